//! `pcli update` — self-update from GitHub releases.

use anyhow::{Context, Result};
use clap::Args;
use dialoguer::Confirm;

use crate::output::OutputContext;

/// GitHub repository the CLI is released from.
const REPO_OWNER: &str = "provable-things";
const REPO_NAME: &str = "pnetwork-node-cli";

/// Arguments for the update command.
#[derive(Args)]
pub struct UpdateArgs {
    /// Check for updates without applying them
    #[arg(long)]
    pub check: bool,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Information about an available update.
pub enum UpdateInfo {
    /// A newer version is available.
    Available {
        /// The new version string (without leading `v`).
        version: String,
    },
    /// Already on the latest version.
    UpToDate,
}

/// Abstraction over the update backend, enabling test doubles.
pub trait UpdateChecker {
    /// Check whether a newer version is available.
    ///
    /// # Errors
    ///
    /// Returns an error if the release list cannot be fetched or parsed.
    fn check(&self, current: &str) -> Result<UpdateInfo>;

    /// Download and replace the current binary.
    ///
    /// # Errors
    ///
    /// Returns an error if the download or binary replacement fails.
    fn perform_update(&self, version: &str) -> Result<()>;
}

/// Production implementation using GitHub releases.
pub struct GithubUpdateChecker;

impl UpdateChecker for GithubUpdateChecker {
    fn check(&self, current: &str) -> Result<UpdateInfo> {
        let releases = self_update::backends::github::ReleaseList::configure()
            .repo_owner(REPO_OWNER)
            .repo_name(REPO_NAME)
            .build()
            .context("configuring release list")?
            .fetch()
            .context("fetching releases")?;

        let Some(latest) = releases.first() else {
            return Ok(UpdateInfo::UpToDate);
        };
        let latest_version = latest.version.trim_start_matches('v');

        let newer = semver::Version::parse(latest_version)
            .and_then(|l| semver::Version::parse(current).map(|c| l > c))
            .context("comparing versions")?;
        if newer {
            Ok(UpdateInfo::Available {
                version: latest_version.to_string(),
            })
        } else {
            Ok(UpdateInfo::UpToDate)
        }
    }

    fn perform_update(&self, version: &str) -> Result<()> {
        self_update::backends::github::Update::configure()
            .repo_owner(REPO_OWNER)
            .repo_name(REPO_NAME)
            .bin_name("pcli")
            .current_version(env!("CARGO_PKG_VERSION"))
            .target_version_tag(&format!("v{version}"))
            .show_output(false)
            .no_confirm(true)
            .build()
            .context("configuring update")?
            .update()
            .context("applying update")?;
        Ok(())
    }
}

/// Run `pcli update [--check]`.
///
/// # Errors
///
/// Returns an error if the version check, user prompt, or download fails.
pub fn run(args: &UpdateArgs, ctx: &OutputContext, checker: &impl UpdateChecker) -> Result<()> {
    let current = env!("CARGO_PKG_VERSION");
    ctx.info(&format!("installed version: {current}"));

    match checker.check(current)? {
        UpdateInfo::UpToDate => {
            ctx.success("pcli is up to date");
            Ok(())
        }
        UpdateInfo::Available { version } => {
            ctx.info(&format!("new version available: {version}"));
            if args.check {
                ctx.info(&format!("run `pcli update` to install {version}"));
                return Ok(());
            }
            if !args.yes {
                let confirmed = Confirm::new()
                    .with_prompt(format!("update to {version}?"))
                    .default(true)
                    .interact()
                    .context("update confirmation")?;
                if !confirmed {
                    ctx.info("cancelled");
                    return Ok(());
                }
            }
            checker.perform_update(&version)?;
            ctx.success(&format!("updated to {version}"));
            Ok(())
        }
    }
}
