//! Terraform CLI abstraction — enables test doubles for all `terraform`
//! commands.
//!
//! Every invocation passes `-chdir=<node_dir>` so terraform resolves its
//! state file inside the per-node directory.

use std::path::Path;
use std::process::Output;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::command_runner::{CommandRunner, LONG_CMD_TIMEOUT, TokioCommandRunner};

/// Timeout for `terraform init` (provider downloads).
const INIT_TIMEOUT: Duration = Duration::from_secs(300);

/// Timeout for `terraform output`.
const OUTPUT_TIMEOUT: Duration = Duration::from_secs(60);

/// Abstraction over the terraform CLI, enabling test doubles.
///
/// The production implementation delegates to the `terraform` binary via
/// a [`CommandRunner`].
#[allow(async_fn_in_trait)]
pub trait Terraform {
    /// Run `terraform -chdir=<dir> init`.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned.
    async fn init(&self, node_dir: &Path) -> Result<Output>;

    /// Run `terraform -chdir=<dir> plan`.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned.
    async fn plan(&self, node_dir: &Path) -> Result<Output>;

    /// Run `terraform -chdir=<dir> apply -auto-approve`.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned.
    async fn apply(&self, node_dir: &Path) -> Result<Output>;

    /// Run `terraform -chdir=<dir> apply` with inherited stdio so the
    /// operator can review and confirm the plan (advanced mode).
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned.
    async fn apply_interactive(&self, node_dir: &Path) -> Result<std::process::ExitStatus>;

    /// Run `terraform -chdir=<dir> destroy -auto-approve`.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned.
    async fn destroy(&self, node_dir: &Path) -> Result<Output>;

    /// Run `terraform -chdir=<dir> output -json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned.
    async fn output_json(&self, node_dir: &Path) -> Result<Output>;
}

/// Production implementation — shells out to the `terraform` binary.
pub struct TerraformCli<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> TerraformCli<R> {
    /// Create a terraform driver with an explicit runner (used in tests).
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

impl TerraformCli<TokioCommandRunner> {
    /// Convenience constructor for production use.
    #[must_use]
    pub fn default_runner() -> Self {
        Self::new(TokioCommandRunner::new(LONG_CMD_TIMEOUT))
    }
}

fn chdir_arg(node_dir: &Path) -> String {
    format!("-chdir={}", node_dir.display())
}

impl<R: CommandRunner> Terraform for TerraformCli<R> {
    async fn init(&self, node_dir: &Path) -> Result<Output> {
        let chdir = chdir_arg(node_dir);
        self.runner
            .run_with_timeout("terraform", &[&chdir, "init", "-no-color"], INIT_TIMEOUT)
            .await
            .context("terraform init")
    }

    async fn plan(&self, node_dir: &Path) -> Result<Output> {
        let chdir = chdir_arg(node_dir);
        self.runner
            .run_with_timeout("terraform", &[&chdir, "plan", "-no-color"], LONG_CMD_TIMEOUT)
            .await
            .context("terraform plan")
    }

    async fn apply(&self, node_dir: &Path) -> Result<Output> {
        let chdir = chdir_arg(node_dir);
        self.runner
            .run_with_timeout(
                "terraform",
                &[&chdir, "apply", "-auto-approve", "-no-color"],
                LONG_CMD_TIMEOUT,
            )
            .await
            .context("terraform apply")
    }

    async fn apply_interactive(&self, node_dir: &Path) -> Result<std::process::ExitStatus> {
        let chdir = chdir_arg(node_dir);
        self.runner
            .run_status("terraform", &[&chdir, "apply"])
            .await
            .context("terraform apply")
    }

    async fn destroy(&self, node_dir: &Path) -> Result<Output> {
        let chdir = chdir_arg(node_dir);
        self.runner
            .run_with_timeout(
                "terraform",
                &[&chdir, "destroy", "-auto-approve", "-no-color"],
                LONG_CMD_TIMEOUT,
            )
            .await
            .context("terraform destroy")
    }

    async fn output_json(&self, node_dir: &Path) -> Result<Output> {
        let chdir = chdir_arg(node_dir);
        self.runner
            .run_with_timeout("terraform", &[&chdir, "output", "-json"], OUTPUT_TIMEOUT)
            .await
            .context("terraform output")
    }
}

/// Extract the node's public IP from `terraform output -json`.
///
/// The outputs file exposes `public_ip` as a one-element list (the
/// instance resource uses `count = 1`).
///
/// # Errors
///
/// Returns an error if the output is not JSON or has no public IP entry.
pub fn parse_public_ip(stdout: &[u8]) -> Result<String> {
    let value: serde_json::Value =
        serde_json::from_slice(stdout).context("parsing terraform output")?;
    value["public_ip"]["value"][0]
        .as_str()
        .map(ToString::to_string)
        .ok_or_else(|| anyhow::anyhow!("no public_ip in terraform output"))
}
