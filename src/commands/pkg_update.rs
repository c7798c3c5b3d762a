//! `pcli node update` — update the node package suite (or named packages)
//! via yum on the node.

use anyhow::Result;
use clap::Args;

use crate::config::CliConfig;
use crate::domain::resolve_target;
use crate::logfile::ToolLog;
use crate::output::OutputContext;
use crate::remote::{Ssh, SshTarget};
use crate::store::NodeStore;
use crate::terraform::Terraform;

/// Arguments for the package update command.
#[derive(Args)]
pub struct PkgUpdateArgs {
    /// Target node (inferred when exactly one node is active)
    #[arg(short = 'n', long = "name")]
    pub node_name: Option<String>,

    /// Packages to update (`all` or omitted for the whole pnode suite)
    #[arg(short = 'p', long = "package", num_args = 1..)]
    pub packages: Vec<String>,
}

/// Build the remote yum command sequence for the requested packages.
///
/// No packages, or the single package `all`, updates the whole
/// `pnode-nitro*` suite; otherwise each named package is updated on its
/// own. Mixing `all` with named packages is ambiguous and rejected.
///
/// # Errors
///
/// Returns an error if `all` is combined with named packages.
pub fn update_commands(packages: &[String]) -> Result<Vec<String>> {
    let is_all = packages.is_empty() || (packages.len() == 1 && packages[0] == "all");
    if is_all {
        return Ok(vec![
            "sudo yum clean all -q".to_string(),
            "sudo yum info pnode-nitro*".to_string(),
            "sudo yum update pnode-nitro* -y".to_string(),
        ]);
    }
    if packages.iter().any(|p| p == "all") {
        anyhow::bail!("unexpected package to update: 'all' cannot be combined with named packages");
    }
    Ok(packages
        .iter()
        .map(|pkg| format!("sudo yum update {pkg} -y"))
        .collect())
}

/// Run `pcli node update`.
///
/// # Errors
///
/// Returns an error if the target cannot be resolved, the package list is
/// ambiguous, or a remote command fails.
pub async fn run(
    args: &PkgUpdateArgs,
    ctx: &OutputContext,
    store: &NodeStore,
    config: &CliConfig,
    tf: &impl Terraform,
    ssh: &impl Ssh,
) -> Result<()> {
    let active = store.list()?;
    let name = resolve_target(&active, args.node_name.as_deref())?;
    let commands = update_commands(&args.packages)?;

    let ip = super::lookup_public_ip(store, tf, &name).await?;
    let key_path = store.key_path(&name);
    let target = SshTarget {
        host: &ip,
        user: &config.instance_user,
        key_path: &key_path,
    };
    let log = ToolLog::new(store.log_path());

    ctx.info(&format!("updating packages on {name}"));
    for command in commands {
        let output = ssh.exec(&target, &command).await?;
        log.append(&command, &output)?;
        anyhow::ensure!(
            output.status.success(),
            "'{command}' failed on {name}: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    ctx.success("packages updated");
    Ok(())
}
