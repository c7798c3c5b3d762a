//! `pcli node exec` — run a command or a local script on a node.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::config::CliConfig;
use crate::domain::resolve_target;
use crate::output::OutputContext;
use crate::remote::{Ssh, SshTarget};
use crate::store::NodeStore;
use crate::terraform::Terraform;

/// Arguments for the exec command.
#[derive(Args)]
pub struct ExecArgs {
    /// Target node (inferred when exactly one node is active)
    #[arg(short = 'n', long = "name")]
    pub node_name: Option<String>,

    /// Local script to run on the node via `bash -s`
    #[arg(short = 's', long = "script", conflicts_with = "command")]
    pub script: Option<PathBuf>,

    /// Command to run on the node
    pub command: Option<String>,
}

/// Run `pcli node exec`.
///
/// # Errors
///
/// Returns an error if the target cannot be resolved, neither (or both)
/// of command/script is given, or the remote invocation fails to spawn.
pub async fn run(
    args: &ExecArgs,
    ctx: &OutputContext,
    store: &NodeStore,
    config: &CliConfig,
    tf: &impl Terraform,
    ssh: &impl Ssh,
) -> Result<()> {
    let active = store.list()?;
    let name = resolve_target(&active, args.node_name.as_deref())?;

    let ip = super::lookup_public_ip(store, tf, &name).await?;
    let key_path = store.key_path(&name);
    let target = SshTarget {
        host: &ip,
        user: &config.instance_user,
        key_path: &key_path,
    };

    let output = match (&args.command, &args.script) {
        (Some(command), None) => ssh.exec(&target, command).await?,
        (None, Some(script)) => {
            let body = std::fs::read(script)
                .with_context(|| format!("reading {}", script.display()))?;
            ssh.exec_script(&target, &body).await?
        }
        _ => anyhow::bail!("provide a command or --script"),
    };

    print!("{}", String::from_utf8_lossy(&output.stdout));
    if !output.status.success() {
        ctx.error(&format!(
            "remote command failed on {name}: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        ));
        anyhow::bail!("remote command failed");
    }
    Ok(())
}
