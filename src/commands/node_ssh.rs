//! `pcli node ssh` — interactive session on a node.

use anyhow::Result;
use clap::Args;

use crate::config::CliConfig;
use crate::domain::resolve_target;
use crate::output::OutputContext;
use crate::remote::{Ssh, SshTarget};
use crate::store::NodeStore;
use crate::terraform::Terraform;

/// Arguments for the ssh command.
#[derive(Args)]
pub struct SshArgs {
    /// Target node (inferred when exactly one node is active)
    #[arg(short = 'n', long = "name")]
    pub node_name: Option<String>,
}

/// Run `pcli node ssh`.
///
/// The session inherits the terminal; the remote exit status is not
/// treated as an error since it reflects whatever the operator last ran.
///
/// # Errors
///
/// Returns an error if the target cannot be resolved, the IP lookup
/// fails, or ssh cannot be spawned.
pub async fn run(
    args: &SshArgs,
    ctx: &OutputContext,
    store: &NodeStore,
    config: &CliConfig,
    tf: &impl Terraform,
    ssh: &impl Ssh,
) -> Result<()> {
    let active = store.list()?;
    let name = resolve_target(&active, args.node_name.as_deref())?;

    let ip = super::lookup_public_ip(store, tf, &name).await?;
    ctx.info(&format!("opening ssh tunnel to {name} ({ip})"));

    let key_path = store.key_path(&name);
    let target = SshTarget {
        host: &ip,
        user: &config.instance_user,
        key_path: &key_path,
    };
    let _status = ssh.shell(&target).await?;
    Ok(())
}
