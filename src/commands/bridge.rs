//! `pcli bridge` — drive the bridge components on a node via the remote
//! `ptokens_bridge` tool.

use anyhow::Result;
use clap::{Args, ValueEnum};

use crate::config::CliConfig;
use crate::domain::{BridgeError, resolve_target};
use crate::output::OutputContext;
use crate::remote::{Ssh, SshTarget};
use crate::store::NodeStore;
use crate::terraform::Terraform;

/// Bridge-wide and single-component actions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum BridgeAction {
    Start,
    Stop,
    Restart,
    Deploy,
    StartSingle,
    StopSingle,
    RestartSingle,
}

impl BridgeAction {
    /// Wire spelling understood by the remote `ptokens_bridge` tool.
    #[must_use]
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
            Self::Deploy => "deploy",
            Self::StartSingle => "start_single",
            Self::StopSingle => "stop_single",
            Self::RestartSingle => "restart_single",
        }
    }

    /// `true` for the `*-single` actions.
    #[must_use]
    pub fn is_single(self) -> bool {
        matches!(self, Self::StartSingle | Self::StopSingle | Self::RestartSingle)
    }
}

/// Bridge components a single action can target.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum BridgeComponent {
    Api,
    SyncerNative,
    SyncerHost,
    All,
}

impl BridgeComponent {
    /// Wire spelling understood by the remote `ptokens_bridge` tool.
    #[must_use]
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::SyncerNative => "syncer_native",
            Self::SyncerHost => "syncer_host",
            Self::All => "all",
        }
    }
}

/// Arguments for the bridge command.
#[derive(Args)]
pub struct BridgeArgs {
    /// Action to perform
    #[arg(value_enum)]
    pub action: BridgeAction,

    /// Component to target (`all` for whole-bridge actions)
    #[arg(value_enum)]
    pub component: BridgeComponent,

    /// Target node
    #[arg(short = 'n', long = "name", required = true)]
    pub node_name: String,
}

/// Map an action/component pair to the remote command line.
///
/// # Errors
///
/// Returns a [`BridgeError`] when a single-component action targets `all`
/// or a whole-bridge action targets a concrete component.
pub fn remote_command(
    action: BridgeAction,
    component: BridgeComponent,
) -> Result<String, BridgeError> {
    match (action.is_single(), component) {
        (true, BridgeComponent::All) => Err(BridgeError::ComponentRequired),
        (true, comp) => Ok(format!(
            "ptokens_bridge {} {}",
            action.wire_name(),
            comp.wire_name()
        )),
        (false, BridgeComponent::All) => Ok(format!("ptokens_bridge {}", action.wire_name())),
        (false, _) => Err(BridgeError::ComponentNotAllowed),
    }
}

/// Run `pcli bridge`.
///
/// # Errors
///
/// Returns an error if the action/component pair is invalid, the node
/// cannot be resolved, or the remote command fails.
pub async fn run(
    args: &BridgeArgs,
    ctx: &OutputContext,
    store: &NodeStore,
    config: &CliConfig,
    tf: &impl Terraform,
    ssh: &impl Ssh,
) -> Result<()> {
    let command = remote_command(args.action, args.component)?;
    let active = store.list()?;
    let name = resolve_target(&active, Some(&args.node_name))?;

    let ip = super::lookup_public_ip(store, tf, &name).await?;
    let key_path = store.key_path(&name);
    let target = SshTarget {
        host: &ip,
        user: &config.instance_user,
        key_path: &key_path,
    };

    let output = ssh.exec(&target, &command).await?;
    print!("{}", String::from_utf8_lossy(&output.stdout));
    anyhow::ensure!(
        output.status.success(),
        "'{command}' failed on {name}: {}",
        String::from_utf8_lossy(&output.stderr).trim()
    );
    ctx.success(&format!("{command} completed on {name}"));
    Ok(())
}
