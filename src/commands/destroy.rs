//! `pcli node destroy` — tear down the instance and its local artifacts.

use anyhow::{Context, Result};
use clap::Args;
use dialoguer::Confirm;

use crate::domain::resolve_target;
use crate::logfile::ToolLog;
use crate::output::OutputContext;
use crate::store::NodeStore;
use crate::terraform::Terraform;

/// Arguments for the destroy command.
#[derive(Args)]
pub struct DestroyArgs {
    /// Node to destroy (inferred when exactly one node is active)
    #[arg(short = 'n', long = "name")]
    pub node_name: Option<String>,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Run `pcli node destroy`.
///
/// # Errors
///
/// Returns an error if the target cannot be resolved, terraform destroy
/// fails, or the local artifacts cannot be removed.
pub async fn run(
    args: &DestroyArgs,
    ctx: &OutputContext,
    store: &NodeStore,
    tf: &impl Terraform,
) -> Result<()> {
    let active = store.list()?;
    let name = resolve_target(&active, args.node_name.as_deref())?;

    if !args.yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("DESTROY {name}? ARE YOU REALLY SURE?"))
            .default(false)
            .interact()
            .context("destroy confirmation")?;
        if !confirmed {
            ctx.info("cancelled");
            return Ok(());
        }
    }

    let log = ToolLog::new(store.log_path());
    let spinner = ctx
        .show_progress()
        .then(|| crate::output::progress::spinner(&format!("destroying {name}")));
    let output = tf.destroy(&store.node_dir(&name)).await?;
    log.append("terraform destroy", &output)?;
    if let Some(pb) = &spinner {
        crate::output::progress::finish_ok(pb, &format!("{name} infrastructure destroyed"));
    }
    anyhow::ensure!(
        output.status.success(),
        "terraform destroy failed; see {} for details",
        log.path().display()
    );

    for artifact in store.remove_artifacts(&name)? {
        ctx.info(&format!("{name}: {artifact} deleted"));
    }
    ctx.success(&format!("{name} destroyed"));
    Ok(())
}
