//! `pcli node clean` — delete local artifacts left behind by a failed
//! provisioning run, without touching any cloud resources.

use anyhow::Result;
use clap::Args;

use crate::domain::validate_name;
use crate::output::OutputContext;
use crate::store::NodeStore;

/// Arguments for the clean command.
#[derive(Args)]
pub struct CleanArgs {
    /// Node whose artifacts should be removed
    #[arg(short = 'n', long = "name", required = true)]
    pub node_name: String,
}

/// Run `pcli node clean`.
///
/// # Errors
///
/// Returns an error if the name is invalid or an artifact cannot be
/// removed.
pub fn run(args: &CleanArgs, ctx: &OutputContext, store: &NodeStore) -> Result<()> {
    validate_name(&args.node_name)?;
    let removed = store.remove_artifacts(&args.node_name)?;
    if removed.is_empty() {
        ctx.info(&format!("{}: nothing to clean", args.node_name));
        return Ok(());
    }
    for artifact in removed {
        ctx.info(&format!("{}: {artifact} deleted", args.node_name));
    }
    Ok(())
}
