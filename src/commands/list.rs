//! `pcli node list` — print every active node with its public IP.

use anyhow::Result;

use crate::output::OutputContext;
use crate::store::NodeStore;
use crate::terraform::Terraform;

/// Run `pcli node list`.
///
/// A node whose IP cannot be read (state drift, terraform error) is listed
/// as `unknown ip` rather than failing the whole listing.
///
/// # Errors
///
/// Returns an error if the local node directories cannot be enumerated.
pub async fn run(ctx: &OutputContext, store: &NodeStore, tf: &impl Terraform) -> Result<()> {
    let nodes = store.list()?;
    if nodes.is_empty() {
        ctx.info("no active nodes");
        return Ok(());
    }
    for name in nodes {
        let ip = super::lookup_public_ip(store, tf, &name)
            .await
            .unwrap_or_else(|_| "unknown ip".to_string());
        ctx.kv(&name, &ip);
    }
    Ok(())
}
