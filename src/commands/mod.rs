//! Command implementations

pub mod bridge;
pub mod clean;
pub mod destroy;
pub mod exec;
pub mod list;
pub mod node_ssh;
pub mod pkg_update;
pub mod provision;
pub mod update;
pub mod version;

use anyhow::{Context, Result};

use crate::store::NodeStore;
use crate::terraform::{Terraform, parse_public_ip};

/// Look up a node's public IP from its terraform state.
///
/// # Errors
///
/// Returns an error if terraform fails or the output has no public IP.
pub async fn lookup_public_ip(
    store: &NodeStore,
    tf: &impl Terraform,
    name: &str,
) -> Result<String> {
    let output = tf.output_json(&store.node_dir(name)).await?;
    parse_public_ip(&output.stdout).with_context(|| format!("retrieving public IP of {name}"))
}
