//! `pcli version` — installed version and repository link.

use crate::output::OutputContext;

/// Run `pcli version`.
pub fn run(ctx: &OutputContext) {
    ctx.kv("version", env!("CARGO_PKG_VERSION"));
    ctx.kv(
        "updates",
        "https://github.com/provable-things/pnetwork-node-cli",
    );
}
