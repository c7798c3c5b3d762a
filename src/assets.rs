//! Embedded assets — the static terraform templates and ansible playbooks
//! compiled into the binary and installed under the pcli home on demand.
//!
//! At compile time, `include_dir!` embeds everything under `assets/`:
//!   - `terraform/main.tf`            — instance + networking definition
//!   - `terraform/outputs.tf`         — exposes the public IP
//!   - `terraform/variables.tf.json`  — variables template with `PH_*` placeholders
//!   - `terraform/inst_config.json`   — default values for every variable
//!   - `ansible/sys_config.yml`       — base system setup playbook
//!   - `ansible/node_package.yml`     — node package install playbook
//!   - `ansible/edit_user_pwd.yml`    — instance user password playbook

use std::path::Path;

use anyhow::{Context, Result};
use include_dir::{Dir, include_dir};

static EMBEDDED_ASSETS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/assets");

/// Playbooks shipped with the CLI, in the order they are installed.
pub const PLAYBOOKS: &[&str] = &["sys_config.yml", "node_package.yml", "edit_user_pwd.yml"];

/// Return the raw bytes of a single embedded asset.
///
/// # Errors
///
/// Returns an error if no asset with the given `name` exists.
pub fn get_asset(name: &str) -> Result<&'static [u8]> {
    EMBEDDED_ASSETS
        .get_file(name)
        .map(include_dir::File::contents)
        .ok_or_else(|| anyhow::anyhow!("embedded asset not found: {name}"))
}

/// Return an embedded asset as UTF-8 text.
///
/// # Errors
///
/// Returns an error if the asset is missing or not valid UTF-8.
pub fn get_asset_str(name: &str) -> Result<&'static str> {
    EMBEDDED_ASSETS
        .get_file(name)
        .and_then(include_dir::File::contents_utf8)
        .ok_or_else(|| anyhow::anyhow!("embedded asset not found or not UTF-8: {name}"))
}

/// Copy `main.tf` and `outputs.tf` into a node's terraform directory.
///
/// # Errors
///
/// Returns an error if a file cannot be written.
pub fn install_terraform_files(node_dir: &Path) -> Result<()> {
    for name in ["main.tf", "outputs.tf"] {
        let bytes = get_asset(&format!("terraform/{name}"))?;
        let dest = node_dir.join(name);
        std::fs::write(&dest, bytes).with_context(|| format!("writing {}", dest.display()))?;
    }
    Ok(())
}

/// Install the embedded playbooks into `playbooks_dir`, overwriting any
/// previous copies so upgrades take effect.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or a playbook
/// cannot be written.
pub fn install_playbooks(playbooks_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(playbooks_dir)
        .with_context(|| format!("creating {}", playbooks_dir.display()))?;
    for name in PLAYBOOKS {
        let bytes = get_asset(&format!("ansible/{name}"))?;
        let dest = playbooks_dir.join(name);
        std::fs::write(&dest, bytes).with_context(|| format!("writing {}", dest.display()))?;
    }
    Ok(())
}
