//! Terraform variable collection — fixed per-node values, the region/AMI
//! menu, and interactive prompts for anything the operator must supply.

use std::path::Path;

use anyhow::{Context, Result};
use dialoguer::{Input, Password, Select};
use serde_json::{Map, Value};

use crate::store::NodeStore;

/// One provisioning region and its pinned machine image.
pub struct Region {
    /// Menu label shown to the operator.
    pub label: &'static str,
    /// AWS region identifier.
    pub region: &'static str,
    /// AMI pinned for that region.
    pub ami: &'static str,
}

/// The twelve supported regions, in menu order.
pub const REGIONS: &[Region] = &[
    Region { label: "N.Virginia", region: "us-east-1", ami: "ami-0be2609ba883822ec" },
    Region { label: "Oregon", region: "us-west-2", ami: "ami-0a36eb8fadc976275" },
    Region { label: "N.California", region: "us-west-1", ami: "ami-03130878b60947df3" },
    Region { label: "Ireland", region: "eu-west-1", ami: "ami-01720b5f421cf0179" },
    Region { label: "Frankfurt", region: "eu-central-1", ami: "ami-03c3a7e4263fd998c" },
    Region { label: "Singapore", region: "ap-southeast-1", ami: "ami-00b8d9cb8a7161e41" },
    Region { label: "Tokyo", region: "ap-northeast-1", ami: "ami-01748a72bed07727c" },
    Region { label: "Sydney", region: "ap-southeast-2", ami: "ami-06ce513624b435a22" },
    Region { label: "Seoul", region: "ap-northeast-2", ami: "ami-0094965d55b3bb1ff" },
    Region { label: "San Paulo", region: "sa-east-1", ami: "ami-022082b7f1da62478" },
    Region { label: "London", region: "eu-west-2", ami: "ami-0e80a462ede03e653" },
    Region { label: "Mumbai", region: "ap-south-1", ami: "ami-04b1ddd35fd71475a" },
];

/// Variable keys that always take the node name.
const IDENTITY_KEYS: &[&str] = &["inst_name", "key_name", "sg_name", "sg_desc", "vpc_name"];

/// Variable keys that carry AWS credentials for the node itself.
const NODE_CREDENTIAL_KEYS: &[&str] = &["access_key_id", "secret_access_key"];

/// Load the default variable set from the embedded instance config.
///
/// # Errors
///
/// Returns an error if the embedded defaults are missing or malformed.
pub fn instance_defaults() -> Result<Map<String, Value>> {
    let text = crate::assets::get_asset_str("terraform/inst_config.json")?;
    let value: Value = serde_json::from_str(text).context("parsing embedded instance config")?;
    value
        .as_object()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("embedded instance config is not an object"))
}

/// Set the variables that are always derived from the node itself: its
/// name (instance, key pair, security group, VPC) and the keypair paths.
pub fn apply_node_identity(vars: &mut Map<String, Value>, store: &NodeStore, name: &str) {
    for key in IDENTITY_KEYS {
        vars.insert((*key).to_string(), Value::String(name.to_string()));
    }
    vars.insert(
        "priv_key_path".to_string(),
        Value::String(store.key_path(name).display().to_string()),
    );
    vars.insert(
        "pub_key_path".to_string(),
        Value::String(store.pub_key_path(name).display().to_string()),
    );
}

/// Set region, availability zone (`<region>a`), and AMI from a menu pick.
pub fn apply_region(vars: &mut Map<String, Value>, region: &Region) {
    vars.insert("region".to_string(), Value::String(region.region.to_string()));
    vars.insert(
        "availability_zone".to_string(),
        Value::String(format!("{}a", region.region)),
    );
    vars.insert("inst_ami".to_string(), Value::String(region.ami.to_string()));
}

/// Read a credential value from the environment (`ACCESS_KEY_ID`,
/// `SECRET_ACCESS_KEY`, ...), as the variable key uppercased.
#[must_use]
pub fn env_credential(key: &str) -> Option<String> {
    std::env::var(key.to_uppercase()).ok().filter(|v| !v.is_empty())
}

/// Ask the operator to pick a region.
///
/// # Errors
///
/// Returns an error if the terminal interaction fails.
pub fn prompt_region() -> Result<&'static Region> {
    let labels: Vec<&str> = REGIONS.iter().map(|r| r.label).collect();
    let choice = Select::new()
        .with_prompt("select your region of choice")
        .items(&labels)
        .default(0)
        .interact()
        .context("region selection")?;
    Ok(&REGIONS[choice])
}

/// Prompt for one credential value, visible for key IDs and hidden for
/// secrets. A non-empty environment value short-circuits the prompt.
///
/// # Errors
///
/// Returns an error if the terminal interaction fails.
pub fn prompt_credential(key: &str, audience: &str) -> Result<String> {
    if let Some(value) = env_credential(key) {
        return Ok(value);
    }
    let prompt = format!("[{audience}] insert {key}");
    if key.contains("secret") {
        Password::new()
            .with_prompt(prompt)
            .interact()
            .with_context(|| format!("reading {key}"))
    } else {
        Input::<String>::new()
            .with_prompt(prompt)
            .interact_text()
            .with_context(|| format!("reading {key}"))
    }
}

/// Collect the full variable set in default (non-advanced) mode: fixed
/// identity values, a region pick, and the two credential pairs. Returns
/// the variables plus the operator credentials destined for the IAM file.
///
/// # Errors
///
/// Returns an error if a prompt fails.
pub fn collect_default(store: &NodeStore, name: &str) -> Result<(Map<String, Value>, Map<String, Value>)> {
    let mut vars = instance_defaults()?;
    apply_node_identity(&mut vars, store, name);
    apply_region(&mut vars, prompt_region()?);

    for key in NODE_CREDENTIAL_KEYS {
        let value = prompt_credential(key, "node creation")?;
        vars.insert((*key).to_string(), Value::String(value));
    }

    let mut iam = Map::new();
    for key in NODE_CREDENTIAL_KEYS {
        let op_key = format!("{key}_op");
        let value = prompt_credential(&op_key, "node operator")?;
        iam.insert((*key).to_string(), Value::String(value.clone()));
        vars.insert(op_key, Value::String(value));
    }

    Ok((vars, iam))
}

/// Collect the variable set in advanced mode: every non-derived variable
/// is prompted with its default shown.
///
/// # Errors
///
/// Returns an error if a prompt fails.
pub fn collect_advanced(store: &NodeStore, name: &str) -> Result<(Map<String, Value>, Map<String, Value>)> {
    let mut vars = instance_defaults()?;
    apply_node_identity(&mut vars, store, name);
    apply_region(&mut vars, prompt_region()?);

    let mut iam = Map::new();
    let keys: Vec<String> = vars.keys().cloned().collect();
    for key in keys {
        if IDENTITY_KEYS.contains(&key.as_str())
            || matches!(key.as_str(), "priv_key_path" | "pub_key_path" | "region" | "availability_zone" | "inst_ami")
        {
            continue;
        }
        if NODE_CREDENTIAL_KEYS.contains(&key.as_str()) {
            let value = prompt_credential(&key, "node creation")?;
            vars.insert(key, Value::String(value));
        } else if let Some(base) = key.strip_suffix("_op") {
            let value = prompt_credential(&key, "node operator")?;
            iam.insert(base.to_string(), Value::String(value.clone()));
            vars.insert(key, Value::String(value));
        } else {
            let default = vars[&key].as_str().unwrap_or_default().to_string();
            let value = Input::<String>::new()
                .with_prompt(format!("insert {key}"))
                .default(default)
                .interact_text()
                .with_context(|| format!("reading {key}"))?;
            vars.insert(key, Value::String(value));
        }
    }

    Ok((vars, iam))
}

/// Write the operator IAM credentials file (JSON, mode 600).
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_iam_credentials(path: &Path, creds: &Map<String, Value>) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let content = serde_json::to_string(creds).context("serializing IAM credentials")?;
    std::fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .with_context(|| format!("setting permissions on {}", path.display()))?;
    }
    Ok(())
}
