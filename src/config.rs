//! CLI configuration — a YAML file under the pcli home directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

fn default_instance_user() -> String {
    "ec2-user".to_string()
}

fn default_remote_credentials_path() -> String {
    "/etc/pnode/data/.node-cred".to_string()
}

fn default_release_url() -> String {
    "https://release-server.p.network/pnode/".to_string()
}

fn default_release_url_dev() -> String {
    "https://release-server.dev.p.network/pnode/".to_string()
}

/// User-tunable settings. Every field has a default so a missing or partial
/// `config.yaml` still loads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Login user on provisioned instances.
    #[serde(default = "default_instance_user")]
    pub instance_user: String,

    /// Path on the node where the dashboard password is stored.
    #[serde(default = "default_remote_credentials_path")]
    pub remote_credentials_path: String,

    /// Production release-server URL for the node package repository.
    #[serde(default = "default_release_url")]
    pub release_url: String,

    /// Development release-server URL, selected by `provision --dev`.
    #[serde(default = "default_release_url_dev")]
    pub release_url_dev: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            instance_user: default_instance_user(),
            remote_credentials_path: default_remote_credentials_path(),
            release_url: default_release_url(),
            release_url_dev: default_release_url_dev(),
        }
    }
}

impl CliConfig {
    /// Load the config from `<home>/config.yaml`, falling back to defaults
    /// when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(home: &Path) -> Result<Self> {
        let path = Self::path(home);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        serde_yaml::from_str(&content).with_context(|| format!("cannot parse {}", path.display()))
    }

    /// Save the config to `<home>/config.yaml` with mode 600.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file
    /// cannot be written.
    pub fn save(&self, home: &Path) -> Result<()> {
        let path = Self::path(home);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("cannot create {}", parent.display()))?;
        }
        let content = serde_yaml::to_string(self).context("cannot serialize config")?;
        std::fs::write(&path, content)
            .with_context(|| format!("cannot write {}", path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("cannot set permissions on {}", path.display()))?;
        }
        Ok(())
    }

    /// Path of the config file under `home`.
    #[must_use]
    pub fn path(home: &Path) -> PathBuf {
        home.join("config.yaml")
    }

    /// Release-server URL for the requested channel.
    #[must_use]
    pub fn release_url_for(&self, dev: bool) -> &str {
        if dev {
            &self.release_url_dev
        } else {
            &self.release_url
        }
    }
}
