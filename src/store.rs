//! Local node bookkeeping under the pcli home directory.
//!
//! Layout:
//!   `<home>/terraform/<node>/`        — per-node terraform working directory
//!   `<home>/terraform/<node>/.<node>-cred` — dashboard credentials dump
//!   `<home>/ssh/<node>` / `<node>.pub` — generated keypair
//!   `<home>/ansible/hosts-<node>`      — per-node inventory
//!   `<home>/ansible/playbooks/`        — installed playbooks
//!   `<home>/pcli.log`                  — external tool output
//!   `<home>/.iam_credentials`          — operator IAM credentials

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Tracks which nodes exist and where their local artifacts live.
pub struct NodeStore {
    root: PathBuf,
}

impl NodeStore {
    /// Create a store rooted at the default location: `$PCLI_HOME` if set,
    /// otherwise `~/.pcli`.
    ///
    /// # Errors
    ///
    /// Returns an error if neither `PCLI_HOME` nor the home directory can
    /// be determined.
    pub fn new() -> Result<Self> {
        if let Ok(val) = std::env::var("PCLI_HOME") {
            return Ok(Self::with_root(PathBuf::from(val)));
        }
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
        Ok(Self::with_root(home.join(".pcli")))
    }

    /// Create a store rooted at an arbitrary path (used in tests).
    #[must_use]
    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }

    /// The pcli home directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding one subdirectory per active node.
    #[must_use]
    pub fn terraform_dir(&self) -> PathBuf {
        self.root.join("terraform")
    }

    /// Terraform working directory for `name`.
    #[must_use]
    pub fn node_dir(&self, name: &str) -> PathBuf {
        self.terraform_dir().join(name)
    }

    /// Private key path for `name`.
    #[must_use]
    pub fn key_path(&self, name: &str) -> PathBuf {
        self.root.join("ssh").join(name)
    }

    /// Public key path for `name`.
    #[must_use]
    pub fn pub_key_path(&self, name: &str) -> PathBuf {
        self.root.join("ssh").join(format!("{name}.pub"))
    }

    /// Ansible inventory path for `name`.
    #[must_use]
    pub fn inventory_path(&self, name: &str) -> PathBuf {
        self.root.join("ansible").join(format!("hosts-{name}"))
    }

    /// Directory the embedded playbooks are installed into.
    #[must_use]
    pub fn playbooks_dir(&self) -> PathBuf {
        self.root.join("ansible").join("playbooks")
    }

    /// External tool log file.
    #[must_use]
    pub fn log_path(&self) -> PathBuf {
        self.root.join("pcli.log")
    }

    /// Operator IAM credentials dump.
    #[must_use]
    pub fn iam_credentials_path(&self) -> PathBuf {
        self.root.join(".iam_credentials")
    }

    /// Dashboard credentials file for `name`.
    #[must_use]
    pub fn credentials_path(&self, name: &str) -> PathBuf {
        self.node_dir(name).join(format!(".{name}-cred"))
    }

    /// Names of all active nodes, sorted. Hidden entries and plain files in
    /// the terraform directory are not nodes.
    ///
    /// # Errors
    ///
    /// Returns an error if the terraform directory exists but cannot be read.
    pub fn list(&self) -> Result<Vec<String>> {
        let dir = self.terraform_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in
            std::fs::read_dir(&dir).with_context(|| format!("reading {}", dir.display()))?
        {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if !name.starts_with('.') {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    /// Number of active nodes.
    ///
    /// # Errors
    ///
    /// Returns an error if the terraform directory cannot be read.
    pub fn count(&self) -> Result<usize> {
        Ok(self.list()?.len())
    }

    /// `true` if a node directory for `name` exists.
    #[must_use]
    pub fn exists(&self, name: &str) -> bool {
        self.node_dir(name).is_dir()
    }

    /// Create the node directory (and the ssh/ansible dirs alongside it).
    ///
    /// # Errors
    ///
    /// Returns an error if any directory cannot be created.
    pub fn create_node_dir(&self, name: &str) -> Result<PathBuf> {
        let dir = self.node_dir(name);
        std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
        std::fs::create_dir_all(self.root.join("ssh"))
            .with_context(|| format!("creating {}", self.root.join("ssh").display()))?;
        std::fs::create_dir_all(self.root.join("ansible"))
            .with_context(|| format!("creating {}", self.root.join("ansible").display()))?;
        Ok(dir)
    }

    /// Dump the dashboard credentials for `name` with mode 600.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_credentials(&self, name: &str, user: &str, pwd: &str, ip: &str) -> Result<PathBuf> {
        let path = self.credentials_path(name);
        let content = format!("user: {user} - pwd: {pwd} - IP: {ip}\n");
        std::fs::write(&path, content)
            .with_context(|| format!("writing {}", path.display()))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("setting permissions on {}", path.display()))?;
        }
        Ok(path)
    }

    /// Remove every local artifact belonging to `name`: the node directory,
    /// the inventory file, and the keypair. Idempotent — missing artifacts
    /// are skipped. Returns a label for each artifact actually removed.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing artifact cannot be removed.
    pub fn remove_artifacts(&self, name: &str) -> Result<Vec<String>> {
        let mut removed = Vec::new();

        let node_dir = self.node_dir(name);
        if node_dir.exists() {
            std::fs::remove_dir_all(&node_dir)
                .with_context(|| format!("removing {}", node_dir.display()))?;
            removed.push("terraform folder".to_string());
        }

        let inventory = self.inventory_path(name);
        if inventory.exists() {
            std::fs::remove_file(&inventory)
                .with_context(|| format!("removing {}", inventory.display()))?;
            removed.push("ansible host file".to_string());
        }

        let mut key_removed = false;
        for key in [self.key_path(name), self.pub_key_path(name)] {
            if key.exists() {
                std::fs::remove_file(&key)
                    .with_context(|| format!("removing {}", key.display()))?;
                key_removed = true;
            }
        }
        if key_removed {
            removed.push("ssh keypair".to_string());
        }

        Ok(removed)
    }
}
