//! SSH keypair generation for provisioned nodes.

use std::path::Path;

use anyhow::{Context, Result};

use crate::command_runner::{CommandRunner, DEFAULT_CMD_TIMEOUT, TokioCommandRunner};

/// Abstraction over keypair creation, enabling test doubles.
#[allow(async_fn_in_trait)]
pub trait Keygen {
    /// Create a keypair at `key_path` (private) / `key_path.pub` (public).
    ///
    /// # Errors
    ///
    /// Returns an error if generation fails.
    async fn create_keypair(&self, key_path: &Path) -> Result<()>;
}

/// Production implementation — shells out to `ssh-keygen` for a 4096-bit
/// RSA keypair with an empty passphrase, then tightens the private key to
/// mode 600.
pub struct SshKeygen<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> SshKeygen<R> {
    /// Create a keygen driver with an explicit runner (used in tests).
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

impl SshKeygen<TokioCommandRunner> {
    /// Convenience constructor for production use.
    #[must_use]
    pub fn default_runner() -> Self {
        Self::new(TokioCommandRunner::new(DEFAULT_CMD_TIMEOUT))
    }
}

impl<R: CommandRunner> Keygen for SshKeygen<R> {
    async fn create_keypair(&self, key_path: &Path) -> Result<()> {
        if let Some(parent) = key_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let path = key_path.display().to_string();
        let output = self
            .runner
            .run(
                "ssh-keygen",
                &["-b", "4096", "-t", "rsa", "-f", &path, "-q", "-N", ""],
            )
            .await
            .context("ssh-keygen")?;
        anyhow::ensure!(
            output.status.success(),
            "ssh-keygen failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(key_path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("setting permissions on {}", key_path.display()))?;
        }
        Ok(())
    }
}

/// `true` if a private key already exists at `key_path`.
#[must_use]
pub fn keypair_exists(key_path: &Path) -> bool {
    key_path.is_file()
}
