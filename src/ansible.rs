//! Ansible CLI abstraction — playbook runs and inventory files.

use std::path::Path;
use std::process::Output;

use anyhow::{Context, Result};

use crate::command_runner::{CommandRunner, LONG_CMD_TIMEOUT, TokioCommandRunner};

/// Abstraction over `ansible-playbook`, enabling test doubles.
#[allow(async_fn_in_trait)]
pub trait Ansible {
    /// Run `ansible-playbook <playbook> -i <inventory>`, optionally with a
    /// single `--extra-vars key=value` pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned.
    async fn run_playbook(
        &self,
        playbook: &Path,
        inventory: &Path,
        extra_var: Option<(&str, &str)>,
    ) -> Result<Output>;
}

/// Production implementation — shells out to the `ansible-playbook` binary
/// with host key checking disabled (nodes are freshly provisioned and not
/// yet in any known_hosts file).
pub struct AnsibleCli<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> AnsibleCli<R> {
    /// Create an ansible driver with an explicit runner (used in tests).
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

impl AnsibleCli<TokioCommandRunner> {
    /// Convenience constructor for production use.
    #[must_use]
    pub fn default_runner() -> Self {
        Self::new(TokioCommandRunner::new(LONG_CMD_TIMEOUT))
    }
}

/// Build the `ansible-playbook` argument list.
#[must_use]
pub fn playbook_args(
    playbook: &Path,
    inventory: &Path,
    extra_var: Option<(&str, &str)>,
) -> Vec<String> {
    let mut args = vec![
        playbook.display().to_string(),
        "-i".to_string(),
        inventory.display().to_string(),
    ];
    if let Some((name, value)) = extra_var {
        args.push("--extra-vars".to_string());
        args.push(format!("{name}={value}"));
    }
    args
}

impl<R: CommandRunner> Ansible for AnsibleCli<R> {
    async fn run_playbook(
        &self,
        playbook: &Path,
        inventory: &Path,
        extra_var: Option<(&str, &str)>,
    ) -> Result<Output> {
        let args = playbook_args(playbook, inventory, extra_var);
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        self.runner
            .run_with_env(
                "ansible-playbook",
                &arg_refs,
                &[("ANSIBLE_HOST_KEY_CHECKING", "False")],
                LONG_CMD_TIMEOUT,
            )
            .await
            .with_context(|| format!("ansible-playbook {}", playbook.display()))
    }
}

/// Write the per-node inventory file: one `[nodes]` group with the node's
/// public IP, login user, and private key.
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created or the file
/// cannot be written.
pub fn write_inventory(path: &Path, ip: &str, user: &str, key_path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let content = format!(
        "[nodes]\n{ip} ansible_ssh_user={user} ansible_ssh_private_key_file={}\n",
        key_path.display()
    );
    std::fs::write(path, content).with_context(|| format!("writing {}", path.display()))
}
