//! Remote command execution over ssh/scp.

use std::path::Path;
use std::process::Output;

use anyhow::{Context, Result};

use crate::command_runner::{CommandRunner, DEFAULT_EXEC_TIMEOUT, TokioCommandRunner};

/// One remote endpoint: public IP, login user, and the node's private key.
pub struct SshTarget<'a> {
    pub host: &'a str,
    pub user: &'a str,
    pub key_path: &'a Path,
}

impl SshTarget<'_> {
    /// `user@host` destination string.
    #[must_use]
    pub fn destination(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }
}

/// Abstraction over ssh/scp, enabling test doubles.
#[allow(async_fn_in_trait)]
pub trait Ssh {
    /// Run `command` on the target and capture its output.
    ///
    /// # Errors
    ///
    /// Returns an error if ssh cannot be spawned.
    async fn exec(&self, target: &SshTarget<'_>, command: &str) -> Result<Output>;

    /// Run a local script on the target by piping it to `bash -s`.
    ///
    /// # Errors
    ///
    /// Returns an error if ssh cannot be spawned or stdin write fails.
    async fn exec_script(&self, target: &SshTarget<'_>, script: &[u8]) -> Result<Output>;

    /// Open an interactive session with inherited stdio.
    ///
    /// # Errors
    ///
    /// Returns an error if ssh cannot be spawned.
    async fn shell(&self, target: &SshTarget<'_>) -> Result<std::process::ExitStatus>;

    /// Copy a local file to the target.
    ///
    /// # Errors
    ///
    /// Returns an error if scp cannot be spawned.
    async fn copy_to(&self, target: &SshTarget<'_>, local: &Path, remote: &str) -> Result<Output>;

    /// Copy a remote file from the target.
    ///
    /// # Errors
    ///
    /// Returns an error if scp cannot be spawned.
    async fn copy_from(&self, target: &SshTarget<'_>, remote: &str, local: &Path) -> Result<Output>;
}

/// Production implementation — shells out to the `ssh` and `scp` binaries.
///
/// Host key checking is disabled and known_hosts writes are suppressed:
/// nodes are freshly provisioned, their host keys are not pinned anywhere,
/// and destroyed nodes would otherwise leave stale entries behind.
pub struct OpenSsh<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> OpenSsh<R> {
    /// Create an ssh driver with an explicit runner (used in tests).
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

impl OpenSsh<TokioCommandRunner> {
    /// Convenience constructor for production use.
    #[must_use]
    pub fn default_runner() -> Self {
        Self::new(TokioCommandRunner::new(DEFAULT_EXEC_TIMEOUT))
    }
}

/// Base `ssh` argument list for `target` (key, host key options, destination).
#[must_use]
pub fn ssh_args(target: &SshTarget<'_>) -> Vec<String> {
    vec![
        "-i".to_string(),
        target.key_path.display().to_string(),
        "-o".to_string(),
        "StrictHostKeyChecking=no".to_string(),
        "-o".to_string(),
        "UserKnownHostsFile=/dev/null".to_string(),
        target.destination(),
    ]
}

/// `scp` argument list copying `from` to `to`.
#[must_use]
pub fn scp_args(target: &SshTarget<'_>, from: &str, to: &str) -> Vec<String> {
    vec![
        "-q".to_string(),
        "-i".to_string(),
        target.key_path.display().to_string(),
        "-o".to_string(),
        "StrictHostKeyChecking=no".to_string(),
        "-o".to_string(),
        "UserKnownHostsFile=/dev/null".to_string(),
        from.to_string(),
        to.to_string(),
    ]
}

impl<R: CommandRunner> Ssh for OpenSsh<R> {
    async fn exec(&self, target: &SshTarget<'_>, command: &str) -> Result<Output> {
        let mut args = ssh_args(target);
        args.push(command.to_string());
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        self.runner
            .run("ssh", &arg_refs)
            .await
            .with_context(|| format!("running '{command}' on {}", target.host))
    }

    async fn exec_script(&self, target: &SshTarget<'_>, script: &[u8]) -> Result<Output> {
        let mut args = ssh_args(target);
        args.push("bash".to_string());
        args.push("-s".to_string());
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        self.runner
            .run_with_stdin("ssh", &arg_refs, script)
            .await
            .with_context(|| format!("running script on {}", target.host))
    }

    async fn shell(&self, target: &SshTarget<'_>) -> Result<std::process::ExitStatus> {
        let args = ssh_args(target);
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        self.runner
            .run_status("ssh", &arg_refs)
            .await
            .with_context(|| format!("opening ssh session to {}", target.host))
    }

    async fn copy_to(&self, target: &SshTarget<'_>, local: &Path, remote: &str) -> Result<Output> {
        let to = format!("{}:{remote}", target.destination());
        let args = scp_args(target, &local.display().to_string(), &to);
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        self.runner
            .run("scp", &arg_refs)
            .await
            .with_context(|| format!("copying {} to {}", local.display(), target.host))
    }

    async fn copy_from(
        &self,
        target: &SshTarget<'_>,
        remote: &str,
        local: &Path,
    ) -> Result<Output> {
        let from = format!("{}:{remote}", target.destination());
        let args = scp_args(target, &from, &local.display().to_string());
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        self.runner
            .run("scp", &arg_refs)
            .await
            .with_context(|| format!("copying {remote} from {}", target.host))
    }
}
