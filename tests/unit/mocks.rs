//! Shared mock infrastructure for unit tests.
//!
//! Provides canned [`Terraform`], [`Ansible`], [`Ssh`], and [`Keygen`]
//! implementations that record their calls instead of spawning processes.

#![allow(clippy::expect_used)]

use std::os::unix::process::ExitStatusExt;
use std::path::Path;
use std::process::{ExitStatus, Output};
use std::sync::Mutex;

use anyhow::Result;
use pcli::ansible::Ansible;
use pcli::keys::Keygen;
use pcli::remote::{Ssh, SshTarget};
use pcli::terraform::Terraform;

// ── Output helpers ────────────────────────────────────────────────────────────

pub fn ok_output(stdout: &[u8]) -> Output {
    Output {
        status: ExitStatus::from_raw(0),
        stdout: stdout.to_vec(),
        stderr: Vec::new(),
    }
}

pub fn err_output(stderr: &[u8]) -> Output {
    Output {
        status: ExitStatus::from_raw(1 << 8),
        stdout: Vec::new(),
        stderr: stderr.to_vec(),
    }
}

pub fn terraform_output_json(ip: &str) -> Vec<u8> {
    format!(r#"{{"public_ip": {{"value": ["{ip}"]}}}}"#).into_bytes()
}

// ── Mock: terraform succeeds end to end ───────────────────────────────────────

pub struct TerraformOk {
    pub calls: Mutex<Vec<String>>,
    pub ip: String,
}

impl TerraformOk {
    pub fn new(ip: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            ip: ip.to_string(),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("lock").clone()
    }

    fn record(&self, call: &str) {
        self.calls.lock().expect("lock").push(call.to_string());
    }
}

impl Terraform for TerraformOk {
    async fn init(&self, _node_dir: &Path) -> Result<Output> {
        self.record("init");
        Ok(ok_output(b""))
    }
    async fn plan(&self, _node_dir: &Path) -> Result<Output> {
        self.record("plan");
        Ok(ok_output(b""))
    }
    async fn apply(&self, _node_dir: &Path) -> Result<Output> {
        self.record("apply");
        Ok(ok_output(b""))
    }
    async fn apply_interactive(&self, _node_dir: &Path) -> Result<ExitStatus> {
        self.record("apply_interactive");
        Ok(ExitStatus::from_raw(0))
    }
    async fn destroy(&self, _node_dir: &Path) -> Result<Output> {
        self.record("destroy");
        Ok(ok_output(b""))
    }
    async fn output_json(&self, _node_dir: &Path) -> Result<Output> {
        self.record("output");
        Ok(ok_output(&terraform_output_json(&self.ip)))
    }
}

// ── Mock: terraform plan fails ────────────────────────────────────────────────

pub struct TerraformPlanFails;

impl Terraform for TerraformPlanFails {
    async fn init(&self, _node_dir: &Path) -> Result<Output> {
        Ok(ok_output(b""))
    }
    async fn plan(&self, _node_dir: &Path) -> Result<Output> {
        Ok(err_output(b"Error: Invalid provider configuration"))
    }
    async fn apply(&self, _node_dir: &Path) -> Result<Output> {
        anyhow::bail!("not expected in this test")
    }
    async fn apply_interactive(&self, _node_dir: &Path) -> Result<ExitStatus> {
        anyhow::bail!("not expected in this test")
    }
    async fn destroy(&self, _node_dir: &Path) -> Result<Output> {
        anyhow::bail!("not expected in this test")
    }
    async fn output_json(&self, _node_dir: &Path) -> Result<Output> {
        anyhow::bail!("not expected in this test")
    }
}

// ── Mock: ansible records playbook runs ───────────────────────────────────────

#[derive(Default)]
pub struct AnsibleRecorder {
    pub calls: Mutex<Vec<String>>,
}

impl AnsibleRecorder {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("lock").clone()
    }
}

impl Ansible for AnsibleRecorder {
    async fn run_playbook(
        &self,
        playbook: &Path,
        _inventory: &Path,
        extra_var: Option<(&str, &str)>,
    ) -> Result<Output> {
        let name = playbook
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let call = match extra_var {
            Some((key, value)) => format!("{name} {key}={value}"),
            None => name,
        };
        self.calls.lock().expect("lock").push(call);
        Ok(ok_output(b""))
    }
}

// ── Mock: ssh records remote commands ─────────────────────────────────────────

#[derive(Default)]
pub struct SshRecorder {
    pub calls: Mutex<Vec<String>>,
}

impl SshRecorder {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("lock").clone()
    }
}

impl Ssh for SshRecorder {
    async fn exec(&self, target: &SshTarget<'_>, command: &str) -> Result<Output> {
        self.calls
            .lock()
            .expect("lock")
            .push(format!("exec@{}: {command}", target.host));
        Ok(ok_output(b""))
    }
    async fn exec_script(&self, target: &SshTarget<'_>, script: &[u8]) -> Result<Output> {
        self.calls.lock().expect("lock").push(format!(
            "script@{}: {} bytes",
            target.host,
            script.len()
        ));
        Ok(ok_output(b"script ran\n"))
    }
    async fn shell(&self, target: &SshTarget<'_>) -> Result<ExitStatus> {
        self.calls
            .lock()
            .expect("lock")
            .push(format!("shell@{}", target.host));
        Ok(ExitStatus::from_raw(0))
    }
    async fn copy_to(&self, target: &SshTarget<'_>, local: &Path, remote: &str) -> Result<Output> {
        self.calls.lock().expect("lock").push(format!(
            "copy_to@{}: {} -> {remote}",
            target.host,
            local.display()
        ));
        Ok(ok_output(b""))
    }
    async fn copy_from(
        &self,
        target: &SshTarget<'_>,
        remote: &str,
        local: &Path,
    ) -> Result<Output> {
        self.calls.lock().expect("lock").push(format!(
            "copy_from@{}: {remote} -> {}",
            target.host,
            local.display()
        ));
        Ok(ok_output(b""))
    }
}

// ── Mock: keygen writes placeholder key files ─────────────────────────────────

pub struct KeygenFake;

impl Keygen for KeygenFake {
    async fn create_keypair(&self, key_path: &Path) -> Result<()> {
        if let Some(parent) = key_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(key_path, b"fake private key")?;
        std::fs::write(
            key_path.with_extension("pub"),
            b"ssh-rsa AAAA fake public key",
        )?;
        Ok(())
    }
}
