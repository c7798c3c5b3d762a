//! The provisioning sequence: terraform, ansible, and the remote service
//! startup commands, in a fixed order with fixed readiness waits.

use std::process::Output;
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use crate::ansible::{self, Ansible};
use crate::assets;
use crate::config::CliConfig;
use crate::keys::{Keygen, keypair_exists};
use crate::logfile::ToolLog;
use crate::output::OutputContext;
use crate::output::progress;
use crate::remote::{Ssh, SshTarget};
use crate::store::NodeStore;
use crate::template;
use crate::terraform::{Terraform, parse_public_ip};

/// Fixed readiness waits between provisioning stages.
pub struct Waits {
    /// After `terraform apply`, before the instance accepts ssh.
    pub boot: Duration,
    /// After the password playbook, before the new password is usable.
    pub password: Duration,
    /// Between the enclave deploy and the bridge deploy.
    pub enclave: Duration,
    /// After the scheduled reboot, before the instance is back.
    pub reboot: Duration,
}

impl Default for Waits {
    fn default() -> Self {
        Self {
            boot: Duration::from_secs(40),
            password: Duration::from_secs(20),
            enclave: Duration::from_secs(60),
            reboot: Duration::from_secs(120),
        }
    }
}

impl Waits {
    /// Zero-length waits, for tests.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            boot: Duration::ZERO,
            password: Duration::ZERO,
            enclave: Duration::ZERO,
            reboot: Duration::ZERO,
        }
    }
}

/// Provisioning options taken from the CLI.
pub struct Options {
    /// Prompt for every variable and review the terraform plan.
    pub advanced: bool,
    /// Install packages from the development release server.
    pub dev: bool,
}

/// What a successful provisioning run produced.
pub struct Report {
    pub node_name: String,
    pub public_ip: String,
    pub password: String,
}

impl Report {
    /// Dashboard URL on the provisioned node.
    #[must_use]
    pub fn dashboard_url(&self) -> String {
        format!("http://{}:8080", self.public_ip)
    }
}

/// Render the variables template and write all terraform files into the
/// node directory.
///
/// # Errors
///
/// Returns an error if an asset is missing or a file cannot be written.
pub fn write_terraform_files(
    store: &NodeStore,
    name: &str,
    variables: &Map<String, Value>,
) -> Result<()> {
    let node_dir = store.node_dir(name);
    assets::install_terraform_files(&node_dir)?;
    let rendered = template::render(
        assets::get_asset_str("terraform/variables.tf.json")?,
        variables,
    );
    let dest = node_dir.join("variables.tf.json");
    std::fs::write(&dest, rendered).with_context(|| format!("writing {}", dest.display()))?;
    Ok(())
}

/// Ensure a keypair exists for `name`, generating one when missing.
///
/// # Errors
///
/// Returns an error if generation fails.
pub async fn ensure_keypair(
    ctx: &OutputContext,
    store: &NodeStore,
    keygen: &impl Keygen,
    name: &str,
) -> Result<()> {
    let key_path = store.key_path(name);
    if keypair_exists(&key_path) {
        ctx.info(&format!("found ssh keypair in {}", key_path.display()));
        return Ok(());
    }
    ctx.info("creating ssh keypair");
    keygen.create_keypair(&key_path).await
}

fn logged(log: &ToolLog, label: &str, output: &Output) -> Result<()> {
    log.append(label, output)?;
    anyhow::ensure!(
        output.status.success(),
        "{label} failed; see {} for details",
        log.path().display()
    );
    Ok(())
}

/// Run the full tool sequence after variables have been collected and the
/// keypair exists. Returns the credentials the operator must save.
///
/// # Errors
///
/// Returns an error when terraform or a required playbook fails; the
/// service startup commands only warn on failure.
#[allow(clippy::too_many_arguments, clippy::too_many_lines)]
pub async fn run(
    ctx: &OutputContext,
    store: &NodeStore,
    config: &CliConfig,
    tf: &impl Terraform,
    ans: &impl Ansible,
    ssh: &impl Ssh,
    name: &str,
    password: String,
    opts: &Options,
    waits: &Waits,
) -> Result<Report> {
    let node_dir = store.node_dir(name);
    let log = ToolLog::new(store.log_path());
    let bar = ctx
        .show_progress()
        .then(|| progress::stage_bar(100, "terraform init"));
    let stage = |msg: &str, inc: u64| {
        if let Some(pb) = &bar {
            pb.set_message(msg.to_string());
            pb.inc(inc);
        } else {
            ctx.info(msg);
        }
    };

    // -- terraform ---------------------------------------------------------
    logged(&log, "terraform init", &tf.init(&node_dir).await?)?;
    stage("terraform plan", 5);

    if let Err(e) = tf.plan(&node_dir).await.and_then(|o| logged(&log, "terraform plan", &o)) {
        if let Some(pb) = &bar {
            progress::finish_error(pb, "terraform plan failed");
        }
        ctx.error(&format!("terraform plan failed: {e:#}"));
        ctx.info(&format!("run `pcli node clean -n {name}` to delete unused files"));
        anyhow::bail!("terraform plan failed");
    }
    stage("terraform apply", 15);

    let applied = if opts.advanced {
        let status = tf.apply_interactive(&node_dir).await;
        status.map(|s| s.success())
    } else {
        tf.apply(&node_dir)
            .await
            .and_then(|o| logged(&log, "terraform apply", &o).map(|()| true))
    };
    match applied {
        Ok(true) => {}
        Ok(false) | Err(_) => {
            if let Some(pb) = &bar {
                progress::finish_error(pb, "terraform apply failed");
            }
            ctx.error("terraform apply failed");
            ctx.info(&format!("run `pcli node clean -n {name}` to delete unused files"));
            anyhow::bail!("terraform apply failed");
        }
    }
    stage("startup machine", 15);

    let output = tf.output_json(&node_dir).await?;
    let public_ip = parse_public_ip(&output.stdout).context("retrieving node public IP")?;

    // -- inventory + boot wait ---------------------------------------------
    let key_path = store.key_path(name);
    ansible::write_inventory(
        &store.inventory_path(name),
        &public_ip,
        &config.instance_user,
        &key_path,
    )?;
    assets::install_playbooks(&store.playbooks_dir())?;

    tokio::time::sleep(waits.boot).await;
    stage("install tools on machine", 10);

    let target = SshTarget {
        host: &public_ip,
        user: &config.instance_user,
        key_path: &key_path,
    };

    let iam_path = store.iam_credentials_path();
    if iam_path.exists() {
        let remote_iam = format!("/home/{}/.iam_credentials", config.instance_user);
        let copied = ssh.copy_to(&target, &iam_path, &remote_iam).await?;
        log.append("scp .iam_credentials", &copied)?;
    }

    // -- system setup -------------------------------------------------------
    let playbooks = store.playbooks_dir();
    let inventory = store.inventory_path(name);
    logged(
        &log,
        "ansible sys_config",
        &ans.run_playbook(&playbooks.join("sys_config.yml"), &inventory, None)
            .await?,
    )?;
    stage("startup machine", 5);

    // -- instance user password ---------------------------------------------
    let cred_path = store.write_credentials(name, &config.instance_user, &password, &public_ip)?;
    ctx.info(&format!("credentials dumped in {}", cred_path.display()));

    logged(
        &log,
        "ansible edit_user_pwd",
        &ans.run_playbook(
            &playbooks.join("edit_user_pwd.yml"),
            &inventory,
            Some(("new_pwd", password.as_str())),
        )
        .await?,
    )?;
    stage("startup machine", 5);

    tokio::time::sleep(waits.password).await;
    let write_cred = format!(
        "echo '{password}' > {}",
        config.remote_credentials_path
    );
    match ssh.exec(&target, &write_cred).await {
        Ok(out) => log.append("write node credentials", &out)?,
        Err(e) => ctx.warn(&format!("error writing node credentials: {e:#}")),
    }
    stage("reboot machine", 15);

    // -- reboot --------------------------------------------------------------
    ctx.info("rebooting system");
    match ssh.exec(&target, "sudo shutdown -r +1").await {
        Ok(out) => log.append("reboot", &out)?,
        Err(e) => ctx.warn(&format!("error scheduling reboot: {e:#}")),
    }
    ctx.info("waiting for machine to come back online after reboot");
    tokio::time::sleep(waits.reboot).await;
    stage("setup node", 20);

    // -- node package ---------------------------------------------------------
    logged(
        &log,
        "ansible node_package",
        &ans.run_playbook(
            &playbooks.join("node_package.yml"),
            &inventory,
            Some(("pnode_rel_url", config.release_url_for(opts.dev))),
        )
        .await?,
    )?;

    // -- service startup ------------------------------------------------------
    start_services(ctx, &log, ssh, &target, &password, waits).await;
    stage("done", 10);
    if let Some(pb) = &bar {
        progress::finish_success(pb, "provisioning complete");
    }

    Ok(Report {
        node_name: name.to_string(),
        public_ip,
        password,
    })
}

/// Start the node service suite. Each failure is reported and skipped so a
/// single flaky service does not abort an otherwise provisioned node.
async fn start_services(
    ctx: &OutputContext,
    log: &ToolLog,
    ssh: &impl Ssh,
    target: &SshTarget<'_>,
    password: &str,
    waits: &Waits,
) {
    ctx.info("starting all pnode components");
    let steps: [(&str, String, Option<Duration>); 4] = [
        ("pnode_logs_viewer start", "pnode_logs_viewer start".to_string(), None),
        (
            "pnode_nitro_enclave deploy",
            "pnode_nitro_enclave deploy".to_string(),
            Some(waits.enclave),
        ),
        ("ptokens_bridge deploy", "ptokens_bridge deploy".to_string(), None),
        (
            "pnode_dashboard start",
            format!("pnode_dashboard start {password}"),
            None,
        ),
    ];
    for (label, command, wait_after) in steps {
        match ssh.exec(target, &command).await {
            Ok(out) => {
                if log.append(label, &out).is_err() || !out.status.success() {
                    ctx.warn(&format!("error running {label}"));
                }
            }
            Err(e) => ctx.warn(&format!("error running {label}: {e:#}")),
        }
        if let Some(wait) = wait_after {
            tokio::time::sleep(wait).await;
        }
    }
}
