//! Provisioning flow tests — the full tool sequence against mocks.

use pcli::config::CliConfig;
use pcli::output::OutputContext;
use pcli::provision::{self, Options, Waits};
use pcli::store::NodeStore;
use tempfile::TempDir;

use crate::mocks::{AnsibleRecorder, KeygenFake, SshRecorder, TerraformOk, TerraformPlanFails};

const NODE: &str = "calm-turing";
const IP: &str = "203.0.113.7";

fn quiet_ctx() -> OutputContext {
    OutputContext::new(true, true)
}

fn store_with_node(dir: &TempDir) -> NodeStore {
    let store = NodeStore::with_root(dir.path().to_path_buf());
    store.create_node_dir(NODE).expect("node dir");
    store
}

async fn run_provision(
    store: &NodeStore,
    tf: &TerraformOk,
    ansible: &AnsibleRecorder,
    ssh: &SshRecorder,
    dev: bool,
) -> anyhow::Result<provision::Report> {
    provision::run(
        &quiet_ctx(),
        store,
        &CliConfig::default(),
        tf,
        ansible,
        ssh,
        NODE,
        "pw123456789012345678901234567890123456".to_string(),
        &Options {
            advanced: false,
            dev,
        },
        &Waits::none(),
    )
    .await
}

#[tokio::test]
async fn provision_runs_terraform_stages_in_order() {
    let dir = TempDir::new().expect("tempdir");
    let store = store_with_node(&dir);
    let tf = TerraformOk::new(IP);
    let ansible = AnsibleRecorder::default();
    let ssh = SshRecorder::default();

    let report = run_provision(&store, &tf, &ansible, &ssh, false)
        .await
        .expect("provision");

    assert_eq!(tf.calls(), vec!["init", "plan", "apply", "output"]);
    assert_eq!(report.public_ip, IP);
    assert_eq!(report.node_name, NODE);
    assert_eq!(report.dashboard_url(), format!("http://{IP}:8080"));
}

#[tokio::test]
async fn provision_writes_inventory_and_credentials() {
    let dir = TempDir::new().expect("tempdir");
    let store = store_with_node(&dir);
    let tf = TerraformOk::new(IP);
    let ansible = AnsibleRecorder::default();
    let ssh = SshRecorder::default();

    run_provision(&store, &tf, &ansible, &ssh, false)
        .await
        .expect("provision");

    let inventory =
        std::fs::read_to_string(store.inventory_path(NODE)).expect("inventory exists");
    assert!(inventory.starts_with("[nodes]\n"));
    assert!(inventory.contains(IP));
    assert!(inventory.contains("ansible_ssh_user=ec2-user"));

    let creds = std::fs::read_to_string(store.credentials_path(NODE)).expect("credentials");
    assert!(creds.contains("user: ec2-user"));
    assert!(creds.contains(IP));

    for playbook in pcli::assets::PLAYBOOKS {
        assert!(
            store.playbooks_dir().join(playbook).exists(),
            "{playbook} must be installed"
        );
    }
}

#[tokio::test]
async fn provision_runs_playbooks_in_order_with_release_url() {
    let dir = TempDir::new().expect("tempdir");
    let store = store_with_node(&dir);
    let tf = TerraformOk::new(IP);
    let ansible = AnsibleRecorder::default();
    let ssh = SshRecorder::default();

    run_provision(&store, &tf, &ansible, &ssh, false)
        .await
        .expect("provision");

    let calls = ansible.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0], "sys_config.yml");
    assert!(calls[1].starts_with("edit_user_pwd.yml new_pwd="));
    assert_eq!(
        calls[2],
        "node_package.yml pnode_rel_url=https://release-server.p.network/pnode/"
    );
}

#[tokio::test]
async fn provision_dev_mode_uses_dev_release_server() {
    let dir = TempDir::new().expect("tempdir");
    let store = store_with_node(&dir);
    let tf = TerraformOk::new(IP);
    let ansible = AnsibleRecorder::default();
    let ssh = SshRecorder::default();

    run_provision(&store, &tf, &ansible, &ssh, true)
        .await
        .expect("provision");

    let calls = ansible.calls();
    assert_eq!(
        calls[2],
        "node_package.yml pnode_rel_url=https://release-server.dev.p.network/pnode/"
    );
}

#[tokio::test]
async fn provision_starts_services_and_reboots() {
    let dir = TempDir::new().expect("tempdir");
    let store = store_with_node(&dir);
    let tf = TerraformOk::new(IP);
    let ansible = AnsibleRecorder::default();
    let ssh = SshRecorder::default();

    run_provision(&store, &tf, &ansible, &ssh, false)
        .await
        .expect("provision");

    let calls = ssh.calls();
    let expect_contains = [
        "echo 'pw",                     // node credentials write
        "sudo shutdown -r +1",          // scheduled reboot
        "pnode_logs_viewer start",
        "pnode_nitro_enclave deploy",
        "ptokens_bridge deploy",
        "pnode_dashboard start pw",
    ];
    for needle in expect_contains {
        assert!(
            calls.iter().any(|c| c.contains(needle)),
            "expected an ssh call containing {needle:?}, got {calls:?}"
        );
    }

    // The reboot must come before the package install starts services.
    let reboot_idx = calls
        .iter()
        .position(|c| c.contains("shutdown -r"))
        .expect("reboot call");
    let dashboard_idx = calls
        .iter()
        .position(|c| c.contains("pnode_dashboard"))
        .expect("dashboard call");
    assert!(reboot_idx < dashboard_idx);
}

#[tokio::test]
async fn provision_copies_iam_credentials_when_present() {
    let dir = TempDir::new().expect("tempdir");
    let store = store_with_node(&dir);
    std::fs::write(store.iam_credentials_path(), b"{}").expect("iam file");
    let tf = TerraformOk::new(IP);
    let ansible = AnsibleRecorder::default();
    let ssh = SshRecorder::default();

    run_provision(&store, &tf, &ansible, &ssh, false)
        .await
        .expect("provision");

    assert!(
        ssh.calls()
            .iter()
            .any(|c| c.starts_with("copy_to@") && c.contains(".iam_credentials")),
        "IAM credentials must be copied to the node"
    );
}

#[tokio::test]
async fn provision_fails_fast_when_plan_fails() {
    let dir = TempDir::new().expect("tempdir");
    let store = store_with_node(&dir);
    let ansible = AnsibleRecorder::default();
    let ssh = SshRecorder::default();

    let result = provision::run(
        &quiet_ctx(),
        &store,
        &CliConfig::default(),
        &TerraformPlanFails,
        &ansible,
        &ssh,
        NODE,
        "pw".to_string(),
        &Options {
            advanced: false,
            dev: false,
        },
        &Waits::none(),
    )
    .await;

    assert!(result.is_err());
    assert!(ansible.calls().is_empty(), "no playbook may run after a failed plan");
    assert!(ssh.calls().is_empty(), "no remote command may run after a failed plan");
}

#[tokio::test]
async fn ensure_keypair_generates_only_when_missing() {
    let dir = TempDir::new().expect("tempdir");
    let store = store_with_node(&dir);
    let ctx = quiet_ctx();

    provision::ensure_keypair(&ctx, &store, &KeygenFake, NODE)
        .await
        .expect("keypair");
    assert!(store.key_path(NODE).exists());

    let before = std::fs::read(store.key_path(NODE)).expect("read key");
    provision::ensure_keypair(&ctx, &store, &KeygenFake, NODE)
        .await
        .expect("keypair again");
    let after = std::fs::read(store.key_path(NODE)).expect("read key");
    assert_eq!(before, after, "existing keypair must not be regenerated");
}
