//! Bridge command flow tests.

use pcli::commands::bridge::{self, BridgeAction, BridgeArgs, BridgeComponent};
use pcli::config::CliConfig;
use pcli::output::OutputContext;
use pcli::store::NodeStore;
use tempfile::TempDir;

use crate::mocks::{SshRecorder, TerraformOk};

const NODE: &str = "calm-turing";
const IP: &str = "203.0.113.7";

fn quiet_ctx() -> OutputContext {
    OutputContext::new(true, true)
}

fn seeded_store(dir: &TempDir) -> NodeStore {
    let store = NodeStore::with_root(dir.path().to_path_buf());
    store.create_node_dir(NODE).expect("node dir");
    store
}

#[tokio::test]
async fn bridge_whole_action_runs_remote_command() {
    let dir = TempDir::new().expect("tempdir");
    let store = seeded_store(&dir);
    let tf = TerraformOk::new(IP);
    let ssh = SshRecorder::default();

    let args = BridgeArgs {
        action: BridgeAction::Restart,
        component: BridgeComponent::All,
        node_name: NODE.to_string(),
    };
    bridge::run(&args, &quiet_ctx(), &store, &CliConfig::default(), &tf, &ssh)
        .await
        .expect("bridge restart");

    assert_eq!(ssh.calls(), vec![format!("exec@{IP}: ptokens_bridge restart")]);
}

#[tokio::test]
async fn bridge_single_action_names_component() {
    let dir = TempDir::new().expect("tempdir");
    let store = seeded_store(&dir);
    let tf = TerraformOk::new(IP);
    let ssh = SshRecorder::default();

    let args = BridgeArgs {
        action: BridgeAction::StartSingle,
        component: BridgeComponent::Api,
        node_name: NODE.to_string(),
    };
    bridge::run(&args, &quiet_ctx(), &store, &CliConfig::default(), &tf, &ssh)
        .await
        .expect("bridge start-single");

    assert_eq!(
        ssh.calls(),
        vec![format!("exec@{IP}: ptokens_bridge start_single api")]
    );
}

#[tokio::test]
async fn bridge_invalid_combination_never_reaches_the_node() {
    let dir = TempDir::new().expect("tempdir");
    let store = seeded_store(&dir);
    let tf = TerraformOk::new(IP);
    let ssh = SshRecorder::default();

    let args = BridgeArgs {
        action: BridgeAction::StopSingle,
        component: BridgeComponent::All,
        node_name: NODE.to_string(),
    };
    let result =
        bridge::run(&args, &quiet_ctx(), &store, &CliConfig::default(), &tf, &ssh).await;

    assert!(result.is_err());
    assert!(ssh.calls().is_empty());
    assert!(tf.calls().is_empty());
}

#[tokio::test]
async fn bridge_unknown_node_fails() {
    let dir = TempDir::new().expect("tempdir");
    let store = seeded_store(&dir);
    let tf = TerraformOk::new(IP);
    let ssh = SshRecorder::default();

    let args = BridgeArgs {
        action: BridgeAction::Start,
        component: BridgeComponent::All,
        node_name: "bold-boole".to_string(),
    };
    let result =
        bridge::run(&args, &quiet_ctx(), &store, &CliConfig::default(), &tf, &ssh).await;

    assert!(result.is_err());
    assert!(ssh.calls().is_empty());
}
