//! Destroy flow tests.

use pcli::commands::destroy::{self, DestroyArgs};
use pcli::output::OutputContext;
use pcli::store::NodeStore;
use tempfile::TempDir;

use crate::mocks::TerraformOk;

const NODE: &str = "calm-turing";

fn quiet_ctx() -> OutputContext {
    OutputContext::new(true, true)
}

fn seeded_store(dir: &TempDir) -> NodeStore {
    let store = NodeStore::with_root(dir.path().to_path_buf());
    store.create_node_dir(NODE).expect("node dir");
    std::fs::write(store.key_path(NODE), b"key").expect("key");
    std::fs::write(store.pub_key_path(NODE), b"pub").expect("pub");
    std::fs::write(store.inventory_path(NODE), b"[nodes]").expect("inventory");
    store
}

#[tokio::test]
async fn destroy_runs_terraform_and_removes_artifacts() {
    let dir = TempDir::new().expect("tempdir");
    let store = seeded_store(&dir);
    let tf = TerraformOk::new("203.0.113.7");

    let args = DestroyArgs {
        node_name: None, // single node, inferred
        yes: true,
    };
    destroy::run(&args, &quiet_ctx(), &store, &tf)
        .await
        .expect("destroy");

    assert_eq!(tf.calls(), vec!["destroy"]);
    assert!(!store.exists(NODE));
    assert!(!store.key_path(NODE).exists());
    assert!(!store.inventory_path(NODE).exists());
}

#[tokio::test]
async fn destroy_with_explicit_name_targets_that_node() {
    let dir = TempDir::new().expect("tempdir");
    let store = seeded_store(&dir);
    store.create_node_dir("zesty-darwin").expect("second node");
    let tf = TerraformOk::new("203.0.113.7");

    let args = DestroyArgs {
        node_name: Some(NODE.to_string()),
        yes: true,
    };
    destroy::run(&args, &quiet_ctx(), &store, &tf)
        .await
        .expect("destroy");

    assert!(!store.exists(NODE));
    assert!(store.exists("zesty-darwin"), "other nodes must survive");
}

#[tokio::test]
async fn destroy_without_name_fails_when_ambiguous() {
    let dir = TempDir::new().expect("tempdir");
    let store = seeded_store(&dir);
    store.create_node_dir("zesty-darwin").expect("second node");
    let tf = TerraformOk::new("203.0.113.7");

    let args = DestroyArgs {
        node_name: None,
        yes: true,
    };
    let result = destroy::run(&args, &quiet_ctx(), &store, &tf).await;

    assert!(result.is_err());
    assert!(tf.calls().is_empty(), "terraform must not run without a target");
    assert!(store.exists(NODE));
}
