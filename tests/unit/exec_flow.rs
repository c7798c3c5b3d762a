//! Exec and package-update flow tests.

use pcli::commands::{exec, pkg_update};
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
async fn exec_runs_inline_command_on_resolved_node() {
    let dir = TempDir::new().expect("tempdir");
    let store = seeded_store(&dir);
    let tf = TerraformOk::new(IP);
    let ssh = SshRecorder::default();

    let args = exec::ExecArgs {
        node_name: None,
        script: None,
        command: Some("uptime".to_string()),
    };
    exec::run(&args, &quiet_ctx(), &store, &CliConfig::default(), &tf, &ssh)
        .await
        .expect("exec");

    assert_eq!(ssh.calls(), vec![format!("exec@{IP}: uptime")]);
}

#[tokio::test]
async fn exec_pipes_local_script_to_node() {
    let dir = TempDir::new().expect("tempdir");
    let store = seeded_store(&dir);
    let tf = TerraformOk::new(IP);
    let ssh = SshRecorder::default();

    let script = dir.path().join("setup.sh");
    std::fs::write(&script, b"#!/bin/bash\nuptime\n").expect("script");

    let args = exec::ExecArgs {
        node_name: None,
        script: Some(script),
        command: None,
    };
    exec::run(&args, &quiet_ctx(), &store, &CliConfig::default(), &tf, &ssh)
        .await
        .expect("exec script");

    let calls = ssh.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].starts_with(&format!("script@{IP}:")));
}

#[tokio::test]
async fn exec_without_command_or_script_fails() {
    let dir = TempDir::new().expect("tempdir");
    let store = seeded_store(&dir);
    let tf = TerraformOk::new(IP);
    let ssh = SshRecorder::default();

    let args = exec::ExecArgs {
        node_name: None,
        script: None,
        command: None,
    };
    let result =
        exec::run(&args, &quiet_ctx(), &store, &CliConfig::default(), &tf, &ssh).await;

    assert!(result.is_err());
    assert!(ssh.calls().is_empty());
}

#[tokio::test]
async fn pkg_update_runs_full_suite_commands() {
    let dir = TempDir::new().expect("tempdir");
    let store = seeded_store(&dir);
    let tf = TerraformOk::new(IP);
    let ssh = SshRecorder::default();

    let args = pkg_update::PkgUpdateArgs {
        node_name: None,
        packages: vec![],
    };
    pkg_update::run(&args, &quiet_ctx(), &store, &CliConfig::default(), &tf, &ssh)
        .await
        .expect("update");

    let calls = ssh.calls();
    assert_eq!(calls.len(), 3);
    assert!(calls[0].contains("yum clean all"));
    assert!(calls[2].contains("yum update pnode-nitro* -y"));
}

#[tokio::test]
async fn pkg_update_updates_named_packages() {
    let dir = TempDir::new().expect("tempdir");
    let store = seeded_store(&dir);
    let tf = TerraformOk::new(IP);
    let ssh = SshRecorder::default();

    let args = pkg_update::PkgUpdateArgs {
        node_name: Some(NODE.to_string()),
        packages: vec!["ptokens-bridge".to_string()],
    };
    pkg_update::run(&args, &quiet_ctx(), &store, &CliConfig::default(), &tf, &ssh)
        .await
        .expect("update");

    assert_eq!(
        ssh.calls(),
        vec![format!("exec@{IP}: sudo yum update ptokens-bridge -y")]
    );
}
