//! `pcli node provision` — create and configure a new node end to end.

use anyhow::Result;
use clap::Args;

use crate::ansible::Ansible;
use crate::config::CliConfig;
use crate::domain::NodeError;
use crate::keys::Keygen;
use crate::naming;
use crate::output::OutputContext;
use crate::provision::{self, Options, Waits};
use crate::remote::Ssh;
use crate::store::NodeStore;
use crate::terraform::Terraform;
use crate::vars;

/// Arguments for the provision command.
#[derive(Args)]
pub struct ProvisionArgs {
    /// Prompt for every terraform variable and review the plan
    #[arg(short = 'a', long)]
    pub advanced: bool,

    /// Install packages from the development release server
    #[arg(long)]
    pub dev: bool,
}

/// Run `pcli node provision`.
///
/// # Errors
///
/// Returns an error if the generated name collides, variable collection
/// is aborted, or any required provisioning stage fails.
#[allow(clippy::too_many_arguments)]
pub async fn run(
    args: &ProvisionArgs,
    ctx: &OutputContext,
    store: &NodeStore,
    config: &CliConfig,
    tf: &impl Terraform,
    ans: &impl Ansible,
    ssh: &impl Ssh,
    keygen: &impl Keygen,
) -> Result<()> {
    ctx.header("provisioning a pnetwork node of type NITRO");

    let mut rng = rand::rng();
    let name = naming::random_node_name(&mut rng);
    if store.exists(&name) {
        return Err(NodeError::NameTaken(name).into());
    }
    ctx.info(&format!("node name: {name}"));
    ctx.info("remember to save the node name!");

    store.create_node_dir(&name)?;
    provision::ensure_keypair(ctx, store, keygen, &name).await?;

    let (variables, iam_creds) = if args.advanced {
        vars::collect_advanced(store, &name)?
    } else {
        vars::collect_default(store, &name)?
    };
    vars::write_iam_credentials(&store.iam_credentials_path(), &iam_creds)?;
    provision::write_terraform_files(store, &name, &variables)?;
    ctx.info(&format!("{name}/variables.tf.json created"));

    let password = naming::random_password(&mut rng);
    let opts = Options {
        advanced: args.advanced,
        dev: args.dev,
    };
    let report = provision::run(
        ctx,
        store,
        config,
        tf,
        ans,
        ssh,
        &name,
        password,
        &opts,
        &Waits::default(),
    )
    .await?;

    ctx.header("configuration ended - details:");
    ctx.kv("node", &format!("{} - {}", report.public_ip, report.node_name));
    ctx.kv(
        &format!("{} password", config.instance_user),
        &report.password,
    );
    ctx.info("remember to save the password!");
    ctx.header("node dashboard details:");
    ctx.kv("url", &report.dashboard_url());
    ctx.kv("user", "operator");
    ctx.kv("password", &report.password);
    Ok(())
}
