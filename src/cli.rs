//! CLI argument parsing with clap derive

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::ansible::AnsibleCli;
use crate::commands;
use crate::config::CliConfig;
use crate::keys::SshKeygen;
use crate::output::OutputContext;
use crate::remote::OpenSsh;
use crate::store::NodeStore;
use crate::terraform::TerraformCli;

/// Provision and operate pNetwork bridge nodes on AWS
#[derive(Parser)]
#[command(
    name = "pcli",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Interact with nodes
    #[command(subcommand)]
    Node(NodeCommand),

    /// Interact with a node's bridge components
    Bridge(commands::bridge::BridgeArgs),

    /// Update pcli itself
    Update(commands::update::UpdateArgs),

    /// Show version and repository
    Version,
}

#[derive(Subcommand)]
pub enum NodeCommand {
    /// Provision a new node
    Provision(commands::provision::ProvisionArgs),

    /// List active nodes
    List,

    /// Destroy a node and its local artifacts
    Destroy(commands::destroy::DestroyArgs),

    /// Run a command or local script on a node
    Exec(commands::exec::ExecArgs),

    /// Open an interactive session on a node
    Ssh(commands::node_ssh::SshArgs),

    /// Update the node package suite via yum
    Update(commands::pkg_update::PkgUpdateArgs),

    /// Delete leftover local artifacts for a node
    Clean(commands::clean::CleanArgs),
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<()> {
        let Cli {
            no_color,
            quiet,
            command,
        } = self;
        let ctx = OutputContext::new(no_color, quiet);

        match command {
            Command::Version => {
                commands::version::run(&ctx);
                Ok(())
            }
            Command::Update(args) => {
                commands::update::run(&args, &ctx, &commands::update::GithubUpdateChecker)
            }
            Command::Bridge(args) => {
                let store = NodeStore::new()?;
                let config = CliConfig::load(store.root())?;
                let tf = TerraformCli::default_runner();
                let ssh = OpenSsh::default_runner();
                commands::bridge::run(&args, &ctx, &store, &config, &tf, &ssh).await
            }
            Command::Node(node_command) => {
                let store = NodeStore::new()?;
                let config = CliConfig::load(store.root())?;
                let tf = TerraformCli::default_runner();
                let ssh = OpenSsh::default_runner();
                match node_command {
                    NodeCommand::Provision(args) => {
                        let ansible = AnsibleCli::default_runner();
                        let keygen = SshKeygen::default_runner();
                        commands::provision::run(
                            &args, &ctx, &store, &config, &tf, &ansible, &ssh, &keygen,
                        )
                        .await
                    }
                    NodeCommand::List => commands::list::run(&ctx, &store, &tf).await,
                    NodeCommand::Destroy(args) => {
                        commands::destroy::run(&args, &ctx, &store, &tf).await
                    }
                    NodeCommand::Exec(args) => {
                        commands::exec::run(&args, &ctx, &store, &config, &tf, &ssh).await
                    }
                    NodeCommand::Ssh(args) => {
                        commands::node_ssh::run(&args, &ctx, &store, &config, &tf, &ssh).await
                    }
                    NodeCommand::Update(args) => {
                        commands::pkg_update::run(&args, &ctx, &store, &config, &tf, &ssh).await
                    }
                    NodeCommand::Clean(args) => commands::clean::run(&args, &ctx, &store),
                }
            }
        }
    }
}
