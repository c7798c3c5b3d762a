//! pNetwork node CLI - provision and operate bridge nodes on AWS

#![cfg_attr(test, allow(clippy::expect_used))]

use clap::Parser;

use pcli::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = cli.run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
