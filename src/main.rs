//! ccdroutes - OpenVPN CCD route generator
//!
//! Resolves hostnames or looks up ASN prefixes and writes a minimal set of
//! `push "route ..."` directives to a client config file.

use anyhow::Result;
use clap::Parser;
use std::time::Instant;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use ccdroutes::cli::{Cli, Commands};
use ccdroutes::commands::{self, RunOptions};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };

    // Logs go to stderr; stdout carries summaries or dry-run directives
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let opts = RunOptions {
        config_path: cli.config,
        ccd_path: cli.ccd_path,
        dry_run: cli.dry_run,
    };

    let started = Instant::now();

    // Execute command
    match cli.command.unwrap_or(Commands::Hosts(Default::default())) {
        Commands::Hosts(args) => commands::hosts::run(args, &opts).await?,
        Commands::Asn { asns, retries } => commands::asn::run(asns, retries, &opts).await?,
        Commands::Collapse { input } => commands::collapse::run(&input, &opts).await?,
        Commands::Version => {
            println!("ccdroutes {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
    }

    opts.report(&format!(
        "Elapsed time: {:.1}s",
        started.elapsed().as_secs_f64()
    ));
    Ok(())
}
