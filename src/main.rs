use clap::Parser;
use colored::*;
use danb::cli::Cli;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins, then DANB_LOG, then the -v level
    let log_level = std::env::var("DANB_LOG").unwrap_or_else(|_| cli.log_level().to_string());

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = danb::cli::run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);

        let exit_code = match e.downcast_ref::<danb::DanbError>() {
            Some(danb::DanbError::Config(_)) => 2,
            _ => 1,
        };
        process::exit(exit_code);
    }
}
