#![doc = include_str!("../README.md")]

mod cli;
mod commands;
mod types;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { files, format } => {
            commands::parse::run_parse_command(files, format)?;
        }
        Commands::Check {
            files,
            bin_by_bin,
            ignore_extended,
            ignore,
            format,
        } => {
            commands::check::run_check_command(files, bin_by_bin, ignore_extended, ignore, format)?;
        }
    }

    Ok(())
}
