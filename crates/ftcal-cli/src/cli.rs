//! CLI argument definitions: top-level `Cli` struct and `Commands` enum.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub(crate) const CLI_LONG_ABOUT: &str =
    "Parse and validate flavour-tagging calibration input files.\n\n\
    Typical use:\n  \
    1. ftcal parse inputs/*.txt\n  \
    2. ftcal check inputs/*.txt\n\n\
    When check reports a binning problem it lists the suspect bins in a form\n\
    that can be passed straight back with --ignore.";

#[derive(Parser)]
#[command(name = "ftcal")]
#[command(about = "Parse and validate flavour-tagging calibration input files")]
#[command(long_about = CLI_LONG_ABOUT)]
#[command(version)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Parse input files and summarise what they declare
    Parse {
        /// Calibration input files, read in order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output format: text | json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Parse input files and run every consistency check
    Check {
        /// Calibration input files, read in order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Validate for a bin-by-bin combination instead of shared binning
        #[arg(long)]
        bin_by_bin: bool,

        /// Leave extrapolated (exbin) bins out of the binning checks
        #[arg(long)]
        ignore_extended: bool,

        /// Drop a bin before checking, as `analysis-flavor-tagger-op-jet:bin`
        #[arg(long, value_name = "BIN")]
        ignore: Vec<String>,

        /// Output format: text | json
        #[arg(long, default_value = "text")]
        format: String,
    },
}
