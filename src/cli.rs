use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::types::DateErrorPolicy;

/// Stage, deduplicate and standardize a layoffs table
#[derive(Parser, Debug)]
#[command(name = "layoffs-clean")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Clean a raw layoffs table into a new file
    Clean {
        /// Raw input table (.csv or .tsv); never modified
        #[arg(short, long)]
        input: PathBuf,

        /// Output path for the cleaned CSV
        #[arg(short, long)]
        out: PathBuf,

        /// Report JSON file path (stdout if not specified)
        #[arg(short, long)]
        report: Option<PathBuf>,

        /// Canonicalization config (TOML); built-in defaults if not specified
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// What to do with records whose date does not parse
        #[arg(long, value_enum, default_value = "halt")]
        on_date_error: DateErrorPolicy,

        /// Where quarantined records go (default: <out>.quarantine.csv)
        #[arg(long)]
        quarantine: Option<PathBuf>,

        /// Record the SHA-256 of the input in the report
        #[arg(long, default_value_t = false)]
        hash_input: bool,
    },

    /// Validate a canonicalization config and print it as JSON
    CheckConfig {
        /// Config file (TOML); the built-in default if not specified
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}
