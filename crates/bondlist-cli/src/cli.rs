//! CLI argument definitions.

use clap::{Parser, Subcommand, ValueEnum};

use crate::commands::{CalcArgs, ScanArgs};

/// Bondlist - screen exchange-traded bonds by yield
#[derive(Parser)]
#[command(name = "bondlist")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Debug logging for the bondlist crates (RUST_LOG overrides)
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Fetch every source, merge, price, filter and rank
    Scan(ScanArgs),

    /// Price a single bond described on the command line
    Calc(CalcArgs),
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Labelled text blocks
    #[default]
    Text,
    /// JSON
    Json,
}
