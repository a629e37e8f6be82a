//! Bondlist CLI - bond screener for exchange-traded bonds.
//!
//! # Usage
//!
//! ```bash
//! # Scan every bond type with the default thresholds
//! bondlist scan
//!
//! # Corporate bonds only, stricter floors, report to a file
//! bondlist scan --bond-type corp --min-price 90 --rub-yield 12 --output bonds.txt
//!
//! # Skip the detail pages and the coupon type filter with them
//! bondlist scan --no-details --any-redemption-type
//!
//! # Record the fetched documents, then replay them offline
//! bondlist scan --record-dir snapshots/
//! bondlist scan --snapshot-dir snapshots/ --format json
//!
//! # Price one bond by hand
//! bondlist calc --maturity 2027-06-15 --clean-price-percent 97.5 --coupon 9 --accrued 12.3 --count 10
//! ```

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod commands;
mod error;
mod report;

use cli::{Cli, Commands};

fn init_tracing(debug: bool) {
    let default = if debug { "info,bondlist=debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let format = cli.format;
    match cli.command {
        Commands::Scan(args) => commands::scan::execute(args, format).await?,
        Commands::Calc(args) => commands::calc::execute(args, format)?,
    }

    Ok(())
}
