//! Scan command implementation.
//!
//! Loads the configuration, applies command-line overrides, runs the scan and
//! writes the ranked report.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;
use tracing::info;

use bondlist_config::ScanConfig;
use bondlist_core::types::BondType;
use bondlist_engine::ScanPipeline;
use bondlist_ext_file::{RecordingFetcher, SnapshotFetcher};
use bondlist_ext_http::HttpFetcher;
use bondlist_traits::DocumentFetcher;

use crate::cli::OutputFormat;
use crate::commands::parse_date;
use crate::report::write_report;

/// Arguments for the scan command.
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Bond types to scan: gov, mun, corp, euro (repeatable)
    #[arg(short = 't', long = "bond-type")]
    pub bond_types: Vec<BondType>,

    /// Broker commission, percent
    #[arg(long)]
    pub commission: Option<f64>,

    /// Valuation date (YYYY-MM-DD). Defaults to now.
    #[arg(short, long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    /// Trade statistics date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub statistics_date: Option<NaiveDate>,

    /// Consecutive days of trade statistics
    #[arg(long)]
    pub statistics_days: Option<u32>,

    /// Minimum clean price, percent of nominal
    #[arg(long)]
    pub min_price: Option<f64>,

    /// Minimum number of transactions
    #[arg(long)]
    pub min_transactions: Option<u64>,

    /// Minimum coupon, percent
    #[arg(long)]
    pub min_coupon: Option<f64>,

    /// Earliest maturity date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub min_maturity: Option<NaiveDate>,

    /// Latest maturity date (YYYY-MM-DD). Defaults to three years ahead.
    #[arg(long, value_parser = parse_date)]
    pub max_maturity: Option<NaiveDate>,

    /// Minimum yield for RUB bonds, percent
    #[arg(long)]
    pub rub_yield: Option<f64>,

    /// Minimum yield for USD bonds, percent
    #[arg(long)]
    pub usd_yield: Option<f64>,

    /// Minimum yield for EUR bonds, percent
    #[arg(long)]
    pub eur_yield: Option<f64>,

    /// Admit floating and variable coupons
    #[arg(long)]
    pub any_coupon_type: bool,

    /// Admit amortizing bonds
    #[arg(long)]
    pub any_redemption_type: bool,

    /// Emitent blacklist file
    #[arg(long)]
    pub emitent_blacklist: Option<PathBuf>,

    /// Securities blacklist file
    #[arg(long)]
    pub securities_blacklist: Option<PathBuf>,

    /// Emitent comments file
    #[arg(long)]
    pub emitent_comments: Option<PathBuf>,

    /// Skip detail pages and with them the coupon and redemption filter
    #[arg(long)]
    pub no_details: bool,

    /// Concurrent detail page workers
    #[arg(long)]
    pub workers: Option<usize>,

    /// Download the emitent directory
    #[arg(long)]
    pub emitents: bool,

    /// Emitent directory cache file
    #[arg(long)]
    pub emitent_cache: Option<PathBuf>,

    /// HTTP timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Replay documents from a snapshot directory instead of the network
    #[arg(long, conflicts_with = "record_dir")]
    pub snapshot_dir: Option<PathBuf>,

    /// Save every fetched document into a snapshot directory
    #[arg(long)]
    pub record_dir: Option<PathBuf>,
}

impl ScanArgs {
    /// Applies the command-line overrides on top of `config`.
    pub fn apply(&self, mut config: ScanConfig) -> ScanConfig {
        if !self.bond_types.is_empty() {
            config.bond_types = self.bond_types.clone();
        }
        set(&mut config.commission_percent, self.commission);
        set_opt(&mut config.valuation_date, self.date);
        set_opt(&mut config.statistics_date, self.statistics_date);
        set(&mut config.statistics_days, self.statistics_days);

        let filters = &mut config.filters;
        set(&mut filters.min_clean_price_percent, self.min_price);
        set(&mut filters.min_transactions, self.min_transactions);
        set(&mut filters.min_coupon_percent, self.min_coupon);
        set_opt(&mut filters.min_maturity, self.min_maturity);
        set_opt(&mut filters.max_maturity, self.max_maturity);
        set(&mut filters.yield_floors.rub, self.rub_yield);
        set(&mut filters.yield_floors.usd, self.usd_yield);
        set(&mut filters.yield_floors.eur, self.eur_yield);
        filters.any_coupon_type |= self.any_coupon_type;
        filters.any_redemption_type |= self.any_redemption_type;

        set_opt(&mut config.lists.emitent_blacklist, self.emitent_blacklist.clone());
        set_opt(&mut config.lists.securities_blacklist, self.securities_blacklist.clone());
        set_opt(&mut config.lists.emitent_comments, self.emitent_comments.clone());

        let enrichment = &mut config.enrichment;
        enrichment.detail_pages &= !self.no_details;
        set(&mut enrichment.workers, self.workers);
        enrichment.emitent_directory |= self.emitents;
        set_opt(&mut enrichment.emitent_cache, self.emitent_cache.clone());

        set(&mut config.http.timeout_secs, self.timeout);
        config
    }

    fn fetcher(&self, config: &ScanConfig) -> Result<Arc<dyn DocumentFetcher>> {
        if let Some(dir) = &self.snapshot_dir {
            info!(dir = %dir.display(), "replaying snapshots");
            return Ok(Arc::new(SnapshotFetcher::new(dir)));
        }

        let mut builder =
            HttpFetcher::builder().with_timeout(Duration::from_secs(config.http.timeout_secs));
        if let Some(agent) = &config.http.user_agent {
            builder = builder.with_user_agent(agent.clone());
        }
        let http = builder.build().context("failed to build HTTP client")?;

        let fetcher: Arc<dyn DocumentFetcher> = match &self.record_dir {
            Some(dir) => {
                info!(dir = %dir.display(), "recording snapshots");
                Arc::new(RecordingFetcher::new(http, dir))
            }
            None => Arc::new(http),
        };
        Ok(fetcher)
    }
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn set_opt<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

/// Execute the scan command.
pub async fn execute(args: ScanArgs, format: OutputFormat) -> Result<()> {
    let config = match &args.config {
        Some(path) => ScanConfig::from_file(path)?,
        None => ScanConfig::default(),
    };
    let config = args.apply(config);
    let fetcher = args.fetcher(&config)?;

    let report = ScanPipeline::new()
        .with_fetcher(fetcher)
        .with_config(config)
        .run()
        .await
        .context("scan failed")?;

    write_report(&report, format, args.output.as_deref())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    fn parse(args: &[&str]) -> ScanArgs {
        let cli = Cli::try_parse_from(std::iter::once("bondlist").chain(args.iter().copied()))
            .unwrap();
        match cli.command {
            Commands::Scan(args) => args,
            Commands::Calc(_) => panic!("expected scan"),
        }
    }

    #[test]
    fn test_no_flags_keep_config() {
        let config = ScanConfig::default();
        assert_eq!(parse(&["scan"]).apply(config.clone()), config);
    }

    #[test]
    fn test_flags_override_config() {
        let args = parse(&[
            "scan",
            "-t",
            "corp",
            "--bond-type",
            "mun",
            "--commission",
            "0.05",
            "--date",
            "2024-03-01",
            "--min-price",
            "95",
            "--rub-yield",
            "12.5",
            "--max-maturity",
            "2026-12-31",
            "--no-details",
            "--workers",
            "3",
            "--securities-blacklist",
            "securities.blacklist",
        ]);
        let config = args.apply(ScanConfig::default());

        assert_eq!(config.bond_types, vec![BondType::Corporate, BondType::Municipal]);
        assert_eq!(config.commission_percent, 0.05);
        assert_eq!(config.valuation_date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(config.filters.min_clean_price_percent, 95.0);
        assert_eq!(config.filters.yield_floors.rub, 12.5);
        assert_eq!(config.filters.yield_floors.usd, 4.0);
        assert_eq!(config.filters.max_maturity, NaiveDate::from_ymd_opt(2026, 12, 31));
        assert!(!config.enrichment.detail_pages);
        assert_eq!(config.enrichment.workers, 3);
        assert_eq!(
            config.lists.securities_blacklist,
            Some(PathBuf::from("securities.blacklist"))
        );
    }

    #[test]
    fn test_flags_keep_config_file_switches() {
        let mut config = ScanConfig::default();
        config.filters.any_coupon_type = true;
        config.enrichment.emitent_directory = true;
        let config = parse(&["scan"]).apply(config);
        assert!(config.filters.any_coupon_type);
        assert!(config.enrichment.emitent_directory);
        assert!(config.enrichment.detail_pages);
    }

    #[test]
    fn test_invalid_flags_rejected() {
        let bad_type = Cli::try_parse_from(["bondlist", "scan", "-t", "stocks"]);
        assert!(bad_type.is_err());
        let bad_date = Cli::try_parse_from(["bondlist", "scan", "--date", "01.03.2024"]);
        assert!(bad_date.is_err());
        let both_dirs = Cli::try_parse_from([
            "bondlist",
            "scan",
            "--snapshot-dir",
            "a",
            "--record-dir",
            "b",
        ]);
        assert!(both_dirs.is_err());
    }
}
