//! Scan orchestration.

use std::sync::Arc;

use chrono::{Local, NaiveDate, NaiveDateTime};
use futures::future::try_join_all;
use serde::Serialize;
use tracing::info;

use bondlist_config::{EmitentComments, ScanConfig, Validate};
use bondlist_core::types::BondRecord;
use bondlist_core::yields::YieldCalculator;
use bondlist_sources::emitent::load_emitents;
use bondlist_sources::listing::fetch_listing;
use bondlist_sources::market::fetch_market;
use bondlist_sources::statistics::fetch_statistics;
use bondlist_sources::SourceError;
use bondlist_traits::DocumentFetcher;

use crate::enrich::{enrich_details, EnrichStats};
use crate::error::{EngineError, EngineResult};
use crate::filter::{FilterPolicy, FilterStats};
use crate::merge::{apply_comments, merge_records, MergeSources, MergeStats};
use crate::pricing::price_records;
use crate::ranking::rank;

/// Outcome of a scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    /// Surviving bonds in rank order.
    pub records: Vec<BondRecord>,
    /// Valuation instant.
    pub valuation: NaiveDateTime,
    /// Date of the most recent statistics day.
    pub statistics_date: NaiveDate,
    /// Merge counters.
    pub merge: MergeStats,
    /// Records with emitent comments.
    pub commented: usize,
    /// Records excluded because their yield is undefined.
    pub undefined_yield: usize,
    /// Filter counters.
    pub filter: FilterStats,
    /// Detail enrichment counters, when enabled.
    pub enrichment: Option<EnrichStats>,
}

/// Builder and runner of a scan.
///
/// ```ignore
/// let report = ScanPipeline::new()
///     .with_fetcher(Arc::new(HttpFetcher::new()?))
///     .with_config(config)
///     .run()
///     .await?;
/// ```
#[derive(Default)]
pub struct ScanPipeline {
    fetcher: Option<Arc<dyn DocumentFetcher>>,
    config: ScanConfig,
    now: Option<NaiveDateTime>,
}

impl ScanPipeline {
    /// Creates a pipeline with the default configuration and no fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the document fetcher.
    pub fn with_fetcher(mut self, fetcher: Arc<dyn DocumentFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Sets the scan configuration.
    pub fn with_config(mut self, config: ScanConfig) -> Self {
        self.config = config;
        self
    }

    /// Fixes "now" instead of reading the local clock.
    pub fn with_clock(mut self, now: NaiveDateTime) -> Self {
        self.now = Some(now);
        self
    }

    /// Configuration in use.
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Runs the scan.
    ///
    /// All primary sources are fetched concurrently and the merge starts only once
    /// every one of them has arrived; any source failure aborts the scan.
    pub async fn run(&self) -> EngineResult<ScanReport> {
        let fetcher = self
            .fetcher
            .clone()
            .ok_or(EngineError::NotConfigured("fetcher"))?;
        let config = &self.config;
        config.validate_or_error()?;

        let now = self.now.unwrap_or_else(|| Local::now().naive_local());
        let valuation = config.valuation_instant(now);
        let statistics_date = config.statistics_date(now);
        let policy = FilterPolicy::from_config(config, valuation.date())?;
        let comments = EmitentComments::load(config.lists.emitent_comments.as_deref())?;
        info!(
            %valuation,
            %statistics_date,
            max_maturity = %policy.max_maturity(),
            bond_types = config.bond_types.len(),
            "starting scan"
        );

        let source: &dyn DocumentFetcher = &*fetcher;
        let markets = try_join_all(
            config
                .bond_types
                .iter()
                .map(|&bond_type| fetch_market(source, bond_type)),
        );
        let emitents = async {
            if config.enrichment.emitent_directory {
                load_emitents(source, config.enrichment.emitent_cache.as_deref())
                    .await
                    .map(Some)
            } else {
                Ok::<_, SourceError>(None)
            }
        };
        let (markets, listing, statistics, emitents) = tokio::try_join!(
            markets,
            fetch_listing(source),
            fetch_statistics(source, statistics_date, config.statistics_days),
            emitents
        )?;

        let records = markets.into_iter().flat_map(|table| table.records).collect();
        let (mut records, merge) = merge_records(
            records,
            MergeSources {
                listing: &listing,
                statistics: &statistics,
                emitents: emitents.as_ref(),
            },
        );
        let commented = apply_comments(&mut records, &comments);

        let calculator = YieldCalculator::at(
            config.commission_percent,
            valuation,
            config.conventions.clone(),
        );
        let (records, undefined_yield) = price_records(records, &calculator);

        let mut filter = FilterStats::default();
        let mut records = policy.apply(records, &mut filter);
        let enrichment = if config.enrichment.detail_pages {
            let (enriched, stats) =
                enrich_details(Arc::clone(&fetcher), records, config.enrichment.workers).await?;
            records = policy.apply_detail(enriched, &mut filter);
            Some(stats)
        } else {
            None
        };
        filter.log();

        rank(&mut records);
        info!(bonds = records.len(), "scan complete");

        Ok(ScanReport {
            records,
            valuation,
            statistics_date,
            merge,
            commented,
            undefined_yield,
            filter,
            enrichment,
        })
    }
}
