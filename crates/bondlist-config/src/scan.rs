//! Scan configuration.
//!
//! One [`ScanConfig`] value is built at startup (TOML file, then command-line
//! overrides), validated, and handed by reference to every stage of the scan.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use bondlist_core::types::{BondType, Currency};
use bondlist_core::yields::YieldConventions;

use crate::error::{ConfigError, ConfigResult, Validate, ValidationError};

/// Hour (local time) from which today's trade statistics are considered complete.
pub const STATISTICS_CUTOFF_HOUR: u32 = 18;

/// Default maturity horizon when no maximum is configured.
pub const DEFAULT_MATURITY_HORIZON_MONTHS: u32 = 36;

// ============================================================================
// Root configuration
// ============================================================================

/// Complete scan configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Bond types whose market tables are scanned.
    #[serde(default = "default_bond_types")]
    pub bond_types: Vec<BondType>,

    /// Broker commission, percent of the purchase amount.
    #[serde(default = "default_commission")]
    pub commission_percent: f64,

    /// Valuation date; the scan runs "now" when absent.
    #[serde(default)]
    pub valuation_date: Option<NaiveDate>,

    /// Trade statistics date; derived from the clock when absent.
    #[serde(default)]
    pub statistics_date: Option<NaiveDate>,

    /// Consecutive days of trade statistics merged together.
    #[serde(default = "default_statistics_days")]
    pub statistics_days: u32,

    /// Filter thresholds.
    #[serde(default)]
    pub filters: FilterConfig,

    /// Tax and day-count conventions.
    #[serde(default)]
    pub conventions: YieldConventions,

    /// Exclusion and comment list files.
    #[serde(default)]
    pub lists: ListPaths,

    /// Optional enrichment sources.
    #[serde(default)]
    pub enrichment: EnrichmentConfig,

    /// Transport settings.
    #[serde(default)]
    pub http: HttpConfig,
}

fn default_bond_types() -> Vec<BondType> {
    BondType::ALL.to_vec()
}

fn default_commission() -> f64 {
    0.1
}

fn default_statistics_days() -> u32 {
    3
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            bond_types: default_bond_types(),
            commission_percent: default_commission(),
            valuation_date: None,
            statistics_date: None,
            statistics_days: default_statistics_days(),
            filters: FilterConfig::default(),
            conventions: YieldConventions::default(),
            lists: ListPaths::default(),
            enrichment: EnrichmentConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl ScanConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            origin: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Parses configuration from TOML text.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            origin: "<inline>".to_string(),
            message: e.to_string(),
        })
    }

    /// Valuation instant: the configured date at midnight, else `now`.
    pub fn valuation_instant(&self, now: NaiveDateTime) -> NaiveDateTime {
        self.valuation_date
            .map_or(now, |date| date.and_time(NaiveTime::MIN))
    }

    /// Trade statistics date: the configured one, else yesterday while the
    /// exchange is still trading (before the cutoff hour), else today.
    pub fn statistics_date(&self, now: NaiveDateTime) -> NaiveDate {
        self.statistics_date.unwrap_or_else(|| {
            if now.hour() < STATISTICS_CUTOFF_HOUR {
                now.date() - Duration::days(1)
            } else {
                now.date()
            }
        })
    }

    /// Upper end of the maturity window.
    pub fn max_maturity(&self, valuation: NaiveDate) -> NaiveDate {
        self.filters.max_maturity.unwrap_or_else(|| {
            valuation
                .checked_add_months(Months::new(DEFAULT_MATURITY_HORIZON_MONTHS))
                .unwrap_or(NaiveDate::MAX)
        })
    }
}

impl Validate for ScanConfig {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.bond_types.is_empty() {
            errors.push(ValidationError::new(
                "bond_types",
                "at least one bond type must be selected",
            ));
        }
        if !self.commission_percent.is_finite() || self.commission_percent < 0.0 {
            errors.push(ValidationError::new(
                "commission_percent",
                "must be a non-negative number",
            ));
        }
        if self.statistics_days == 0 {
            errors.push(ValidationError::new("statistics_days", "must be at least 1"));
        }
        if !(0.0..1.0).contains(&self.conventions.tax_rate) {
            errors.push(ValidationError::new(
                "conventions.tax_rate",
                "must be in [0, 1)",
            ));
        }
        if self.conventions.day_basis <= 0.0 {
            errors.push(ValidationError::new(
                "conventions.day_basis",
                "must be positive",
            ));
        }

        errors.extend(self.filters.validate());
        errors.extend(self.enrichment.validate());
        if self.http.timeout_secs == 0 {
            errors.push(ValidationError::new("http.timeout_secs", "must be positive"));
        }

        errors
    }
}

// ============================================================================
// Filters
// ============================================================================

/// Thresholds of the filter cascade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Minimum clean price, percent of nominal.
    #[serde(default = "default_min_clean_price")]
    pub min_clean_price_percent: f64,

    /// Minimum number of transactions over the statistics window.
    #[serde(default)]
    pub min_transactions: u64,

    /// Minimum coupon rate, percent.
    #[serde(default)]
    pub min_coupon_percent: f64,

    /// Earliest accepted maturity date.
    #[serde(default)]
    pub min_maturity: Option<NaiveDate>,

    /// Latest accepted maturity date; valuation date plus three years when absent.
    #[serde(default)]
    pub max_maturity: Option<NaiveDate>,

    /// Minimum yield to maturity per currency.
    #[serde(default)]
    pub yield_floors: YieldFloors,

    /// Admit floating and variable coupons.
    #[serde(default)]
    pub any_coupon_type: bool,

    /// Admit amortizing bonds.
    #[serde(default)]
    pub any_redemption_type: bool,
}

fn default_min_clean_price() -> f64 {
    50.0
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_clean_price_percent: default_min_clean_price(),
            min_transactions: 0,
            min_coupon_percent: 0.0,
            min_maturity: None,
            max_maturity: None,
            yield_floors: YieldFloors::default(),
            any_coupon_type: false,
            any_redemption_type: false,
        }
    }
}

impl Validate for FilterConfig {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if self.min_clean_price_percent < 0.0 {
            errors.push(ValidationError::new(
                "filters.min_clean_price_percent",
                "must be non-negative",
            ));
        }
        if self.min_coupon_percent < 0.0 {
            errors.push(ValidationError::new(
                "filters.min_coupon_percent",
                "must be non-negative",
            ));
        }
        if let (Some(min), Some(max)) = (self.min_maturity, self.max_maturity) {
            if min > max {
                errors.push(ValidationError::new(
                    "filters.min_maturity",
                    format!("{min} is after max_maturity {max}"),
                ));
            }
        }
        errors
    }
}

/// Minimum yield to maturity per currency, percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldFloors {
    /// Domestic currency floor.
    #[serde(default = "default_rub_floor")]
    pub rub: f64,

    /// US dollar floor.
    #[serde(default = "default_foreign_floor")]
    pub usd: f64,

    /// Euro floor.
    #[serde(default = "default_foreign_floor")]
    pub eur: f64,

    /// Floors for any other currency, keyed by currency code.
    #[serde(default)]
    pub other: BTreeMap<String, f64>,
}

fn default_rub_floor() -> f64 {
    8.0
}

fn default_foreign_floor() -> f64 {
    4.0
}

impl Default for YieldFloors {
    fn default() -> Self {
        Self {
            rub: default_rub_floor(),
            usd: default_foreign_floor(),
            eur: default_foreign_floor(),
            other: BTreeMap::new(),
        }
    }
}

impl YieldFloors {
    /// Floor for `currency`; zero when none is configured.
    pub fn floor_for(&self, currency: &Currency) -> f64 {
        match currency {
            Currency::Rub => self.rub,
            Currency::Usd => self.usd,
            Currency::Eur => self.eur,
            Currency::Other(code) => self.other.get(code).copied().unwrap_or(0.0),
        }
    }
}

// ============================================================================
// Lists, enrichment, transport
// ============================================================================

/// Locations of the plain-text list files; absent files are simply not used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPaths {
    /// Emitent names excluded by substring.
    #[serde(default)]
    pub emitent_blacklist: Option<PathBuf>,

    /// ISINs, short names or trade codes excluded by substring.
    #[serde(default)]
    pub securities_blacklist: Option<PathBuf>,

    /// `emitent -> comment` lines.
    #[serde(default)]
    pub emitent_comments: Option<PathBuf>,
}

/// Optional per-bond and directory enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Fetch the detail page of every surviving bond. Without details the coupon
    /// and redemption stage has nothing to judge and is skipped.
    #[serde(default = "default_detail_pages")]
    pub detail_pages: bool,

    /// Concurrent detail page workers.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Download the emitent directory.
    #[serde(default)]
    pub emitent_directory: bool,

    /// Cache file for the emitent directory.
    #[serde(default)]
    pub emitent_cache: Option<PathBuf>,
}

fn default_detail_pages() -> bool {
    true
}

fn default_workers() -> usize {
    10
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            detail_pages: default_detail_pages(),
            workers: default_workers(),
            emitent_directory: false,
            emitent_cache: None,
        }
    }
}

impl Validate for EnrichmentConfig {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if self.detail_pages && self.workers == 0 {
            errors.push(ValidationError::new(
                "enrichment.workers",
                "must be at least 1 when detail pages are enabled",
            ));
        }
        errors
    }
}

/// HTTP transport settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// User agent override.
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_timeout() -> u64 {
    30
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            user_agent: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(date: &str, hour: u32) -> NaiveDateTime {
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(hour, 30, 0)
            .unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = ScanConfig::default();
        assert_eq!(config.bond_types, BondType::ALL.to_vec());
        assert_eq!(config.commission_percent, 0.1);
        assert_eq!(config.statistics_days, 3);
        assert_eq!(config.filters.min_clean_price_percent, 50.0);
        assert_eq!(config.filters.yield_floors.rub, 8.0);
        assert!(config.enrichment.detail_pages);
        assert_eq!(config.enrichment.workers, 10);
        assert!(!config.filters.any_coupon_type);
        assert!(!config.filters.any_redemption_type);
        assert!(config.is_valid());
    }

    #[test]
    fn test_empty_toml_equals_default() {
        let config = ScanConfig::from_toml_str("").unwrap();
        assert_eq!(config, ScanConfig::default());
    }

    #[test]
    fn test_partial_sections_keep_field_defaults() {
        let config = ScanConfig::from_toml_str(
            r#"
            valuation_date = "2024-03-01"

            [filters]
            min_transactions = 5
            max_maturity = "2026-01-01"

            [filters.yield_floors]
            usd = 6.5
            other = { CNY = 3.0 }

            [conventions]
            tax_exempt = []
            "#,
        )
        .unwrap();

        assert_eq!(config.valuation_date, Some(date("2024-03-01")));
        assert_eq!(config.filters.min_transactions, 5);
        assert_eq!(config.filters.min_clean_price_percent, 50.0);
        assert_eq!(config.filters.yield_floors.usd, 6.5);
        assert_eq!(config.filters.yield_floors.rub, 8.0);
        assert_eq!(
            config
                .filters
                .yield_floors
                .floor_for(&Currency::Other("CNY".into())),
            3.0
        );
        assert!(config.conventions.tax_exempt.is_empty());
        assert_eq!(config.conventions.tax_rate, 0.13);
    }

    #[test]
    fn test_unknown_bond_type_is_parse_error() {
        let err = ScanConfig::from_toml_str(r#"bond_types = ["junk"]"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_floor_for_unconfigured_currency_is_zero() {
        let floors = YieldFloors::default();
        assert_eq!(floors.floor_for(&Currency::Other("CHF".into())), 0.0);
        assert_eq!(floors.floor_for(&Currency::Eur), 4.0);
    }

    #[test]
    fn test_valuation_instant() {
        let now = at("2024-05-10", 15);
        let mut config = ScanConfig::default();
        assert_eq!(config.valuation_instant(now), now);

        config.valuation_date = Some(date("2024-05-01"));
        assert_eq!(
            config.valuation_instant(now),
            date("2024-05-01").and_hms_opt(0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_statistics_date_follows_trading_cutoff() {
        let mut config = ScanConfig::default();
        assert_eq!(config.statistics_date(at("2024-05-10", 17)), date("2024-05-09"));
        assert_eq!(config.statistics_date(at("2024-05-10", 18)), date("2024-05-10"));

        config.statistics_date = Some(date("2024-01-15"));
        assert_eq!(config.statistics_date(at("2024-05-10", 9)), date("2024-01-15"));
    }

    #[test]
    fn test_max_maturity_defaults_to_three_years() {
        let mut config = ScanConfig::default();
        assert_eq!(config.max_maturity(date("2024-02-29")), date("2027-02-28"));

        config.filters.max_maturity = Some(date("2025-06-30"));
        assert_eq!(config.max_maturity(date("2024-02-29")), date("2025-06-30"));
    }

    #[test]
    fn test_validation_collects_every_error() {
        let mut config = ScanConfig::default();
        config.bond_types.clear();
        config.commission_percent = -1.0;
        config.statistics_days = 0;
        config.filters.min_maturity = Some(date("2025-01-01"));
        config.filters.max_maturity = Some(date("2024-01-01"));
        config.enrichment.detail_pages = true;
        config.enrichment.workers = 0;

        let errors = config.validate();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "bond_types",
                "commission_percent",
                "statistics_days",
                "filters.min_maturity",
                "enrichment.workers",
            ]
        );
        assert!(matches!(
            config.validate_or_error(),
            Err(ConfigError::MultipleValidationErrors(ref e)) if e.len() == 5
        ));
    }

    #[test]
    fn test_single_validation_error() {
        let mut config = ScanConfig::default();
        config.conventions.tax_rate = 1.5;
        match config.validate_or_error() {
            Err(ConfigError::Validation { field, .. }) => assert_eq!(field, "conventions.tax_rate"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
