//! The filter cascade.
//!
//! Stages run in a fixed order and the first failing stage drops the record, so a
//! record is counted under exactly one stage. Stages one to six run on priced
//! records; the coupon and redemption stage runs after detail enrichment.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use bondlist_config::{Blacklist, ConfigResult, FilterConfig, ScanConfig, YieldFloors};
use bondlist_core::types::BondRecord;

// ============================================================================
// Stages and counters
// ============================================================================

/// A stage of the cascade, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Emitent or security blacklist.
    Blacklist,
    /// Clean price floor.
    CleanPrice,
    /// Transaction count floor.
    Transactions,
    /// Coupon rate floor.
    Coupon,
    /// Maturity window.
    Maturity,
    /// Per-currency yield floor.
    YieldFloor,
    /// Coupon type and redemption style.
    CouponType,
}

impl Stage {
    /// All stages in order.
    pub const ALL: [Stage; 7] = [
        Stage::Blacklist,
        Stage::CleanPrice,
        Stage::Transactions,
        Stage::Coupon,
        Stage::Maturity,
        Stage::YieldFloor,
        Stage::CouponType,
    ];

    /// Counter name of the stage.
    pub fn name(self) -> &'static str {
        match self {
            Stage::Blacklist => "blacklisted",
            Stage::CleanPrice => "low_price",
            Stage::Transactions => "illiquid",
            Stage::Coupon => "low_coupon",
            Stage::Maturity => "maturity_window",
            Stage::YieldFloor => "low_yield",
            Stage::CouponType => "coupon_type",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Records dropped per stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterStats {
    /// Dropped by a blacklist.
    pub blacklisted: usize,
    /// Dropped by the clean price floor.
    pub low_price: usize,
    /// Dropped by the transaction floor.
    pub illiquid: usize,
    /// Dropped by the coupon floor.
    pub low_coupon: usize,
    /// Dropped by the maturity window.
    pub maturity_window: usize,
    /// Dropped by the yield floor.
    pub low_yield: usize,
    /// Dropped by the coupon type or redemption stage.
    pub coupon_type: usize,
    /// Records that passed every stage run so far.
    pub passed: usize,
}

impl FilterStats {
    fn slot(&mut self, stage: Stage) -> &mut usize {
        match stage {
            Stage::Blacklist => &mut self.blacklisted,
            Stage::CleanPrice => &mut self.low_price,
            Stage::Transactions => &mut self.illiquid,
            Stage::Coupon => &mut self.low_coupon,
            Stage::Maturity => &mut self.maturity_window,
            Stage::YieldFloor => &mut self.low_yield,
            Stage::CouponType => &mut self.coupon_type,
        }
    }

    /// Counts a drop.
    pub fn record(&mut self, stage: Stage) {
        *self.slot(stage) += 1;
    }

    /// Records dropped by `stage`.
    pub fn dropped(&self, stage: Stage) -> usize {
        match stage {
            Stage::Blacklist => self.blacklisted,
            Stage::CleanPrice => self.low_price,
            Stage::Transactions => self.illiquid,
            Stage::Coupon => self.low_coupon,
            Stage::Maturity => self.maturity_window,
            Stage::YieldFloor => self.low_yield,
            Stage::CouponType => self.coupon_type,
        }
    }

    /// Records dropped by any stage.
    pub fn total_dropped(&self) -> usize {
        Stage::ALL.iter().map(|&s| self.dropped(s)).sum()
    }

    /// Emits the filter summary.
    pub fn log(&self) {
        info!(
            blacklisted = self.blacklisted,
            low_price = self.low_price,
            illiquid = self.illiquid,
            low_coupon = self.low_coupon,
            maturity_window = self.maturity_window,
            low_yield = self.low_yield,
            coupon_type = self.coupon_type,
            passed = self.passed,
            "filtered bonds"
        );
    }
}

// ============================================================================
// Policy
// ============================================================================

/// Thresholds and lists of the cascade.
#[derive(Debug, Clone)]
pub struct FilterPolicy {
    emitent_blacklist: Blacklist,
    securities_blacklist: Blacklist,
    min_clean_price_percent: f64,
    min_transactions: u64,
    min_coupon_percent: f64,
    min_maturity: Option<NaiveDate>,
    max_maturity: NaiveDate,
    yield_floors: YieldFloors,
    any_coupon_type: bool,
    any_redemption_type: bool,
}

impl FilterPolicy {
    /// Creates a policy with empty blacklists.
    pub fn new(filters: &FilterConfig, max_maturity: NaiveDate) -> Self {
        Self {
            emitent_blacklist: Blacklist::default(),
            securities_blacklist: Blacklist::default(),
            min_clean_price_percent: filters.min_clean_price_percent,
            min_transactions: filters.min_transactions,
            min_coupon_percent: filters.min_coupon_percent,
            min_maturity: filters.min_maturity,
            max_maturity,
            yield_floors: filters.yield_floors.clone(),
            any_coupon_type: filters.any_coupon_type,
            any_redemption_type: filters.any_redemption_type,
        }
    }

    /// Creates the policy of a scan valued at `valuation`, loading its blacklists.
    pub fn from_config(config: &ScanConfig, valuation: NaiveDate) -> ConfigResult<Self> {
        Ok(Self::new(&config.filters, config.max_maturity(valuation))
            .with_emitent_blacklist(Blacklist::load(config.lists.emitent_blacklist.as_deref())?)
            .with_securities_blacklist(Blacklist::load(
                config.lists.securities_blacklist.as_deref(),
            )?))
    }

    /// Sets the emitent name blacklist.
    pub fn with_emitent_blacklist(mut self, list: Blacklist) -> Self {
        self.emitent_blacklist = list;
        self
    }

    /// Sets the ISIN, short name and trade code blacklist.
    pub fn with_securities_blacklist(mut self, list: Blacklist) -> Self {
        self.securities_blacklist = list;
        self
    }

    /// Latest accepted maturity.
    pub fn max_maturity(&self) -> NaiveDate {
        self.max_maturity
    }

    /// First of stages one to six that rejects `record`.
    pub fn check(&self, record: &BondRecord) -> Option<Stage> {
        if self.emitent_blacklist.matches(record.emitent_name()).is_some()
            || self
                .securities_blacklist
                .matches_any([
                    record.isin.as_str(),
                    record.short_name.as_str(),
                    record.trade_code.as_str(),
                ])
                .is_some()
        {
            return Some(Stage::Blacklist);
        }
        if record.clean_price_percent < self.min_clean_price_percent {
            return Some(Stage::CleanPrice);
        }
        if record.liquidity.transactions_count < self.min_transactions {
            return Some(Stage::Transactions);
        }
        if record.coupon_interest < self.min_coupon_percent {
            return Some(Stage::Coupon);
        }
        match record.maturity_date {
            Some(date)
                if date <= self.max_maturity && self.min_maturity.map_or(true, |min| date >= min) => {}
            _ => return Some(Stage::Maturity),
        }
        match record.yield_to_maturity {
            Some(ytm) if ytm >= self.yield_floors.floor_for(&record.currency) => None,
            _ => Some(Stage::YieldFloor),
        }
    }

    /// Rejects `record` unless its detail page shows an admitted coupon type and
    /// redemption style. A record without details is unknown on both counts.
    pub fn check_detail(&self, record: &BondRecord) -> Option<Stage> {
        let detail = record.detail.as_ref();
        let coupon_ok = self.any_coupon_type || detail.is_some_and(|d| d.is_fixed_coupon());
        let redemption_ok =
            self.any_redemption_type || detail.is_some_and(|d| !d.is_amortizing());
        if coupon_ok && redemption_ok {
            None
        } else {
            Some(Stage::CouponType)
        }
    }

    /// Runs stages one to six.
    pub fn apply(&self, records: Vec<BondRecord>, stats: &mut FilterStats) -> Vec<BondRecord> {
        Self::run(records, stats, |r| self.check(r))
    }

    /// Runs the coupon and redemption stage.
    pub fn apply_detail(&self, records: Vec<BondRecord>, stats: &mut FilterStats) -> Vec<BondRecord> {
        Self::run(records, stats, |r| self.check_detail(r))
    }

    fn run(
        records: Vec<BondRecord>,
        stats: &mut FilterStats,
        check: impl Fn(&BondRecord) -> Option<Stage>,
    ) -> Vec<BondRecord> {
        let kept: Vec<BondRecord> = records
            .into_iter()
            .filter(|record| match check(record) {
                Some(stage) => {
                    debug!(isin = %record.isin, %stage, "dropped");
                    stats.record(stage);
                    false
                }
                None => true,
            })
            .collect();
        stats.passed = kept.len();
        kept
    }
}
