//! Tax and commission adjusted yield to maturity.
//!
//! For a bond bought at the valuation instant and held until `redemption`:
//!
//! ```text
//! dirty  = (clean + accrued) * (1 + commission% / 100)
//! keep   = 1 - tax_rate(bond_type)
//! spread = max(0, nominal - clean) * keep
//! coupon = nominal * coupon% / 100 * days / basis * keep
//! income = nominal + spread + accrued * keep + coupon
//! yield  = (income / dirty - 1) * basis / days * 100
//! ```
//!
//! The yield is undefined (an [`UndefinedYield`] error, never a number) when
//! `days <= 0`, `dirty == 0` or `nominal <= 0`.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{BondError, BondResult, UndefinedYield};
use crate::types::{BondRecord, BondType};

const SECONDS_PER_DAY: f64 = 86_400.0;

// ============================================================================
// Conventions
// ============================================================================

/// Jurisdiction-specific constants of the yield formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct YieldConventions {
    /// Income tax rate applied to coupon, accrued interest and price spread.
    pub tax_rate: f64,
    /// Bond types exempt from the tax.
    pub tax_exempt: Vec<BondType>,
    /// Days per year (actual/basis).
    pub day_basis: f64,
    /// Round the day count to whole days.
    pub round_days: bool,
}

impl Default for YieldConventions {
    fn default() -> Self {
        Self {
            tax_rate: 0.13,
            tax_exempt: vec![BondType::Government],
            day_basis: 365.0,
            round_days: true,
        }
    }
}

impl YieldConventions {
    /// Tax rate for the given bond type.
    pub fn tax_rate_for(&self, bond_type: BondType) -> f64 {
        if self.tax_exempt.contains(&bond_type) {
            0.0
        } else {
            self.tax_rate
        }
    }

    /// Days from `as_of` to the start of `date`.
    pub fn days_between(&self, as_of: NaiveDateTime, date: NaiveDate) -> f64 {
        let seconds = (date.and_time(NaiveTime::MIN) - as_of).num_seconds() as f64;
        let days = seconds / SECONDS_PER_DAY;
        if self.round_days {
            days.round()
        } else {
            days
        }
    }
}

// ============================================================================
// Computation
// ============================================================================

/// Prices and yield for one redemption date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YieldMetrics {
    /// Clean price per bond.
    pub clean_price: f64,
    /// Clean price in percent of nominal.
    pub clean_price_percent: f64,
    /// Clean price plus accrued interest plus commission.
    pub dirty_price: f64,
    /// Days until redemption.
    pub days: f64,
    /// Annualized yield in percent.
    pub yield_percent: f64,
}

/// Computes prices and yield of `record` when redeemed at `redemption`.
pub fn compute_yield(
    record: &BondRecord,
    redemption: NaiveDate,
    commission_percent: f64,
    as_of: NaiveDateTime,
    conventions: &YieldConventions,
) -> Result<YieldMetrics, UndefinedYield> {
    if record.nominal <= 0.0 {
        return Err(UndefinedYield::NonPositiveNominal);
    }

    let (clean_price, clean_price_percent) = record.resolve_clean_price();
    let dirty_price =
        (clean_price + record.accrued_interest) * (1.0 + commission_percent / 100.0);

    let days = conventions.days_between(as_of, redemption);
    if days <= 0.0 {
        return Err(UndefinedYield::NonPositiveDays(days));
    }
    if dirty_price == 0.0 {
        return Err(UndefinedYield::ZeroDirtyPrice);
    }

    let keep = 1.0 - conventions.tax_rate_for(record.bond_type);
    let basis = conventions.day_basis;

    let spread = (record.nominal - clean_price).max(0.0) * keep;
    let future_coupon = record.nominal * (record.coupon_interest / 100.0) * (days / basis) * keep;
    let accrued = record.accrued_interest * keep;
    let income = record.nominal + spread + accrued + future_coupon;

    Ok(YieldMetrics {
        clean_price,
        clean_price_percent,
        dirty_price,
        days,
        yield_percent: (income / dirty_price - 1.0) * (basis / days) * 100.0,
    })
}

/// Applies [`compute_yield`] with a fixed commission, valuation instant and conventions.
#[derive(Debug, Clone)]
pub struct YieldCalculator {
    commission_percent: f64,
    as_of: NaiveDateTime,
    conventions: YieldConventions,
}

impl YieldCalculator {
    /// Creates a calculator valuing at the start of `as_of`.
    pub fn new(commission_percent: f64, as_of: NaiveDate, conventions: YieldConventions) -> Self {
        Self::at(commission_percent, as_of.and_time(NaiveTime::MIN), conventions)
    }

    /// Creates a calculator valuing at an exact instant.
    pub fn at(commission_percent: f64, as_of: NaiveDateTime, conventions: YieldConventions) -> Self {
        Self {
            commission_percent,
            as_of,
            conventions,
        }
    }

    /// Valuation instant.
    pub fn as_of(&self) -> NaiveDateTime {
        self.as_of
    }

    /// Conventions in use.
    pub fn conventions(&self) -> &YieldConventions {
        &self.conventions
    }

    /// Metrics of `record` redeemed at `redemption`.
    pub fn compute(
        &self,
        record: &BondRecord,
        redemption: NaiveDate,
    ) -> Result<YieldMetrics, UndefinedYield> {
        compute_yield(
            record,
            redemption,
            self.commission_percent,
            self.as_of,
            &self.conventions,
        )
    }

    /// Fills prices, days to maturity, yield to maturity and yield to offer.
    ///
    /// Prices and days are written even when the yield turns out undefined, so the
    /// caller can report what was seen; the record must then be excluded.
    pub fn finalize(&self, record: &mut BondRecord) -> BondResult<()> {
        let undefined = |reason| BondError::undefined_yield(record.isin.clone(), reason);
        let maturity = record
            .maturity_date
            .ok_or_else(|| undefined(UndefinedYield::MissingMaturity))?;

        let (clean_price, clean_price_percent) = record.resolve_clean_price();
        record.clean_price = clean_price;
        record.clean_price_percent = clean_price_percent;
        record.dirty_price =
            (clean_price + record.accrued_interest) * (1.0 + self.commission_percent / 100.0);
        record.days_to_maturity = Some(self.conventions.days_between(self.as_of, maturity) as i64);
        record.yield_to_maturity = None;
        record.yield_to_offer = None;

        let to_maturity = self
            .compute(record, maturity)
            .map_err(|reason| BondError::undefined_yield(record.isin.clone(), reason))?;
        record.yield_to_maturity = Some(to_maturity.yield_percent);

        record.yield_to_offer = record
            .offer_date
            .and_then(|offer| self.compute(record, offer).ok())
            .map(|m| m.yield_percent);
        Ok(())
    }
}
