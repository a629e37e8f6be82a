//! The unified bond record and its enrichment parts.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{BondType, Currency};

/// Coupon type label of a fixed-rate coupon on the detail page.
pub const FIXED_COUPON: &str = "Постоянный";

/// Redemption label of an amortizing bond on the detail page.
pub const AMORTIZATION: &str = "Амортизация";

/// Trading activity counters from the transaction statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Liquidity {
    /// Number of securities traded.
    pub securities_count: u64,
    /// Number of transactions.
    pub transactions_count: u64,
    /// Traded volume in the bond's currency.
    pub trade_volume: f64,
}

impl Liquidity {
    /// Creates a set of counters.
    pub fn new(securities_count: u64, transactions_count: u64, trade_volume: f64) -> Self {
        Self {
            securities_count,
            transactions_count,
            trade_volume,
        }
    }

    /// Adds another day's counters to these.
    pub fn absorb(&mut self, other: &Liquidity) {
        self.securities_count += other.securities_count;
        self.transactions_count += other.transactions_count;
        self.trade_volume += other.trade_volume;
    }

    /// True if at least one transaction was recorded.
    pub fn is_liquid(&self) -> bool {
        self.transactions_count > 0
    }
}

/// Issuer of a security, from the exchange's securities directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmitentInfo {
    /// Security kind as reported by the directory (e.g. `corporate_bond`).
    pub kind: String,
    /// Issuer's legal name.
    pub title: String,
    /// Issuer's tax id.
    pub inn: String,
}

/// Facts scraped from a bond's detail page.
///
/// Fields whose pattern did not match stay empty (or zero).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailInfo {
    /// Coupon type, e.g. [`FIXED_COUPON`].
    pub coupon_type: String,
    /// Coupon payments per year.
    pub coupon_frequency: u32,
    /// Current coupon period, e.g. `182 (5)`.
    pub coupon_period: String,
    /// Redemption style, e.g. [`AMORTIZATION`].
    pub redemption: String,
    /// Offer and early redemption description.
    pub options: String,
}

impl DetailInfo {
    /// True if the coupon is fixed.
    pub fn is_fixed_coupon(&self) -> bool {
        self.coupon_type == FIXED_COUPON
    }

    /// True if principal is repaid in installments.
    pub fn is_amortizing(&self) -> bool {
        self.redemption == AMORTIZATION
    }
}

/// A bond assembled from every source, then priced.
///
/// Created by the market table, completed by the listing and the statistics,
/// and finalized by [`YieldCalculator::finalize`](crate::yields::YieldCalculator::finalize).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondRecord {
    /// ISIN, the primary key.
    pub isin: String,
    /// Market segment.
    pub bond_type: BondType,
    /// Short name shown in market tables.
    pub short_name: String,
    /// Issuer's full legal name from the listing.
    pub full_name: String,
    /// Exchange trade code (secid).
    pub trade_code: String,
    /// Issuer from the securities directory, when loaded.
    pub emitent: Option<EmitentInfo>,
    /// Settlement currency.
    pub currency: Currency,
    /// Face value.
    pub nominal: f64,
    /// Annual coupon rate in percent of nominal.
    pub coupon_interest: f64,
    /// Detail page facts, when enrichment ran and found the bond.
    pub detail: Option<DetailInfo>,
    /// Accrued coupon interest per bond.
    pub accrued_interest: f64,
    /// Clean price per bond.
    pub clean_price: f64,
    /// Clean price in percent of nominal.
    pub clean_price_percent: f64,
    /// Clean price plus accrued interest plus commission.
    pub dirty_price: f64,
    /// Maturity date.
    pub maturity_date: Option<NaiveDate>,
    /// Offer (put) date.
    pub offer_date: Option<NaiveDate>,
    /// Whole days from the valuation instant to maturity.
    pub days_to_maturity: Option<i64>,
    /// Annualized yield to maturity in percent.
    pub yield_to_maturity: Option<f64>,
    /// Annualized yield to the offer date in percent.
    pub yield_to_offer: Option<f64>,
    /// Trading activity.
    pub liquidity: Liquidity,
    /// Free-text comment attached to the issuer.
    pub comment: String,
}

impl BondRecord {
    /// Creates an empty record for the given ISIN.
    pub fn new(isin: impl Into<String>, bond_type: BondType) -> Self {
        Self {
            isin: isin.into(),
            bond_type,
            short_name: String::new(),
            full_name: String::new(),
            trade_code: String::new(),
            emitent: None,
            currency: Currency::default(),
            nominal: 0.0,
            coupon_interest: 0.0,
            detail: None,
            accrued_interest: 0.0,
            clean_price: 0.0,
            clean_price_percent: 0.0,
            dirty_price: 0.0,
            maturity_date: None,
            offer_date: None,
            days_to_maturity: None,
            yield_to_maturity: None,
            yield_to_offer: None,
            liquidity: Liquidity::default(),
            comment: String::new(),
        }
    }

    /// Sets the short name.
    pub fn with_short_name(mut self, name: impl Into<String>) -> Self {
        self.short_name = name.into();
        self
    }

    /// Sets the maturity date.
    pub fn with_maturity(mut self, date: NaiveDate) -> Self {
        self.maturity_date = Some(date);
        self
    }

    /// Issuer name used for matching: the directory title, else the listing's legal name.
    pub fn emitent_name(&self) -> &str {
        match &self.emitent {
            Some(info) if !info.title.is_empty() => &info.title,
            _ => &self.full_name,
        }
    }

    /// Resolves the authoritative clean price input into `(clean_price, clean_price_percent)`.
    ///
    /// A non-zero percent wins; otherwise the percent is derived from the absolute price.
    pub fn resolve_clean_price(&self) -> (f64, f64) {
        if self.clean_price_percent != 0.0 {
            (
                self.nominal * self.clean_price_percent / 100.0,
                self.clean_price_percent,
            )
        } else if self.nominal > 0.0 {
            (self.clean_price, self.clean_price / self.nominal * 100.0)
        } else {
            (self.clean_price, 0.0)
        }
    }
}

fn fmt_opt_date(date: Option<NaiveDate>) -> String {
    date.map_or_else(|| "n/a".to_string(), |d| d.format("%Y-%m-%d").to_string())
}

fn fmt_opt_percent(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}%"))
}

impl fmt::Display for BondRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Type: {}", self.bond_type)?;
        writeln!(f, "ISIN: {}", self.isin)?;
        writeln!(f, "Emitent: {} ({})", self.short_name, self.emitent_name())?;
        writeln!(f, "Nominal: {:.2}", self.nominal)?;
        writeln!(f, "Coupon: {:.2}%", self.coupon_interest)?;
        if let Some(detail) = &self.detail {
            writeln!(f, "Coupon type: {}", detail.coupon_type)?;
            writeln!(f, "Coupon frequency: {} (per year)", detail.coupon_frequency)?;
            writeln!(f, "Coupon period: {}", detail.coupon_period)?;
        }
        writeln!(f, "Currency: {}", self.currency)?;
        writeln!(f, "Accrued interest: {:.2}", self.accrued_interest)?;
        writeln!(
            f,
            "Clean price: {:.2} ({:.2}%)",
            self.clean_price, self.clean_price_percent
        )?;
        writeln!(f, "Dirty price: {:.2}", self.dirty_price)?;
        writeln!(f, "Maturity date: {}", fmt_opt_date(self.maturity_date))?;
        match self.days_to_maturity {
            Some(days) => writeln!(f, "Days to maturity: {days}")?,
            None => writeln!(f, "Days to maturity: n/a")?,
        }
        writeln!(
            f,
            "Yield to maturity: {}",
            fmt_opt_percent(self.yield_to_maturity)
        )?;
        if self.offer_date.is_some() {
            writeln!(f, "Offer date: {}", fmt_opt_date(self.offer_date))?;
            writeln!(f, "Yield to offer: {}", fmt_opt_percent(self.yield_to_offer))?;
        }
        if let Some(detail) = &self.detail {
            if !detail.redemption.is_empty() {
                writeln!(f, "Redemption: {}", detail.redemption)?;
            }
            if !detail.options.is_empty() {
                writeln!(f, "Options: {}", detail.options)?;
            }
        }
        if !self.comment.is_empty() {
            writeln!(f, "Comment: {}", self.comment)?;
        }
        if self.liquidity.is_liquid() {
            write!(
                f,
                "Liquid: yes (securities/transactions/volume: {}/{}/{:.2})",
                self.liquidity.securities_count,
                self.liquidity.transactions_count,
                self.liquidity.trade_volume
            )
        } else {
            write!(f, "Liquid: no")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_liquidity_absorb() {
        let mut day0 = Liquidity::new(5, 2, 100.0);
        day0.absorb(&Liquidity::new(3, 1, 50.0));
        assert_eq!(day0, Liquidity::new(8, 3, 150.0));
        assert!(day0.is_liquid());
        assert!(!Liquidity::default().is_liquid());
    }

    #[test]
    fn test_resolve_clean_price() {
        let mut bond = BondRecord::new("RU000A0TEST1", BondType::Corporate);
        bond.nominal = 1000.0;
        bond.clean_price_percent = 95.0;
        assert_eq!(bond.resolve_clean_price(), (950.0, 95.0));

        bond.clean_price_percent = 0.0;
        bond.clean_price = 980.0;
        assert_eq!(bond.resolve_clean_price(), (980.0, 98.0));
    }

    #[test]
    fn test_emitent_name_fallback() {
        let mut bond = BondRecord::new("RU000A0TEST1", BondType::Corporate);
        bond.full_name = "ПАО Пример".into();
        assert_eq!(bond.emitent_name(), "ПАО Пример");
        bond.emitent = Some(EmitentInfo {
            kind: "corporate_bond".into(),
            title: "Пример".into(),
            inn: "7700000000".into(),
        });
        assert_eq!(bond.emitent_name(), "Пример");
    }

    #[test]
    fn test_detail_flags() {
        let detail = DetailInfo {
            coupon_type: FIXED_COUPON.into(),
            redemption: AMORTIZATION.into(),
            ..DetailInfo::default()
        };
        assert!(detail.is_fixed_coupon());
        assert!(detail.is_amortizing());
        assert!(!DetailInfo::default().is_fixed_coupon());
    }

    #[test]
    fn test_display_block() {
        let mut bond = BondRecord::new("RU000A0TEST1", BondType::Corporate)
            .with_short_name("Пример1P1")
            .with_maturity(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        bond.full_name = "ПАО Пример".into();
        bond.nominal = 1000.0;
        bond.clean_price = 950.0;
        bond.clean_price_percent = 95.0;
        bond.yield_to_maturity = Some(16.7372);
        bond.days_to_maturity = Some(365);
        bond.liquidity = Liquidity::new(8, 3, 150.0);

        let text = bond.to_string();
        assert!(text.starts_with("Type: Corporate\nISIN: RU000A0TEST1\n"));
        assert!(text.contains("Emitent: Пример1P1 (ПАО Пример)"));
        assert!(text.contains("Clean price: 950.00 (95.00%)"));
        assert!(text.contains("Maturity date: 2025-01-01"));
        assert!(text.contains("Yield to maturity: 16.74%"));
        assert!(!text.contains("Offer date"));
        assert!(text.ends_with("Liquid: yes (securities/transactions/volume: 8/3/150.00)"));
    }
}
