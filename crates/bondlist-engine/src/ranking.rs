//! Final ordering of surviving records.

use std::cmp::Ordering;

use bondlist_core::types::BondRecord;

/// Ranking order: yield to maturity descending, then ISIN, then short name.
///
/// Records without a yield sort last.
pub fn compare(a: &BondRecord, b: &BondRecord) -> Ordering {
    let ytm = |r: &BondRecord| r.yield_to_maturity.unwrap_or(f64::NEG_INFINITY);
    ytm(b)
        .total_cmp(&ytm(a))
        .then_with(|| a.isin.cmp(&b.isin))
        .then_with(|| a.short_name.cmp(&b.short_name))
}

/// Sorts records into rank order.
pub fn rank(records: &mut [BondRecord]) {
    records.sort_by(compare);
}
