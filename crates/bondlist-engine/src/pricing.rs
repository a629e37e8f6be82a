//! Yield computation over merged records.

use tracing::{debug, info};

use bondlist_core::types::BondRecord;
use bondlist_core::yields::YieldCalculator;

/// Finalizes every record and keeps those with a defined yield to maturity.
///
/// Returns the survivors and the number of records excluded as undefined.
pub fn price_records(
    records: Vec<BondRecord>,
    calculator: &YieldCalculator,
) -> (Vec<BondRecord>, usize) {
    let total = records.len();
    let priced: Vec<BondRecord> = records
        .into_iter()
        .filter_map(|mut record| match calculator.finalize(&mut record) {
            Ok(()) => Some(record),
            Err(e) => {
                debug!(error = %e, "excluded from pricing");
                None
            }
        })
        .collect();

    let undefined = total - priced.len();
    info!(priced = priced.len(), undefined, "computed yields");
    (priced, undefined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bondlist_core::types::BondType;
    use bondlist_core::yields::YieldConventions;
    use chrono::{Duration, NaiveDate};

    #[test]
    fn test_undefined_yields_are_excluded() {
        let as_of = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let calculator = YieldCalculator::new(0.1, as_of, YieldConventions::default());

        let mut good = BondRecord::new("RU000A100001", BondType::Corporate)
            .with_maturity(as_of + Duration::days(365));
        good.nominal = 1000.0;
        good.coupon_interest = 8.0;
        good.clean_price_percent = 95.0;

        let mut matured = good.clone().with_maturity(as_of);
        matured.isin = "RU000A100002".into();
        let mut undated = good.clone();
        undated.isin = "RU000A100003".into();
        undated.maturity_date = None;

        let (priced, undefined) = price_records(vec![matured, good, undated], &calculator);
        assert_eq!(undefined, 2);
        assert_eq!(priced.len(), 1);
        assert_eq!(priced[0].isin, "RU000A100001");
        assert!(priced[0].yield_to_maturity.is_some());
    }
}
