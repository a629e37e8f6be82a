//! Joining market records with the listing, trade statistics and emitent directory.

use serde::Serialize;
use tracing::{debug, info};

use bondlist_config::EmitentComments;
use bondlist_core::normalize::normalize_short_name;
use bondlist_core::types::BondRecord;
use bondlist_sources::emitent::EmitentDirectory;
use bondlist_sources::{ListingIndex, StatisticsIndex};

/// Lookup tables the market records are joined with.
#[derive(Debug, Clone, Copy)]
pub struct MergeSources<'a> {
    /// Listing by ISIN and trade code.
    pub listing: &'a ListingIndex,
    /// Trade statistics by normalized short name.
    pub statistics: &'a StatisticsIndex,
    /// Emitent directory by trade code, when downloaded.
    pub emitents: Option<&'a EmitentDirectory>,
}

/// Merge counters; diagnostic only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    /// Records produced by the market tables.
    pub market: usize,
    /// Records kept after the merge.
    pub merged: usize,
    /// Dropped because the listing has no such ISIN.
    pub listing_not_found: usize,
    /// Kept without liquidity because the statistics have no such name.
    pub statistics_not_found: usize,
    /// Kept without emitent because the directory has no such trade code.
    pub emitent_not_found: usize,
}

impl MergeStats {
    /// Emits the end-of-merge summary.
    pub fn log(&self) {
        info!(
            market = self.market,
            merged = self.merged,
            listing_not_found = self.listing_not_found,
            statistics_not_found = self.statistics_not_found,
            emitent_not_found = self.emitent_not_found,
            "merged sources"
        );
    }
}

/// Completes market records from the other sources.
///
/// A record missing from the listing is dropped. A record missing from the
/// statistics is kept with zero liquidity. A positive ask quote replaces the
/// market clean price, being the price a buyer actually pays.
pub fn merge_records(
    records: Vec<BondRecord>,
    sources: MergeSources<'_>,
) -> (Vec<BondRecord>, MergeStats) {
    let mut stats = MergeStats {
        market: records.len(),
        ..MergeStats::default()
    };

    let merged: Vec<BondRecord> = records
        .into_iter()
        .filter_map(|mut record| {
            let Some(listing) = sources.listing.get(&record.isin) else {
                debug!(isin = %record.isin, "not in listing");
                stats.listing_not_found += 1;
                return None;
            };
            record.currency = listing.currency.clone();
            record.coupon_interest = listing.coupon_interest;
            record.nominal = listing.nominal;
            record.full_name = listing.full_name.clone();
            record.trade_code = listing.trade_code.clone();

            if let Some(directory) = sources.emitents {
                match directory.get(&record.trade_code) {
                    Some(emitent) => record.emitent = Some(emitent.clone()),
                    None => stats.emitent_not_found += 1,
                }
            }

            match sources.statistics.get(&normalize_short_name(&record.short_name)) {
                Some(trade) => {
                    record.liquidity = trade.liquidity;
                    if trade.ask > 0.0 {
                        record.clean_price_percent = trade.ask;
                    }
                }
                None => {
                    debug!(name = %record.short_name, "not in trade statistics");
                    stats.statistics_not_found += 1;
                }
            }
            Some(record)
        })
        .collect();

    stats.merged = merged.len();
    stats.log();
    (merged, stats)
}

/// Attaches emitent comments, matched by emitent title then full legal name.
///
/// Returns the number of commented records.
pub fn apply_comments(records: &mut [BondRecord], comments: &EmitentComments) -> usize {
    if comments.is_empty() {
        return 0;
    }
    let mut applied = 0;
    for record in records.iter_mut() {
        let title = record.emitent.as_ref().map(|e| e.title.as_str());
        let comment = title
            .and_then(|t| comments.get(t))
            .or_else(|| comments.get(&record.full_name));
        if let Some(comment) = comment {
            record.comment = comment.to_string();
            applied += 1;
        }
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use bondlist_core::types::{BondType, Currency, EmitentInfo, Liquidity};
    use bondlist_sources::{ListingEntry, TradeStats};

    fn listing() -> ListingIndex {
        let mut index = ListingIndex::default();
        index.insert(ListingEntry {
            isin: "RU000A100001".into(),
            trade_code: "RU000A100001".into(),
            full_name: "ПАО \"Ромашка\"".into(),
            nominal: 1000.0,
            coupon_interest: 9.5,
            currency: Currency::Rub,
        });
        index.insert(ListingEntry {
            isin: "XS0000000001".into(),
            trade_code: "XS01".into(),
            full_name: "Lutik Finance DAC".into(),
            nominal: 1000.0,
            coupon_interest: 5.0,
            currency: Currency::Usd,
        });
        index
    }

    fn statistics() -> StatisticsIndex {
        let mut index = StatisticsIndex::new();
        index.insert(
            normalize_short_name("Ромашка 1Р-01"),
            TradeStats {
                name: "Ромашка 1Р-01".into(),
                bid: 97.0,
                ask: 97.5,
                liquidity: Liquidity::new(100, 7, 97_500.0),
            },
        );
        index.insert(
            normalize_short_name("Lutik 25"),
            TradeStats {
                name: "Lutik 25".into(),
                bid: 0.0,
                ask: 0.0,
                liquidity: Liquidity::new(3, 1, 3_000.0),
            },
        );
        index
    }

    fn market(isin: &str, name: &str, price: f64) -> BondRecord {
        let mut record = BondRecord::new(isin, BondType::Corporate).with_short_name(name);
        record.clean_price_percent = price;
        record
    }

    #[test]
    fn test_merge_copies_listing_and_statistics() {
        let (listing, statistics) = (listing(), statistics());
        let sources = MergeSources {
            listing: &listing,
            statistics: &statistics,
            emitents: None,
        };
        let (merged, stats) = merge_records(
            vec![
                market("RU000A100001", "РОМАШКА 1Р01", 99.0),
                market("RU000A999999", "Неизвестный", 99.0),
                market("XS0000000001", "Lutik-25", 88.0),
            ],
            sources,
        );

        assert_eq!(
            stats,
            MergeStats {
                market: 3,
                merged: 2,
                listing_not_found: 1,
                statistics_not_found: 0,
                emitent_not_found: 0,
            }
        );

        let romashka = &merged[0];
        assert_eq!(romashka.nominal, 1000.0);
        assert_eq!(romashka.coupon_interest, 9.5);
        assert_eq!(romashka.full_name, "ПАО \"Ромашка\"");
        assert_eq!(romashka.clean_price_percent, 97.5);
        assert_eq!(romashka.liquidity.transactions_count, 7);

        let lutik = &merged[1];
        assert_eq!(lutik.currency, Currency::Usd);
        assert_eq!(lutik.trade_code, "XS01");
        assert_eq!(lutik.clean_price_percent, 88.0, "empty ask keeps market price");
        assert_eq!(lutik.liquidity.securities_count, 3);
    }

    #[test]
    fn test_statistics_miss_keeps_record() {
        let listing = listing();
        let statistics = StatisticsIndex::new();
        let (merged, stats) = merge_records(
            vec![market("RU000A100001", "Ромашка 1Р-01", 99.0)],
            MergeSources {
                listing: &listing,
                statistics: &statistics,
                emitents: None,
            },
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(stats.statistics_not_found, 1);
        assert_eq!(merged[0].liquidity, Liquidity::default());
        assert_eq!(merged[0].clean_price_percent, 99.0);
    }

    #[test]
    fn test_emitent_attached_by_trade_code() {
        let (listing, statistics) = (listing(), statistics());
        let mut directory = EmitentDirectory::new();
        directory.insert(
            "XS01".into(),
            EmitentInfo {
                kind: "euro_bond".into(),
                title: "Lutik Group".into(),
                inn: String::new(),
            },
        );
        let (merged, stats) = merge_records(
            vec![
                market("XS0000000001", "Lutik 25", 90.0),
                market("RU000A100001", "Ромашка 1Р-01", 99.0),
            ],
            MergeSources {
                listing: &listing,
                statistics: &statistics,
                emitents: Some(&directory),
            },
        );
        assert_eq!(stats.emitent_not_found, 1);
        assert_eq!(merged[0].emitent_name(), "Lutik Group");
        assert_eq!(merged[1].emitent_name(), "ПАО \"Ромашка\"");
    }

    #[test]
    fn test_comments_prefer_emitent_title() {
        let mut comments = EmitentComments::default();
        comments.insert("Lutik Group", "watch");
        comments.insert("ПАО \"Ромашка\"", "BB-");

        let mut with_emitent = market("XS0000000001", "Lutik 25", 90.0);
        with_emitent.full_name = "Lutik Finance DAC".into();
        with_emitent.emitent = Some(EmitentInfo {
            kind: String::new(),
            title: "Lutik Group".into(),
            inn: String::new(),
        });
        let mut by_name = market("RU000A100001", "Ромашка 1Р-01", 99.0);
        by_name.full_name = "ПАО \"Ромашка\"".into();
        let plain = market("RU000A100002", "Другой", 99.0);

        let mut records = vec![with_emitent, by_name, plain];
        assert_eq!(apply_comments(&mut records, &comments), 2);
        assert_eq!(records[0].comment, "watch");
        assert_eq!(records[1].comment, "BB-");
        assert!(records[2].comment.is_empty());
    }
}
