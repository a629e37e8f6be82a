//! Trade statistics: bid/ask and liquidity counters over several trading days.

use std::collections::HashMap;
use std::fmt;

use bondlist_core::normalize::normalize_short_name;
use bondlist_core::types::Liquidity;
use bondlist_traits::{DocumentFetcher, FetchRequest};
use chrono::{Datelike, Duration, NaiveDate};
use futures::future::try_join_all;
use tracing::{debug, info};

use crate::error::{SourceError, SourceResult};
use crate::html::{cell_text, find_path, is_header_row, parse_document, row_cells, table_rows};
use crate::table::{parse_f64, parse_u64, walk_row, Layout, ParseSummary, Role, RowOutcome};

/// Element path of the results table.
pub const TABLE_PATH: &[&str] = &[
    "html", "body", "div", "div", "div", "table", "tbody", "tr", "td", "div", "table",
];

/// Trading days fetched by default, counting back from the statistics date.
pub const DEFAULT_DAYS: u32 = 3;

/// Columns the statistics extractor reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatField {
    /// Short name.
    Name,
    /// Best bid in percent.
    Bid,
    /// Best ask in percent.
    Ask,
    /// Securities traded.
    SecuritiesCount,
    /// Traded volume.
    TradeVolume,
    /// Transactions.
    TransactionsCount,
}

const S: Role<StatField> = Role::Skip;

static T0_LAYOUT: Layout<StatField> = Layout {
    source: "statistics/T0",
    header: &[],
    roles: &[
        Role::Field(StatField::Name),
        Role::Field(StatField::Bid),
        Role::Field(StatField::Ask),
        S,
        Role::Field(StatField::SecuritiesCount),
        Role::Field(StatField::TradeVolume),
        Role::Field(StatField::TransactionsCount),
        Role::Last,
    ],
};

static T_PLUS_LAYOUT: Layout<StatField> = Layout {
    source: "statistics/T+",
    header: &[],
    roles: &[
        S,
        Role::Field(StatField::Name),
        Role::Field(StatField::Bid),
        Role::Field(StatField::Ask),
        S,
        Role::Field(StatField::SecuritiesCount),
        Role::Field(StatField::TradeVolume),
        Role::Field(StatField::TransactionsCount),
        Role::Last,
    ],
};

/// Settlement mode of a statistics page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TradingMode {
    /// Same-day settlement.
    T0,
    /// Deferred settlement.
    TPlus,
}

impl TradingMode {
    /// Both modes, in merge order.
    pub const ALL: [TradingMode; 2] = [TradingMode::T0, TradingMode::TPlus];

    /// `resultsType` query value of the mode.
    pub fn results_type(self) -> u8 {
        match self {
            TradingMode::T0 => 1,
            TradingMode::TPlus => 5,
        }
    }

    fn layout(self) -> &'static Layout<StatField> {
        match self {
            TradingMode::T0 => &T0_LAYOUT,
            TradingMode::TPlus => &T_PLUS_LAYOUT,
        }
    }
}

impl fmt::Display for TradingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradingMode::T0 => f.write_str("T0"),
            TradingMode::TPlus => f.write_str("T+"),
        }
    }
}

/// URL of the statistics page for `date` and `mode`.
///
/// The date is encoded as hexadecimal year, month and day.
pub fn statistics_url(date: NaiveDate, mode: TradingMode) -> String {
    format!(
        "http://bonds.finam.ru/trades/today/rqdate{:X}{:02X}{:02X}/default.asp?order=1&resultsType={}&close=off&bid=on&ask=on&tradesOnly=1&page=0",
        date.year(),
        date.month(),
        date.day(),
        mode.results_type()
    )
}

/// One statistics row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeStats {
    /// Short name as printed by the source.
    pub name: String,
    /// Best bid in percent.
    pub bid: f64,
    /// Best ask in percent.
    pub ask: f64,
    /// Trading activity.
    pub liquidity: Liquidity,
}

/// Statistics keyed by normalized short name.
pub type StatisticsIndex = HashMap<String, TradeStats>;

/// Parses one statistics page.
///
/// Header rows are skipped, partial rows are skipped and counted, and an unparsable
/// number is a hard error.
pub fn parse_statistics(mode: TradingMode, text: &str) -> SourceResult<(Vec<TradeStats>, ParseSummary)> {
    let layout = mode.layout();
    let document = parse_document(text);
    let table = find_path(document.root_element(), TABLE_PATH)
        .ok_or_else(|| SourceError::missing(layout.source, "result table"))?;

    let mut stats = Vec::new();
    let mut summary = ParseSummary::new(layout.source);
    for row in table_rows(table) {
        if is_header_row(row) {
            continue;
        }
        let fields = match walk_row(layout.roles, row_cells(row)) {
            RowOutcome::Complete(fields) => fields,
            RowOutcome::Partial { consumed } => {
                debug!(source = layout.source, consumed, "skip partial row");
                summary.skipped += 1;
                continue;
            }
        };

        let mut entry = TradeStats::default();
        for (field, cell) in fields {
            let text = cell_text(cell);
            let source = layout.source;
            match field {
                StatField::Name => entry.name = text.to_string(),
                StatField::Bid => entry.bid = parse_f64(source, "bid", text)?,
                StatField::Ask => entry.ask = parse_f64(source, "ask", text)?,
                StatField::SecuritiesCount => {
                    entry.liquidity.securities_count = parse_u64(source, "securities count", text)?;
                }
                StatField::TradeVolume => {
                    entry.liquidity.trade_volume = parse_f64(source, "trade volume", text)?;
                }
                StatField::TransactionsCount => {
                    entry.liquidity.transactions_count =
                        parse_u64(source, "transactions count", text)?;
                }
            }
        }
        if entry.name.is_empty() {
            summary.skipped += 1;
            continue;
        }
        stats.push(entry);
        summary.accepted += 1;
    }

    summary.log();
    Ok((stats, summary))
}

/// Merges the pages of one trading day in order; a later page replaces the whole
/// entry of a name seen on an earlier one (T+ over T0).
pub fn merge_day<I>(pages: I) -> Vec<TradeStats>
where
    I: IntoIterator<Item = Vec<TradeStats>>,
{
    let mut day = StatisticsIndex::new();
    for entry in pages.into_iter().flatten() {
        day.insert(normalize_short_name(&entry.name), entry);
    }
    day.into_values().collect()
}

/// Merges days in order: the first day a name appears on keeps its descriptive
/// fields (name, bid, ask), later days only add their liquidity counters.
pub fn merge_pages<I>(days: I) -> StatisticsIndex
where
    I: IntoIterator<Item = Vec<TradeStats>>,
{
    let mut index = StatisticsIndex::new();
    for day in days {
        for entry in day {
            let key = normalize_short_name(&entry.name);
            match index.get_mut(&key) {
                Some(existing) => existing.liquidity.absorb(&entry.liquidity),
                None => {
                    index.insert(key, entry);
                }
            }
        }
    }
    index
}

async fn fetch_day<F: DocumentFetcher + ?Sized>(
    fetcher: &F,
    day: NaiveDate,
) -> SourceResult<Vec<TradeStats>> {
    let pages = try_join_all(TradingMode::ALL.into_iter().map(|mode| async move {
        let text = fetcher
            .fetch(&FetchRequest::windows_1251(statistics_url(day, mode)))
            .await?;
        let (stats, _) = parse_statistics(mode, &text)?;
        Ok::<_, SourceError>(stats)
    }))
    .await?;
    Ok(merge_day(pages))
}

/// Downloads both trading modes for `days` consecutive days ending at `date` and
/// merges them, `date` first.
///
/// All pages are fetched concurrently; any failure aborts the whole fetch.
pub async fn fetch_statistics<F: DocumentFetcher + ?Sized>(
    fetcher: &F,
    date: NaiveDate,
    days: u32,
) -> SourceResult<StatisticsIndex> {
    let pages = try_join_all(
        (0..days).map(|back| fetch_day(fetcher, date - Duration::days(i64::from(back)))),
    )
    .await?;

    let index = merge_pages(pages);
    info!(days, bonds = index.len(), "merged trade statistics");
    Ok(index)
}
