//! Exchange listing CSV: nominal, coupon, currency and issuer of every listed bond.

use std::collections::HashMap;

use bondlist_core::types::Currency;
use bondlist_traits::{DocumentFetcher, FetchRequest};
use tracing::debug;

use crate::error::{SourceError, SourceResult};
use crate::table::{clean_numeric, validate_header, walk_row, Layout, ParseSummary, Role, RowOutcome};

/// Listing CSV download URL.
pub const LISTING_URL: &str = "https://www.moex.com/ru/listing/securities-list-csv.aspx?type=1";

/// Security class of bonds.
pub const BOND_SUPERTYPE: &str = "Облигации";

/// Flag value meaning "yes".
const FLAG_SET: &str = "+";

const SOURCE: &str = "listing";

/// Columns the listing extractor reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Supertype,
    TradeCode,
    Isin,
    FullName,
    Nominal,
    Currency,
    QualifiedInvestor,
    HasDefault,
    HasTechDefault,
    CouponPercent,
}

const S: Role<Column> = Role::Skip;

static LAYOUT: Layout<Column> = Layout {
    source: SOURCE,
    header: &[
        "DATESTAMP",
        "INSTRUMENT_ID",
        "LIST_SECTION",
        "RN",
        "SUPERTYPE",
        "INSTRUMENT_TYPE",
        "INSTRUMENT_CATEGORY",
        "TRADE_CODE",
        "ISIN",
        "REGISTRY_NUMBER",
        "REGISTRY_DATE",
        "EMITENT_FULL_NAME",
        "INN",
        "NOMINAL",
        "CURRENCY",
        "ISSUE_AMOUNT",
        "DECISION_DATE",
        "OKSM_EDR",
        "ONLY_EMITENT_FULL_NAME",
        "REG_COUNTRY",
        "QUALIFIED_INVESTOR",
        "HAS_PROSPECTUS",
        "IS_CONCESSION_AGREEMENT",
        "IS_MORTGAGE_AGENT",
        "INCLUDED_DURING_CREATION",
        "SECURITY_HAS_DEFAULT",
        "SECURITY_HAS_TECH_DEFAULT",
        "INCLUDED_WITHOUT_COMPLIANCE",
        "RETAINED_WITHOUT_COMPLIANCE",
        "HAS_RESTRICTION_CIRCULATION",
        "LISTING_LEVEL_HIST",
        "OBLIGATION_PROGRAM_RN",
        "COUPON_PERCENT",
        "EARLY_REPAYMENT",
        "EARLY_REDEMPTION",
        "ISS_BOARDS",
        "OTHER_SECURITIES",
        "DISCLOSURE_PART_PAGE",
        "DISCLOSURE_RF_INFO_PAGE",
    ],
    roles: &[
        S,
        S,
        S,
        S,
        Role::Field(Column::Supertype),
        S,
        S,
        Role::Field(Column::TradeCode),
        Role::Field(Column::Isin),
        S,
        S,
        Role::Field(Column::FullName),
        S,
        Role::Field(Column::Nominal),
        Role::Field(Column::Currency),
        S,
        S,
        S,
        S,
        S,
        Role::Field(Column::QualifiedInvestor),
        S,
        S,
        S,
        S,
        Role::Field(Column::HasDefault),
        Role::Field(Column::HasTechDefault),
        S,
        S,
        S,
        S,
        S,
        Role::Field(Column::CouponPercent),
        S,
        S,
        S,
        S,
        S,
        S,
    ],
};

/// Column labels the listing header must carry, in order.
pub fn expected_header() -> &'static [&'static str] {
    LAYOUT.header
}

/// Listing facts about one bond.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingEntry {
    /// ISIN.
    pub isin: String,
    /// Exchange trade code.
    pub trade_code: String,
    /// Issuer's full legal name.
    pub full_name: String,
    /// Face value.
    pub nominal: f64,
    /// Annual coupon in percent.
    pub coupon_interest: f64,
    /// Settlement currency.
    pub currency: Currency,
}

/// Listing entries keyed by ISIN, and also by trade code where it differs.
#[derive(Debug, Clone, Default)]
pub struct ListingIndex {
    entries: HashMap<String, ListingEntry>,
}

impl ListingIndex {
    /// Adds an entry under its ISIN and trade code.
    pub fn insert(&mut self, entry: ListingEntry) {
        if !entry.trade_code.is_empty() && entry.trade_code != entry.isin {
            self.entries.insert(entry.trade_code.clone(), entry.clone());
        }
        self.entries.insert(entry.isin.clone(), entry);
    }

    /// Looks up by ISIN or trade code.
    pub fn get(&self, key: &str) -> Option<&ListingEntry> {
        self.entries.get(key)
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no bond was listed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Default)]
struct RawRow<'a> {
    supertype: &'a str,
    trade_code: &'a str,
    isin: &'a str,
    full_name: &'a str,
    nominal: &'a str,
    currency: &'a str,
    qualified: &'a str,
    has_default: &'a str,
    has_tech_default: &'a str,
    coupon: &'a str,
}

impl<'a> RawRow<'a> {
    fn from_fields(fields: Vec<(Column, &'a str)>) -> Self {
        let mut row = RawRow::default();
        for (column, text) in fields {
            let slot = match column {
                Column::Supertype => &mut row.supertype,
                Column::TradeCode => &mut row.trade_code,
                Column::Isin => &mut row.isin,
                Column::FullName => &mut row.full_name,
                Column::Nominal => &mut row.nominal,
                Column::Currency => &mut row.currency,
                Column::QualifiedInvestor => &mut row.qualified,
                Column::HasDefault => &mut row.has_default,
                Column::HasTechDefault => &mut row.has_tech_default,
                Column::CouponPercent => &mut row.coupon,
            };
            *slot = text.trim();
        }
        row
    }

    /// Rows the scan never considers: other security classes, qualified-investor-only
    /// issues, defaulted issuers and coupons not quoted in percent.
    fn is_excluded(&self) -> bool {
        self.isin.is_empty()
            || self.supertype != BOND_SUPERTYPE
            || self.qualified == FLAG_SET
            || self.has_default == FLAG_SET
            || self.has_tech_default == FLAG_SET
            || !self.coupon.contains('%')
    }
}

/// Parses the listing CSV.
///
/// The header must match column by column. Short rows are skipped; an unparsable
/// nominal or coupon is a hard error since the feed is expected to be well-formed.
pub fn parse_listing(text: &str) -> SourceResult<(ListingIndex, ParseSummary)> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = reader.records();
    let header = records
        .next()
        .ok_or_else(|| SourceError::missing(SOURCE, "header row"))??;
    let labels: Vec<&str> = header.iter().collect();
    validate_header(&LAYOUT, &labels)?;

    let mut index = ListingIndex::default();
    let mut summary = ParseSummary::new(SOURCE);
    for record in records {
        let record = record?;
        let fields = match walk_row(LAYOUT.roles, record.iter()) {
            RowOutcome::Complete(fields) => fields,
            RowOutcome::Partial { consumed } => {
                debug!(consumed, "listing: skip short row");
                summary.skipped += 1;
                continue;
            }
        };

        let row = RawRow::from_fields(fields);
        if row.is_excluded() {
            summary.filtered += 1;
            continue;
        }

        index.insert(ListingEntry {
            isin: row.isin.to_string(),
            trade_code: row.trade_code.to_string(),
            full_name: row.full_name.to_string(),
            nominal: parse_number("nominal", row.nominal)?,
            coupon_interest: parse_coupon(row.coupon)?,
            currency: Currency::parse(row.currency),
        });
        summary.accepted += 1;
    }

    summary.log();
    Ok((index, summary))
}

fn parse_number(field: &'static str, text: &str) -> SourceResult<f64> {
    clean_numeric(text)
        .parse()
        .map_err(|_| SourceError::malformed(SOURCE, field, text))
}

/// Coupon cells look like `8,5%` or `7,1% годовых`; only the number before `%` counts.
fn parse_coupon(text: &str) -> SourceResult<f64> {
    let number = text.split('%').next().unwrap_or_default();
    parse_number("coupon percent", number)
}

/// Downloads and parses the listing.
pub async fn fetch_listing<F: DocumentFetcher + ?Sized>(fetcher: &F) -> SourceResult<ListingIndex> {
    let text = fetcher.fetch(&FetchRequest::windows_1251(LISTING_URL)).await?;
    let (index, _) = parse_listing(&text)?;
    Ok(index)
}
