//! Market tables: one HTML page per bond type, the base of every bond record.

use bondlist_core::types::{BondRecord, BondType};
use bondlist_traits::{DocumentFetcher, FetchRequest};
use chrono::NaiveDate;
use scraper::ElementRef;
use tracing::debug;

use crate::error::{SourceError, SourceResult};
use crate::html::{cell_text, find_path, first_text, parse_document, row_cells, table_rows};
use crate::table::{parse_f64, validate_header, walk_row, Layout, ParseSummary, Role, RowOutcome};

/// Element path of the quotes table.
pub const TABLE_PATH: &[&str] = &["html", "body", "div", "div", "table"];

/// Link prefix of a bond page; the ISIN follows it.
pub const ISIN_LINK_PREFIX: &str = "/q/bonds/";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Columns the market extractor reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketField {
    /// Short name, linking to the bond page.
    Name,
    /// Maturity date.
    MaturityDate,
    /// Offer date.
    OfferDate,
    /// Accrued interest.
    AccruedInterest,
    /// Clean price in percent.
    CleanPrice,
}

/// Where and how a bond type's table is published.
#[derive(Debug)]
pub struct MarketSource {
    /// Bond type of the table.
    pub bond_type: BondType,
    /// Page URL.
    pub url: &'static str,
    /// Column layout.
    pub layout: Layout<MarketField>,
}

const S: Role<MarketField> = Role::Skip;
const NAME: Role<MarketField> = Role::Field(MarketField::Name);
const MATURITY: Role<MarketField> = Role::Field(MarketField::MaturityDate);
const OFFER: Role<MarketField> = Role::Field(MarketField::OfferDate);
const ACCRUED: Role<MarketField> = Role::Field(MarketField::AccruedInterest);
const PRICE: Role<MarketField> = Role::Field(MarketField::CleanPrice);

static CORPORATE: MarketSource = MarketSource {
    bond_type: BondType::Corporate,
    url: "https://smart-lab.ru/q/bonds/",
    layout: Layout {
        source: "market/corp",
        header: &[
            "№", "Время", "Имя", "", "Размещение", "Погашение", "Лет до", "Доходн", "Год.куп.",
            "Куп.дох.", "Цена", "Объем, млн руб", "Купон, руб", "Частота,", "НКД, руб",
            "Дюр-я, лет", "Дата купона", "Оферта",
        ],
        roles: &[
            S, S, NAME, S, S, MATURITY, S, S, S, S, PRICE, S, S, S, ACCRUED, S, S, OFFER,
        ],
    },
};

static GOVERNMENT: MarketSource = MarketSource {
    bond_type: BondType::Government,
    url: "https://smart-lab.ru/q/ofz/",
    layout: Layout {
        source: "market/gov",
        header: &[
            "№", "Время", "Имя", "", "Погашение", "Лет до", "Доходн", "!", "Год.куп.",
            "Куп.дох.", "Цена", "Объем,", "Купон, руб", "Частота,", "НКД, руб", "Дюр-я, лет",
            "Дата купона",
        ],
        roles: &[S, S, NAME, S, MATURITY, S, S, S, S, S, PRICE, S, S, S, ACCRUED, S, S],
    },
};

static MUNICIPAL: MarketSource = MarketSource {
    bond_type: BondType::Municipal,
    url: "https://smart-lab.ru/q/subfed/",
    layout: Layout {
        source: "market/mun",
        header: &[
            "№", "Время", "Имя", "", "Погашение", "Лет до", "Доходн", "Год.куп.", "Куп.дох.",
            "Цена", "Объем, млн руб", "Купон, руб", "Частота,", "НКД, руб", "Дюр-я, лет",
            "Дата купона", "Оферта",
        ],
        roles: &[S, S, NAME, S, MATURITY, S, S, S, S, PRICE, S, S, S, ACCRUED, S, S, OFFER],
    },
};

static EUROBOND: MarketSource = MarketSource {
    bond_type: BondType::Eurobond,
    url: "https://smart-lab.ru/q/eurobonds/",
    layout: Layout {
        source: "market/euro",
        header: &[
            "№", "Время", "Имя", "", "Погашение", "Лет до", "Доходн", "Год.куп.дох.",
            "Куп.дох.", "Цена", "Объем, тыс. $", "Купон, $", "Частота,", "НКД, $",
            "Дата купона", "Оферта",
        ],
        roles: &[S, S, NAME, S, MATURITY, S, S, S, S, PRICE, S, S, S, ACCRUED, S, OFFER],
    },
};

/// Table configuration of a bond type.
pub fn market_source(bond_type: BondType) -> &'static MarketSource {
    match bond_type {
        BondType::Corporate => &CORPORATE,
        BondType::Government => &GOVERNMENT,
        BondType::Municipal => &MUNICIPAL,
        BondType::Eurobond => &EUROBOND,
    }
}

/// Records parsed from one market table.
#[derive(Debug, Clone)]
pub struct MarketTable {
    /// Bond type of the table.
    pub bond_type: BondType,
    /// One record per accepted row.
    pub records: Vec<BondRecord>,
    /// Row counters.
    pub summary: ParseSummary,
}

enum RowError {
    /// Recoverable; the row is counted as skipped.
    Skip(&'static str),
    /// Fatal for the table.
    Fatal(SourceError),
}

impl From<SourceError> for RowError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::MalformedValue { field, .. } => RowError::Skip(field),
            other => RowError::Fatal(other),
        }
    }
}

/// Parses the market table of `bond_type`.
///
/// Header drift and a missing or malformed ISIN link are fatal. Partial rows, rows
/// with an unparsable maturity date and rows with unparsable numbers are skipped.
pub fn parse_market(bond_type: BondType, text: &str) -> SourceResult<MarketTable> {
    let source = market_source(bond_type);
    let layout = &source.layout;
    let document = parse_document(text);
    let table = find_path(document.root_element(), TABLE_PATH)
        .ok_or_else(|| SourceError::missing(layout.source, "quotes table"))?;

    let mut rows = table_rows(table).into_iter();
    let header = rows
        .next()
        .ok_or_else(|| SourceError::missing(layout.source, "header row"))?;
    let labels: Vec<&str> = row_cells(header).into_iter().map(cell_text).collect();
    validate_header(layout, &labels)?;

    let mut records = Vec::new();
    let mut summary = ParseSummary::new(layout.source);
    for row in rows {
        match walk_row(layout.roles, row_cells(row)) {
            RowOutcome::Complete(fields) => match parse_row(source, fields) {
                Ok(record) => {
                    records.push(record);
                    summary.accepted += 1;
                }
                Err(RowError::Skip(reason)) => {
                    debug!(source = layout.source, reason, "skip row");
                    summary.skipped += 1;
                }
                Err(RowError::Fatal(err)) => return Err(err),
            },
            RowOutcome::Partial { consumed } => {
                debug!(source = layout.source, consumed, "skip partial row");
                summary.skipped += 1;
            }
        }
    }

    summary.log();
    Ok(MarketTable {
        bond_type,
        records,
        summary,
    })
}

fn parse_row(
    source: &MarketSource,
    fields: Vec<(MarketField, ElementRef<'_>)>,
) -> Result<BondRecord, RowError> {
    let name = source.layout.source;
    let mut record = BondRecord::new(String::new(), source.bond_type);
    for (field, cell) in fields {
        let Some((raw, holder)) = first_text(cell) else {
            continue;
        };
        let text = raw.trim();
        match field {
            MarketField::Name => {
                record.short_name = text.to_string();
                record.isin = extract_isin(name, holder)?;
            }
            MarketField::MaturityDate => {
                let date = NaiveDate::parse_from_str(text, DATE_FORMAT)
                    .map_err(|_| RowError::Skip("maturity date"))?;
                record.maturity_date = Some(date);
            }
            MarketField::OfferDate => {
                record.offer_date = NaiveDate::parse_from_str(text, DATE_FORMAT).ok();
            }
            MarketField::AccruedInterest => {
                record.accrued_interest = parse_f64(name, "accrued interest", text)?;
            }
            MarketField::CleanPrice => {
                record.clean_price_percent = parse_f64(name, "clean price", text)?;
            }
        }
    }
    if record.isin.is_empty() {
        return Err(RowError::Skip("name"));
    }
    Ok(record)
}

/// Extracts the ISIN from a `/q/bonds/<ISIN>/` link.
fn extract_isin(source: &str, anchor: ElementRef<'_>) -> Result<String, RowError> {
    let fail = |detail: String| {
        RowError::Fatal(SourceError::Isin {
            source_name: source.to_string(),
            detail,
        })
    };
    if anchor.value().name() != "a" {
        return Err(fail(format!("name is inside <{}>, not a link", anchor.value().name())));
    }
    let href = anchor
        .value()
        .attr("href")
        .ok_or_else(|| fail("link has no href".to_string()))?;
    href.strip_prefix(ISIN_LINK_PREFIX)
        .and_then(|rest| rest.strip_suffix('/'))
        .filter(|isin| !isin.is_empty() && !isin.contains('/'))
        .map(str::to_string)
        .ok_or_else(|| fail(format!("unexpected link `{href}`")))
}

/// Downloads and parses the market table of `bond_type`.
pub async fn fetch_market<F: DocumentFetcher + ?Sized>(
    fetcher: &F,
    bond_type: BondType,
) -> SourceResult<MarketTable> {
    let source = market_source(bond_type);
    let text = fetcher.fetch(&FetchRequest::new(source.url)).await?;
    parse_market(bond_type, &text)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A market page for `bond_type` with the given data rows.
    pub fn page(bond_type: BondType, rows: &[Vec<String>]) -> String {
        let layout = &market_source(bond_type).layout;
        let mut html = String::from("<html><body><div><div><table><tr>");
        for label in layout.header {
            html.push_str(&format!("<th>{label}</th>"));
        }
        html.push_str("</tr>");
        for row in rows {
            html.push_str("<tr>");
            for cell in row {
                html.push_str(&format!("<td>{cell}</td>"));
            }
            html.push_str("</tr>");
        }
        html.push_str("</table></div></div></body></html>");
        html
    }

    /// A full corporate row.
    pub fn corporate_row(isin: &str, name: &str, maturity: &str, price: &str, accrued: &str, offer: &str) -> Vec<String> {
        let mut cells: Vec<String> = (0..18).map(|i| format!("{i}")).collect();
        cells[2] = format!("<a href=\"/q/bonds/{isin}/\">{name}</a>");
        cells[5] = maturity.to_string();
        cells[10] = price.to_string();
        cells[14] = accrued.to_string();
        cells[17] = offer.to_string();
        cells
    }
}
