//! Bond detail pages: coupon type and frequency, redemption style, offers.
//!
//! A search by ISIN either returns a results table linking to the detail page, or no
//! table at all ("not found", which is not an error). The detail page is reduced to
//! plain text and matched against fixed patterns; a pattern that does not match
//! leaves its field empty.

use bondlist_core::types::DetailInfo;
use bondlist_traits::{DocumentFetcher, FetchRequest};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::ElementRef;

use crate::error::{SourceError, SourceResult};
use crate::html::{find_path, parse_document};

const SOURCE: &str = "detail";

/// Site root prepended to relative detail links.
pub const DETAIL_ROOT: &str = "https://www.rusbonds.ru";

/// Element path of the search results header.
pub const RESULTS_HEAD_PATH: &[&str] = &["html", "body", "div", "table", "thead"];

static STRIP_MARKUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s:<!--.+?-->)|(?si:<script.+?</script>)|<[^>]+>").expect("valid markup pattern")
});
static COLLAPSE_SPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s:(?:\s+|&nbsp;)+)").expect("valid space pattern"));

static REDEMPTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"ПОГАШЕНИЕ\s+-?\s+(\S+)").expect("valid redemption pattern"));
static OPTIONS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"ОФЕРТЫ или ДОСРОЧН.ПОГАШЕНИЕ (.+?) КУПОН").expect("valid options pattern")
});
static COUPON_TYPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"КУПОН\s+-?\s+(\S+)").expect("valid coupon type pattern"));
static COUPON_FREQUENCY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Периодичность выплат в год: (\d+)").expect("valid frequency pattern")
});
static COUPON_PERIOD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Текущий купон [(]всего[)]: (\d+ [(]\d+[)])").expect("valid period pattern")
});

/// Search URL for an ISIN.
pub fn search_url(isin: &str) -> String {
    format!(
        "{DETAIL_ROOT}/srch_simple.asp?go=1&nick={isin}&emit=0&sec=0&status=&cat=0&per=0&rate=0&ctype=0&pvt=0&grnt=0&conv=0&amm=0&bpog=&epog=&brazm=&erazm=&bvip=&evip=&brep=&erep=&bemis=&eemis=&bstav=&estav=&bcvol=&ecvol=#rslt"
    )
}

/// Extracts the detail link from a search result page.
///
/// `Ok(None)` when the page has no results table.
pub fn parse_search(text: &str) -> SourceResult<Option<String>> {
    let document = parse_document(text);
    let Some(thead) = find_path(document.root_element(), RESULTS_HEAD_PATH) else {
        return Ok(None);
    };

    let tbody = thead
        .next_siblings()
        .find_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "tbody")
        .ok_or_else(|| SourceError::missing(SOURCE, "results body"))?;

    let anchor = find_path(tbody, &["tbody", "tr", "td", "a"])
        .ok_or_else(|| SourceError::missing(SOURCE, "detail link"))?;
    let href = anchor
        .value()
        .attr("href")
        .ok_or_else(|| SourceError::missing(SOURCE, "detail link href"))?;
    Ok(Some(href.to_string()))
}

/// Reduces a page to single-spaced plain text.
pub fn plain_text(html: &str) -> String {
    let stripped = STRIP_MARKUP.replace_all(html, " ");
    COLLAPSE_SPACE.replace_all(&stripped, " ").into_owned()
}

fn capture(pattern: &Regex, text: &str) -> String {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Extracts the detail facts from a detail page.
pub fn parse_detail_page(html: &str) -> DetailInfo {
    let text = plain_text(html);
    DetailInfo {
        coupon_type: capture(&COUPON_TYPE, &text),
        coupon_frequency: capture(&COUPON_FREQUENCY, &text).parse().unwrap_or(0),
        coupon_period: capture(&COUPON_PERIOD, &text),
        redemption: capture(&REDEMPTION, &text),
        options: capture(&OPTIONS, &text),
    }
}

/// Searches for `isin` and, when found, fetches and parses its detail page.
pub async fn fetch_detail<F: DocumentFetcher + ?Sized>(
    fetcher: &F,
    isin: &str,
) -> SourceResult<Option<DetailInfo>> {
    let search = fetcher
        .fetch(&FetchRequest::windows_1251(search_url(isin)))
        .await?;
    let Some(href) = parse_search(&search)? else {
        return Ok(None);
    };

    let url = if href.starts_with("http") {
        href
    } else {
        format!("{DETAIL_ROOT}{href}")
    };
    let page = fetcher.fetch(&FetchRequest::windows_1251(url)).await?;
    Ok(Some(parse_detail_page(&page)))
}
