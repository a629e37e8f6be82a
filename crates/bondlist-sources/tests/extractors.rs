//! Extractors driven through the fetcher seam.

use bondlist_core::types::{BondType, Liquidity};
use bondlist_ext_file::MemoryFetcher;
use bondlist_sources::detail::{fetch_detail, search_url};
use bondlist_sources::emitent::{load_emitents, page_url};
use bondlist_sources::market::{fetch_market, market_source};
use bondlist_sources::statistics::{fetch_statistics, statistics_url, TradingMode};
use bondlist_sources::SourceError;
use chrono::NaiveDate;

fn statistics_page(rows: &[[&str; 9]]) -> String {
    let mut html = String::from(
        "<html><body><div><div><div><table><tr><td><div><table><tr><th>Имя</th></tr>",
    );
    for row in rows {
        html.push_str("<tr>");
        for cell in row {
            html.push_str(&format!("<td>{cell}</td>"));
        }
        html.push_str("</tr>");
    }
    html.push_str("</table></div></td></tr></table></div></div></div></body></html>");
    html
}

fn empty_statistics() -> String {
    statistics_page(&[])
}

#[tokio::test]
async fn statistics_sum_over_days() {
    let date = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap();
    let previous = NaiveDate::from_ymd_opt(2024, 6, 4).unwrap();
    let fetcher = MemoryFetcher::new()
        .with_document(
            statistics_url(date, TradingMode::T0),
            statistics_page(&[["ОФЗ 26207", "99", "99,5", "-", "5", "100", "2", "x", "x"]]),
        )
        .with_document(statistics_url(date, TradingMode::TPlus), empty_statistics())
        .with_document(
            statistics_url(previous, TradingMode::T0),
            statistics_page(&[["ОФЗ-26207", "97", "97,5", "-", "3", "50", "1", "x", "x"]]),
        )
        .with_document(statistics_url(previous, TradingMode::TPlus), empty_statistics());

    let index = fetch_statistics(&fetcher, date, 2).await.unwrap();
    let ofz = &index["ОФЗ26207"];
    assert_eq!(ofz.liquidity, Liquidity::new(8, 3, 150.0));
    assert_eq!(ofz.name, "ОФЗ 26207");
    assert_eq!(ofz.ask, 99.5);
    assert_eq!(fetcher.total_requests(), 4);
}

#[tokio::test]
async fn statistics_t_plus_replaces_t0_within_a_day() {
    let date = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap();
    let previous = NaiveDate::from_ymd_opt(2024, 6, 4).unwrap();
    let fetcher = MemoryFetcher::new()
        .with_document(
            statistics_url(date, TradingMode::T0),
            statistics_page(&[["ОФЗ 26207", "99", "99,5", "-", "10", "9 950", "2", "x", "x"]]),
        )
        .with_document(
            statistics_url(date, TradingMode::TPlus),
            statistics_page(&[["1", "ОФЗ 26207", "99", "99,8", "-", "5", "4 990", "1", "x"]]),
        )
        .with_document(
            statistics_url(previous, TradingMode::T0),
            statistics_page(&[["ОФЗ-26207", "97", "97,5", "-", "3", "50", "1", "x", "x"]]),
        )
        .with_document(statistics_url(previous, TradingMode::TPlus), empty_statistics());

    let index = fetch_statistics(&fetcher, date, 2).await.unwrap();
    let ofz = &index["ОФЗ26207"];
    assert_eq!(ofz.ask, 99.8);
    assert_eq!(ofz.liquidity, Liquidity::new(8, 2, 5040.0));
}

#[tokio::test]
async fn statistics_missing_day_aborts() {
    let date = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap();
    let fetcher = MemoryFetcher::new()
        .with_document(statistics_url(date, TradingMode::T0), empty_statistics())
        .with_document(statistics_url(date, TradingMode::TPlus), empty_statistics());

    let err = fetch_statistics(&fetcher, date, 2).await.unwrap_err();
    assert!(matches!(err, SourceError::Fetch(_)));
}

#[tokio::test]
async fn market_table_from_fetcher() {
    let source = market_source(BondType::Eurobond);
    let mut html = String::from("<html><body><div><div><table><tr>");
    for label in source.layout.header {
        html.push_str(&format!("<th>{label}</th>"));
    }
    html.push_str("</tr><tr>");
    let mut cells: Vec<String> = (0..16).map(|i| i.to_string()).collect();
    cells[2] = "<a href=\"/q/bonds/XS0088543193/\">Russia-30</a>".into();
    cells[4] = "2030-03-31".into();
    cells[9] = "101,25".into();
    cells[13] = "3,1".into();
    cells[15] = String::new();
    for cell in &cells {
        html.push_str(&format!("<td>{cell}</td>"));
    }
    html.push_str("</tr></table></div></div></body></html>");

    let fetcher = MemoryFetcher::new().with_document(source.url, html);
    let table = fetch_market(&fetcher, BondType::Eurobond).await.unwrap();
    assert_eq!(table.records.len(), 1);
    assert_eq!(table.records[0].isin, "XS0088543193");
    assert_eq!(table.records[0].bond_type, BondType::Eurobond);
    assert_eq!(table.records[0].clean_price_percent, 101.25);
}

#[tokio::test]
async fn detail_not_found_is_not_an_error() {
    let fetcher = MemoryFetcher::new().with_document(
        search_url("RU000A0ZZZZ9"),
        "<html><body><div>Ничего не найдено</div></body></html>",
    );
    assert_eq!(fetch_detail(&fetcher, "RU000A0ZZZZ9").await.unwrap(), None);
}

#[tokio::test]
async fn detail_follows_relative_link() {
    let fetcher = MemoryFetcher::new()
        .with_document(
            search_url("RU000A100001"),
            "<html><body><div><table><thead><tr><th>x</th></tr></thead>\
             <tbody><tr><td><a href=\"/bonds/777/\">Пример</a></td></tr></tbody></table></div></body></html>",
        )
        .with_document(
            "https://www.rusbonds.ru/bonds/777/",
            "<html><body>ПОГАШЕНИЕ - Амортизация КУПОН - Плавающий</body></html>",
        );
    let detail = fetch_detail(&fetcher, "RU000A100001").await.unwrap().unwrap();
    assert!(detail.is_amortizing());
    assert!(!detail.is_fixed_coupon());
    assert_eq!(detail.coupon_type, "Плавающий");
}

#[tokio::test]
async fn emitents_paginate_and_cache() {
    let dir = tempfile::tempdir().unwrap();
    let cache = dir.path().join("emitents.json");
    let fetcher = MemoryFetcher::new()
        .with_document(
            page_url(0),
            r#"{"securities":{"data":[["A1","corporate_bond","Альфа","1"],["B2","corporate_bond","Бета","2"]]}}"#,
        )
        .with_document(
            page_url(2),
            r#"{"securities":{"data":[["C3","municipal_bond","Гамма","3"]]}}"#,
        )
        .with_document(page_url(3), r#"{"securities":{"data":[]}}"#);

    let directory = load_emitents(&fetcher, Some(&cache)).await.unwrap();
    assert_eq!(directory.len(), 3);
    assert_eq!(directory["C3"].title, "Гамма");
    assert_eq!(fetcher.total_requests(), 3);

    let cached = load_emitents(&fetcher, Some(&cache)).await.unwrap();
    assert_eq!(cached, directory);
    assert_eq!(fetcher.total_requests(), 3);

    std::fs::write(&cache, "not json").unwrap();
    let refetched = load_emitents(&fetcher, Some(&cache)).await.unwrap();
    assert_eq!(refetched.len(), 3);
    assert_eq!(fetcher.total_requests(), 6);
}
