//! Instrument catalog scraped from the HistData tick-data index.
//!
//! Each instrument sits in a table cell like
//! `<td><a href="...ascii/tick-data-quotes/eurusd"><strong>EUR/USD</strong></a><br/>(2000/May)</td>`.
//! The annotation gives the first available month; the last one is always
//! the most recent complete calendar month.

use crate::period::Period;
use crate::session::Session;
use chrono::{Month, NaiveDate};
use regex::Regex;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;
use tracing::warn;

const TICK_LINK_MARKER: &str = "/ascii/tick-data-quotes/";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("catalog parse error: {0}")]
    Parse(String),
}

/// One downloadable instrument and its available months.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentInfo {
    pub symbol: String,
    pub first: Period,
    pub last: Period,
    pub interval: String,
}

/// Address of the tick-data index page.
pub fn catalog_url(base: &str) -> String {
    format!("{}/?{TICK_LINK_MARKER}", base.trim_end_matches('/'))
}

/// Download and parse the instrument catalog.
pub fn fetch_catalog(
    session: &Session,
    base: &str,
    today: NaiveDate,
) -> Result<Vec<InstrumentInfo>, CatalogError> {
    let html = session.get_page(&catalog_url(base))?;
    parse_catalog(&html, today)
}

fn start_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\((\d{4})/(\w+)\)").expect("static start-date pattern"))
}

fn selector(css: &str) -> Result<Selector, CatalogError> {
    Selector::parse(css).map_err(|e| CatalogError::Parse(format!("selector {css}: {e}")))
}

/// Parse the tick-data index page.
///
/// Cells without a tick-data link are ignored; cells with a link but no
/// readable start month are skipped with a warning.
pub fn parse_catalog(html: &str, today: NaiveDate) -> Result<Vec<InstrumentInfo>, CatalogError> {
    let document = Html::parse_document(html);
    let td = selector("td")?;
    let link = selector("a[href]")?;
    let strong = selector("strong")?;

    let last = Period::of(&today).prev();
    let mut infos = Vec::new();

    for cell in document.select(&td) {
        let Some(anchor) = cell.select(&link).find(|a| {
            a.value()
                .attr("href")
                .is_some_and(|href| href.contains(TICK_LINK_MARKER))
        }) else {
            continue;
        };
        let Some(label) = anchor.select(&strong).next() else {
            continue;
        };
        let symbol = label
            .text()
            .collect::<String>()
            .trim()
            .replace('/', "")
            .to_uppercase();

        let raw = cell.text().collect::<Vec<_>>().join(" ");
        let Some(caps) = start_pattern().captures(&raw) else {
            warn!(symbol = %symbol, "no start date");
            continue;
        };
        let Ok(year) = caps[1].parse::<i32>() else {
            warn!(symbol = %symbol, "bad start year {}", &caps[1]);
            continue;
        };
        let Ok(month) = caps[2].parse::<Month>() else {
            warn!(symbol = %symbol, "unknown month '{}'", &caps[2]);
            continue;
        };

        infos.push(InstrumentInfo {
            symbol,
            first: Period {
                year,
                month: month.number_from_month(),
            },
            last,
            interval: "tick".to_string(),
        });
    }

    Ok(infos)
}
