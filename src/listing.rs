// src/listing.rs
//! Listing-page extraction: pure parse of the news hub HTML into candidate
//! posts, in page order (the site emits newest-first). No network access.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use scraper::{ElementRef, Html, Selector};

use crate::config::SourceConfig;
use crate::post::CandidatePost;

const NO_TITLE: &str = "No title found";

/// Parse raw listing bytes into candidate posts.
///
/// Zero matching blocks is a normal empty result, not an error; only totally
/// malformed input (not UTF-8, bad selectors) errors out. Missing parts of a
/// block degrade per field: placeholder title, epoch-zero date, `None` link.
pub fn extract_posts(raw: &[u8], cfg: &SourceConfig) -> Result<Vec<CandidatePost>> {
    let html = std::str::from_utf8(raw).context("listing page is not valid UTF-8")?;

    let post_sel = parse_selector(&cfg.post_selector)?;
    let title_sel = parse_selector(&cfg.title_selector)?;
    let time_sel = parse_selector(&cfg.time_selector)?;

    let document = Html::parse_document(html);
    let mut posts = Vec::new();

    for block in document.select(&post_sel) {
        let title = block
            .select(&title_sel)
            .next()
            .map(element_text)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| NO_TITLE.to_string());

        let date = block
            .select(&time_sel)
            .next()
            .and_then(|el| el.value().attr(&cfg.date_attr))
            .map(parse_date)
            .unwrap_or(DateTime::UNIX_EPOCH);

        let link = block_link(block);

        posts.push(CandidatePost { title, date, link });
    }

    Ok(posts)
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid CSS selector `{css}`: {e}"))
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<Vec<_>>().join(" ").trim().to_string()
}

/// The block itself is usually the anchor; fall back to the first anchor inside.
fn block_link(block: ElementRef<'_>) -> Option<String> {
    if let Some(href) = block.value().attr("href") {
        return Some(href.to_string());
    }
    static ANCHOR: once_cell::sync::OnceCell<Selector> = once_cell::sync::OnceCell::new();
    let anchor = ANCHOR.get_or_init(|| Selector::parse("a[href]").unwrap());
    block
        .select(anchor)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(str::to_string)
}

/// Parse a machine-readable date attribute; epoch-zero when unparsable, so the
/// post never triggers false republishing.
pub fn parse_date(value: &str) -> DateTime<Utc> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return naive.and_utc();
    }
    if let Ok(day) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(naive) = day.and_hms_opt(0, 0, 0) {
            return naive.and_utc();
        }
    }
    DateTime::UNIX_EPOCH
}
