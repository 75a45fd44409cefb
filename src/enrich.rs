// src/enrich.rs
//! Best-effort article enrichment: fetch the article page behind a candidate
//! post and pull out a lead image and a short plain-text description. Any
//! failure degrades to the unenriched post; enrichment never fails a run.

use once_cell::sync::OnceCell;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::config::SourceConfig;
use crate::fetch::Fetch;
use crate::post::{CandidatePost, EnrichedPost};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ArticleDetails {
    pub image: Option<String>,
    pub desc: Option<String>,
}

/// Enrich one post. Resolves a relative link against the configured base URL,
/// fetches the article page and parses it; on any fetch/parse trouble the
/// original candidate comes back unchanged.
pub async fn enrich<F: Fetch + ?Sized>(
    fetcher: &F,
    cfg: &SourceConfig,
    post: CandidatePost,
) -> EnrichedPost {
    let Some(raw_link) = post.link.clone() else {
        return EnrichedPost::from(post);
    };

    let article_url = match resolve_link(&cfg.base_url, &raw_link) {
        Ok(u) => u,
        Err(e) => {
            warn!(error = %e, link = %raw_link, "cannot resolve article link");
            return EnrichedPost::from(post);
        }
    };

    let body = match fetcher.fetch(article_url.as_str()).await {
        Ok(b) => b,
        Err(e) => {
            warn!(error = %e, url = %article_url, "article fetch failed; posting without enrichment");
            return EnrichedPost::from(post);
        }
    };

    let details = parse_article(&body, cfg);
    debug!(
        url = %article_url,
        has_image = details.image.is_some(),
        has_desc = details.desc.is_some(),
        "article parsed"
    );

    let mut enriched = EnrichedPost::from(post);
    enriched.link = Some(article_url.to_string());
    enriched.image = details.image;
    enriched.desc = details.desc;
    enriched
}

/// Join a possibly-relative listing link onto the source's base URL.
pub fn resolve_link(base_url: &str, link: &str) -> anyhow::Result<url::Url> {
    if let Ok(absolute) = url::Url::parse(link) {
        return Ok(absolute);
    }
    let base = url::Url::parse(base_url)?;
    Ok(base.join(link)?)
}

/// Pull image + description out of an article page.
///
/// The first `<img>` inside the content container supplies the image; the
/// description is the text of the siblings following that image's parent,
/// joined by newlines, whitespace-collapsed and capped at `desc_max_chars`.
/// A container with no image (or no trailing siblings) yields partial or no
/// enrichment, never an error.
pub fn parse_article(raw: &[u8], cfg: &SourceConfig) -> ArticleDetails {
    let Ok(html) = std::str::from_utf8(raw) else {
        return ArticleDetails::default();
    };
    let Ok(container_sel) = Selector::parse(&cfg.article_selector) else {
        return ArticleDetails::default();
    };

    let document = Html::parse_document(html);
    let Some(container) = document.select(&container_sel).next() else {
        return ArticleDetails::default();
    };

    static IMG: OnceCell<Selector> = OnceCell::new();
    let img_sel = IMG.get_or_init(|| Selector::parse("img").unwrap());

    let Some(img) = container.select(img_sel).next() else {
        return ArticleDetails::default();
    };

    let image = img
        .value()
        .attr("src")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let desc = img
        .parent()
        .and_then(ElementRef::wrap)
        .map(|parent| collect_sibling_text(parent, cfg.desc_max_chars))
        .filter(|d| !d.is_empty());

    ArticleDetails { image, desc }
}

fn collect_sibling_text(after: ElementRef<'_>, max_chars: usize) -> String {
    let blocks: Vec<String> = after
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .map(|el| normalize_text(&el.text().collect::<Vec<_>>().join(" ")))
        .filter(|t| !t.is_empty())
        .collect();
    truncate_chars(&blocks.join("\n"), max_chars)
}

/// Collapse newlines/tabs and repeated whitespace to single spaces, trim.
pub fn normalize_text(s: &str) -> String {
    static RE_CTRL: OnceCell<Regex> = OnceCell::new();
    let re_ctrl = RE_CTRL.get_or_init(|| Regex::new(r"[\r\n\t]+").unwrap());
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s{2,}").unwrap());

    let out = re_ctrl.replace_all(s, " ");
    let out = re_ws.replace_all(&out, " ");
    out.trim().to_string()
}

/// Hard cap at `max` characters, no partial-word repair.
pub fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        s.chars().take(max).collect()
    } else {
        s.to_string()
    }
}
