// src/pipeline.rs
//! One crawl run, end to end: fetch the listing, extract candidates, select
//! what is new against the watermark, enrich concurrently, publish in
//! chronological order, persist. A listing failure aborts the run as a
//! retriable no-op; everything downstream is best-effort per post.

use anyhow::{Context, Result};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::config::SourceConfig;
use crate::enrich;
use crate::fetch::FetchPool;
use crate::listing;
use crate::notify::Publish;
use crate::post::EnrichedPost;
use crate::select::select_new;
use crate::store::Store;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("crawl_runs_total", "Crawl runs started.");
        describe_counter!("crawl_run_errors_total", "Crawl runs aborted by a listing error.");
        describe_counter!(
            "crawl_posts_found_total",
            "Candidate posts extracted from the listing."
        );
        describe_counter!("crawl_posts_published_total", "Posts published to the channel.");
        describe_counter!("crawl_publish_errors_total", "Per-post publish failures.");
        describe_gauge!("crawl_last_run_ts", "Unix ts when the last run finished.");
    });
}

/// Outcome counters for one run, for logs and tests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub found: usize,
    pub selected: usize,
    pub published: usize,
    pub publish_errors: usize,
    pub persisted: bool,
}

pub async fn run_once<F, P>(
    fetchers: &F,
    publisher: &P,
    store: &Store,
    cfg: &SourceConfig,
) -> Result<RunReport>
where
    F: FetchPool + ?Sized,
    P: Publish + ?Sized,
{
    ensure_metrics_described();
    counter!("crawl_runs_total").increment(1);

    let listing_url = cfg.listing_url()?;
    info!(url = %listing_url, "looking for news");

    // A listing fetch failure makes the whole run a no-op; the caller logs it
    // and the next scheduled run retries.
    let raw = fetchers
        .client()
        .fetch(listing_url.as_str())
        .await
        .with_context(|| format!("fetching listing {listing_url}"))?;
    info!(bytes = raw.len(), "received listing page");

    let candidates = listing::extract_posts(&raw, cfg).context("extracting listing posts")?;
    if candidates.is_empty() {
        info!("no post blocks found in listing");
        return Ok(RunReport::default());
    }
    debug!(count = candidates.len(), "found news items in total");
    counter!("crawl_posts_found_total").increment(candidates.len() as u64);

    let selected = select_new(&candidates, store.watermark(), cfg.first_run_limit);
    let report_base = RunReport {
        found: candidates.len(),
        selected: selected.len(),
        ..RunReport::default()
    };
    if selected.is_empty() {
        info!("nothing new since last run");
        return Ok(report_base);
    }
    for post in &selected {
        debug!(title = %post.title, date = %post.date, link = ?post.link, "selected post");
    }

    // Enrichment is concurrent and best-effort. Each post gets its own
    // rate-limited client, so fetches interleave across posts instead of
    // queueing behind one gate. The stage completes when every post has
    // resolved.
    let batch_size = selected.len();
    let mut enriched: Vec<EnrichedPost> = stream::iter(selected)
        .map(|post| {
            let client = fetchers.client();
            async move { enrich::enrich(client.as_ref(), cfg, post).await }
        })
        .buffer_unordered(batch_size.max(1))
        .collect()
        .await;

    // Oldest first, so the channel reads chronologically.
    enriched.sort_by_key(|p| p.date);

    let mut published = 0usize;
    let mut publish_errors = 0usize;
    for post in &enriched {
        match publisher.publish(post).await {
            Ok(()) => {
                debug!(title = %post.title, "published post");
                published += 1;
            }
            Err(e) => {
                warn!(error = %e, title = %post.title, "failed to publish post");
                counter!("crawl_publish_errors_total").increment(1);
                publish_errors += 1;
            }
        }
    }
    counter!("crawl_posts_published_total").increment(published as u64);

    // The publish results stand even if persistence fails; worst case is a
    // duplicate post on the next run.
    let now = Utc::now();
    let persisted = match store.update(&enriched, now) {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "could not write store");
            false
        }
    };
    gauge!("crawl_last_run_ts").set(now.timestamp() as f64);

    Ok(RunReport {
        published,
        publish_errors,
        persisted,
        ..report_base
    })
}
