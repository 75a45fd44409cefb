//! DDO News Herald — Binary Entrypoint
//! Loads configuration and the watermark store, starts the uptime/metrics
//! endpoint, and runs the crawl pipeline on a fixed schedule.
//!
//! See `README.md` for quickstart.

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ddo_news_herald::config::{self, AppConfig};
use ddo_news_herald::fetch::{FetchPool, HttpFetchPool};
use ddo_news_herald::notify::{discord::DiscordNotifier, Publish};
use ddo_news_herald::store::Store;
use ddo_news_herald::{api, scheduler};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when the variables come from the
    // environment directly.
    let _ = dotenvy::dotenv();
    init_tracing();

    let app = AppConfig::from_env()?;
    let source = config::load_source_config()?;
    info!(
        base_url = %source.base_url,
        interval_hours = app.run_interval_hours,
        store = %app.store_path.display(),
        "starting ddo-news-herald"
    );

    // A malformed store is fatal here: better to stop than to silently reset
    // the watermark and re-post history.
    let store = Arc::new(Store::load(&app.store_path).context("loading watermark store")?);

    let metrics = api::install_metrics_recorder(app.run_interval_hours);
    let router = api::create_router(Utc::now(), metrics);
    let listener = tokio::net::TcpListener::bind(app.uptime_addr)
        .await
        .with_context(|| format!("binding uptime endpoint on {}", app.uptime_addr))?;
    info!(addr = %app.uptime_addr, "uptime endpoint listening");
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            error!(error = %e, "uptime server stopped");
        }
    });

    let fetchers: Arc<dyn FetchPool> = Arc::new(HttpFetchPool::new(source.fetch.limits()));
    let publisher: Arc<dyn Publish> = Arc::new(DiscordNotifier::new(app.webhook_url.clone()));

    let crawl = scheduler::spawn(
        fetchers,
        publisher,
        store,
        Arc::new(source),
        app.run_interval(),
    );
    crawl.await.context("crawl scheduler ended")?;
    Ok(())
}
