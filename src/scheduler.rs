// src/scheduler.rs
use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::config::SourceConfig;
use crate::fetch::FetchPool;
use crate::notify::Publish;
use crate::pipeline;
use crate::store::Store;

/// Spawn the crawl loop: one run immediately, then one per interval.
///
/// Runs are single-flight: a tick that fires while the previous run is still
/// in progress is skipped, so concurrent runs never race on the store.
pub fn spawn(
    fetchers: Arc<dyn FetchPool>,
    publisher: Arc<dyn Publish>,
    store: Arc<Store>,
    cfg: Arc<SourceConfig>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let gate = Arc::new(tokio::sync::Mutex::new(()));
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let Ok(guard) = Arc::clone(&gate).try_lock_owned() else {
                warn!("previous run still in progress; skipping this tick");
                continue;
            };

            let fetchers = Arc::clone(&fetchers);
            let publisher = Arc::clone(&publisher);
            let store = Arc::clone(&store);
            let cfg = Arc::clone(&cfg);

            tokio::spawn(async move {
                let _guard = guard;
                match pipeline::run_once(
                    fetchers.as_ref(),
                    publisher.as_ref(),
                    store.as_ref(),
                    cfg.as_ref(),
                )
                .await
                {
                    Ok(report) => info!(
                        found = report.found,
                        selected = report.selected,
                        published = report.published,
                        publish_errors = report.publish_errors,
                        persisted = report.persisted,
                        "crawl run finished"
                    ),
                    Err(e) => {
                        counter!("crawl_run_errors_total").increment(1);
                        error!(error = %e, "crawl run failed; will retry on next tick");
                    }
                }
            });
        }
    })
}
