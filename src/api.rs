//! Uptime/metrics HTTP surface. Answers external uptime probes with a
//! humanized "active since" line and exposes the Prometheus scrape endpoint.

use axum::{routing::get, Router};
use chrono::{DateTime, Utc};
use metrics::gauge;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the global Prometheus recorder. Call exactly once, at startup,
/// before any counters fire; the returned handle renders `/metrics`.
pub fn install_metrics_recorder(run_interval_hours: u64) -> PrometheusHandle {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("prometheus: install recorder");

    gauge!("crawl_run_interval_hours").set(run_interval_hours as f64);

    handle
}

pub fn create_router(launched_at: DateTime<Utc>, metrics: PrometheusHandle) -> Router {
    Router::new()
        .route(
            "/health",
            get(move || async move {
                let uptime = Utc::now()
                    .signed_duration_since(launched_at)
                    .num_seconds()
                    .max(0) as u64;
                format!("ddo-news-herald is active since {}\n", humanize_secs(uptime))
            }),
        )
        .route(
            "/metrics",
            get(move || {
                let h = metrics.clone();
                async move { h.render() }
            }),
        )
}

/// Compact duration rendering for the uptime probe, e.g. "1d 2h 3m 4s".
pub fn humanize_secs(total: u64) -> String {
    if total == 0 {
        return "0s".to_string();
    }
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{days}d"));
    }
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}m"));
    }
    if seconds > 0 {
        parts.push(format!("{seconds}s"));
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn humanize_composes_units() {
        assert_eq!(humanize_secs(0), "0s");
        assert_eq!(humanize_secs(59), "59s");
        assert_eq!(humanize_secs(3_600), "1h");
        assert_eq!(humanize_secs(90_061), "1d 1h 1m 1s");
    }
}
