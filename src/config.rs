// src/config.rs
//! Runtime configuration: process-level settings from the environment,
//! site-level scraping parameters from TOML (with built-in defaults).

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::fetch::FetchLimits;

pub const ENV_SOURCE_CONFIG: &str = "NEWS_SOURCE_CONFIG";
const DEFAULT_SOURCE_CONFIG_PATH: &str = "config/news_source.toml";

/// Process-level settings, loaded once at startup from the environment
/// (`.env` supported via dotenvy in `main`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub webhook_url: String,
    pub run_interval_hours: u64,
    pub store_path: PathBuf,
    pub uptime_addr: SocketAddr,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let webhook_url = std::env::var("DISCORD_WEBHOOK_URL")
            .context("DISCORD_WEBHOOK_URL must be set (see README)")?;

        // Unparsable interval falls back to hourly rather than failing startup.
        let run_interval_hours = std::env::var("RUN_INTERVAL_HOURS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(1)
            .max(1);

        let store_path = std::env::var("STORE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".data/store.json"));

        let uptime_addr = std::env::var("UPTIME_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse::<SocketAddr>()
            .context("UPTIME_ADDR is not a valid socket address")?;

        Ok(Self {
            webhook_url,
            run_interval_hours,
            store_path,
            uptime_addr,
        })
    }

    pub fn run_interval(&self) -> Duration {
        Duration::from_secs(self.run_interval_hours * 3600)
    }
}

/// Site-level scraping parameters: where the listing lives and which CSS
/// selectors pick posts apart. Defaults target the DDO news hub.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub base_url: String,
    pub listing_path: String,
    /// One listing block per post, assumed newest-first in page order.
    pub post_selector: String,
    pub title_selector: String,
    pub time_selector: String,
    /// Attribute on the time element carrying the machine-readable date.
    pub date_attr: String,
    /// Content container on the article page.
    pub article_selector: String,
    /// How many posts to bootstrap with when no watermark exists yet.
    pub first_run_limit: usize,
    pub desc_max_chars: usize,
    pub fetch: FetchCfg,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.ddo.com".to_string(),
            listing_path: "/en/news".to_string(),
            post_selector: ".article-item".to_string(),
            title_selector: "h5".to_string(),
            time_selector: "time".to_string(),
            date_attr: "title".to_string(),
            article_selector: ".news.content".to_string(),
            first_run_limit: 2,
            desc_max_chars: 500,
            fetch: FetchCfg::default(),
        }
    }
}

impl SourceConfig {
    pub fn listing_url(&self) -> Result<url::Url> {
        let base = url::Url::parse(&self.base_url)
            .with_context(|| format!("invalid base_url `{}`", self.base_url))?;
        base.join(&self.listing_path)
            .with_context(|| format!("invalid listing_path `{}`", self.listing_path))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchCfg {
    pub max_concurrency: usize,
    pub min_interval_secs: u64,
}

impl Default for FetchCfg {
    fn default() -> Self {
        Self {
            max_concurrency: 3,
            min_interval_secs: 30,
        }
    }
}

impl FetchCfg {
    pub fn limits(&self) -> FetchLimits {
        FetchLimits {
            max_concurrency: self.max_concurrency.max(1),
            min_interval: Duration::from_secs(self.min_interval_secs),
        }
    }
}

/// Load source config from an explicit TOML path.
pub fn load_source_config_from(path: &Path) -> Result<SourceConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading source config from {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("parsing source config from {}", path.display()))
}

/// Load source config using env var + fallbacks:
/// 1) $NEWS_SOURCE_CONFIG (must exist when set)
/// 2) config/news_source.toml
/// 3) built-in defaults
pub fn load_source_config() -> Result<SourceConfig> {
    if let Ok(p) = std::env::var(ENV_SOURCE_CONFIG) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_source_config_from(&pb);
        }
        return Err(anyhow!("NEWS_SOURCE_CONFIG points to non-existent path"));
    }
    let toml_p = PathBuf::from(DEFAULT_SOURCE_CONFIG_PATH);
    if toml_p.exists() {
        return load_source_config_from(&toml_p);
    }
    Ok(SourceConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, fs};

    #[test]
    fn defaults_point_at_ddo_news_hub() {
        let cfg = SourceConfig::default();
        assert_eq!(cfg.listing_url().unwrap().as_str(), "https://www.ddo.com/en/news");
        assert_eq!(cfg.first_run_limit, 2);
        assert_eq!(cfg.desc_max_chars, 500);
        assert_eq!(cfg.fetch.max_concurrency, 3);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let cfg: SourceConfig =
            toml::from_str(r#"base_url = "https://example.org""#).unwrap();
        assert_eq!(cfg.base_url, "https://example.org");
        assert_eq!(cfg.post_selector, ".article-item");
        assert_eq!(cfg.fetch.min_interval_secs, 30);
    }

    #[serial_test::serial]
    #[test]
    fn env_path_must_exist_when_set() {
        env::set_var(ENV_SOURCE_CONFIG, "/definitely/not/here.toml");
        assert!(load_source_config().is_err());
        env::remove_var(ENV_SOURCE_CONFIG);
    }

    #[serial_test::serial]
    #[test]
    fn env_path_takes_precedence() {
        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("source.toml");
        fs::write(&p, r#"listing_path = "/en/other-news""#).unwrap();
        env::set_var(ENV_SOURCE_CONFIG, p.display().to_string());
        let cfg = load_source_config().unwrap();
        assert_eq!(cfg.listing_path, "/en/other-news");
        env::remove_var(ENV_SOURCE_CONFIG);
    }
}
