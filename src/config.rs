//! Configuration for the arcade client.

use anyhow::{anyhow, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct ArcadeConfig {
    /// Base URL of the zk-arcade API, no trailing slash.
    pub base_url: String,
    /// Per-request timeout for both accessors.
    pub request_timeout_secs: u64,
    /// Freshness window: cached quest numbers are served without a network
    /// call for this long after a successful fetch.
    pub quest_fresh_secs: u64,
    /// Retention window: a cache entry unused for this long is evicted.
    pub quest_retention_secs: u64,
}

impl ArcadeConfig {
    pub fn from_env() -> Result<Self> {
        let request_timeout_secs = parse_u64("ARCADE_REQUEST_TIMEOUT_SECS", 30)?;
        let quest_fresh_secs = parse_u64("ARCADE_QUEST_FRESH_SECS", 5 * 60)?;
        let quest_retention_secs = parse_u64("ARCADE_QUEST_RETENTION_SECS", 10 * 60)?;

        if request_timeout_secs == 0 {
            return Err(anyhow!("ARCADE_REQUEST_TIMEOUT_SECS must be > 0"));
        }
        if quest_retention_secs < quest_fresh_secs {
            return Err(anyhow!(
                "ARCADE_QUEST_RETENTION_SECS must be >= ARCADE_QUEST_FRESH_SECS"
            ));
        }

        let base_url = env::var("ARCADE_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:4000".to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            base_url,
            request_timeout_secs,
            quest_fresh_secs,
            quest_retention_secs,
        })
    }
}

impl Default for ArcadeConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4000".to_string(),
            request_timeout_secs: 30,
            quest_fresh_secs: 5 * 60,
            quest_retention_secs: 10 * 60,
        }
    }
}

fn parse_u64(name: &str, default: u64) -> Result<u64> {
    match env::var(name) {
        Ok(val) => val
            .parse::<u64>()
            .map_err(|_| anyhow!("{} must be a non-negative integer, got '{}'", name, val)),
        Err(_) => Ok(default),
    }
}
