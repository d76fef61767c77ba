//! Stop-flag accessor.
//!
//! The arcade exposes a kill switch for proof submission at
//! `GET /proof/stop-flag`. This client fetches it once on demand, keeps an
//! observable snapshot of `{ stop, is_loading, error }`, and supports a
//! manual refetch that always hits the network (there is no caching layer
//! here).

use crate::config::ArcadeConfig;
use crate::error::ClientError;
use crate::types::FlagState;
use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct StopFlagResponse {
    stop: bool,
}

/// Transport seam for the stop-flag endpoint.
#[async_trait]
pub trait StopFlagSource: Send + Sync {
    async fn fetch_stop_flag(&self) -> Result<bool, ClientError>;
}

/// Production source: `GET {base_url}/proof/stop-flag` with
/// `Accept: application/json` over a cookie-bearing client, so session
/// credentials ride along with the request.
pub struct HttpStopFlagSource {
    client: Client,
    base_url: String,
}

impl HttpStopFlagSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl StopFlagSource for HttpStopFlagSource {
    async fn fetch_stop_flag(&self) -> Result<bool, ClientError> {
        let url = format!("{}/proof/stop-flag", self.base_url);
        debug!("Fetching stop flag from {}", url);

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::FetchFailed {
                status: response.status().to_string(),
            });
        }

        let body: StopFlagResponse = response.json().await?;
        Ok(body.stop)
    }
}

/// Stop-flag client with observable state.
///
/// Failures never escape a fetch: they set `error = true` and leave `stop`
/// at its previous value. `is_loading` is cleared when the owning fetch
/// completes, whatever the outcome.
pub struct StopFlagClient {
    source: Arc<dyn StopFlagSource>,
    state: RwLock<FlagState>,
    // Bumped on every fetch; a completion only writes state while its
    // generation is still current, so a late result from a superseded fetch
    // cannot overwrite a newer one.
    generation: AtomicU64,
}

impl StopFlagClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_source(Arc::new(HttpStopFlagSource::new(base_url)))
    }

    pub fn from_config(config: &ArcadeConfig) -> Self {
        Self::with_source(Arc::new(HttpStopFlagSource::with_timeout(
            config.base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )))
    }

    pub fn with_source(source: Arc<dyn StopFlagSource>) -> Self {
        Self {
            source,
            state: RwLock::new(FlagState::default()),
            generation: AtomicU64::new(0),
        }
    }

    /// Create a client and issue the initial fetch immediately, mirroring an
    /// accessor that activates on mount. Afterwards the flag only changes
    /// through an explicit [`refetch`](Self::refetch).
    pub async fn activate(source: Arc<dyn StopFlagSource>) -> Self {
        let client = Self::with_source(source);
        client.fetch().await;
        client
    }

    /// Snapshot of the current observable state.
    pub fn state(&self) -> FlagState {
        self.state.read().clone()
    }

    /// Issue a fetch and return the state snapshot after it completes.
    ///
    /// On success `stop` takes the fetched value and `error` clears. On
    /// failure `error` is set and `stop` keeps its previous value.
    pub async fn fetch(&self) -> FlagState {
        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.write().is_loading = true;

        let result = self.source.fetch_stop_flag().await;

        {
            let mut state = self.state.write();
            if self.generation.load(Ordering::SeqCst) == token {
                match result {
                    Ok(stop) => {
                        state.stop = stop;
                        state.error = false;
                    }
                    Err(e) => {
                        warn!("Stop flag fetch failed: {}", e);
                        state.error = true;
                    }
                }
                state.is_loading = false;
            }
        }

        self.state()
    }

    /// Re-issue a fetch unconditionally.
    pub async fn refetch(&self) -> FlagState {
        self.fetch().await
    }
}
