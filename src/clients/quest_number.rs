//! Quest-number accessor.
//!
//! Each game instance carries a quest number served at
//! `GET /api/games/{game_type}/{game_index}/quest-number`. Lookups go
//! through a per-key cache: values are served without a network call for 5
//! minutes after a successful fetch, and an entry unused for 10 minutes is
//! evicted. Concurrent lookups for the same key coalesce into a single
//! network call. An absent game index disables the query entirely.

use crate::cache::QueryCache;
use crate::config::ArcadeConfig;
use crate::error::ClientError;
use crate::types::{GameType, QuestKey};
use async_trait::async_trait;
use chrono::Duration;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration as StdDuration;
use tokio::sync::Mutex;
use tracing::debug;

/// Freshness window: cached values are served without refetching.
const DEFAULT_FRESH_SECS: i64 = 5 * 60;
/// Retention window: entries unused this long are evicted.
const DEFAULT_RETENTION_SECS: i64 = 10 * 60;

#[derive(Debug, Deserialize)]
struct QuestNumberResponse {
    quest_number: u64,
}

/// Transport seam for the quest-number endpoint.
#[async_trait]
pub trait QuestNumberSource: Send + Sync {
    async fn fetch_quest_number(
        &self,
        game_type: GameType,
        game_index: u64,
    ) -> Result<u64, ClientError>;
}

/// Production source backed by the arcade HTTP API.
pub struct HttpQuestNumberSource {
    client: Client,
    base_url: String,
}

impl HttpQuestNumberSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, StdDuration::from_secs(30))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: StdDuration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl QuestNumberSource for HttpQuestNumberSource {
    async fn fetch_quest_number(
        &self,
        game_type: GameType,
        game_index: u64,
    ) -> Result<u64, ClientError> {
        let url = format!(
            "{}/api/games/{}/{}/quest-number",
            self.base_url, game_type, game_index
        );
        debug!("Fetching quest number from {}", url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(ClientError::FetchFailed {
                status: response.status().to_string(),
            });
        }

        let body: QuestNumberResponse = response.json().await?;
        Ok(body.quest_number)
    }
}

/// Cached quest-number client.
pub struct QuestNumberClient {
    source: Arc<dyn QuestNumberSource>,
    cache: QueryCache<QuestKey, u64>,
    // Per-key locks so concurrent lookups for the same key issue at most one
    // network call; late arrivals re-check the cache after the lock.
    inflight: Mutex<HashMap<QuestKey, Arc<Mutex<()>>>>,
}

impl QuestNumberClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_source(
            Arc::new(HttpQuestNumberSource::new(base_url)),
            Duration::seconds(DEFAULT_FRESH_SECS),
            Duration::seconds(DEFAULT_RETENTION_SECS),
        )
    }

    pub fn from_config(config: &ArcadeConfig) -> Self {
        Self::with_source(
            Arc::new(HttpQuestNumberSource::with_timeout(
                config.base_url.clone(),
                StdDuration::from_secs(config.request_timeout_secs),
            )),
            Duration::seconds(config.quest_fresh_secs as i64),
            Duration::seconds(config.quest_retention_secs as i64),
        )
    }

    pub fn with_source(
        source: Arc<dyn QuestNumberSource>,
        fresh_window: Duration,
        retention_window: Duration,
    ) -> Self {
        Self {
            source,
            cache: QueryCache::new(fresh_window, retention_window),
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Look up the quest number for a game.
    ///
    /// `game_index = None` disables the query: no fetch is issued and the
    /// result is `Ok(None)`. Fetch failures propagate to the caller; no
    /// retry is attempted.
    pub async fn get_quest_number(
        &self,
        game_type: GameType,
        game_index: Option<u64>,
    ) -> Result<Option<u64>, ClientError> {
        let Some(game_index) = game_index else {
            return Ok(None);
        };
        let key = QuestKey {
            game_type,
            game_index,
        };

        if let Some(value) = self.cache.get(&key).await {
            debug!("Quest number cache hit for {} game {}", game_type, game_index);
            return Ok(Some(value));
        }

        let lock = {
            let mut inflight = self.inflight.lock().await;
            inflight
                .entry(key)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        let _guard = lock.lock().await;

        // Another caller may have completed the fetch while we waited.
        if let Some(value) = self.cache.get(&key).await {
            return Ok(Some(value));
        }

        let result = self.source.fetch_quest_number(game_type, game_index).await;

        match result {
            Ok(value) => {
                self.cache.insert(key, value).await;
                self.inflight.lock().await.remove(&key);
                Ok(Some(value))
            }
            Err(e) => {
                self.inflight.lock().await.remove(&key);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
        delay: StdDuration,
    }

    impl CountingSource {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                delay: StdDuration::ZERO,
            }
        }

        fn with_delay(delay: StdDuration) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                delay,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl QuestNumberSource for CountingSource {
        async fn fetch_quest_number(
            &self,
            _game_type: GameType,
            game_index: u64,
        ) -> Result<u64, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            Ok(game_index * 100)
        }
    }

    struct FailingSource;

    #[async_trait]
    impl QuestNumberSource for FailingSource {
        async fn fetch_quest_number(
            &self,
            _game_type: GameType,
            _game_index: u64,
        ) -> Result<u64, ClientError> {
            Err(ClientError::FetchFailed {
                status: "404 Not Found".to_string(),
            })
        }
    }

    fn client_with_windows(
        source: Arc<dyn QuestNumberSource>,
        fresh_ms: i64,
        retention_ms: i64,
    ) -> QuestNumberClient {
        QuestNumberClient::with_source(
            source,
            Duration::milliseconds(fresh_ms),
            Duration::milliseconds(retention_ms),
        )
    }

    #[tokio::test]
    async fn test_second_lookup_within_fresh_window_is_cached() {
        let source = Arc::new(CountingSource::new());
        let client = client_with_windows(source.clone(), 60_000, 120_000);

        let first = client
            .get_quest_number(GameType::Beast, Some(3))
            .await
            .unwrap();
        let second = client
            .get_quest_number(GameType::Beast, Some(3))
            .await
            .unwrap();

        assert_eq!(first, Some(300));
        assert_eq!(second, Some(300));
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_absent_game_index_issues_no_fetch() {
        let source = Arc::new(CountingSource::new());
        let client = client_with_windows(source.clone(), 60_000, 120_000);

        let result = client.get_quest_number(GameType::Parity, None).await.unwrap();

        assert_eq!(result, None);
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_different_indices_are_different_keys() {
        let source = Arc::new(CountingSource::new());
        let client = client_with_windows(source.clone(), 60_000, 120_000);

        client
            .get_quest_number(GameType::Beast, Some(1))
            .await
            .unwrap();
        client
            .get_quest_number(GameType::Beast, Some(2))
            .await
            .unwrap();
        // Back to the first index: its entry is still cached.
        client
            .get_quest_number(GameType::Beast, Some(1))
            .await
            .unwrap();

        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_game_types_do_not_share_entries() {
        let source = Arc::new(CountingSource::new());
        let client = client_with_windows(source.clone(), 60_000, 120_000);

        client
            .get_quest_number(GameType::Beast, Some(1))
            .await
            .unwrap();
        client
            .get_quest_number(GameType::Parity, Some(1))
            .await
            .unwrap();

        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_retention_expiry_forces_full_fetch() {
        let source = Arc::new(CountingSource::new());
        let client = client_with_windows(source.clone(), 20, 40);

        client
            .get_quest_number(GameType::Beast, Some(5))
            .await
            .unwrap();
        tokio::time::sleep(StdDuration::from_millis(80)).await;
        let value = client
            .get_quest_number(GameType::Beast, Some(5))
            .await
            .unwrap();

        assert_eq!(value, Some(500));
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_stale_entry_refetches() {
        let source = Arc::new(CountingSource::new());
        // Fresh for 20ms, retained for 10s.
        let client = client_with_windows(source.clone(), 20, 10_000);

        client
            .get_quest_number(GameType::Parity, Some(7))
            .await
            .unwrap();
        tokio::time::sleep(StdDuration::from_millis(50)).await;
        client
            .get_quest_number(GameType::Parity, Some(7))
            .await
            .unwrap();

        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_lookups_coalesce() {
        let source = Arc::new(CountingSource::with_delay(StdDuration::from_millis(30)));
        let client = Arc::new(client_with_windows(source.clone(), 60_000, 120_000));

        let a = tokio::spawn({
            let client = client.clone();
            async move { client.get_quest_number(GameType::Beast, Some(9)).await }
        });
        let b = tokio::spawn({
            let client = client.clone();
            async move { client.get_quest_number(GameType::Beast, Some(9)).await }
        });

        let a = a.await.unwrap().unwrap();
        let b = b.await.unwrap().unwrap();

        assert_eq!(a, Some(900));
        assert_eq!(b, Some(900));
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_failure_surfaces_status_text() {
        let client = client_with_windows(Arc::new(FailingSource), 60_000, 120_000);

        let err = client
            .get_quest_number(GameType::Beast, Some(1))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("404 Not Found"));
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        struct FlakySource {
            calls: AtomicUsize,
        }

        #[async_trait]
        impl QuestNumberSource for FlakySource {
            async fn fetch_quest_number(
                &self,
                _game_type: GameType,
                _game_index: u64,
            ) -> Result<u64, ClientError> {
                if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(ClientError::FetchFailed {
                        status: "502 Bad Gateway".to_string(),
                    })
                } else {
                    Ok(42)
                }
            }
        }

        let client = client_with_windows(
            Arc::new(FlakySource {
                calls: AtomicUsize::new(0),
            }),
            60_000,
            120_000,
        );

        assert!(client
            .get_quest_number(GameType::Parity, Some(1))
            .await
            .is_err());
        let value = client
            .get_quest_number(GameType::Parity, Some(1))
            .await
            .unwrap();
        assert_eq!(value, Some(42));
    }
}
