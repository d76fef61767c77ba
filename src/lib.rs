//! zk-arcade client core.
//!
//! This crate provides:
//! - Stop-flag accessor for the proof submission kill switch
//!   (`GET /proof/stop-flag`) with observable loading/error state and a
//!   manual refetch
//! - Quest-number accessor (`GET /api/games/{game_type}/{game_index}/quest-number`)
//!   behind a freshness/retention cache keyed by game type and game index
//! - In-flight request deduplication so concurrent identical quest-number
//!   lookups coalesce into a single network call
//!
//! Both accessors are independent leaf components. Transport is pluggable
//! through the source traits in [`clients`], which is also how tests inject
//! mock backends.

pub mod cache;
pub mod clients;
pub mod config;
pub mod error;
mod types;

pub use cache::QueryCache;
pub use clients::quest_number::{HttpQuestNumberSource, QuestNumberClient, QuestNumberSource};
pub use clients::stop_flag::{HttpStopFlagSource, StopFlagClient, StopFlagSource};
pub use config::ArcadeConfig;
pub use error::ClientError;
pub use types::*;
