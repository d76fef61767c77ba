//! Shared domain types for the arcade accessors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Game variants exposed by the arcade API.
///
/// The lowercase tag is a path segment in the quest-number endpoint URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameType {
    Beast,
    Parity,
}

impl GameType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameType::Beast => "beast",
            GameType::Parity => "parity",
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observable state of the stop-flag accessor.
///
/// A freshly created accessor starts loading: `is_loading` is true until the
/// first fetch completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagState {
    pub stop: bool,
    pub is_loading: bool,
    pub error: bool,
}

impl Default for FlagState {
    fn default() -> Self {
        Self {
            stop: false,
            is_loading: true,
            error: false,
        }
    }
}

/// Cache key for quest-number lookups.
///
/// Each distinct (game type, game index) pair is its own entry; switching to
/// a different game index addresses a different key and never invalidates
/// the old one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuestKey {
    pub game_type: GameType,
    pub game_index: u64,
}
