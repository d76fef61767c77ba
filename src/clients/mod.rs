pub mod quest_number;
pub mod stop_flag;

// Re-export commonly used types
pub use quest_number::{HttpQuestNumberSource, QuestNumberClient, QuestNumberSource};
pub use stop_flag::{HttpStopFlagSource, StopFlagClient, StopFlagSource};
