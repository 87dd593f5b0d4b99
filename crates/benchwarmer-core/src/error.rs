// Engine error type.

use thiserror::Error;

use crate::lineup::template::TemplateError;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// A lineup referenced a player the directory does not know. Never
    /// replaced by a zero-point placeholder.
    #[error("player {player_id} (roster {roster_id}, week {week}) is missing from the player directory")]
    MissingPlayer {
        player_id: String,
        roster_id: u32,
        week: u32,
    },

    #[error("roster {roster_id} appears more than once in the roster directory")]
    DuplicateRoster { roster_id: u32 },

    #[error("roster {roster_id} has a matchup row with invalid week {week}")]
    InvalidWeek { roster_id: u32, week: u32 },

    #[error("invalid slot template: {0}")]
    InvalidTemplate(#[from] TemplateError),
}
