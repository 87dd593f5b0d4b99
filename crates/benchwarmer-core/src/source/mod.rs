// League data sources: the Sleeper HTTP API and the on-disk snapshot cache.

pub mod cache;
pub mod sleeper;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AnalyticsError;
use crate::league::{LeagueContext, MatchupRow, Player, PlayerDirectory, RosterEntry, SeasonMeta};
use crate::lineup::template::SlotTemplate;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },

    #[error("failed to access {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("no cached data at {path}; run once without --offline")]
    MissingCache { path: String },

    #[error("league {league_id} not found")]
    MissingLeague { league_id: String },

    #[error("fetch task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

// ---------------------------------------------------------------------------
// LeagueSnapshot
// ---------------------------------------------------------------------------

/// The league-specific base data of one league-season, with owners already
/// resolved. This is the unit that gets cached to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueSnapshot {
    pub meta: SeasonMeta,
    pub rosters: Vec<RosterEntry>,
    pub matchups: Vec<MatchupRow>,
}

impl LeagueSnapshot {
    /// Attach the shared player directory and lineup template, validating the
    /// result.
    pub fn into_context(
        self,
        players: Arc<PlayerDirectory>,
        template: SlotTemplate,
    ) -> Result<LeagueContext, AnalyticsError> {
        LeagueContext::new(self.meta, template, players, self.rosters, self.matchups)
    }

    /// First listed player id the directory does not know, if any.
    pub fn unknown_player<'a>(&'a self, players: &PlayerDirectory) -> Option<&'a str> {
        self.matchups
            .iter()
            .flat_map(|m| m.player_ids.iter())
            .find(|id| players.get(id).is_none())
            .map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// LeagueSource
// ---------------------------------------------------------------------------

/// Anything that can produce the player directory and league snapshots.
#[async_trait]
pub trait LeagueSource: Send + Sync {
    async fn fetch_players(&self) -> Result<Vec<Player>, SourceError>;

    /// Fetch the player directory bypassing any cached copy. Sources without
    /// a cache have nothing to bypass.
    async fn refresh_players(&self) -> Result<Vec<Player>, SourceError> {
        self.fetch_players().await
    }

    async fn fetch_league(&self, league_id: &str) -> Result<LeagueSnapshot, SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lineup::template::standard_template;

    #[test]
    fn snapshot_into_context_validates() {
        let snapshot = LeagueSnapshot {
            meta: SeasonMeta {
                league_id: "1".into(),
                league_name: "L".into(),
                season: "2024".into(),
                total_weeks: 1,
            },
            rosters: vec![
                RosterEntry {
                    roster_id: 1,
                    owner_id: "a".into(),
                    wins: 0,
                    losses: 0,
                },
                RosterEntry {
                    roster_id: 1,
                    owner_id: "b".into(),
                    wins: 0,
                    losses: 0,
                },
            ],
            matchups: vec![],
        };
        let err = snapshot
            .into_context(Arc::new(PlayerDirectory::default()), standard_template())
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::DuplicateRoster { roster_id: 1 }));
    }

    #[test]
    fn unknown_player_finds_first_missing_id() {
        let mut snapshot = LeagueSnapshot {
            meta: SeasonMeta {
                league_id: "1".into(),
                league_name: "L".into(),
                season: "2024".into(),
                total_weeks: 1,
            },
            rosters: vec![],
            matchups: vec![MatchupRow {
                week: 1,
                roster_id: 1,
                matchup_id: Some(1),
                points: 0.0,
                player_ids: vec!["known".into(), "rookie".into(), "other".into()],
                player_points: Default::default(),
            }],
        };
        let players = PlayerDirectory::new(vec![Player {
            player_id: "known".into(),
            full_name: "Known Player".into(),
            position: crate::league::Position::Kicker,
        }]);
        assert_eq!(snapshot.unknown_player(&players), Some("rookie"));

        snapshot.matchups[0].player_ids.truncate(1);
        assert_eq!(snapshot.unknown_player(&players), None);
    }
}
