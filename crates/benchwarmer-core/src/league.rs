// League data model: players, rosters, matchup rows and the per-league context.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::AnalyticsError;
use crate::lineup::template::SlotTemplate;

/// Football positions used for lineup slot eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    Quarterback,
    RunningBack,
    WideReceiver,
    TightEnd,
    Kicker,
    Defense,
    DefensiveLine,
    Linebacker,
    DefensiveBack,
    /// Any position no lineup slot can reference (OL, P, LS, unknown).
    Other,
}

impl Position {
    /// Parse a position label into a Position enum.
    ///
    /// Handles the common feed spellings:
    /// - "DEF" / "DST" / "D/ST" -> Defense
    /// - "PK" -> Kicker
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "QB" => Some(Position::Quarterback),
            "RB" => Some(Position::RunningBack),
            "WR" => Some(Position::WideReceiver),
            "TE" => Some(Position::TightEnd),
            "K" | "PK" => Some(Position::Kicker),
            "DEF" | "DST" | "D/ST" => Some(Position::Defense),
            "DL" => Some(Position::DefensiveLine),
            "LB" => Some(Position::Linebacker),
            "DB" => Some(Position::DefensiveBack),
            _ => None,
        }
    }

    /// Parse a position label from the player feed. Labels no slot can use
    /// map to `Other` rather than failing, since such players still exist.
    pub fn from_feed(s: Option<&str>) -> Self {
        s.and_then(Position::from_str_pos).unwrap_or(Position::Other)
    }

    /// Return the display string for this position.
    pub fn display_str(&self) -> &'static str {
        match self {
            Position::Quarterback => "QB",
            Position::RunningBack => "RB",
            Position::WideReceiver => "WR",
            Position::TightEnd => "TE",
            Position::Kicker => "K",
            Position::Defense => "DEF",
            Position::DefensiveLine => "DL",
            Position::Linebacker => "LB",
            Position::DefensiveBack => "DB",
            Position::Other => "OTHER",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

/// A player from the league-independent player directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub player_id: String,
    pub full_name: String,
    pub position: Position,
}

/// Lookup of player id -> player. Never mutated by the engine.
#[derive(Debug, Clone, Default)]
pub struct PlayerDirectory {
    players: HashMap<String, Player>,
}

impl PlayerDirectory {
    pub fn new(players: impl IntoIterator<Item = Player>) -> Self {
        Self {
            players: players
                .into_iter()
                .map(|p| (p.player_id.clone(), p))
                .collect(),
        }
    }

    pub fn get(&self, player_id: &str) -> Option<&Player> {
        self.players.get(player_id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// All players, sorted by id so that persisted copies are stable.
    pub fn sorted(&self) -> Vec<&Player> {
        let mut all: Vec<&Player> = self.players.values().collect();
        all.sort_by(|a, b| a.player_id.cmp(&b.player_id));
        all
    }
}

/// One team in one league-season. `owner_id` holds the manager's display
/// name once the data source has resolved it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub roster_id: u32,
    pub owner_id: String,
    pub wins: u32,
    pub losses: u32,
}

/// One roster's lineup for one week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupRow {
    pub week: u32,
    pub roster_id: u32,
    /// Groups the rows that faced each other this week. Not guaranteed to
    /// pair exactly two rosters; `None` appears for unscheduled rosters.
    pub matchup_id: Option<u32>,
    pub points: f64,
    pub player_ids: Vec<String>,
    #[serde(default)]
    pub player_points: HashMap<String, f64>,
}

impl MatchupRow {
    /// Points credited to one listed player; unscored players count 0.
    pub fn points_for_player(&self, player_id: &str) -> f64 {
        self.player_points.get(player_id).copied().unwrap_or(0.0)
    }
}

/// Descriptive data about one league-season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonMeta {
    pub league_id: String,
    pub league_name: String,
    pub season: String,
    /// Number of completed regular-season weeks.
    pub total_weeks: u32,
}

// ---------------------------------------------------------------------------
// LeagueContext
// ---------------------------------------------------------------------------

/// Everything the engine needs for one league-season, validated once at
/// load time and then passed by reference into every component.
#[derive(Debug, Clone)]
pub struct LeagueContext {
    pub meta: SeasonMeta,
    pub template: SlotTemplate,
    /// Shared by every league of a run.
    pub players: Arc<PlayerDirectory>,
    pub rosters: Vec<RosterEntry>,
    pub matchups: Vec<MatchupRow>,
}

impl LeagueContext {
    /// Build a context, rejecting structurally invalid base data.
    ///
    /// Fatal: duplicate `roster_id` in the roster directory, week numbers
    /// below 1. Rows for rosters missing from the directory are kept (they
    /// still count as opponents) but logged.
    pub fn new(
        meta: SeasonMeta,
        template: SlotTemplate,
        players: Arc<PlayerDirectory>,
        rosters: Vec<RosterEntry>,
        matchups: Vec<MatchupRow>,
    ) -> Result<Self, AnalyticsError> {
        let mut seen = HashSet::new();
        for roster in &rosters {
            if !seen.insert(roster.roster_id) {
                return Err(AnalyticsError::DuplicateRoster {
                    roster_id: roster.roster_id,
                });
            }
        }

        for row in &matchups {
            if row.week == 0 {
                return Err(AnalyticsError::InvalidWeek {
                    roster_id: row.roster_id,
                    week: row.week,
                });
            }
            if !seen.contains(&row.roster_id) {
                warn!(
                    league = %meta.league_id,
                    roster_id = row.roster_id,
                    week = row.week,
                    "matchup row references a roster missing from the roster directory"
                );
            }
        }

        Ok(Self {
            meta,
            template,
            players,
            rosters,
            matchups,
        })
    }

    /// All rows belonging to one roster, in log order.
    pub fn rows_for(&self, roster_id: u32) -> impl Iterator<Item = &MatchupRow> {
        self.matchups.iter().filter(move |m| m.roster_id == roster_id)
    }
}
