// Sleeper HTTP client.
//
// Fetches the player directory, league settings, rosters, owner display names
// and the weekly matchup log, and converts Sleeper's JSON into the league data
// model. Week logs are fetched concurrently on the tokio runtime.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::{LeagueSnapshot, LeagueSource, SourceError};
use crate::config::Config;
use crate::league::{MatchupRow, Player, Position, RosterEntry, SeasonMeta};

const UNKNOWN: &str = "Unknown";

// ---------------------------------------------------------------------------
// Raw Sleeper serde structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPlayer {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLeague {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub settings: Option<RawLeagueSettings>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLeagueSettings {
    #[serde(default)]
    pub playoff_week_start: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRoster {
    pub roster_id: u32,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub settings: Option<RawRosterSettings>,
    #[serde(default)]
    pub metadata: Option<RawRosterMetadata>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRosterSettings {
    #[serde(default)]
    pub wins: Option<u32>,
    #[serde(default)]
    pub losses: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRosterMetadata {
    /// Game-by-game result string such as "WWLW".
    #[serde(default)]
    pub record: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawUser {
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawMatchup {
    pub roster_id: u32,
    #[serde(default)]
    pub matchup_id: Option<u32>,
    #[serde(default)]
    pub points: Option<f64>,
    #[serde(default)]
    pub players: Option<Vec<String>>,
    #[serde(default)]
    pub players_points: Option<HashMap<String, f64>>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// Player name: `full_name`, then "first last", then the id itself.
pub fn player_from_raw(player_id: &str, raw: &RawPlayer) -> Player {
    let full_name = raw
        .full_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .or_else(|| {
            let joined = format!(
                "{} {}",
                raw.first_name.as_deref().unwrap_or_default(),
                raw.last_name.as_deref().unwrap_or_default()
            );
            let joined = joined.trim();
            (!joined.is_empty()).then(|| joined.to_string())
        })
        .unwrap_or_else(|| player_id.to_string());

    Player {
        player_id: player_id.to_string(),
        full_name,
        position: Position::from_feed(raw.position.as_deref()),
    }
}

/// Wins and losses. The metadata record string is authoritative when
/// present; otherwise the roster settings counters are used.
pub fn wins_losses(raw: &RawRoster) -> (u32, u32) {
    if let Some(record) = raw
        .metadata
        .as_ref()
        .and_then(|m| m.record.as_deref())
        .filter(|r| !r.is_empty())
    {
        let count = |c: char| record.chars().filter(|&x| x == c).count() as u32;
        return (count('W'), count('L'));
    }
    let settings = raw.settings.clone().unwrap_or_default();
    (settings.wins.unwrap_or(0), settings.losses.unwrap_or(0))
}

/// Season metadata. The completed regular season ends the week before the
/// playoffs start.
pub fn season_meta(league_id: &str, raw: &RawLeague, default_playoff_week_start: u32) -> SeasonMeta {
    let playoff_week_start = raw
        .settings
        .as_ref()
        .and_then(|s| s.playoff_week_start)
        .filter(|&w| w > 0)
        .unwrap_or(default_playoff_week_start);

    SeasonMeta {
        league_id: league_id.to_string(),
        league_name: raw.name.clone().unwrap_or_else(|| UNKNOWN.to_string()),
        season: raw.season.clone().unwrap_or_else(|| UNKNOWN.to_string()),
        total_weeks: playoff_week_start.saturating_sub(1),
    }
}

pub fn matchup_rows(week: u32, raw: Vec<RawMatchup>) -> Vec<MatchupRow> {
    raw.into_iter()
        .map(|m| MatchupRow {
            week,
            roster_id: m.roster_id,
            matchup_id: m.matchup_id,
            points: m.points.unwrap_or(0.0),
            player_ids: m.players.unwrap_or_default(),
            player_points: m.players_points.unwrap_or_default(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// SleeperClient
// ---------------------------------------------------------------------------

pub struct SleeperClient {
    http: reqwest::Client,
    base_url: String,
    default_playoff_week_start: u32,
}

impl SleeperClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        default_playoff_week_start: u32,
    ) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Http {
                url: base_url.to_string(),
                source: e,
            })?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            default_playoff_week_start,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        Self::new(
            &config.sleeper.base_url,
            Duration::from_secs(config.sleeper.timeout_secs),
            config.analysis.default_playoff_week_start,
        )
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, SourceError> {
        get_json(&self.http, self.url(path)).await
    }

    /// Display name for an owner id, falling back to the id itself.
    async fn display_name(&self, owner_id: &str) -> String {
        match self.get::<Option<RawUser>>(&format!("user/{owner_id}")).await {
            Ok(Some(RawUser {
                display_name: Some(name),
            })) if !name.trim().is_empty() => name,
            Ok(_) => {
                warn!(owner_id, "user has no display name; using owner id");
                owner_id.to_string()
            }
            Err(e) => {
                warn!(owner_id, error = %e, "failed to resolve owner; using owner id");
                owner_id.to_string()
            }
        }
    }

    async fn rosters(&self, league_id: &str) -> Result<Vec<RosterEntry>, SourceError> {
        let raw: Vec<RawRoster> = self.get(&format!("league/{league_id}/rosters")).await?;
        let mut rosters = Vec::with_capacity(raw.len());
        for r in &raw {
            let owner = match r.owner_id.as_deref() {
                Some(id) => self.display_name(id).await,
                None => {
                    warn!(league_id, roster_id = r.roster_id, "roster has no owner");
                    format!("roster {}", r.roster_id)
                }
            };
            let (wins, losses) = wins_losses(r);
            rosters.push(RosterEntry {
                roster_id: r.roster_id,
                owner_id: owner,
                wins,
                losses,
            });
        }
        Ok(rosters)
    }

    async fn matchups(&self, league_id: &str, total_weeks: u32) -> Result<Vec<MatchupRow>, SourceError> {
        let mut tasks = JoinSet::new();
        for week in 1..=total_weeks {
            let http = self.http.clone();
            let url = self.url(&format!("league/{league_id}/matchups/{week}"));
            tasks.spawn(async move {
                let raw: Option<Vec<RawMatchup>> = get_json(&http, url).await?;
                Ok::<_, SourceError>((week, raw.unwrap_or_default()))
            });
        }

        let mut weeks = Vec::with_capacity(total_weeks as usize);
        while let Some(joined) = tasks.join_next().await {
            weeks.push(joined??);
        }
        weeks.sort_by_key(|(week, _)| *week);

        Ok(weeks
            .into_iter()
            .flat_map(|(week, raw)| matchup_rows(week, raw))
            .collect())
    }
}

async fn get_json<T: DeserializeOwned>(http: &reqwest::Client, url: String) -> Result<T, SourceError> {
    debug!(%url, "GET");
    let response = http
        .get(&url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| SourceError::Http {
            url: url.clone(),
            source: e,
        })?;
    response
        .json::<T>()
        .await
        .map_err(|e| SourceError::Http { url, source: e })
}

#[async_trait]
impl LeagueSource for SleeperClient {
    async fn fetch_players(&self) -> Result<Vec<Player>, SourceError> {
        let raw: HashMap<String, RawPlayer> = self.get("players/nfl").await?;
        let mut players: Vec<Player> = raw
            .iter()
            .map(|(id, p)| player_from_raw(id, p))
            .collect();
        players.sort_by(|a, b| a.player_id.cmp(&b.player_id));
        info!(players = players.len(), "fetched player directory");
        Ok(players)
    }

    async fn fetch_league(&self, league_id: &str) -> Result<LeagueSnapshot, SourceError> {
        let raw: Option<RawLeague> = self.get(&format!("league/{league_id}")).await?;
        let raw = raw.ok_or_else(|| SourceError::MissingLeague {
            league_id: league_id.to_string(),
        })?;
        let meta = season_meta(league_id, &raw, self.default_playoff_week_start);

        let rosters = self.rosters(league_id).await?;
        let matchups = self.matchups(league_id, meta.total_weeks).await?;

        info!(
            league_id,
            name = %meta.league_name,
            weeks = meta.total_weeks,
            rosters = rosters.len(),
            rows = matchups.len(),
            "fetched league"
        );

        Ok(LeagueSnapshot {
            meta,
            rosters,
            matchups,
        })
    }
}
