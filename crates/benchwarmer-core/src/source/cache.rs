// On-disk cache: the player directory as CSV and league snapshots as JSON.
//
// `CachingSource` wraps a live source and records everything it fetches;
// `OfflineSource` serves the same files back without touching the network.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{LeagueSnapshot, LeagueSource, SourceError};
use crate::league::{Player, Position};

pub const PLAYERS_FILE: &str = "players.csv";

// ---------------------------------------------------------------------------
// Player directory CSV
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct PlayerRecord {
    player_id: String,
    full_name: String,
    position: String,
}

fn read_players<R: Read>(rdr: R) -> Result<Vec<Player>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut players = Vec::new();
    for result in reader.deserialize::<PlayerRecord>() {
        match result {
            Ok(record) => {
                if record.player_id.trim().is_empty() {
                    warn!("skipping cached player with empty id");
                    continue;
                }
                players.push(Player {
                    position: Position::from_feed(Some(&record.position)),
                    player_id: record.player_id,
                    full_name: record.full_name,
                });
            }
            Err(e) => {
                warn!("skipping malformed player row: {}", e);
            }
        }
    }
    Ok(players)
}

fn write_players<W: Write>(wtr: W, players: &[Player]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(wtr);
    for p in players {
        writer.serialize(PlayerRecord {
            player_id: p.player_id.clone(),
            full_name: p.full_name.clone(),
            position: p.position.display_str().to_string(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

fn io_error(path: &Path, source: std::io::Error) -> SourceError {
    SourceError::Io {
        path: path.display().to_string(),
        source,
    }
}

// ---------------------------------------------------------------------------
// SnapshotStore
// ---------------------------------------------------------------------------

/// A cache directory holding `players.csv` and one `league_{id}.json` per
/// league.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn players_path(&self) -> PathBuf {
        self.dir.join(PLAYERS_FILE)
    }

    pub fn league_path(&self, league_id: &str) -> PathBuf {
        self.dir.join(format!("league_{league_id}.json"))
    }

    fn ensure_dir(&self) -> Result<(), SourceError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| io_error(&self.dir, e))
    }

    /// Cached players, or `None` when nothing has been cached yet.
    pub fn load_players(&self) -> Result<Option<Vec<Player>>, SourceError> {
        let path = self.players_path();
        if !path.exists() {
            return Ok(None);
        }
        let file = std::fs::File::open(&path).map_err(|e| io_error(&path, e))?;
        let players = read_players(file).map_err(|e| SourceError::Csv {
            path: path.display().to_string(),
            source: e,
        })?;
        debug!(path = %path.display(), players = players.len(), "loaded cached players");
        Ok(Some(players))
    }

    pub fn store_players(&self, players: &[Player]) -> Result<(), SourceError> {
        self.ensure_dir()?;
        let path = self.players_path();
        let file = std::fs::File::create(&path).map_err(|e| io_error(&path, e))?;
        write_players(file, players).map_err(|e| SourceError::Csv {
            path: path.display().to_string(),
            source: e,
        })
    }

    pub fn load_league(&self, league_id: &str) -> Result<Option<LeagueSnapshot>, SourceError> {
        let path = self.league_path(league_id);
        if !path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&path).map_err(|e| io_error(&path, e))?;
        let snapshot = serde_json::from_str(&text).map_err(|e| SourceError::Json {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(Some(snapshot))
    }

    pub fn store_league(&self, snapshot: &LeagueSnapshot) -> Result<(), SourceError> {
        self.ensure_dir()?;
        let path = self.league_path(&snapshot.meta.league_id);
        let json = serde_json::to_string_pretty(snapshot).map_err(|e| SourceError::Json {
            path: path.display().to_string(),
            source: e,
        })?;
        std::fs::write(&path, json).map_err(|e| io_error(&path, e))?;
        debug!(path = %path.display(), "stored league snapshot");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Live source whose results are written to the store. The player directory
/// is only fetched when no cached copy exists or on `refresh_players`;
/// leagues are always refreshed.
pub struct CachingSource<S> {
    inner: S,
    store: SnapshotStore,
}

impl<S: LeagueSource> CachingSource<S> {
    pub fn new(inner: S, store: SnapshotStore) -> Self {
        Self { inner, store }
    }
}

#[async_trait]
impl<S: LeagueSource> LeagueSource for CachingSource<S> {
    async fn fetch_players(&self) -> Result<Vec<Player>, SourceError> {
        if let Some(players) = self.store.load_players()? {
            return Ok(players);
        }
        self.refresh_players().await
    }

    async fn refresh_players(&self) -> Result<Vec<Player>, SourceError> {
        let players = self.inner.fetch_players().await?;
        self.store.store_players(&players)?;
        info!(path = %self.store.players_path().display(), "cached player directory");
        Ok(players)
    }

    async fn fetch_league(&self, league_id: &str) -> Result<LeagueSnapshot, SourceError> {
        let snapshot = self.inner.fetch_league(league_id).await?;
        self.store.store_league(&snapshot)?;
        Ok(snapshot)
    }
}

/// Serves previously cached data only.
pub struct OfflineSource {
    store: SnapshotStore,
}

impl OfflineSource {
    pub fn new(store: SnapshotStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl LeagueSource for OfflineSource {
    async fn fetch_players(&self) -> Result<Vec<Player>, SourceError> {
        self.store
            .load_players()?
            .ok_or_else(|| SourceError::MissingCache {
                path: self.store.players_path().display().to_string(),
            })
    }

    async fn fetch_league(&self, league_id: &str) -> Result<LeagueSnapshot, SourceError> {
        self.store
            .load_league(league_id)?
            .ok_or_else(|| SourceError::MissingCache {
                path: self.store.league_path(league_id).display().to_string(),
            })
    }
}
