// Configuration loading and parsing (config/benchwarmer.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::lineup::optimizer::OptimizerKind;
use crate::lineup::template::{SlotSpec, SlotTemplate};
use crate::season::weeks::DEFAULT_RANKING_SIZE;

pub const CONFIG_FILE: &str = "benchwarmer.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    /// League ids analyzed when none are given on the command line.
    pub leagues: Vec<String>,
    pub analysis: AnalysisConfig,
    pub template: SlotTemplate,
    pub sleeper: SleeperConfig,
    pub paths: PathsConfig,
}

// ---------------------------------------------------------------------------
// benchwarmer.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the whole file.
#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    leagues: Vec<String>,
    #[serde(default)]
    analysis: AnalysisConfig,
    lineup: LineupSection,
    sleeper: SleeperConfig,
    paths: PathsConfig,
}

#[derive(Debug, Clone, Deserialize)]
struct LineupSection {
    slots: Vec<SlotSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_ranking_size")]
    pub ranking_size: usize,
    #[serde(default)]
    pub optimizer: OptimizerKind,
    /// Used when a league's settings omit `playoff_week_start`.
    #[serde(default = "default_playoff_week_start")]
    pub default_playoff_week_start: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            ranking_size: default_ranking_size(),
            optimizer: OptimizerKind::default(),
            default_playoff_week_start: default_playoff_week_start(),
        }
    }
}

fn default_ranking_size() -> usize {
    DEFAULT_RANKING_SIZE
}

fn default_playoff_week_start() -> u32 {
    17
}

#[derive(Debug, Clone, Deserialize)]
pub struct SleeperConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    /// Where player and league snapshots are cached. Falls back to the
    /// platform cache directory when unset.
    #[serde(default)]
    pub cache_dir: Option<String>,
    pub output_dir: String,
}

impl PathsConfig {
    /// Cache directory. A relative `cache_dir` is taken from `root`; when it
    /// is unset the platform cache directory is used, then `root/cache`.
    pub fn resolve_cache_dir(&self, root: &Path) -> PathBuf {
        if let Some(dir) = &self.cache_dir {
            return root.join(dir);
        }
        directories::ProjectDirs::from("", "", "benchwarmer")
            .map(|dirs| dirs.cache_dir().to_path_buf())
            .unwrap_or_else(|| root.join("cache"))
    }

    pub fn resolve_output_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.output_dir)
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/benchwarmer.toml` relative to `base_dir`.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    parse_config(&text, &path)
}

/// Parse and validate config text. `path` is only used in error messages.
pub fn parse_config(text: &str, path: &Path) -> Result<Config, ConfigError> {
    let file: ConfigFile = toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let template =
        SlotTemplate::from_specs(&file.lineup.slots).map_err(|e| ConfigError::ValidationError {
            field: "lineup.slots".into(),
            message: e.to_string(),
        })?;

    let config = Config {
        leagues: file.leagues,
        analysis: file.analysis,
        template,
        sleeper: file.sleeper,
        paths: file.paths,
    };

    validate(&config)?;

    Ok(config)
}

/// Copy `defaults/benchwarmer.toml` to `config/` under `base_dir` unless a
/// config file is already there. Returns the path written, if any.
pub fn ensure_config_file(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let target = base_dir.join("config").join(CONFIG_FILE);
    if target.exists() {
        return Ok(None);
    }

    let source = base_dir.join("defaults").join(CONFIG_FILE);
    if !source.is_file() {
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "neither config/{CONFIG_FILE} nor defaults/{CONFIG_FILE} found in {}; \
                 pass --root or run from the project root",
                base_dir.display()
            ),
        });
    }

    let copy_err = |e: std::io::Error| ConfigError::DefaultsCopyError {
        message: format!("failed to copy {} to {}: {e}", source.display(), target.display()),
    };
    if let Some(dir) = target.parent() {
        std::fs::create_dir_all(dir).map_err(copy_err)?;
    }
    std::fs::copy(&source, &target).map_err(copy_err)?;
    Ok(Some(target))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.analysis.ranking_size == 0 {
        return Err(ConfigError::ValidationError {
            field: "analysis.ranking_size".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.analysis.default_playoff_week_start < 2 {
        return Err(ConfigError::ValidationError {
            field: "analysis.default_playoff_week_start".into(),
            message: format!(
                "must be at least 2, got {}",
                config.analysis.default_playoff_week_start
            ),
        });
    }

    if config.sleeper.timeout_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "sleeper.timeout_secs".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.sleeper.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "sleeper.base_url".into(),
            message: "must not be empty".into(),
        });
    }

    if let Some(id) = config.leagues.iter().find(|id| id.trim().is_empty()) {
        return Err(ConfigError::ValidationError {
            field: "leagues".into(),
            message: format!("league ids must not be blank, got {id:?}"),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
