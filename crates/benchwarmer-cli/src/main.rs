// Benchwarmer entry point.
//
// Startup sequence:
// 1. Parse arguments, resolve the root, initialize tracing (log to file, not terminal)
// 2. Load config, apply command-line overrides
// 3. Pick the data source (live Sleeper API with caching, or offline cache)
// 4. Fetch leagues and the player directory
// 5. Analyze each league on the blocking pool, then combine across leagues
// 6. Print tables and export CSV files

mod cli;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use benchwarmer_core::config::{self, Config};
use benchwarmer_core::export;
use benchwarmer_core::league::{LeagueContext, PlayerDirectory};
use benchwarmer_core::lineup::optimizer::OptimizerKind;
use benchwarmer_core::season::weeks::RankingCategory;
use benchwarmer_core::season::{self, LeagueReport};
use benchwarmer_core::source::cache::{CachingSource, OfflineSource, SnapshotStore};
use benchwarmer_core::source::sleeper::SleeperClient;
use benchwarmer_core::source::{LeagueSnapshot, LeagueSource};
use clap::Parser;
use tracing::{info, warn};

use cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 1. Initialize tracing
    let root = match &cli.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("failed to read current directory")?,
    };
    init_tracing(&root)?;
    info!(root = %root.display(), "benchwarmer starting up");

    // 2. Load config
    let config = load_config(&root, &cli)?;

    let league_ids = if cli.leagues.is_empty() {
        config.leagues.clone()
    } else {
        cli.leagues.clone()
    };
    if league_ids.is_empty() {
        anyhow::bail!("no leagues to analyze; pass league ids or set `leagues` in config/benchwarmer.toml");
    }
    info!(
        leagues = league_ids.len(),
        optimizer = config.analysis.optimizer.strategy().name(),
        ranking_size = config.analysis.ranking_size,
        "config loaded"
    );

    // 3. Data source
    let cache_dir = config.paths.resolve_cache_dir(&root);
    let store = SnapshotStore::new(&cache_dir);
    let source: Box<dyn LeagueSource> = if cli.offline {
        info!(cache = %cache_dir.display(), "offline mode");
        Box::new(OfflineSource::new(store))
    } else {
        let client = SleeperClient::from_config(&config).context("failed to build Sleeper client")?;
        Box::new(CachingSource::new(client, store))
    };

    // 4. Fetch
    let snapshots = fetch_leagues(source.as_ref(), &league_ids).await?;
    let players = load_players(source.as_ref(), &snapshots, cli.refresh_players).await?;
    let contexts = snapshots
        .into_iter()
        .map(|snapshot| {
            let league_id = snapshot.meta.league_id.clone();
            snapshot
                .into_context(Arc::clone(&players), config.template.clone())
                .with_context(|| format!("invalid data for league {league_id}"))
        })
        .collect::<anyhow::Result<Vec<LeagueContext>>>()?;

    // 5. Analyze
    let optimizer = config.analysis.optimizer;
    let ranking_size = config.analysis.ranking_size;
    let reports = analyze_on_blocking_pool(contexts, optimizer, ranking_size).await?;
    let (combined, rankings) = season::combine_reports(&reports, ranking_size);

    // 6. Output
    for report in &reports {
        println!("{}", export::league_table(report));
    }
    println!("{}", export::combined_table(&combined));
    for category in RankingCategory::ALL {
        println!("{}", export::weeks_table(category, category.list(&rankings)));
    }

    if !cli.no_export {
        let output_dir = config.paths.resolve_output_dir(&root);
        let written = export::export_all(&output_dir, &reports, &combined, &rankings)
            .context("failed to export reports")?;
        println!("Wrote {} files to {}", written.len(), output_dir.display());
    }

    info!("benchwarmer finished");
    Ok(())
}

fn load_config(root: &Path, cli: &Cli) -> anyhow::Result<Config> {
    if let Some(path) =
        config::ensure_config_file(root).context("failed to initialize configuration")?
    {
        info!(path = %path.display(), "copied default config");
    }
    let mut config = config::load_config_from(root).context("failed to load configuration")?;

    if let Some(optimizer) = cli.optimizer {
        config.analysis.optimizer = optimizer.into();
    }
    if let Some(size) = cli.ranking_size {
        config.analysis.ranking_size = usize::from(size);
    }
    Ok(config)
}

async fn fetch_leagues(
    source: &dyn LeagueSource,
    league_ids: &[String],
) -> anyhow::Result<Vec<LeagueSnapshot>> {
    let mut snapshots = Vec::with_capacity(league_ids.len());
    for league_id in league_ids {
        let snapshot = source
            .fetch_league(league_id)
            .await
            .with_context(|| format!("failed to load league {league_id}"))?;
        snapshots.push(snapshot);
    }
    Ok(snapshots)
}

/// The player directory, re-fetched when asked to or when a league lists a
/// player the cached copy does not know.
async fn load_players(
    source: &dyn LeagueSource,
    snapshots: &[LeagueSnapshot],
    force_refresh: bool,
) -> anyhow::Result<Arc<PlayerDirectory>> {
    let cached = if force_refresh {
        None
    } else {
        let players = source
            .fetch_players()
            .await
            .context("failed to load player directory")?;
        Some(PlayerDirectory::new(players))
    };

    let stale = cached.as_ref().and_then(|dir| {
        snapshots
            .iter()
            .find_map(|s| s.unknown_player(dir).map(|id| (s.meta.league_id.as_str(), id)))
    });

    let players = match (cached, stale) {
        (Some(dir), None) => dir,
        (_, stale) => {
            if let Some((league_id, player_id)) = stale {
                warn!(league_id, player_id, "unknown player in league, refreshing player directory");
            }
            let players = source
                .refresh_players()
                .await
                .context("failed to refresh player directory")?;
            PlayerDirectory::new(players)
        }
    };
    info!(players = players.len(), "player directory ready");
    Ok(Arc::new(players))
}

/// Rayon-backed analysis kept off the async worker threads.
async fn analyze_on_blocking_pool(
    contexts: Vec<LeagueContext>,
    optimizer: OptimizerKind,
    ranking_size: usize,
) -> anyhow::Result<Vec<LeagueReport>> {
    tokio::task::spawn_blocking(move || analyze(&contexts, optimizer, ranking_size))
        .await
        .context("analysis task failed")?
}

fn analyze(
    contexts: &[LeagueContext],
    optimizer: OptimizerKind,
    ranking_size: usize,
) -> anyhow::Result<Vec<LeagueReport>> {
    let strategy = optimizer.strategy();
    contexts
        .iter()
        .map(|ctx| {
            season::analyze_league(ctx, strategy, ranking_size)
                .with_context(|| format!("failed to analyze league {}", ctx.meta.league_id))
        })
        .collect()
}

fn init_tracing(root: &Path) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = root.join("logs");
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create {}", log_dir.display()))?;

    let log_file = std::fs::File::create(log_dir.join("benchwarmer.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("benchwarmer=info,benchwarmer_core=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
