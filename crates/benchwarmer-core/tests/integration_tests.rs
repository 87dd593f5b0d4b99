// Integration tests for the analytics engine.
//
// These drive the public API end to end: cached fixtures are served through
// the offline source, turned into league contexts, analyzed, combined across
// leagues and exported.

use std::path::PathBuf;
use std::sync::Arc;

use benchwarmer_core::error::AnalyticsError;
use benchwarmer_core::export;
use benchwarmer_core::league::{LeagueContext, PlayerDirectory};
use benchwarmer_core::lineup::optimizer::OptimizerKind;
use benchwarmer_core::lineup::template::{SlotSpec, SlotTemplate};
use benchwarmer_core::season::weeks::WeekRecord;
use benchwarmer_core::season::{self, LeagueReport};
use benchwarmer_core::source::cache::{OfflineSource, SnapshotStore};
use benchwarmer_core::source::{LeagueSnapshot, LeagueSource};

// ===========================================================================
// Test helpers
// ===========================================================================

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn slot(name: &str, positions: &[&str], count: usize) -> SlotSpec {
    SlotSpec {
        name: name.into(),
        positions: positions.iter().map(|p| p.to_string()).collect(),
        count,
    }
}

/// QB, 2 RB, 2 WR, TE, FLEX (RB/WR/TE), K.
fn template() -> SlotTemplate {
    SlotTemplate::from_specs(&[
        slot("QB", &["QB"], 1),
        slot("RB", &["RB"], 2),
        slot("WR", &["WR"], 2),
        slot("TE", &["TE"], 1),
        slot("FLEX", &["RB", "WR", "TE"], 1),
        slot("K", &["K"], 1),
    ])
    .unwrap()
}

fn source() -> OfflineSource {
    OfflineSource::new(SnapshotStore::new(fixtures()))
}

async fn players(source: &OfflineSource) -> Arc<PlayerDirectory> {
    Arc::new(PlayerDirectory::new(source.fetch_players().await.unwrap()))
}

async fn context(league_id: &str) -> LeagueContext {
    let source = source();
    let players = players(&source).await;
    source
        .fetch_league(league_id)
        .await
        .unwrap()
        .into_context(players, template())
        .unwrap()
}

/// (team, week) of each record, in list order.
fn summary(list: &[WeekRecord]) -> Vec<(String, u32)> {
    list.iter().map(|w| (w.team.clone(), w.week)).collect()
}

fn actuals(list: &[WeekRecord]) -> Vec<f64> {
    list.iter().map(|w| w.actual).collect()
}

async fn report(league_id: &str, ranking_size: usize) -> LeagueReport {
    let ctx = context(league_id).await;
    season::analyze_league(&ctx, OptimizerKind::Greedy.strategy(), ranking_size).unwrap()
}

// ===========================================================================
// Single league
// ===========================================================================

#[tokio::test]
async fn fixtures_load_through_offline_source() {
    let source = source();
    let players = players(&source).await;
    assert_eq!(players.len(), 24);
    let snapshot = source.fetch_league("100").await.unwrap();
    assert_eq!(snapshot.meta.league_name, "Bench Mob");
    assert_eq!(snapshot.meta.total_weeks, 2);
    assert_eq!(snapshot.rosters.len(), 2);
    assert_eq!(snapshot.matchups.len(), 4);
}

#[tokio::test]
async fn league_table_matches_hand_computed_totals() {
    let report = report("100", 10).await;
    assert_eq!(report.season, "2024");

    let owners: Vec<&str> = report.stats.iter().map(|r| r.owner_id.as_str()).collect();
    assert_eq!(owners, vec!["bob", "alice"]);

    let alice = &report.stats[1];
    let p = alice.totals.points;
    assert!(approx_eq(p.points_for, 142.0));
    assert!(approx_eq(p.points_against, 182.0));
    assert!(approx_eq(p.optimal_points_for, 139.0));
    assert!(approx_eq(p.optimal_points_against, 182.0));
    assert!(approx_eq(alice.derived.points_difference, -40.0));
    assert_eq!(alice.derived.win_percentage.percent(), "50.00%");
    assert_eq!(alice.derived.average_points_for.fixed(), "71.00");
    // Actual above the engine's own optimal is reported as is.
    assert!(alice.derived.efficiency_for.value() > 1.0);

    let bob = &report.stats[0];
    assert!(approx_eq(bob.totals.points.points_for, 182.0));
    assert!(approx_eq(bob.totals.points.optimal_points_against, 139.0));
    assert_eq!(bob.derived.efficiency_for.percent(), "100.00%");
}

#[tokio::test]
async fn week_rankings_order_and_tie_break() {
    let report = report("100", 10).await;
    let r = &report.rankings;

    let pair = |team: &str, week: u32| (team.to_string(), week);

    assert_eq!(
        summary(&r.worst_efficiency),
        vec![pair("alice", 2), pair("bob", 1), pair("bob", 2), pair("alice", 1)]
    );
    assert_eq!(
        summary(&r.worst_actual),
        vec![pair("alice", 2), pair("bob", 1), pair("alice", 1), pair("bob", 2)]
    );
    assert_eq!(
        summary(&r.best_actual),
        vec![pair("bob", 2), pair("alice", 1), pair("bob", 1), pair("alice", 2)]
    );

    let first_week = &r.worst_efficiency[3];
    assert!(approx_eq(first_week.actual, 102.0));
    assert!(approx_eq(first_week.optimal, 94.0));
    assert!(approx_eq(first_week.points_missed, -8.0));
    assert_eq!(first_week.efficiency.percent(), "108.51%");
    assert_eq!(first_week.league_name, "Bench Mob");
}

#[tokio::test]
async fn multi_team_groups_are_not_opponents() {
    let report = report("200", 10).await;
    let by_owner = |owner: &str| {
        report
            .stats
            .iter()
            .find(|r| r.owner_id == owner)
            .unwrap()
            .totals
            .points
    };

    // alice, carol and dave share one matchup id; erin's row has none and is
    // the only member of its group, so she is everyone else's opponent.
    for owner in ["alice", "carol", "dave"] {
        assert!(approx_eq(by_owner(owner).points_against, 48.0), "{owner}");
        assert!(approx_eq(by_owner(owner).optimal_points_against, 48.0), "{owner}");
    }
    assert!(approx_eq(by_owner("erin").points_against, 0.0));
    let erin = report.stats.iter().find(|r| r.owner_id == "erin").unwrap();
    assert!(!erin.derived.efficiency_against.is_defined());
}

#[tokio::test]
async fn exact_optimizer_agrees_when_greedy_is_optimal() {
    let ctx = context("100").await;
    let greedy = season::analyze_league(&ctx, OptimizerKind::Greedy.strategy(), 10).unwrap();
    let exact = season::analyze_league(&ctx, OptimizerKind::Exact.strategy(), 10).unwrap();
    for (g, e) in greedy.stats.iter().zip(&exact.stats) {
        assert_eq!(g.owner_id, e.owner_id);
        assert!(approx_eq(g.totals.points.optimal_points_for, e.totals.points.optimal_points_for));
    }
}

#[tokio::test]
async fn unknown_player_fails_the_league() {
    let source = source();
    let players = players(&source).await;
    let mut snapshot: LeagueSnapshot = source.fetch_league("100").await.unwrap();
    snapshot.matchups[2].player_ids.push("ghost".into());
    let ctx = snapshot.into_context(players, template()).unwrap();
    let err = season::analyze_league(&ctx, OptimizerKind::Greedy.strategy(), 10).unwrap_err();
    match err {
        AnalyticsError::MissingPlayer {
            player_id,
            roster_id,
            week,
        } => {
            assert_eq!(player_id, "ghost");
            assert_eq!(roster_id, 1);
            assert_eq!(week, 2);
        }
        other => panic!("expected MissingPlayer, got: {other}"),
    }
}

// ===========================================================================
// Across leagues
// ===========================================================================

#[tokio::test]
async fn combined_table_sums_then_derives() {
    let reports = vec![report("100", 3).await, report("200", 3).await];
    let (combined, _) = season::combine_reports(&reports, 3);

    let owners: Vec<&str> = combined.iter().map(|r| r.owner_id.as_str()).collect();
    assert_eq!(owners, vec!["erin", "bob", "carol", "dave", "alice"]);

    let alice = combined.iter().find(|r| r.owner_id == "alice").unwrap();
    assert_eq!(alice.leagues, 2);
    assert_eq!((alice.totals.wins, alice.totals.losses), (2, 1));
    assert!(approx_eq(alice.totals.points.points_for, 177.0));
    assert!(approx_eq(alice.totals.points.points_against, 230.0));
    assert!(approx_eq(alice.derived.points_difference, -53.0));
    assert!(approx_eq(alice.derived.efficiency_for.value(), 177.0 / 174.0));
    assert!(approx_eq(alice.derived.win_percentage.value(), 2.0 / 3.0));
}

#[tokio::test]
async fn combined_rankings_are_top_n_of_top_ns() {
    let reports = vec![report("100", 3).await, report("200", 3).await];
    let (_, rankings) = season::combine_reports(&reports, 3);

    assert_eq!(actuals(&rankings.best_actual), vec![120.0, 102.0, 62.0]);
    assert_eq!(actuals(&rankings.worst_actual), vec![12.0, 30.0, 35.0]);
    assert_eq!(rankings.worst_efficiency.len(), 3);
    assert_eq!(rankings.worst_efficiency[0].team, "alice");
    assert_eq!(rankings.worst_efficiency[0].week, 2);
    // Ties at 100% keep league order, then each league's own order.
    assert_eq!(rankings.worst_efficiency[1].league_name, "Bench Mob");
    assert_eq!(rankings.worst_efficiency[2].league_name, "Bench Mob");
    assert_eq!(rankings.worst_actual[0].league_name, "Median Madness");
    assert_eq!(rankings.worst_actual[0].season, "2023");
}

#[tokio::test]
async fn export_writes_readable_csv() {
    let reports = vec![report("100", 10).await, report("200", 10).await];
    let (combined, rankings) = season::combine_reports(&reports, 10);

    let dir = std::env::temp_dir().join("benchwarmer_integration_export");
    let _ = std::fs::remove_dir_all(&dir);
    let written = export::export_all(&dir, &reports, &combined, &rankings).unwrap();
    assert_eq!(written.len(), 6);

    let league = std::fs::read_to_string(dir.join("statistics_100.csv")).unwrap();
    let mut lines = league.lines();
    assert!(!lines.next().unwrap().contains("roster_id"));
    assert!(lines.next().unwrap().starts_with("bob,1,1,50.00%,182.0,142.0,91.00,71.00,40.0,"));

    let best = std::fs::read_to_string(dir.join("best_weeks.csv")).unwrap();
    assert_eq!(best.lines().count(), 1 + 8);
    assert!(best.lines().nth(1).unwrap().starts_with("bob,Bench Mob,2024,2,120.0,120.0,0.0,100.00%"));

    let _ = std::fs::remove_dir_all(&dir);
}
