// Season points aggregation: points for/against and their optimal counterparts.

use std::collections::{BTreeMap, HashMap};

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::error::AnalyticsError;
use crate::league::{LeagueContext, MatchupRow};
use crate::lineup::pooled_candidates;
use crate::lineup::optimizer::LineupStrategy;

/// Season point totals for one roster.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PointsTotals {
    pub points_for: f64,
    pub points_against: f64,
    pub optimal_points_for: f64,
    pub optimal_points_against: f64,
}

/// Rows that count as the opponent of `roster_id`.
///
/// Every row of the roster itself is removed, the rest are grouped by
/// `(week, matchup_id)` and only groups of exactly one row survive. In a
/// 1-vs-1 week that leaves the single true opponent; bye, median and other
/// multi-team groupings are dropped whole instead of guessed at.
pub fn opponent_rows(matchups: &[MatchupRow], roster_id: u32) -> Vec<&MatchupRow> {
    let others: Vec<&MatchupRow> = matchups
        .iter()
        .filter(|m| m.roster_id != roster_id)
        .collect();

    let mut group_sizes: HashMap<(u32, Option<u32>), usize> = HashMap::new();
    for row in &others {
        *group_sizes.entry((row.week, row.matchup_id)).or_default() += 1;
    }

    others
        .into_iter()
        .filter(|row| group_sizes.get(&(row.week, row.matchup_id)) == Some(&1))
        .collect()
}

/// Best-lineup points summed over weeks. All rows of a week are pooled
/// into one lineup, so a week split across rows is still optimized once.
fn weekly_optimal(
    ctx: &LeagueContext,
    rows: &[&MatchupRow],
    strategy: &dyn LineupStrategy,
) -> Result<f64, AnalyticsError> {
    let mut by_week: BTreeMap<u32, Vec<&MatchupRow>> = BTreeMap::new();
    for &row in rows {
        by_week.entry(row.week).or_default().push(row);
    }

    let mut total = 0.0;
    for week_rows in by_week.values() {
        let pool = pooled_candidates(week_rows, &ctx.players)?;
        total += strategy.optimal_points(&pool, &ctx.template);
    }
    Ok(total)
}

/// Totals for a single roster.
pub fn aggregate_roster(
    ctx: &LeagueContext,
    roster_id: u32,
    strategy: &dyn LineupStrategy,
) -> Result<PointsTotals, AnalyticsError> {
    let own: Vec<&MatchupRow> = ctx.rows_for(roster_id).collect();
    let opponents = opponent_rows(&ctx.matchups, roster_id);

    let totals = PointsTotals {
        points_for: own.iter().fold(0.0, |acc, r| acc + r.points),
        points_against: opponents.iter().fold(0.0, |acc, r| acc + r.points),
        optimal_points_for: weekly_optimal(ctx, &own, strategy)?,
        optimal_points_against: weekly_optimal(ctx, &opponents, strategy)?,
    };

    debug!(
        league = %ctx.meta.league_id,
        roster_id,
        points_for = totals.points_for,
        points_against = totals.points_against,
        "aggregated roster"
    );

    Ok(totals)
}

/// Totals for every roster in the directory.
///
/// Rosters are processed in parallel; results are collected in directory
/// order, so the first error reported is the first failing roster in that
/// order regardless of scheduling.
pub fn aggregate(
    ctx: &LeagueContext,
    strategy: &dyn LineupStrategy,
) -> Result<BTreeMap<u32, PointsTotals>, AnalyticsError> {
    let results: Vec<(u32, Result<PointsTotals, AnalyticsError>)> = ctx
        .rosters
        .par_iter()
        .map(|r| (r.roster_id, aggregate_roster(ctx, r.roster_id, strategy)))
        .collect();

    let mut out = BTreeMap::new();
    for (roster_id, totals) in results {
        out.insert(roster_id, totals?);
    }
    Ok(out)
}
