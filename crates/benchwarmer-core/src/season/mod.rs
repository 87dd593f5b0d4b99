// Season analytics: aggregation, league tables, week rankings, cross-league combining.

pub mod aggregate;
pub mod combine;
pub mod stats;
pub mod weeks;

use tracing::info;

use crate::error::AnalyticsError;
use crate::league::LeagueContext;
use crate::lineup::optimizer::LineupStrategy;
use stats::SeasonStatRow;
use weeks::WeekRankings;

/// Everything computed for one league-season.
#[derive(Debug, Clone)]
pub struct LeagueReport {
    pub league_id: String,
    pub league_name: String,
    pub season: String,
    pub stats: Vec<SeasonStatRow>,
    pub rankings: WeekRankings,
}

/// Run the full per-league pipeline: aggregate points, build the table,
/// rank the weeks.
pub fn analyze_league(
    ctx: &LeagueContext,
    strategy: &dyn LineupStrategy,
    ranking_size: usize,
) -> Result<LeagueReport, AnalyticsError> {
    let aggregates = aggregate::aggregate(ctx, strategy)?;
    let stats = stats::build(&ctx.rosters, &aggregates);
    let rankings = weeks::rank(ctx, strategy, ranking_size)?;

    info!(
        league = %ctx.meta.league_id,
        teams = stats.len(),
        rows = ctx.matchups.len(),
        optimizer = strategy.name(),
        "league analyzed"
    );

    Ok(LeagueReport {
        league_id: ctx.meta.league_id.clone(),
        league_name: ctx.meta.league_name.clone(),
        season: ctx.meta.season.clone(),
        stats,
        rankings,
    })
}

/// Combined table and rankings for a set of league reports.
pub fn combine_reports(
    reports: &[LeagueReport],
    ranking_size: usize,
) -> (Vec<combine::CombinedStatRow>, WeekRankings) {
    let stats: Vec<Vec<SeasonStatRow>> = reports.iter().map(|r| r.stats.clone()).collect();
    let rankings: Vec<WeekRankings> = reports.iter().map(|r| r.rankings.clone()).collect();
    combine::combine(&stats, &rankings, ranking_size)
}
