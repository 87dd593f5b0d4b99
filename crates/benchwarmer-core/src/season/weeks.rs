// Week ranking: the league's most and least impressive single weeks.

use std::cmp::Ordering;

use rayon::prelude::*;

use crate::error::AnalyticsError;
use crate::league::{LeagueContext, MatchupRow, RosterEntry};
use crate::lineup::optimizer::LineupStrategy;
use crate::lineup::pooled_candidates;
use crate::season::stats::Ratio;

/// Default length of every ranking list.
pub const DEFAULT_RANKING_SIZE: usize = 10;

/// One roster's result for one week.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekRecord {
    pub team: String,
    pub league_name: String,
    pub week: u32,
    pub season: String,
    pub roster_id: u32,
    pub actual: f64,
    pub optimal: f64,
    pub points_missed: f64,
    pub efficiency: Ratio,
}

/// The ranking lists produced for a league (or a set of leagues).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WeekRankings {
    pub worst_efficiency: Vec<WeekRecord>,
    pub worst_actual: Vec<WeekRecord>,
    pub best_actual: Vec<WeekRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingCategory {
    /// Lowest actual/optimal first. Weeks with zero optimal are skipped.
    WorstEfficiency,
    /// Lowest actual points first. Weeks with no positive score are skipped.
    WorstActual,
    /// Highest actual points first. Weeks with no positive score are skipped.
    BestActual,
}

impl RankingCategory {
    pub const ALL: [RankingCategory; 3] = [
        RankingCategory::WorstEfficiency,
        RankingCategory::WorstActual,
        RankingCategory::BestActual,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RankingCategory::WorstEfficiency => "worst efficiency weeks",
            RankingCategory::WorstActual => "worst weeks",
            RankingCategory::BestActual => "best weeks",
        }
    }

    fn qualifies(&self, record: &WeekRecord) -> bool {
        match self {
            RankingCategory::WorstEfficiency => record.optimal != 0.0,
            RankingCategory::WorstActual | RankingCategory::BestActual => record.actual > 0.0,
        }
    }

    fn compare(&self, a: &WeekRecord, b: &WeekRecord) -> Ordering {
        let ord = match self {
            RankingCategory::WorstEfficiency => a.efficiency.value().partial_cmp(&b.efficiency.value()),
            RankingCategory::WorstActual => a.actual.partial_cmp(&b.actual),
            RankingCategory::BestActual => b.actual.partial_cmp(&a.actual),
        };
        ord.unwrap_or(Ordering::Equal)
    }

    /// Keep qualifying records, sort by this category's metric (stable, so
    /// ties keep candidate order) and truncate to `limit`.
    pub fn select<'a>(
        &self,
        candidates: impl IntoIterator<Item = &'a WeekRecord>,
        limit: usize,
    ) -> Vec<WeekRecord> {
        let mut picked: Vec<WeekRecord> = candidates
            .into_iter()
            .filter(|r| self.qualifies(r))
            .cloned()
            .collect();
        picked.sort_by(|a, b| self.compare(a, b));
        picked.truncate(limit);
        picked
    }

    pub fn list<'a>(&self, rankings: &'a WeekRankings) -> &'a [WeekRecord] {
        match self {
            RankingCategory::WorstEfficiency => &rankings.worst_efficiency,
            RankingCategory::WorstActual => &rankings.worst_actual,
            RankingCategory::BestActual => &rankings.best_actual,
        }
    }
}

impl WeekRankings {
    /// Build all three lists from one pool of candidate records.
    pub fn from_records(records: &[WeekRecord], limit: usize) -> Self {
        Self {
            worst_efficiency: RankingCategory::WorstEfficiency.select(records, limit),
            worst_actual: RankingCategory::WorstActual.select(records, limit),
            best_actual: RankingCategory::BestActual.select(records, limit),
        }
    }
}

/// Record for one roster-week, or `None` when the roster has no row that week.
fn week_record(
    ctx: &LeagueContext,
    roster: &RosterEntry,
    rows: &[&MatchupRow],
    strategy: &dyn LineupStrategy,
) -> Result<Option<WeekRecord>, AnalyticsError> {
    let Some(first) = rows.first() else {
        return Ok(None);
    };

    let actual: f64 = rows.iter().map(|r| r.points).sum();
    let pool = pooled_candidates(rows, &ctx.players)?;
    let optimal = strategy.optimal_points(&pool, &ctx.template);

    Ok(Some(WeekRecord {
        team: roster.owner_id.clone(),
        league_name: ctx.meta.league_name.clone(),
        week: first.week,
        season: ctx.meta.season.clone(),
        roster_id: roster.roster_id,
        actual,
        optimal,
        points_missed: optimal - actual,
        efficiency: Ratio::of(actual, optimal),
    }))
}

/// Every (roster, completed week) record in roster-directory then week order.
pub fn week_records(
    ctx: &LeagueContext,
    strategy: &dyn LineupStrategy,
) -> Result<Vec<WeekRecord>, AnalyticsError> {
    let per_roster: Vec<Result<Vec<WeekRecord>, AnalyticsError>> = ctx
        .rosters
        .par_iter()
        .map(|roster| {
            let rows: Vec<&MatchupRow> = ctx.rows_for(roster.roster_id).collect();
            let mut records = Vec::new();
            for week in 1..=ctx.meta.total_weeks {
                let week_rows: Vec<&MatchupRow> =
                    rows.iter().copied().filter(|r| r.week == week).collect();
                if let Some(record) = week_record(ctx, roster, &week_rows, strategy)? {
                    records.push(record);
                }
            }
            Ok(records)
        })
        .collect();

    let mut all = Vec::new();
    for records in per_roster {
        all.extend(records?);
    }
    Ok(all)
}

/// The three ranking lists for one league.
pub fn rank(
    ctx: &LeagueContext,
    strategy: &dyn LineupStrategy,
    limit: usize,
) -> Result<WeekRankings, AnalyticsError> {
    let records = week_records(ctx, strategy)?;
    Ok(WeekRankings::from_records(&records, limit))
}
