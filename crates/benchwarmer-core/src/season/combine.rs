// Cross-league combining of season tables and week rankings.

use std::collections::HashMap;

use crate::season::stats::{by_difference_desc, DerivedStats, SeasonStatRow, SeasonTotals};
use crate::season::weeks::{RankingCategory, WeekRankings};

/// One owner's totals summed over every league they appear in.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedStatRow {
    pub owner_id: String,
    /// Number of league-seasons folded into this row.
    pub leagues: usize,
    pub totals: SeasonTotals,
    pub derived: DerivedStats,
}

/// Group rows by owner, sum the additive fields and derive the ratios from
/// the sums. Ratios from individual leagues are never averaged.
///
/// Owners appear in first-seen order before the final sort by points
/// difference (descending, stable).
pub fn combine_stats(per_league: &[Vec<SeasonStatRow>]) -> Vec<CombinedStatRow> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut combined: Vec<CombinedStatRow> = Vec::new();

    for row in per_league.iter().flatten() {
        match index.get(row.owner_id.as_str()) {
            Some(&i) => {
                let entry = &mut combined[i];
                entry.totals.add(&row.totals);
                entry.leagues += 1;
            }
            None => {
                index.insert(row.owner_id.as_str(), combined.len());
                combined.push(CombinedStatRow {
                    owner_id: row.owner_id.clone(),
                    leagues: 1,
                    totals: row.totals,
                    derived: row.derived,
                });
            }
        }
    }

    for row in &mut combined {
        row.derived = row.totals.derive();
    }

    combined.sort_by(|a, b| {
        by_difference_desc(a.derived.points_difference, b.derived.points_difference)
    });
    combined
}

/// Concatenate each league's lists (in league order), re-sort by the
/// category metric and keep the top `limit`: a top-N of top-Ns.
pub fn combine_rankings(per_league: &[WeekRankings], limit: usize) -> WeekRankings {
    let merged = |category: RankingCategory| {
        category.select(
            per_league.iter().flat_map(|r| category.list(r).iter()),
            limit,
        )
    };
    WeekRankings {
        worst_efficiency: merged(RankingCategory::WorstEfficiency),
        worst_actual: merged(RankingCategory::WorstActual),
        best_actual: merged(RankingCategory::BestActual),
    }
}

/// Fold N leagues into one combined table and one set of rankings.
pub fn combine(
    per_league_stats: &[Vec<SeasonStatRow>],
    per_league_rankings: &[WeekRankings],
    limit: usize,
) -> (Vec<CombinedStatRow>, WeekRankings) {
    (
        combine_stats(per_league_stats),
        combine_rankings(per_league_rankings, limit),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league::RosterEntry;
    use crate::season::aggregate::PointsTotals;
    use crate::season::stats::Ratio;
    use crate::season::weeks::WeekRecord;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn stat(owner: &str, roster_id: u32, wins: u32, losses: u32, pf: f64, pa: f64, opf: f64) -> SeasonStatRow {
        SeasonStatRow::new(
            &RosterEntry {
                roster_id,
                owner_id: owner.into(),
                wins,
                losses,
            },
            PointsTotals {
                points_for: pf,
                points_against: pa,
                optimal_points_for: opf,
                optimal_points_against: pa * 1.1,
            },
        )
    }

    fn eff_record(league: &str, week: u32, efficiency: f64) -> WeekRecord {
        WeekRecord {
            team: "t".into(),
            league_name: league.into(),
            week,
            season: "2024".into(),
            roster_id: 1,
            actual: efficiency * 100.0,
            optimal: 100.0,
            points_missed: 100.0 - efficiency * 100.0,
            efficiency: Ratio::Defined(efficiency),
        }
    }

    #[test]
    fn single_league_is_identity() {
        let stats = vec![
            stat("amy", 1, 8, 6, 1500.0, 1400.0, 1700.0),
            stat("bo", 2, 6, 8, 1300.0, 1450.0, 1600.0),
        ];
        let combined = combine_stats(&[stats.clone()]);
        assert_eq!(combined.len(), stats.len());
        for (c, s) in combined.iter().zip(&stats) {
            assert_eq!(c.owner_id, s.owner_id);
            assert_eq!(c.leagues, 1);
            assert_eq!(c.totals, s.totals);
            assert!(approx_eq(c.derived.win_percentage.value(), s.derived.win_percentage.value()));
            assert!(approx_eq(c.derived.efficiency_for.value(), s.derived.efficiency_for.value()));
            assert!(approx_eq(c.derived.points_difference, s.derived.points_difference));
        }
    }

    #[test]
    fn owners_merge_across_leagues_and_ratios_are_rederived() {
        let league_a = vec![stat("amy", 1, 10, 0, 1000.0, 800.0, 1000.0)];
        let league_b = vec![
            stat("amy", 4, 0, 2, 100.0, 300.0, 400.0),
            stat("cal", 1, 2, 0, 300.0, 100.0, 300.0),
        ];
        let combined = combine_stats(&[league_a, league_b]);
        assert_eq!(combined.len(), 2);
        let amy = combined.iter().find(|r| r.owner_id == "amy").unwrap();
        assert_eq!(amy.leagues, 2);
        assert_eq!(amy.totals.wins, 10);
        assert_eq!(amy.totals.losses, 2);
        // 10/12, not the mean of 100% and 0%.
        assert!(approx_eq(amy.derived.win_percentage.value(), 10.0 / 12.0));
        assert!(approx_eq(amy.derived.efficiency_for.value(), 1100.0 / 1400.0));
        assert!(approx_eq(amy.derived.points_difference, 0.0));
        // cal +200 sorts ahead of amy +0.
        assert_eq!(combined[0].owner_id, "cal");
    }

    #[test]
    fn top_of_tops_keeps_exactly_limit() {
        let per_league: Vec<WeekRankings> = (0..3)
            .map(|league| {
                let records: Vec<WeekRecord> = (1..=10)
                    .map(|w| eff_record(&format!("L{league}"), w, 0.5 + f64::from(w) * 0.03 + f64::from(league) * 0.01))
                    .collect();
                WeekRankings::from_records(&records, 10)
            })
            .collect();
        let combined = combine_rankings(&per_league, 10);
        assert_eq!(combined.worst_efficiency.len(), 10);
        for pair in combined.worst_efficiency.windows(2) {
            assert!(pair[0].efficiency.value() <= pair[1].efficiency.value());
        }
        let candidates: Vec<&WeekRecord> = per_league.iter().flat_map(|r| r.worst_efficiency.iter()).collect();
        for picked in &combined.worst_efficiency {
            assert!(candidates.iter().any(|c| *c == picked));
        }
    }

    #[test]
    fn combine_returns_both_halves() {
        let stats = vec![vec![stat("amy", 1, 1, 0, 10.0, 5.0, 12.0)]];
        let rankings = vec![WeekRankings::from_records(&[eff_record("L", 1, 0.9)], 10)];
        let (table, ranks) = combine(&stats, &rankings, 10);
        assert_eq!(table.len(), 1);
        assert_eq!(ranks.worst_efficiency.len(), 1);
        assert_eq!(ranks.best_actual.len(), 1);
    }
}
