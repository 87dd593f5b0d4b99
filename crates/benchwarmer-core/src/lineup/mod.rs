// Lineup construction: slot templates, candidate pools and optimizers.

pub mod optimizer;
pub mod template;

use crate::error::AnalyticsError;
use crate::league::{MatchupRow, PlayerDirectory};
use optimizer::LineupCandidate;

/// Resolve every listed player of a matchup row into an optimizer
/// candidate, preserving the row's player order.
///
/// A player id absent from the directory is an error; it is never scored
/// as a zero-point placeholder.
pub fn candidates<'a>(
    row: &'a MatchupRow,
    players: &'a PlayerDirectory,
) -> Result<Vec<LineupCandidate<'a>>, AnalyticsError> {
    row.player_ids
        .iter()
        .map(|id| {
            let player = players
                .get(id)
                .ok_or_else(|| AnalyticsError::MissingPlayer {
                    player_id: id.clone(),
                    roster_id: row.roster_id,
                    week: row.week,
                })?;
            Ok(LineupCandidate {
                player_id: &player.player_id,
                full_name: &player.full_name,
                position: player.position,
                points: row.points_for_player(id),
            })
        })
        .collect()
}

/// One pool from several rows of the same roster-week, rows in the order
/// given.
pub fn pooled_candidates<'a>(
    rows: &[&'a MatchupRow],
    players: &'a PlayerDirectory,
) -> Result<Vec<LineupCandidate<'a>>, AnalyticsError> {
    let mut pool = Vec::new();
    for &row in rows {
        pool.extend(candidates(row, players)?);
    }
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::league::{Player, Position};

    fn directory() -> PlayerDirectory {
        PlayerDirectory::new(vec![
            Player {
                player_id: "4046".into(),
                full_name: "Patrick Mahomes".into(),
                position: Position::Quarterback,
            },
            Player {
                player_id: "KC".into(),
                full_name: "Kansas City Chiefs".into(),
                position: Position::Defense,
            },
        ])
    }

    fn row(ids: &[&str]) -> MatchupRow {
        let mut player_points = HashMap::new();
        player_points.insert("4046".to_string(), 24.3);
        MatchupRow {
            week: 3,
            roster_id: 7,
            matchup_id: Some(2),
            points: 24.3,
            player_ids: ids.iter().map(|s| s.to_string()).collect(),
            player_points,
        }
    }

    #[test]
    fn resolves_in_row_order_with_points() {
        let dir = directory();
        let r = row(&["KC", "4046"]);
        let pool = candidates(&r, &dir).unwrap();
        assert_eq!(pool.len(), 2);
        assert_eq!(pool[0].player_id, "KC");
        assert_eq!(pool[0].points, 0.0);
        assert_eq!(pool[1].position, Position::Quarterback);
        assert_eq!(pool[1].points, 24.3);
    }

    #[test]
    fn missing_player_is_an_error() {
        let dir = directory();
        let r = row(&["4046", "9999"]);
        match candidates(&r, &dir) {
            Err(AnalyticsError::MissingPlayer {
                player_id,
                roster_id,
                week,
            }) => {
                assert_eq!(player_id, "9999");
                assert_eq!(roster_id, 7);
                assert_eq!(week, 3);
            }
            other => panic!("expected MissingPlayer, got: {other:?}"),
        }
    }

    #[test]
    fn pooled_keeps_row_then_player_order() {
        let dir = directory();
        let first = row(&["4046"]);
        let second = row(&["KC"]);
        let pool = pooled_candidates(&[&second, &first], &dir).unwrap();
        let ids: Vec<&str> = pool.iter().map(|c| c.player_id).collect();
        assert_eq!(ids, vec!["KC", "4046"]);
    }
}
