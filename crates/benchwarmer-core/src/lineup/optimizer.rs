// Lineup optimizers: best attainable lineup from one week's player pool.
//
// `Greedy` is the reference policy every report is computed with. It walks
// the slot template in fill order and hands each slot the best remaining
// eligible players. It is a heuristic: an elite player eligible for several
// scarce slots can be consumed early, so the total is not always the global
// maximum. `ExactAssignment` solves the player x seat assignment exactly and
// exists for comparison.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::league::Position;
use crate::lineup::template::SlotTemplate;

/// One player available to the optimizer.
#[derive(Debug, Clone, PartialEq)]
pub struct LineupCandidate<'a> {
    pub player_id: &'a str,
    pub full_name: &'a str,
    pub position: Position,
    pub points: f64,
}

/// A player placed into a slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    pub slot: String,
    pub player_id: String,
    pub full_name: String,
    pub position: Position,
    pub points: f64,
}

/// The chosen lineup and its point total.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Lineup {
    pub selections: Vec<Selection>,
    pub total: f64,
}

impl Lineup {
    fn push(&mut self, slot: &str, candidate: &LineupCandidate<'_>) {
        self.total += candidate.points;
        self.selections.push(Selection {
            slot: slot.to_string(),
            player_id: candidate.player_id.to_string(),
            full_name: candidate.full_name.to_string(),
            position: candidate.position,
            points: candidate.points,
        });
    }
}

/// A policy for choosing a lineup from a pool under a slot template.
pub trait LineupStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn optimize(&self, pool: &[LineupCandidate<'_>], template: &SlotTemplate) -> Lineup;

    fn optimal_points(&self, pool: &[LineupCandidate<'_>], template: &SlotTemplate) -> f64 {
        self.optimize(pool, template).total
    }
}

/// Which optimizer a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizerKind {
    #[default]
    Greedy,
    Exact,
}

impl OptimizerKind {
    pub fn strategy(self) -> &'static dyn LineupStrategy {
        match self {
            OptimizerKind::Greedy => &Greedy,
            OptimizerKind::Exact => &ExactAssignment,
        }
    }
}

// ---------------------------------------------------------------------------
// Greedy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct Greedy;

impl LineupStrategy for Greedy {
    fn name(&self) -> &'static str {
        "greedy"
    }

    /// 1. Rank the pool by points descending; equal points keep input order.
    /// 2. For each slot in fill order, take the top `count` remaining players
    ///    whose position the slot accepts.
    /// 3. Slots with too few eligible players stay partially filled.
    fn optimize(&self, pool: &[LineupCandidate<'_>], template: &SlotTemplate) -> Lineup {
        let mut ranked: Vec<usize> = (0..pool.len()).collect();
        // sort_by is stable, which keeps tie-breaking on input order.
        ranked.sort_by(|&a, &b| {
            pool[b]
                .points
                .partial_cmp(&pool[a].points)
                .unwrap_or(Ordering::Equal)
        });

        let mut taken = vec![false; pool.len()];
        let mut lineup = Lineup::default();

        for slot in template.fill_order() {
            let mut filled = 0;
            for &idx in &ranked {
                if filled == slot.count {
                    break;
                }
                if taken[idx] || !slot.accepts(pool[idx].position) {
                    continue;
                }
                taken[idx] = true;
                filled += 1;
                lineup.push(&slot.name, &pool[idx]);
            }
        }

        lineup
    }
}

/// Points of the greedy lineup for `pool`.
pub fn optimal_points(pool: &[LineupCandidate<'_>], template: &SlotTemplate) -> f64 {
    Greedy.optimal_points(pool, template)
}

// ---------------------------------------------------------------------------
// Exact assignment
// ---------------------------------------------------------------------------

/// Cost of placing a player in a seat it is not eligible for. Finite so the
/// potentials in the Hungarian method never produce NaN.
const INELIGIBLE_COST: f64 = 1e12;

#[derive(Debug, Clone, Copy, Default)]
pub struct ExactAssignment;

impl LineupStrategy for ExactAssignment {
    fn name(&self) -> &'static str {
        "exact"
    }

    /// Maximum-weight assignment of players to individual seats. Every seat
    /// also has a zero-point "leave empty" column, so a seat is never forced
    /// onto an ineligible or negative-scoring player.
    fn optimize(&self, pool: &[LineupCandidate<'_>], template: &SlotTemplate) -> Lineup {
        let seats: Vec<&str> = template
            .fill_order()
            .flat_map(|slot| std::iter::repeat(slot.name.as_str()).take(slot.count))
            .collect();
        let seat_slots: Vec<_> = template
            .fill_order()
            .flat_map(|slot| std::iter::repeat(slot).take(slot.count))
            .collect();

        if seats.is_empty() || pool.is_empty() {
            return Lineup::default();
        }

        let columns = pool.len() + seats.len();
        let cost: Vec<Vec<f64>> = seat_slots
            .iter()
            .map(|slot| {
                (0..columns)
                    .map(|j| match pool.get(j) {
                        Some(c) if slot.accepts(c.position) => -c.points,
                        Some(_) => INELIGIBLE_COST,
                        None => 0.0,
                    })
                    .collect()
            })
            .collect();

        let assignment = hungarian(&cost);

        let mut lineup = Lineup::default();
        for (seat, &col) in assignment.iter().enumerate() {
            if let Some(candidate) = pool.get(col) {
                if seat_slots[seat].accepts(candidate.position) {
                    lineup.push(seats[seat], candidate);
                }
            }
        }
        lineup
    }
}

/// Minimum-cost assignment of every row to a distinct column (rows <= columns).
/// Returns the column chosen for each row.
fn hungarian(cost: &[Vec<f64>]) -> Vec<usize> {
    let n = cost.len();
    let m = cost.first().map_or(0, |r| r.len());
    debug_assert!(n <= m);

    let mut u = vec![0.0; n + 1];
    let mut v = vec![0.0; m + 1];
    // p[j]: row (1-based) matched to column j; 0 = free.
    let mut p = vec![0usize; m + 1];
    let mut way = vec![0usize; m + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0;
        let mut minv = vec![f64::INFINITY; m + 1];
        let mut used = vec![false; m + 1];
        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0;
            for j in 1..=m {
                if used[j] {
                    continue;
                }
                let cur = cost[i0 - 1][j - 1] - u[i0] - v[j];
                if cur < minv[j] {
                    minv[j] = cur;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }
            for j in 0..=m {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }
            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }
        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut assignment = vec![0usize; n];
    for j in 1..=m {
        if p[j] != 0 {
            assignment[p[j] - 1] = j - 1;
        }
    }
    assignment
}
