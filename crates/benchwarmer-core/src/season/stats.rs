// Per-team season statistics: records, averages, differential and efficiency.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use crate::league::RosterEntry;
use crate::season::aggregate::PointsTotals;

// ---------------------------------------------------------------------------
// Ratio
// ---------------------------------------------------------------------------

/// A quotient whose denominator may be zero.
///
/// `Undefined` reads as `0.0` for arithmetic and sorting but stays
/// distinguishable from a true zero for display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ratio {
    Defined(f64),
    Undefined,
}

impl Ratio {
    pub fn of(numerator: f64, denominator: f64) -> Self {
        if denominator == 0.0 {
            Ratio::Undefined
        } else {
            Ratio::Defined(numerator / denominator)
        }
    }

    pub fn value(&self) -> f64 {
        match self {
            Ratio::Defined(v) => *v,
            Ratio::Undefined => 0.0,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Ratio::Defined(_))
    }

    /// `"12.34%"`, or `"n/a"` when undefined.
    pub fn percent(&self) -> String {
        match self {
            Ratio::Defined(v) => format!("{:.2}%", v * 100.0),
            Ratio::Undefined => "n/a".to_string(),
        }
    }

    /// Value rounded to two decimals, or `"n/a"` when undefined.
    pub fn fixed(&self) -> String {
        match self {
            Ratio::Defined(v) => format!("{:.2}", v),
            Ratio::Undefined => "n/a".to_string(),
        }
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.percent())
    }
}

/// Round to two decimal places for display and export.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// Totals and derived fields
// ---------------------------------------------------------------------------

/// The additive part of a team's season. Summing these across leagues and
/// then deriving is the only way ratios are ever produced.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SeasonTotals {
    pub wins: u32,
    pub losses: u32,
    pub points: PointsTotals,
}

impl SeasonTotals {
    pub fn games(&self) -> u32 {
        self.wins + self.losses
    }

    pub fn points_difference(&self) -> f64 {
        self.points.points_for - self.points.points_against
    }

    pub fn add(&mut self, other: &SeasonTotals) {
        self.wins += other.wins;
        self.losses += other.losses;
        self.points.points_for += other.points.points_for;
        self.points.points_against += other.points.points_against;
        self.points.optimal_points_for += other.points.optimal_points_for;
        self.points.optimal_points_against += other.points.optimal_points_against;
    }

    pub fn derive(&self) -> DerivedStats {
        let games = f64::from(self.games());
        let p = &self.points;
        DerivedStats {
            win_percentage: Ratio::of(f64::from(self.wins), games),
            average_points_for: Ratio::of(p.points_for, games),
            average_points_against: Ratio::of(p.points_against, games),
            points_difference: self.points_difference(),
            efficiency_for: Ratio::of(p.points_for, p.optimal_points_for),
            efficiency_against: Ratio::of(p.points_against, p.optimal_points_against),
        }
    }
}

/// Fields computed from `SeasonTotals`; never summed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedStats {
    pub win_percentage: Ratio,
    pub average_points_for: Ratio,
    pub average_points_against: Ratio,
    pub points_difference: f64,
    pub efficiency_for: Ratio,
    pub efficiency_against: Ratio,
}

/// One team's row in a league's season table.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonStatRow {
    pub roster_id: u32,
    pub owner_id: String,
    pub totals: SeasonTotals,
    pub derived: DerivedStats,
}

impl SeasonStatRow {
    pub fn new(roster: &RosterEntry, points: PointsTotals) -> Self {
        let totals = SeasonTotals {
            wins: roster.wins,
            losses: roster.losses,
            points,
        };
        Self {
            roster_id: roster.roster_id,
            owner_id: roster.owner_id.clone(),
            derived: totals.derive(),
            totals,
        }
    }
}

/// Descending by points difference; equal differences keep their order.
pub(crate) fn by_difference_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Build the league table from the roster directory and aggregated points.
///
/// Rows come out sorted by points difference, descending; ties keep roster
/// directory order. A roster absent from `aggregates` gets zero totals.
pub fn build(rosters: &[RosterEntry], aggregates: &BTreeMap<u32, PointsTotals>) -> Vec<SeasonStatRow> {
    let mut rows: Vec<SeasonStatRow> = rosters
        .iter()
        .map(|r| {
            let points = aggregates.get(&r.roster_id).copied().unwrap_or_default();
            SeasonStatRow::new(r, points)
        })
        .collect();

    rows.sort_by(|a, b| {
        by_difference_desc(a.derived.points_difference, b.derived.points_difference)
    });
    rows
}
