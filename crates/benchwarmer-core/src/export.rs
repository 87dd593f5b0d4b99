// Report output: CSV files under the output directory and plain-text tables.
//
// Everything here rounds to two decimals and renders ratios as percentages;
// the analytics types themselves keep full precision.

use std::fmt::Write as _;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::season::combine::CombinedStatRow;
use crate::season::stats::{round2, DerivedStats, SeasonStatRow, SeasonTotals};
use crate::season::weeks::{RankingCategory, WeekRankings, WeekRecord};
use crate::season::LeagueReport;

pub const COMBINED_STATS_FILE: &str = "combined_statistics.csv";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },
}

/// Output file for one ranking list.
pub fn ranking_file(category: RankingCategory) -> &'static str {
    match category {
        RankingCategory::WorstEfficiency => "worst_efficiency_weeks.csv",
        RankingCategory::WorstActual => "worst_weeks.csv",
        RankingCategory::BestActual => "best_weeks.csv",
    }
}

pub fn league_stats_file(league_id: &str) -> String {
    format!("statistics_{league_id}.csv")
}

// ---------------------------------------------------------------------------
// CSV records
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct StatRecord<'a> {
    owner_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    leagues: Option<usize>,
    wins: u32,
    losses: u32,
    win_percentage: String,
    points_for: f64,
    points_against: f64,
    average_points_for: String,
    average_points_against: String,
    points_difference: f64,
    optimal_points_for: f64,
    optimal_points_against: f64,
    efficiency_for: String,
    efficiency_against: String,
}

impl<'a> StatRecord<'a> {
    fn new(
        owner_id: &'a str,
        leagues: Option<usize>,
        totals: &SeasonTotals,
        derived: &DerivedStats,
    ) -> Self {
        Self {
            owner_id,
            leagues,
            wins: totals.wins,
            losses: totals.losses,
            win_percentage: derived.win_percentage.percent(),
            points_for: round2(totals.points.points_for),
            points_against: round2(totals.points.points_against),
            average_points_for: derived.average_points_for.fixed(),
            average_points_against: derived.average_points_against.fixed(),
            points_difference: round2(derived.points_difference),
            optimal_points_for: round2(totals.points.optimal_points_for),
            optimal_points_against: round2(totals.points.optimal_points_against),
            efficiency_for: derived.efficiency_for.percent(),
            efficiency_against: derived.efficiency_against.percent(),
        }
    }
}

#[derive(Debug, Serialize)]
struct WeekCsvRecord<'a> {
    team: &'a str,
    league_name: &'a str,
    season: &'a str,
    week: u32,
    actual: f64,
    optimal: f64,
    points_missed: f64,
    efficiency: String,
}

impl<'a> From<&'a WeekRecord> for WeekCsvRecord<'a> {
    fn from(r: &'a WeekRecord) -> Self {
        Self {
            team: &r.team,
            league_name: &r.league_name,
            season: &r.season,
            week: r.week,
            actual: round2(r.actual),
            optimal: round2(r.optimal),
            points_missed: round2(r.points_missed),
            efficiency: r.efficiency.percent(),
        }
    }
}

pub fn write_league_stats<W: Write>(wtr: W, rows: &[SeasonStatRow]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(wtr);
    for row in rows {
        writer.serialize(StatRecord::new(&row.owner_id, None, &row.totals, &row.derived))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_combined_stats<W: Write>(wtr: W, rows: &[CombinedStatRow]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(wtr);
    for row in rows {
        writer.serialize(StatRecord::new(
            &row.owner_id,
            Some(row.leagues),
            &row.totals,
            &row.derived,
        ))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_weeks<W: Write>(wtr: W, records: &[WeekRecord]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(wtr);
    for record in records {
        writer.serialize(WeekCsvRecord::from(record))?;
    }
    writer.flush()?;
    Ok(())
}

fn write_file<F>(path: &Path, write: F) -> Result<PathBuf, ExportError>
where
    F: FnOnce(std::fs::File) -> Result<(), csv::Error>,
{
    let file = std::fs::File::create(path).map_err(|e| ExportError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    write(file).map_err(|e| ExportError::Csv {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(path.to_path_buf())
}

/// Write every report file into `output_dir`, creating it if needed.
/// Returns the paths written, in a stable order.
pub fn export_all(
    output_dir: &Path,
    reports: &[LeagueReport],
    combined: &[CombinedStatRow],
    rankings: &WeekRankings,
) -> Result<Vec<PathBuf>, ExportError> {
    std::fs::create_dir_all(output_dir).map_err(|e| ExportError::Io {
        path: output_dir.display().to_string(),
        source: e,
    })?;

    let mut written = Vec::new();
    for report in reports {
        let path = output_dir.join(league_stats_file(&report.league_id));
        written.push(write_file(&path, |f| write_league_stats(f, &report.stats))?);
    }

    let path = output_dir.join(COMBINED_STATS_FILE);
    written.push(write_file(&path, |f| write_combined_stats(f, combined))?);

    for category in RankingCategory::ALL {
        let path = output_dir.join(ranking_file(category));
        written.push(write_file(&path, |f| write_weeks(f, category.list(rankings)))?);
    }

    info!(dir = %output_dir.display(), files = written.len(), "exported reports");
    Ok(written)
}

// ---------------------------------------------------------------------------
// Text tables
// ---------------------------------------------------------------------------

const STAT_HEADER: [&str; 10] = [
    "W", "L", "Win%", "PF", "PA", "Avg PF", "Avg PA", "Diff", "Eff For", "Eff Ag",
];

fn stat_line(out: &mut String, owner: &str, totals: &SeasonTotals, derived: &DerivedStats) {
    let _ = writeln!(
        out,
        "{:<20} {:>3} {:>3} {:>8} {:>9.2} {:>9.2} {:>8} {:>8} {:>9.2} {:>8} {:>8}",
        owner,
        totals.wins,
        totals.losses,
        derived.win_percentage.percent(),
        totals.points.points_for,
        totals.points.points_against,
        derived.average_points_for.fixed(),
        derived.average_points_against.fixed(),
        derived.points_difference,
        derived.efficiency_for.percent(),
        derived.efficiency_against.percent(),
    );
}

fn stat_header(out: &mut String, first: &str) {
    let h = STAT_HEADER;
    let _ = writeln!(
        out,
        "{:<20} {:>3} {:>3} {:>8} {:>9} {:>9} {:>8} {:>8} {:>9} {:>8} {:>8}",
        first, h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], h[8], h[9]
    );
}

/// One league's table, in the order given.
pub fn league_table(report: &LeagueReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", report.league_name, report.season);
    stat_header(&mut out, "Owner");
    for row in &report.stats {
        stat_line(&mut out, &row.owner_id, &row.totals, &row.derived);
    }
    out
}

pub fn combined_table(rows: &[CombinedStatRow]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "All leagues");
    stat_header(&mut out, "Owner");
    for row in rows {
        let owner = format!("{} ({})", row.owner_id, row.leagues);
        stat_line(&mut out, &owner, &row.totals, &row.derived);
    }
    out
}

pub fn weeks_table(category: RankingCategory, records: &[WeekRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Top {} {}", records.len(), category.label());
    let _ = writeln!(
        out,
        "{:>3}  {:<20} {:<24} {:>6} {:>4} {:>8} {:>8} {:>8} {:>8}",
        "#", "Team", "League", "Season", "Week", "Actual", "Optimal", "Missed", "Eff"
    );
    for (i, r) in records.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}  {:<20} {:<24} {:>6} {:>4} {:>8.2} {:>8.2} {:>8.2} {:>8}",
            i + 1,
            r.team,
            r.league_name,
            r.season,
            r.week,
            r.actual,
            r.optimal,
            r.points_missed,
            r.efficiency.percent(),
        );
    }
    out
}
