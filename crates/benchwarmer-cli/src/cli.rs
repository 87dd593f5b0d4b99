use std::path::PathBuf;

use benchwarmer_core::lineup::optimizer::OptimizerKind;
use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(author, version, about = "Fantasy football season analytics for Sleeper leagues")]
pub struct Cli {
    /// League ids to analyze (defaults to `leagues` in config/benchwarmer.toml)
    pub leagues: Vec<String>,

    /// Read players and leagues from the local cache instead of the API
    #[arg(long)]
    pub offline: bool,

    /// Re-download the player directory even if a cached copy exists
    #[arg(long, conflicts_with = "offline")]
    pub refresh_players: bool,

    /// Lineup optimizer (overrides `analysis.optimizer`)
    #[arg(long, value_enum)]
    pub optimizer: Option<OptimizerArg>,

    /// Length of each week ranking (overrides `analysis.ranking_size`)
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub ranking_size: Option<u16>,

    /// Directory holding defaults/ and config/ (defaults to the current directory)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Skip writing CSV files
    #[arg(long)]
    pub no_export: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizerArg {
    Greedy,
    Exact,
}

impl From<OptimizerArg> for OptimizerKind {
    fn from(arg: OptimizerArg) -> Self {
        match arg {
            OptimizerArg::Greedy => OptimizerKind::Greedy,
            OptimizerArg::Exact => OptimizerKind::Exact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_leagues_and_flags() {
        let cli = Cli::try_parse_from([
            "benchwarmer",
            "111",
            "222",
            "--offline",
            "--optimizer",
            "exact",
            "--ranking-size",
            "5",
        ])
        .unwrap();
        assert_eq!(cli.leagues, vec!["111", "222"]);
        assert!(cli.offline);
        assert_eq!(cli.optimizer.map(OptimizerKind::from), Some(OptimizerKind::Exact));
        assert_eq!(cli.ranking_size, Some(5));
        assert!(!cli.no_export);
        assert!(!cli.refresh_players);
    }

    #[test]
    fn refresh_players_needs_the_network() {
        let cli = Cli::try_parse_from(["benchwarmer", "--refresh-players", "111"]).unwrap();
        assert!(cli.refresh_players);
        assert!(Cli::try_parse_from(["benchwarmer", "--refresh-players", "--offline"]).is_err());
    }

    #[test]
    fn rejects_zero_ranking_size() {
        assert!(Cli::try_parse_from(["benchwarmer", "--ranking-size", "0"]).is_err());
    }
}
