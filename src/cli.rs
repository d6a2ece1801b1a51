use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tab_triage::analysis::estimate::RankBy;

#[derive(Debug, Parser)]
#[command(name = "tab-triage")]
#[command(about = "Find duplicate, similar and expensive browser tabs", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan a session snapshot for duplicate and similar tabs
    Scan {
        /// Path to the snapshot JSON file
        snapshot: PathBuf,
        /// Print the full scan result as JSON
        #[arg(long)]
        json: bool,
        /// Write per-tab estimates to a CSV file
        #[arg(long, value_name = "FILE")]
        csv: Option<PathBuf>,
    },
    /// Rank tabs by estimated resource cost
    Rank {
        snapshot: PathBuf,
        #[arg(long, value_enum, default_value_t = RankArg::Score)]
        by: RankArg,
        /// Only show the top N tabs
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Suggest the least recently used tabs to close
    Idle {
        snapshot: PathBuf,
        /// Share of closable tabs to suggest (overrides the configured ratio)
        #[arg(long)]
        ratio: Option<f64>,
    },
    /// Print configuration values
    PrintConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RankArg {
    Score,
    Memory,
    Cpu,
}

impl From<RankArg> for RankBy {
    fn from(arg: RankArg) -> Self {
        match arg {
            RankArg::Score => RankBy::Score,
            RankArg::Memory => RankBy::Memory,
            RankArg::Cpu => RankBy::Cpu,
        }
    }
}
