//! CLI command definitions.

use clap::{Parser, Subcommand, ValueEnum};
use kizashi::PostShape;
use std::path::PathBuf;

/// Kizashi - scheduled weak-signal news bot
#[derive(Parser, Debug)]
#[command(name = "kizashi")]
#[command(about = "Research, rank, compose and publish weak-signal news on a schedule", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file layered over the defaults
    #[arg(short, long, global = true, env = "KIZASHI_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the scheduler until interrupted
    Run {
        /// Run a single cycle and exit
        #[arg(long)]
        once: bool,
    },

    /// Compose a post from a candidate JSON file without publishing
    Compose {
        /// Path to a candidate JSON object
        #[arg(long)]
        candidate: PathBuf,

        /// Post layout; defaults to the configured shape
        #[arg(long)]
        shape: Option<ShapeArg>,

        /// Character limit; defaults to the configured limit or 280
        #[arg(long)]
        max_length: Option<usize>,

        /// Rank shown in the ranked header
        #[arg(long, default_value = "1")]
        rank: usize,
    },

    /// Show posts recorded in the dedup ledger
    History {
        /// Window to look back over, in hours
        #[arg(long, default_value = "24")]
        hours: i64,

        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,
    },

    /// Extract candidates from a saved research answer
    Parse {
        /// Path to the research text
        file: PathBuf,
    },
}

/// Post layout options
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ShapeArg {
    /// Title, summary and future signal
    Signal,
    /// Numbered header, title, summary, key point and link
    Ranked,
}

impl From<ShapeArg> for PostShape {
    fn from(shape: ShapeArg) -> Self {
        match shape {
            ShapeArg::Signal => PostShape::Signal,
            ShapeArg::Ranked => PostShape::Ranked,
        }
    }
}

/// Output format options
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum OutputFormat {
    /// Human-readable format
    Human,
    /// JSON format
    Json,
}
