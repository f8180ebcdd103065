//! Root CLI structure for fxsim

use clap::{Parser, Subcommand};
use log::LevelFilter;

use crate::commands::compact::CompactArgs;
use crate::commands::layout::LayoutArgs;
use crate::commands::simulate::SimulateArgs;

#[derive(Parser)]
#[command(name = "fxsim")]
#[command(about = "Run and inspect module-driven particle emitters", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl Cli {
    /// Log level picked by `-v`/`-q`, or None to keep the environment's
    pub fn log_level(&self) -> Option<LevelFilter> {
        match (self.quiet, self.verbose) {
            (_, 1) => Some(LevelFilter::Info),
            (_, 2) => Some(LevelFilter::Debug),
            (_, 3..) => Some(LevelFilter::Trace),
            (true, 0) => Some(LevelFilter::Error),
            (false, 0) => None,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Tick a preset particle system and report particle counts
    Simulate(SimulateArgs),

    /// Show the per-particle payload layout of a preset
    Layout(LayoutArgs),

    /// Fuse preset emitters into uber modules and verify the result
    Compact(CompactArgs),

    /// List the built-in presets
    Presets,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
