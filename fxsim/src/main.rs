//! fxsim: drive fx-particles emitters from the command line

mod cli;
mod commands;
mod presets;
mod utils;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use log::LevelFilter;

use crate::cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level());

    match cli.command {
        Commands::Simulate(args) => commands::simulate::execute(&args),
        Commands::Layout(args) => commands::layout::execute(&args),
        Commands::Compact(args) => commands::compact::execute(&args),
        Commands::Presets => commands::list_presets(),
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            let name = command.get_name().to_string();
            generate(shell, &mut command, name, &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Warnings by default; `RUST_LOG` refines that, and `-v`/`-q` override both
fn init_logging(level: Option<LevelFilter>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(level) = level {
        builder.filter_level(level);
    }
    builder.format_timestamp(None).init();
}
