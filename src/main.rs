//! SessionFx CLI
//!
//! Command-line front end for dry runs of the session controller.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;

use sessionfx::cli::{commands, Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("SessionFx v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(cmd) => handle_command(cmd),
        None => {
            println!("SessionFx v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(cmd: Commands) -> anyhow::Result<()> {
    match cmd {
        Commands::Replay {
            profiles,
            events,
            bands,
        } => commands::print_replay(&profiles, &events, bands)
            .with_context(|| format!("replaying {}", events.display())),
        Commands::Profile { wired, bluetooth } => {
            commands::print_profile(wired, bluetooth);
            Ok(())
        }
        Commands::Bands { levels } => {
            commands::print_bands(&levels).context("decoding band levels")
        }
    }
}
