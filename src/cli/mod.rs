//! CLI Module
//!
//! Command-line interface for dry runs of the session controller.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// SessionFx - per-session DSP configuration by output routing
#[derive(Parser, Debug)]
#[command(name = "sessionfx")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay an event script against simulated effect engines
    #[command(name = "replay")]
    Replay {
        /// Directory holding one `sessionfx.<profile>.json` file per profile
        #[arg(short, long)]
        profiles: PathBuf,

        /// JSON array of events
        #[arg(short, long)]
        events: PathBuf,

        /// Equalizer band count of the simulated engines
        #[arg(long, default_value_t = 5)]
        bands: u16,
    },

    /// Print the routing profile selected for a headset state
    #[command(name = "profile")]
    Profile {
        /// Wired headset connected
        #[arg(long)]
        wired: bool,

        /// Bluetooth headset connected
        #[arg(long)]
        bluetooth: bool,
    },

    /// Decode a stored band string into centibels
    #[command(name = "bands")]
    Bands {
        /// Band levels in dB separated by ';'
        levels: String,
    },
}
