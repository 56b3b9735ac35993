//! SessionFx - Per-Session DSP Effect Configuration
//!
//! Keeps a fixed effect chain (compressor, equalizer, bass boost,
//! virtualizer) attached to every live audio session and configures it from
//! the settings profile of the current output route.
//!
//! # Architecture
//!
//! - `routing`: infers speaker / wired headset / Bluetooth from plug events
//! - `config`: stored per-profile settings and their decoding
//! - `engine`: capability interface to the platform effect engines
//! - `dsp`: the per-session effect chain
//! - `session`: registry owning one chain per session
//! - `controller`: serializes events and resyncs every session

pub mod cli;
pub mod config;
pub mod controller;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod routing;
pub mod session;

pub use controller::{Event, EventQueue, ResyncReport, UpdateController};
pub use error::{Result, SessionFxError};
