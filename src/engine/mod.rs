//! Effect Engine Module
//!
//! Capability interface to the platform's effect engines:
//! - `EffectEngine`: the primitive operations one engine instance accepts
//! - `EngineFactory`: instantiates an engine bound to an audio session
//! - `EffectHandle`: owned engine instance, released when dropped
//! - `simulated`: in-memory backend with readback and fault injection

pub mod handle;
pub mod simulated;

pub use handle::EffectHandle;
pub use simulated::{EngineState, SimulatedBackend};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::session::SessionId;

/// Raw parameter code selecting the compressor mode
pub const COMPRESSOR_MODE_PARAM: i32 = 0;

/// Raw parameter code for the equalizer loudness correction reference (in cB)
pub const LOUDNESS_CORRECTION_PARAM: i32 = 1000;

/// Valid strength range for bass boost and virtualizer
pub const MAX_STRENGTH: i16 = 1000;

/// The four effects attached to every audio session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    Compressor,
    Equalizer,
    BassBoost,
    Virtualizer,
}

impl EffectKind {
    /// All effect kinds, in construction order
    pub const ALL: [EffectKind; 4] = [
        EffectKind::Compressor,
        EffectKind::Equalizer,
        EffectKind::BassBoost,
        EffectKind::Virtualizer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EffectKind::Compressor => "compressor",
            EffectKind::Equalizer => "equalizer",
            EffectKind::BassBoost => "bass_boost",
            EffectKind::Virtualizer => "virtualizer",
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by an engine primitive
///
/// Engines know nothing about sessions; `EffectHandle` attaches the session
/// and effect kind when converting this into a crate error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct EngineFault {
    pub reason: String,
}

impl EngineFault {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn unsupported(operation: &str) -> Self {
        Self::new(format!("{} is not supported by this effect", operation))
    }
}

/// Result type for engine primitives
pub type EngineResult<T> = std::result::Result<T, EngineFault>;

/// Primitive operations accepted by a single effect engine instance
///
/// Only `set_enabled` and `release` are universal. The remaining primitives
/// default to an "unsupported" fault so each engine implements just the
/// operations its effect type has.
pub trait EffectEngine: Send {
    /// Enable or bypass the effect
    fn set_enabled(&mut self, enabled: bool) -> EngineResult<()>;

    /// Set effect strength (0..=1000)
    fn set_strength(&mut self, _strength: i16) -> EngineResult<()> {
        Err(EngineFault::unsupported("set_strength"))
    }

    /// Set one equalizer band level in centibels
    fn set_band_level(&mut self, _band: u16, _level_cb: i16) -> EngineResult<()> {
        Err(EngineFault::unsupported("set_band_level"))
    }

    /// Write an engine-specific parameter
    fn set_raw_parameter(&mut self, _code: i32, _value: i16) -> EngineResult<()> {
        Err(EngineFault::unsupported("set_raw_parameter"))
    }

    /// Number of equalizer bands the engine exposes
    fn band_count(&self) -> u16 {
        0
    }

    /// Inclusive band level range in centibels
    fn band_level_range(&self) -> (i16, i16) {
        (0, 0)
    }

    /// Free the underlying engine. Called exactly once by `EffectHandle`.
    fn release(&mut self);
}

/// Creates effect engines bound to an audio session
pub trait EngineFactory: Send + Sync {
    fn create(&self, kind: EffectKind, session_id: SessionId)
        -> EngineResult<Box<dyn EffectEngine>>;
}
