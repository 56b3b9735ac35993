//! Owned effect engine handle
//!
//! An `EffectHandle` is bound to one session for its whole life and releases
//! the engine when dropped, so every exit path (close, eviction, a failed
//! chain construction) frees the engine exactly once.

use log::debug;

use super::{EffectEngine, EffectKind, EngineFactory, EngineFault};
use crate::error::{Result, SessionFxError};
use crate::session::SessionId;

pub struct EffectHandle {
    kind: EffectKind,
    session_id: SessionId,
    engine: Box<dyn EffectEngine>,
}

impl EffectHandle {
    /// Instantiate an engine of `kind` for `session_id`
    pub fn open(factory: &dyn EngineFactory, kind: EffectKind, session_id: SessionId) -> Result<Self> {
        let engine = factory
            .create(kind, session_id)
            .map_err(|fault| SessionFxError::EngineUnavailable {
                session_id,
                effect: kind,
                reason: fault.reason,
            })?;
        debug!("Created {} engine for session {}", kind, session_id);
        Ok(Self {
            kind,
            session_id,
            engine,
        })
    }

    pub fn set_enabled(&mut self, enabled: bool) -> Result<()> {
        let result = self.engine.set_enabled(enabled);
        self.check(result)
    }

    pub fn set_strength(&mut self, strength: i16) -> Result<()> {
        let result = self.engine.set_strength(strength);
        self.check(result)
    }

    pub fn set_band_level(&mut self, band: u16, level_cb: i16) -> Result<()> {
        let result = self.engine.set_band_level(band, level_cb);
        self.check(result)
    }

    pub fn set_raw_parameter(&mut self, code: i32, value: i16) -> Result<()> {
        let result = self.engine.set_raw_parameter(code, value);
        self.check(result)
    }

    pub fn band_count(&self) -> u16 {
        self.engine.band_count()
    }

    /// Band level limits in centibels; an inverted range is an apply failure
    pub fn band_level_range(&self) -> Result<(i16, i16)> {
        let (min, max) = self.engine.band_level_range();
        if min > max {
            return Err(SessionFxError::ApplyFailure {
                session_id: self.session_id,
                effect: self.kind,
                reason: format!("invalid band level range {}..={}", min, max),
            });
        }
        Ok((min, max))
    }

    fn check(&self, result: std::result::Result<(), EngineFault>) -> Result<()> {
        result.map_err(|fault| SessionFxError::ApplyFailure {
            session_id: self.session_id,
            effect: self.kind,
            reason: fault.reason,
        })
    }
}

impl Drop for EffectHandle {
    fn drop(&mut self) {
        debug!("Releasing {} engine for session {}", self.kind, self.session_id);
        self.engine.release();
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("kind", &self.kind)
            .field("session_id", &self.session_id)
            .finish()
    }
}
