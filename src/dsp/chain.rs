//! Effect Chain for one audio session
//!
//! Every session gets the same four effects, written in a fixed order:
//! 1. Compressor (enable, mode)
//! 2. Bass boost (enable, strength)
//! 3. Equalizer (enable, bands, loudness correction)
//! 4. Virtualizer (enable, strength)

use log::{debug, info};

use crate::config::{db_to_centibels, EffectParameters};
use crate::engine::{
    EffectHandle, EffectKind, EngineFactory, COMPRESSOR_MODE_PARAM, LOUDNESS_CORRECTION_PARAM,
    MAX_STRENGTH,
};
use crate::error::Result;
use crate::session::SessionId;

/// The engines attached to one audio session
///
/// The chain owns its handles outright. Dropping or releasing it frees all
/// four engines, and a released chain cannot be touched again.
#[derive(Debug)]
pub struct EffectChain {
    session_id: SessionId,
    compressor: EffectHandle,
    equalizer: EffectHandle,
    bass_boost: EffectHandle,
    virtualizer: EffectHandle,
}

impl EffectChain {
    /// Instantiate all four engines for `session_id`
    ///
    /// If any engine cannot be created, those already created are released
    /// before the error is returned.
    pub fn create(factory: &dyn EngineFactory, session_id: SessionId) -> Result<Self> {
        let compressor = EffectHandle::open(factory, EffectKind::Compressor, session_id)?;
        let equalizer = EffectHandle::open(factory, EffectKind::Equalizer, session_id)?;
        let bass_boost = EffectHandle::open(factory, EffectKind::BassBoost, session_id)?;
        let virtualizer = EffectHandle::open(factory, EffectKind::Virtualizer, session_id)?;

        Ok(Self {
            session_id,
            compressor,
            equalizer,
            bass_boost,
            virtualizer,
        })
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Number of equalizer bands reported by the engine
    pub fn band_count(&self) -> u16 {
        self.equalizer.band_count()
    }

    /// Write a full parameter set to the engines
    ///
    /// Stops at the first failing engine call without undoing earlier writes.
    pub fn apply(&mut self, params: &EffectParameters) -> Result<()> {
        self.compressor.set_enabled(params.compressor.enabled)?;
        self.compressor
            .set_raw_parameter(COMPRESSOR_MODE_PARAM, params.compressor.mode)?;

        self.bass_boost.set_enabled(params.bass_boost.enabled)?;
        self.bass_boost
            .set_strength(clamp_strength(params.bass_boost.strength))?;

        self.equalizer.set_enabled(params.tone.enabled)?;
        self.apply_bands(&params.tone.bands)?;
        self.equalizer
            .set_raw_parameter(LOUDNESS_CORRECTION_PARAM, params.tone.loudness)?;

        self.virtualizer.set_enabled(params.virtualizer.enabled)?;
        self.virtualizer
            .set_strength(clamp_strength(params.virtualizer.strength))?;

        debug!("Applied parameters to session {}", self.session_id);
        Ok(())
    }

    /// Write band levels (dB), ignoring values beyond the engine's band count
    fn apply_bands(&mut self, levels_db: &[f32]) -> Result<()> {
        let band_count = self.equalizer.band_count() as usize;
        let (min, max) = self.equalizer.band_level_range()?;

        for (band, level_db) in levels_db.iter().take(band_count).enumerate() {
            let level_cb = db_to_centibels(*level_db).clamp(i32::from(min), i32::from(max));
            self.equalizer.set_band_level(band as u16, level_cb as i16)?;
        }
        Ok(())
    }

    /// Release all four engines
    pub fn release(self) {
        info!("Releasing effect chain for session {}", self.session_id);
        drop(self);
    }
}

fn clamp_strength(strength: i16) -> i16 {
    strength.clamp(0, MAX_STRENGTH)
}
