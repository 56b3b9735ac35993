//! In-memory effect backend
//!
//! Stands in for the platform effect engines in dry runs and tests. Every
//! engine write is recorded so callers can read back what a session's chain
//! currently holds, and faults can be injected per session.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{EffectEngine, EffectKind, EngineFactory, EngineFault, EngineResult, MAX_STRENGTH};
use crate::session::SessionId;

/// Default number of equalizer bands
pub const DEFAULT_BAND_COUNT: u16 = 5;

/// Default equalizer level range in centibels (+/- 10 dB)
pub const DEFAULT_LEVEL_RANGE: (i16, i16) = (-1000, 1000);

/// Recorded state of one engine instance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EngineState {
    pub enabled: bool,
    pub strength: i16,
    pub bands: Vec<i16>,
    pub raw_parameters: BTreeMap<i32, i16>,
    pub released: bool,
}

#[derive(Debug, Default)]
struct BackendState {
    engines: HashMap<(SessionId, EffectKind), EngineState>,
    created: usize,
    released: usize,
    failing_creates: HashSet<(SessionId, EffectKind)>,
    failing_writes: HashSet<SessionId>,
}

fn lock_state(shared: &Mutex<BackendState>) -> MutexGuard<'_, BackendState> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Factory for simulated engines. Clones share the same recorded state.
#[derive(Debug, Clone)]
pub struct SimulatedBackend {
    shared: Arc<Mutex<BackendState>>,
    band_count: u16,
    level_range: (i16, i16),
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedBackend {
    /// Backend with a 5-band equalizer limited to +/- 10 dB
    pub fn new() -> Self {
        Self::with_equalizer(DEFAULT_BAND_COUNT, DEFAULT_LEVEL_RANGE)
    }

    /// Backend whose equalizers expose `band_count` bands within `level_range` (cB)
    pub fn with_equalizer(band_count: u16, level_range: (i16, i16)) -> Self {
        Self {
            shared: Arc::new(Mutex::new(BackendState::default())),
            band_count,
            level_range,
        }
    }

    fn lock(&self) -> MutexGuard<'_, BackendState> {
        lock_state(&self.shared)
    }

    /// State of the most recent engine of `kind` created for `session_id`
    pub fn engine_state(&self, session_id: SessionId, kind: EffectKind) -> Option<EngineState> {
        self.lock().engines.get(&(session_id, kind)).cloned()
    }

    /// All recorded engine states for a session, keyed by effect
    pub fn session_state(&self, session_id: SessionId) -> BTreeMap<EffectKind, EngineState> {
        self.lock()
            .engines
            .iter()
            .filter(|((id, _), _)| *id == session_id)
            .map(|((_, kind), state)| (*kind, state.clone()))
            .collect()
    }

    /// Total engines created since the backend was built
    pub fn created_count(&self) -> usize {
        self.lock().created
    }

    /// Total engines released since the backend was built
    pub fn release_count(&self) -> usize {
        self.lock().released
    }

    /// Engines created and not yet released
    pub fn live_engines(&self) -> usize {
        self.lock().engines.values().filter(|e| !e.released).count()
    }

    /// Make creation of `kind` for `session_id` fail
    pub fn fail_create(&self, session_id: SessionId, kind: EffectKind) {
        self.lock().failing_creates.insert((session_id, kind));
    }

    /// Make every write to engines of `session_id` fail
    pub fn fail_writes(&self, session_id: SessionId) {
        self.lock().failing_writes.insert(session_id);
    }

    pub fn clear_faults(&self) {
        let mut state = self.lock();
        state.failing_creates.clear();
        state.failing_writes.clear();
    }
}

impl EngineFactory for SimulatedBackend {
    fn create(
        &self,
        kind: EffectKind,
        session_id: SessionId,
    ) -> EngineResult<Box<dyn EffectEngine>> {
        if session_id < 0 {
            return Err(EngineFault::new(format!(
                "invalid audio session {}",
                session_id
            )));
        }

        let mut state = self.lock();
        if state.failing_creates.contains(&(session_id, kind)) {
            return Err(EngineFault::new("effect library not loaded"));
        }

        let bands = match kind {
            EffectKind::Equalizer => vec![0; self.band_count as usize],
            _ => Vec::new(),
        };
        state.engines.insert(
            (session_id, kind),
            EngineState {
                bands,
                ..EngineState::default()
            },
        );
        state.created += 1;

        Ok(Box::new(SimulatedEngine {
            shared: Arc::clone(&self.shared),
            session_id,
            kind,
            band_count: self.band_count,
            level_range: self.level_range,
        }))
    }
}

struct SimulatedEngine {
    shared: Arc<Mutex<BackendState>>,
    session_id: SessionId,
    kind: EffectKind,
    band_count: u16,
    level_range: (i16, i16),
}

impl SimulatedEngine {
    fn write(&self, update: impl FnOnce(&mut EngineState) -> EngineResult<()>) -> EngineResult<()> {
        let mut state = lock_state(&self.shared);
        if state.failing_writes.contains(&self.session_id) {
            return Err(EngineFault::new("effect engine died"));
        }
        let engine = state
            .engines
            .get_mut(&(self.session_id, self.kind))
            .ok_or_else(|| EngineFault::new("engine instance is gone"))?;
        if engine.released {
            return Err(EngineFault::new("engine already released"));
        }
        update(engine)
    }
}

impl EffectEngine for SimulatedEngine {
    fn set_enabled(&mut self, enabled: bool) -> EngineResult<()> {
        self.write(|engine| {
            engine.enabled = enabled;
            Ok(())
        })
    }

    fn set_strength(&mut self, strength: i16) -> EngineResult<()> {
        if !matches!(self.kind, EffectKind::BassBoost | EffectKind::Virtualizer) {
            return Err(EngineFault::unsupported("set_strength"));
        }
        if !(0..=MAX_STRENGTH).contains(&strength) {
            return Err(EngineFault::new(format!("strength {} out of range", strength)));
        }
        self.write(|engine| {
            engine.strength = strength;
            Ok(())
        })
    }

    fn set_band_level(&mut self, band: u16, level_cb: i16) -> EngineResult<()> {
        if self.kind != EffectKind::Equalizer {
            return Err(EngineFault::unsupported("set_band_level"));
        }
        let (min, max) = self.level_range;
        if band >= self.band_count || !(min..=max).contains(&level_cb) {
            return Err(EngineFault::new(format!(
                "band {} level {} rejected",
                band, level_cb
            )));
        }
        self.write(|engine| {
            engine.bands[band as usize] = level_cb;
            Ok(())
        })
    }

    fn set_raw_parameter(&mut self, code: i32, value: i16) -> EngineResult<()> {
        if !matches!(self.kind, EffectKind::Compressor | EffectKind::Equalizer) {
            return Err(EngineFault::unsupported("set_raw_parameter"));
        }
        self.write(|engine| {
            engine.raw_parameters.insert(code, value);
            Ok(())
        })
    }

    fn band_count(&self) -> u16 {
        match self.kind {
            EffectKind::Equalizer => self.band_count,
            _ => 0,
        }
    }

    fn band_level_range(&self) -> (i16, i16) {
        match self.kind {
            EffectKind::Equalizer => self.level_range,
            _ => (0, 0),
        }
    }

    fn release(&mut self) {
        let mut state = lock_state(&self.shared);
        let newly_released = match state.engines.get_mut(&(self.session_id, self.kind)) {
            Some(engine) if !engine.released => {
                engine.released = true;
                true
            }
            _ => false,
        };
        if newly_released {
            state.released += 1;
        }
    }
}
