//! Update Controller
//!
//! Orchestrates routing, sessions and configuration:
//! - every inbound event mutates state and then resyncs all sessions
//! - a resync resolves the routing profile, loads its parameters, and
//!   applies them to every chain, evicting chains that fail
//! - all state lives behind one lock, so events never interleave
//!
//! The `EventQueue` feeds a controller from a single worker thread when
//! events come from several independent sources.

mod event;
mod queue;

pub use event::Event;
pub use queue::EventQueue;

use log::{info, warn};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::{ConfigurationStore, EffectParameters};
use crate::engine::EngineFactory;
use crate::error::SessionFxError;
use crate::routing::{RoutingDetector, RoutingProfile, RoutingState};
use crate::session::{SessionId, SessionRegistry};

/// Outcome of one resync pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResyncReport {
    pub profile: RoutingProfile,
    /// Sessions that accepted the parameters
    pub applied: Vec<SessionId>,
    /// Sessions evicted because their chain failed
    pub evicted: Vec<SessionId>,
}

/// Snapshot of controller state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControllerStatus {
    pub routing: RoutingState,
    pub profile: RoutingProfile,
    pub override_bands: Option<Vec<f32>>,
    pub sessions: Vec<SessionId>,
}

struct ControllerState {
    routing: RoutingDetector,
    sessions: SessionRegistry,
    override_bands: Option<Vec<f32>>,
}

pub struct UpdateController {
    store: Arc<dyn ConfigurationStore>,
    state: Mutex<ControllerState>,
}

impl UpdateController {
    pub fn new(store: Arc<dyn ConfigurationStore>, factory: Arc<dyn EngineFactory>) -> Self {
        Self::with_routing(store, factory, RoutingState::default())
    }

    /// Controller starting from a known routing state
    pub fn with_routing(
        store: Arc<dyn ConfigurationStore>,
        factory: Arc<dyn EngineFactory>,
        routing: RoutingState,
    ) -> Self {
        Self {
            store,
            state: Mutex::new(ControllerState {
                routing: RoutingDetector::with_state(routing),
                sessions: SessionRegistry::new(factory),
                override_bands: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Handle one inbound event
    ///
    /// Returns the resync report when the event triggered a resync. Routing
    /// events that leave both flags unchanged do not.
    pub fn handle_event(&self, event: Event) -> Option<ResyncReport> {
        let mut state = self.lock();

        if let Some(routing_event) = event.routing_event() {
            if !state.routing.handle_routing_event(routing_event) {
                return None;
            }
            return Some(state.resync(self.store.as_ref()));
        }

        match event {
            Event::SessionOpened { id } => {
                // Failure is already logged by the registry and never fatal
                let _ = state.sessions.on_session_opened(id);
            }
            Event::SessionClosed { id } => {
                state.sessions.on_session_closed(id);
            }
            Event::ConfigurationChanged { profile } => {
                info!("Preferences updated for profile '{}'", profile);
            }
            Event::SetOverrideBands { bands } => {
                state.override_bands = Some(bands);
            }
            Event::ClearOverride => {
                state.override_bands = None;
            }
            _ => {}
        }
        Some(state.resync(self.store.as_ref()))
    }

    /// Push the current configuration to every session
    pub fn resync(&self) -> ResyncReport {
        self.lock().resync(self.store.as_ref())
    }

    /// Temporarily replace the stored equalizer bands (dB) on every session
    pub fn set_override_bands(&self, bands: &[f32]) -> ResyncReport {
        let mut state = self.lock();
        state.override_bands = Some(bands.to_vec());
        state.resync(self.store.as_ref())
    }

    /// Return to the stored equalizer bands
    pub fn clear_override(&self) -> ResyncReport {
        let mut state = self.lock();
        state.override_bands = None;
        state.resync(self.store.as_ref())
    }

    pub fn profile(&self) -> RoutingProfile {
        self.lock().routing.profile()
    }

    pub fn active_sessions(&self) -> Vec<SessionId> {
        self.lock().sessions.active_sessions()
    }

    pub fn status(&self) -> ControllerStatus {
        let state = self.lock();
        ControllerStatus {
            routing: state.routing.state(),
            profile: state.routing.profile(),
            override_bands: state.override_bands.clone(),
            sessions: state.sessions.active_sessions(),
        }
    }
}

impl ControllerState {
    fn resync(&mut self, store: &dyn ConfigurationStore) -> ResyncReport {
        let profile = self.routing.profile();
        info!("Selected configuration: {}", profile);

        let mut params = load_parameters(store, profile);
        if let Some(bands) = &self.override_bands {
            params = params.with_band_override(bands);
        }

        let mut report = ResyncReport {
            profile,
            applied: Vec::new(),
            evicted: Vec::new(),
        };

        for id in self.sessions.active_sessions() {
            let Some(chain) = self.sessions.get_mut(id) else {
                continue;
            };
            match chain.apply(&params) {
                Ok(()) => report.applied.push(id),
                Err(e) => {
                    warn!("Trouble trying to manage session {}, removing: {}", id, e);
                    self.sessions.on_session_closed(id);
                    report.evicted.push(id);
                }
            }
        }
        report
    }
}

/// Parameters for `profile`, falling back to defaults when the store has none
fn load_parameters(store: &dyn ConfigurationStore, profile: RoutingProfile) -> EffectParameters {
    match store.get(profile.as_str()) {
        Ok(values) => EffectParameters::from_values(&values),
        Err(SessionFxError::ConfigurationMissing { .. }) => {
            info!("No stored configuration for '{}', using defaults", profile);
            EffectParameters::default()
        }
        Err(e) => {
            warn!("Could not load configuration '{}': {}; using defaults", profile, e);
            EffectParameters::default()
        }
    }
}
