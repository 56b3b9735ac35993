//! CLI Command Implementations

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use log::info;
use serde::Serialize;

use crate::config::{db_to_centibels, parse_band_levels, JsonFileStore};
use crate::controller::{ControllerStatus, Event, EventQueue, UpdateController};
use crate::engine::simulated::DEFAULT_LEVEL_RANGE;
use crate::engine::{EffectKind, EngineState, SimulatedBackend};
use crate::error::{Result, SessionFxError};
use crate::routing::RoutingState;
use crate::session::SessionId;

/// Final state printed by `replay`
#[derive(Debug, Serialize)]
pub struct ReplayOutput {
    pub status: ControllerStatus,
    pub engines: BTreeMap<SessionId, BTreeMap<EffectKind, EngineState>>,
}

/// Replay an event script and return the final state
pub fn replay(profiles: &Path, events: &Path, bands: u16) -> Result<ReplayOutput> {
    info!("Replaying {} against {}", events.display(), profiles.display());

    let content = fs::read_to_string(events).map_err(|e| SessionFxError::FileReadError {
        path: events.to_path_buf(),
        source: e,
    })?;
    let script: Vec<Event> = serde_json::from_str(&content)?;

    let store = Arc::new(JsonFileStore::new(profiles));
    let backend = SimulatedBackend::with_equalizer(bands, DEFAULT_LEVEL_RANGE);
    let controller = Arc::new(UpdateController::new(store, Arc::new(backend.clone())));

    let queue = EventQueue::spawn(Arc::clone(&controller))?;
    for event in script {
        queue.submit(event)?;
    }
    queue.flush()?;

    let status = controller.status();
    let engines = status
        .sessions
        .iter()
        .map(|id| (*id, backend.session_state(*id)))
        .collect();
    Ok(ReplayOutput { status, engines })
}

/// Print the replay result as JSON
pub fn print_replay(profiles: &Path, events: &Path, bands: u16) -> Result<()> {
    let output = replay(profiles, events, bands)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Print the profile selected for a headset state
pub fn print_profile(wired: bool, bluetooth: bool) {
    let state = RoutingState {
        wired_headset_connected: wired,
        bluetooth_headset_connected: bluetooth,
    };
    println!("{}", state.profile());
}

/// Print the centibel values of a stored band string
pub fn print_bands(levels: &str) -> Result<()> {
    let bands = parse_band_levels(levels)?;
    for (band, db) in bands.iter().enumerate() {
        println!("band {}: {:+.2} dB = {} cB", band, db, db_to_centibels(*db));
    }
    Ok(())
}
