//! Integration Tests
//!
//! End-to-end behavior of the controller against simulated effect engines.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use sessionfx::config::{keys, MemoryStore};
use sessionfx::engine::{EffectKind, SimulatedBackend};
use sessionfx::routing::{DeviceClass, RoutingProfile, RoutingState};
use sessionfx::{Event, EventQueue, UpdateController};

fn setup() -> (Arc<UpdateController>, Arc<MemoryStore>, SimulatedBackend) {
    let store = Arc::new(MemoryStore::new());
    let backend = SimulatedBackend::new();
    let controller = Arc::new(UpdateController::new(
        store.clone(),
        Arc::new(backend.clone()),
    ));
    (controller, store, backend)
}

fn equalizer_bands(backend: &SimulatedBackend, id: i32) -> Vec<i16> {
    backend
        .engine_state(id, EffectKind::Equalizer)
        .expect("equalizer exists")
        .bands
}

// === Session Lifecycle ===

#[test]
fn test_unique_opens_are_all_active() {
    let (controller, _, _) = setup();
    for id in [42, 7, 19, 3] {
        controller.handle_event(Event::SessionOpened { id });
    }
    assert_eq!(controller.active_sessions(), vec![3, 7, 19, 42]);
}

#[test]
fn test_repeated_open_keeps_chain_identity() {
    let (controller, _, backend) = setup();
    controller.handle_event(Event::SessionOpened { id: 5 });
    controller.handle_event(Event::SessionOpened { id: 5 });

    assert_eq!(controller.active_sessions(), vec![5]);
    assert_eq!(backend.created_count(), 4);
    assert_eq!(backend.release_count(), 0);
}

#[test]
fn test_close_of_unknown_session_is_harmless() {
    let (controller, _, backend) = setup();
    controller.handle_event(Event::SessionOpened { id: 1 });
    controller.handle_event(Event::SessionClosed { id: 99 });

    assert_eq!(controller.active_sessions(), vec![1]);
    assert_eq!(backend.live_engines(), 4);
}

// === Parameter Application ===

#[test]
fn test_scenario_speaker_bass_strength() {
    let (controller, store, backend) = setup();
    controller.handle_event(Event::SessionOpened { id: 5 });

    store.set("speaker", keys::BASS_ENABLE, true);
    store.set("speaker", keys::BASS_STRENGTH, "300");
    controller.handle_event(Event::ConfigurationChanged {
        profile: "speaker".to_string(),
    });

    let bass = backend.engine_state(5, EffectKind::BassBoost).unwrap();
    assert!(bass.enabled);
    assert_eq!(bass.strength, 300);
}

#[test]
fn test_applied_parameters_read_back() {
    let (controller, store, backend) = setup();
    store.set("speaker", keys::COMPRESSION_ENABLE, true);
    store.set("speaker", keys::COMPRESSION_MODE, "1");
    store.set("speaker", keys::TONE_ENABLE, true);
    store.set("speaker", keys::TONE_BANDS, "1.234;-0.5;0;2.5;-9.99");
    store.set("speaker", keys::TONE_LOUDNESS, "8000");
    store.set("speaker", keys::VIRTUALIZER_ENABLE, true);
    store.set("speaker", keys::VIRTUALIZER_STRENGTH, "1000");
    controller.handle_event(Event::SessionOpened { id: 1 });

    let expected_db = [1.234f32, -0.5, 0.0, 2.5, -9.99];
    for (cb, db) in equalizer_bands(&backend, 1).iter().zip(expected_db) {
        assert!((f32::from(*cb) - db * 100.0).abs() <= 1.0);
    }

    let eq = backend.engine_state(1, EffectKind::Equalizer).unwrap();
    assert!(eq.enabled);
    assert_eq!(eq.raw_parameters.get(&1000), Some(&8000));

    let compressor = backend.engine_state(1, EffectKind::Compressor).unwrap();
    assert!(compressor.enabled);
    assert_eq!(compressor.raw_parameters.get(&0), Some(&1));

    let virtualizer = backend.engine_state(1, EffectKind::Virtualizer).unwrap();
    assert!(virtualizer.enabled);
    assert_eq!(virtualizer.strength, 1000);
}

#[test]
fn test_resync_twice_is_stable() {
    let (controller, store, backend) = setup();
    store.set("speaker", keys::TONE_BANDS, "2;1;0;-1;-2");
    store.set("speaker", keys::BASS_STRENGTH, 650);
    controller.handle_event(Event::SessionOpened { id: 1 });
    controller.handle_event(Event::SessionOpened { id: 2 });

    controller.resync();
    let first = (backend.session_state(1), backend.session_state(2));
    controller.resync();
    assert_eq!((backend.session_state(1), backend.session_state(2)), first);
}

// === Routing ===

#[test]
fn test_scenario_wired_plug_under_bluetooth() {
    let (controller, store, backend) = setup();
    store.set("bluetooth", keys::BASS_STRENGTH, 800);
    store.set("headset", keys::BASS_STRENGTH, 200);
    controller.handle_event(Event::SessionOpened { id: 1 });
    controller.handle_event(Event::BluetoothConnected {
        device_class: DeviceClass::Headphones,
    });
    let before = backend.session_state(1);

    let report = controller
        .handle_event(Event::WiredPlug { connected: true })
        .expect("wired flag changed");
    assert_eq!(report.profile, RoutingProfile::Bluetooth);
    assert_eq!(controller.profile(), RoutingProfile::Bluetooth);
    assert_eq!(backend.session_state(1), before);
}

#[test]
fn test_headset_profile_follows_unplug() {
    let (controller, store, backend) = setup();
    store.set("headset", keys::VIRTUALIZER_ENABLE, true);
    controller.handle_event(Event::SessionOpened { id: 4 });

    controller.handle_event(Event::WiredPlug { connected: true });
    assert!(backend.engine_state(4, EffectKind::Virtualizer).unwrap().enabled);

    controller.handle_event(Event::WiredPlug { connected: false });
    assert!(!backend.engine_state(4, EffectKind::Virtualizer).unwrap().enabled);
}

#[test]
fn test_forced_resync_from_platform_state() {
    let store = Arc::new(MemoryStore::new());
    let backend = SimulatedBackend::new();
    let controller = UpdateController::with_routing(
        store,
        Arc::new(backend),
        RoutingState {
            wired_headset_connected: true,
            bluetooth_headset_connected: true,
        },
    );

    let report = controller
        .handle_event(Event::ForcedRouteResync {
            wired_connected: false,
            bluetooth_on: false,
        })
        .unwrap();
    assert_eq!(report.profile, RoutingProfile::Speaker);
}

// === Override ===

#[test]
fn test_scenario_override_preview() {
    let (controller, store, backend) = setup();
    store.set("speaker", keys::TONE_BANDS, "4;0;-4;0;4");
    controller.handle_event(Event::SessionOpened { id: 1 });
    assert_eq!(equalizer_bands(&backend, 1), vec![400, 0, -400, 0, 400]);

    controller.set_override_bands(&[1.0, 2.0, -1.0, 0.0, 0.0]);
    let bands = equalizer_bands(&backend, 1);
    assert_eq!(bands[0], 100);
    assert_eq!(bands[2], -100);

    controller.clear_override();
    assert_eq!(equalizer_bands(&backend, 1), vec![400, 0, -400, 0, 400]);
}

#[test]
fn test_override_applies_to_sessions_opened_later() {
    let (controller, _, backend) = setup();
    controller.handle_event(Event::SetOverrideBands {
        bands: vec![-3.0, -3.0],
    });
    controller.handle_event(Event::SessionOpened { id: 8 });

    assert_eq!(equalizer_bands(&backend, 8), vec![-300, -300, 0, 0, 0]);
}

#[test]
fn test_override_longer_than_engine_is_truncated() {
    let store = Arc::new(MemoryStore::new());
    let backend = SimulatedBackend::with_equalizer(3, (-1500, 1500));
    let controller = UpdateController::new(store, Arc::new(backend.clone()));
    controller.handle_event(Event::SessionOpened { id: 1 });

    let report = controller.set_override_bands(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    assert_eq!(report.applied, vec![1]);
    assert_eq!(equalizer_bands(&backend, 1), vec![100, 200, 300]);
}

// === Failure Containment ===

#[test]
fn test_eviction_leaves_other_sessions_updated() {
    let (controller, store, backend) = setup();
    for id in [10, 20, 30] {
        controller.handle_event(Event::SessionOpened { id });
    }
    backend.fail_writes(20);
    store.set("speaker", keys::BASS_ENABLE, true);
    store.set("speaker", keys::BASS_STRENGTH, 500);

    let report = controller
        .handle_event(Event::ConfigurationChanged {
            profile: "speaker".to_string(),
        })
        .unwrap();

    assert_eq!(report.evicted, vec![20]);
    assert_eq!(controller.active_sessions(), vec![10, 30]);
    for id in [10, 30] {
        let bass = backend.engine_state(id, EffectKind::BassBoost).unwrap();
        assert!(bass.enabled);
        assert_eq!(bass.strength, 500);
    }
    assert!(backend
        .session_state(20)
        .values()
        .all(|engine| engine.released));
}

#[test]
fn test_evicted_session_can_be_reopened() {
    let (controller, _, backend) = setup();
    controller.handle_event(Event::SessionOpened { id: 3 });
    backend.fail_writes(3);
    controller.resync();
    assert!(controller.active_sessions().is_empty());

    backend.clear_faults();
    controller.handle_event(Event::SessionOpened { id: 3 });
    assert_eq!(controller.active_sessions(), vec![3]);
    assert_eq!(backend.live_engines(), 4);
}

#[test]
fn test_unavailable_engine_drops_only_that_session() {
    let (controller, _, backend) = setup();
    backend.fail_create(2, EffectKind::Virtualizer);
    for id in [1, 2, 3] {
        controller.handle_event(Event::SessionOpened { id });
    }

    assert_eq!(controller.active_sessions(), vec![1, 3]);
    assert_eq!(backend.live_engines(), 8);
}

// === Event Queue ===

#[test]
fn test_queue_preserves_routing_order() {
    let (controller, store, backend) = setup();
    store.set("speaker", keys::BASS_STRENGTH, 100);
    store.set("headset", keys::BASS_STRENGTH, 200);
    let queue = EventQueue::spawn(controller.clone()).unwrap();

    queue.submit(Event::SessionOpened { id: 1 }).unwrap();
    for connected in [true, false, true] {
        queue.submit(Event::WiredPlug { connected }).unwrap();
    }
    queue.flush().unwrap();

    assert_eq!(controller.profile(), RoutingProfile::Headset);
    assert_eq!(backend.engine_state(1, EffectKind::BassBoost).unwrap().strength, 200);
}

#[test]
fn test_queue_survives_inverted_band_range() {
    let store = Arc::new(MemoryStore::new());
    let backend = SimulatedBackend::with_equalizer(5, (100, -100));
    let controller = Arc::new(UpdateController::new(store, Arc::new(backend.clone())));
    let queue = EventQueue::spawn(controller.clone()).unwrap();

    queue.submit(Event::SessionOpened { id: 1 }).unwrap();
    queue.flush().unwrap();
    assert!(controller.active_sessions().is_empty());
    assert_eq!(backend.live_engines(), 0);

    queue.submit(Event::WiredPlug { connected: true }).unwrap();
    queue.flush().unwrap();
    assert_eq!(controller.profile(), RoutingProfile::Headset);
}
