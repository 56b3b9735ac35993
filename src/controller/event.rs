//! Inbound events
//!
//! Everything that can change which parameters sessions should carry.
//! Events are serde-tagged so recorded event scripts can be replayed.

use serde::{Deserialize, Serialize};

use crate::routing::{DeviceClass, RoutingEvent};
use crate::session::SessionId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SessionOpened {
        id: SessionId,
    },
    SessionClosed {
        id: SessionId,
    },
    WiredPlug {
        connected: bool,
    },
    BluetoothConnected {
        device_class: DeviceClass,
    },
    BluetoothDisconnected {
        #[serde(default)]
        device_class: Option<DeviceClass>,
    },
    ForcedRouteResync {
        wired_connected: bool,
        bluetooth_on: bool,
    },
    ConfigurationChanged {
        profile: String,
    },
    /// Preview equalizer bands (dB) on every session without persisting them
    SetOverrideBands {
        bands: Vec<f32>,
    },
    ClearOverride,
}

impl Event {
    /// The routing part of this event, if it is one
    pub fn routing_event(&self) -> Option<RoutingEvent> {
        match *self {
            Event::WiredPlug { connected } => Some(RoutingEvent::WiredPlug { connected }),
            Event::BluetoothConnected { device_class } => {
                Some(RoutingEvent::BluetoothConnected { device_class })
            }
            Event::BluetoothDisconnected { device_class } => {
                Some(RoutingEvent::BluetoothDisconnected { device_class })
            }
            Event::ForcedRouteResync {
                wired_connected,
                bluetooth_on,
            } => Some(RoutingEvent::ForcedRouteResync {
                wired_connected,
                bluetooth_on,
            }),
            _ => None,
        }
    }
}
