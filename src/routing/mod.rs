//! Output Routing Detection
//!
//! Tracks whether a wired or Bluetooth headset is connected and derives the
//! routing profile whose settings should be active.
//!
//! There is no reliable way to observe the final output route, so it is
//! inferred from plug and connection events, with "becoming noisy"
//! notifications resampling the platform's own view.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bluetooth class-of-device code for headphones
pub const CLASS_HEADPHONES: u32 = 0x0418;

/// Bluetooth class-of-device code for a wearable headset
pub const CLASS_WEARABLE_HEADSET: u32 = 0x0404;

/// Bluetooth device class of a connecting or disconnecting device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    Headphones,
    WearableHeadset,
    Other(u32),
}

impl DeviceClass {
    /// Map a raw class-of-device code
    pub fn from_code(code: u32) -> Self {
        match code {
            CLASS_HEADPHONES => DeviceClass::Headphones,
            CLASS_WEARABLE_HEADSET => DeviceClass::WearableHeadset,
            other => DeviceClass::Other(other),
        }
    }

    /// Whether audio is routed to this device when it connects
    pub fn is_headset(&self) -> bool {
        matches!(self, DeviceClass::Headphones | DeviceClass::WearableHeadset)
    }
}

/// Routing profile selecting a configuration bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingProfile {
    Bluetooth,
    Headset,
    #[default]
    Speaker,
}

impl RoutingProfile {
    /// Name of the profile in the configuration store
    pub fn as_str(&self) -> &'static str {
        match self {
            RoutingProfile::Bluetooth => "bluetooth",
            RoutingProfile::Headset => "headset",
            RoutingProfile::Speaker => "speaker",
        }
    }
}

impl fmt::Display for RoutingProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Routing-related notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingEvent {
    /// Wired headset plugged or unplugged
    WiredPlug { connected: bool },
    /// A Bluetooth device connected
    BluetoothConnected { device_class: DeviceClass },
    /// A Bluetooth device disconnected; the class may not be resolvable
    BluetoothDisconnected { device_class: Option<DeviceClass> },
    /// Output is about to change; carries the platform's current view
    ForcedRouteResync {
        wired_connected: bool,
        bluetooth_on: bool,
    },
}

/// Current routing flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoutingState {
    pub wired_headset_connected: bool,
    pub bluetooth_headset_connected: bool,
}

impl RoutingState {
    /// Profile for these flags: Bluetooth wins over wired, wired over speaker
    ///
    /// # Example
    /// ```
    /// use sessionfx::routing::{RoutingProfile, RoutingState};
    /// let state = RoutingState {
    ///     wired_headset_connected: true,
    ///     bluetooth_headset_connected: true,
    /// };
    /// assert_eq!(state.profile(), RoutingProfile::Bluetooth);
    /// ```
    pub fn profile(&self) -> RoutingProfile {
        if self.bluetooth_headset_connected {
            RoutingProfile::Bluetooth
        } else if self.wired_headset_connected {
            RoutingProfile::Headset
        } else {
            RoutingProfile::Speaker
        }
    }
}

/// Maintains `RoutingState` from routing events
#[derive(Debug, Clone, Default)]
pub struct RoutingDetector {
    state: RoutingState,
}

impl RoutingDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a known platform state
    pub fn with_state(state: RoutingState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> RoutingState {
        self.state
    }

    pub fn profile(&self) -> RoutingProfile {
        self.state.profile()
    }

    /// Apply an event, returning whether either flag changed
    pub fn handle_routing_event(&mut self, event: RoutingEvent) -> bool {
        let previous = self.state;

        match event {
            RoutingEvent::WiredPlug { connected } => {
                self.state.wired_headset_connected = connected;
            }
            RoutingEvent::BluetoothConnected { device_class } => {
                if device_class.is_headset() {
                    self.state.bluetooth_headset_connected = true;
                } else {
                    debug!("Ignoring Bluetooth connect of {:?}", device_class);
                }
            }
            RoutingEvent::BluetoothDisconnected { device_class } => match device_class {
                Some(class) if class.is_headset() => {
                    self.state.bluetooth_headset_connected = false;
                }
                Some(class) => debug!("Ignoring Bluetooth disconnect of {:?}", class),
                None => debug!("Ignoring Bluetooth disconnect without device class"),
            },
            RoutingEvent::ForcedRouteResync {
                wired_connected,
                bluetooth_on,
            } => {
                self.state = RoutingState {
                    wired_headset_connected: wired_connected,
                    bluetooth_headset_connected: bluetooth_on,
                };
            }
        }

        info!(
            "Headset={}; Bluetooth={}",
            self.state.wired_headset_connected, self.state.bluetooth_headset_connected
        );
        self.state != previous
    }
}
