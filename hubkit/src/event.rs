//! Events emitted by a hub.

use crate::error::HubError;
use bytes::Bytes;
use hubkit_port::PortValue;
use hubkit_wire::{AlertKind, DeviceKind, FeedbackFlags, HubAction, PropertyKind, Version};

/// Parsed hub property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Text property (names)
    Text(String),
    /// Boolean property (button state)
    Bool(bool),
    /// Packed version property
    Version(Version),
    /// Signal strength in dBm
    Rssi(i8),
    /// Percentage (battery charge)
    Percentage(u8),
    /// Anything this engine does not parse further
    Raw(Bytes),
}

/// Events emitted by a hub.
///
/// The port callbacks of the protocol surface here as an event stream; the
/// `Error` variant is the hub-level sink for failures not tied to a caller.
#[derive(Debug, Clone, PartialEq)]
pub enum HubEvent {
    /// A port was created from an attach notification
    PortAdded {
        /// Port id
        port: u8,
        /// Attached device type
        device: DeviceKind,
    },
    /// A port was destroyed by a detach notification
    PortRemoved {
        /// Port id
        port: u8,
    },
    /// A port finished bring-up successfully
    PortReady {
        /// Port id
        port: u8,
    },
    /// A port failed bring-up; terminal
    PortFailed {
        /// Port id
        port: u8,
    },
    /// A port decoded new values
    PortUpdated {
        /// Port id
        port: u8,
        /// The values this update carried
        values: Vec<PortValue>,
    },
    /// Output command feedback for a port
    OutputFeedback {
        /// Port id
        port: u8,
        /// Feedback bits
        feedback: FeedbackFlags,
    },
    /// A hub property update arrived and was cached
    PropertyUpdated {
        /// Property selector
        property: PropertyKind,
        /// Parsed value
        value: PropertyValue,
    },
    /// An alert update arrived
    Alert {
        /// Alert selector
        alert: AlertKind,
        /// Whether the alert condition is active
        active: bool,
    },
    /// The hub announced an action (about to switch off, disconnect, ...)
    ActionNotice(HubAction),
    /// Hub-level error sink
    Error(HubError),
}
