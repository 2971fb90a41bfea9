//! Port and device model for hubkit.
//!
//! This crate models the hardware ports a hub exposes: the multi-step
//! asynchronous bring-up that accumulates port and mode metadata, value
//! subscriptions (single-mode and combined), value decoding against resolved
//! mode formats, and virtual two-port composites.
//!
//! The model is deliberately synchronous: handlers consume decoded response
//! payloads and return follow-up query plans. The hub layer owns the
//! transmission of those queries and feeds resolutions back in.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod mode;
pub mod port;
pub mod subscription;
pub mod value;
pub mod virtual_port;

// Re-export main types
pub use mode::{ModeMapping, PortModeInformation, ValueRange};
pub use port::{
    Port, PortInformation, PortQuery, PortSetupConfig, PortStatus, QueryOutcome,
};
pub use subscription::{
    resolve_combination_index, CombinedEntry, CombinedSubscription, SingleSubscription,
    SubscriptionError, ValueSubscription,
};
pub use value::PortValue;
pub use virtual_port::VirtualPortKind;
