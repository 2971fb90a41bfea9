//! Per-hub request serialization and response correlation for hubkit.
//!
//! The protocol has no native request ids: correlation works by keeping at
//! most one request in flight per hub and matching inbound responses against
//! it structurally. This crate provides the transport seam, the per-kind
//! response policies, and the serializing transmission queue task.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod policy;
pub mod queue;
pub mod transport;

// Re-export main types
pub use policy::{expects_response, matches_response};
pub use queue::{QueueConfig, QueueError, QueueHandle, QueueStats, TransmissionQueue};
pub use transport::{Transport, TransportError};
