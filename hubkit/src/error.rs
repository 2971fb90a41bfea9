//! Hub-level error types.

use hubkit_port::SubscriptionError;
use hubkit_queue::QueueError;
use hubkit_wire::ErrorCode;
use thiserror::Error;

/// Errors surfaced by the hub API and the hub-level error sink.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HubError {
    /// The named port is not in the port table
    #[error("port 0x{0:02x} is not registered")]
    UnknownPort(u8),

    /// The named port failed bring-up
    #[error("port 0x{0:02x} failed bring-up")]
    PortFailed(u8),

    /// The named port is not a virtual port
    #[error("port 0x{0:02x} is not a virtual port")]
    NotVirtual(u8),

    /// A virtual attach named a constituent that is not registered
    #[error("virtual port 0x{port:02x} names unregistered constituent 0x{constituent:02x}")]
    MissingConstituent {
        /// Virtual port id
        port: u8,
        /// Unregistered constituent port id
        constituent: u8,
    },

    /// Subscription request failed validation
    #[error(transparent)]
    Subscription(#[from] SubscriptionError),

    /// The hub reported negative protocol feedback
    #[error("hub feedback for command 0x{command:02x}: {error:?}")]
    Protocol {
        /// Message type byte of the command the feedback answers
        command: u8,
        /// Feedback code
        error: ErrorCode,
    },

    /// The transmission queue failed the request
    #[error(transparent)]
    Queue(#[from] QueueError),

    /// The hub task is gone
    #[error("hub task closed")]
    Closed,
}
