//! Wire protocol error types.

use thiserror::Error;

/// Wire protocol errors.
///
/// The streaming decode path never surfaces these; they are returned only by
/// explicit encode helpers and body validators.
#[derive(Error, Debug)]
pub enum WireError {
    /// Frame exceeds the maximum encodable length
    #[error("frame length {0} exceeds protocol maximum")]
    FrameTooLong(usize),

    /// Unknown message type byte
    #[error("unknown message type 0x{0:02x}")]
    Type(u8),

    /// Unknown raw value for a protocol enum
    #[error("unknown {kind} value 0x{value:02x}")]
    Code {
        /// Enum the value was decoded for
        kind: &'static str,
        /// Offending raw value
        value: u8,
    },

    /// Body too short for its message type
    #[error("truncated body for message type 0x{0:02x}")]
    Truncated(u8),
}
