//! The transport seam.
//!
//! BLE central management, GATT discovery, and characteristic plumbing live
//! outside this engine; the queue only needs a way to hand frame bytes to
//! the peripheral. Inbound notification chunks travel the other way, into
//! the hub's decoder.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Transport-level failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The transport is gone (disconnected, characteristic unavailable)
    #[error("transport unavailable")]
    Unavailable,
    /// The write was attempted and failed
    #[error("write failed: {0}")]
    Write(String),
}

/// Write side of a hub connection.
///
/// Implementations wrap whatever BLE stack the host application uses; the
/// returned future resolves when the write completes or fails.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Hand one encoded frame to the peripheral.
    async fn write(&self, frame: Bytes) -> Result<(), TransportError>;
}
