//! Protocol engine for BLE-controlled robotics hubs.
//!
//! hubkit implements the length-prefixed binary request/response protocol
//! used to discover, configure, and drive hardware ports (motors, sensors,
//! lights) attached to a hub. BLE itself stays outside: the host application
//! provides a [`queue::Transport`] for writes and feeds inbound notification
//! chunks to the [`HubHandle`].
//!
//! ## Components
//!
//! - [`wire`] — request encoding, buffering response decoder, message catalog
//! - [`port`] — port/device model, bring-up state machine, subscriptions
//! - [`queue`] — per-hub request serialization and response correlation
//! - [`Hub`] — owns the port table, dispatches inbound traffic, drives
//!   bring-up and subscription sequences
//! - [`HubRegistry`] — explicit registry of hubs keyed by device identifier
//!
//! ## Example
//!
//! ```rust,no_run
//! use hubkit::{Hub, HubConfig, HubEvent};
//! use hubkit_queue::{Transport, TransportError};
//! use async_trait::async_trait;
//! use bytes::Bytes;
//! use std::sync::Arc;
//!
//! struct BleWriter; // wraps the host BLE stack
//!
//! #[async_trait]
//! impl Transport for BleWriter {
//!     async fn write(&self, _frame: Bytes) -> Result<(), TransportError> {
//!         Ok(())
//!     }
//! }
//!
//! # async fn example() -> anyhow::Result<()> {
//! let (hub, mut events) = Hub::spawn(
//!     uuid::Uuid::new_v4(),
//!     Arc::new(BleWriter),
//!     HubConfig::default(),
//! );
//! hub.startup().await?;
//!
//! // Feed BLE notifications as they arrive:
//! hub.notify(&[3u8, 0x00, 0x13][..])?;
//!
//! while let Some(event) = events.recv().await {
//!     match event {
//!         HubEvent::PortAdded { port, device } => {
//!             println!("port {port:#04x} attached: {device:?}");
//!         }
//!         HubEvent::PortReady { port } => println!("port {port:#04x} ready"),
//!         other => println!("{other:?}"),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod event;
pub mod hub;
pub mod registry;

/// Port and device model.
pub use hubkit_port as port;
/// Transmission queue and transport seam.
pub use hubkit_queue as queue;
/// Wire codec and message catalog.
pub use hubkit_wire as wire;

// Re-export main types
pub use config::HubConfig;
pub use error::HubError;
pub use event::{HubEvent, PropertyValue};
pub use hub::{Hub, HubHandle, HubSnapshot};
pub use registry::HubRegistry;
