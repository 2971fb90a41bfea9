//! Wire protocol framing, message catalog, and encoding/decoding for hubkit.
//!
//! This crate implements the length-prefixed binary request/response protocol
//! spoken by BLE-controlled robotics hubs: request encoding for every upstream
//! message kind, a buffering response decoder that tolerates arbitrary
//! notification fragmentation, and the closed catalog of message bodies.
//!
//! ## Wire Format
//!
//! ```text
//! +----------------------+------------------------------------+
//! | length prefix        | 1 byte (<= 0x7F) or 2 bytes        |
//! |                      | (15-bit length, +127 bias,         |
//! |                      |  high bit of byte 0 set)           |
//! +----------------------+------------------------------------+
//! | hub id               | 1 byte                             |
//! +----------------------+------------------------------------+
//! | message type         | 1 byte                             |
//! +----------------------+------------------------------------+
//! | body                 | type-specific, integers LE         |
//! +----------------------+------------------------------------+
//! ```
//!
//! The length prefix counts the whole frame, prefix included. Decoding never
//! fails: frames with an unrecognized message type are skipped, and frames
//! whose body does not validate decode to [`ResponseBody::Unknown`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bitset;
pub mod error;
pub mod frame;
pub mod message;
pub mod request;
pub mod response;
pub mod value;
pub mod version;

// Re-export main types
pub use bitset::{decode_mask, encode_mask, ModeSet};
pub use error::WireError;
pub use frame::{Request, Response, ResponseDecoder, MAX_FRAME_LEN};
pub use message::{
    AlertKind, AlertOperation, DeviceKind, ErrorCode, HubAction, IoEvent, MessageType,
    ModeInformationKind, NetworkRequest, NetworkUpdate, PortCapabilities, PortInformationKind,
    PropertyKind, PropertyOperation,
};
pub use request::{
    CombinedFormatCommand, OutputCommandFlags, RequestBody, VirtualPortRequest, BOOT_MODE_TOKEN,
    LOCK_MEMORY_TOKEN,
};
pub use response::{
    FeedbackFlags, IoAttachmentEvent, ModeInformationPayload, PortInformationPayload, ResponseBody,
};
pub use value::{DatasetKind, ScalarValue, ValueFormat};
pub use version::Version;
