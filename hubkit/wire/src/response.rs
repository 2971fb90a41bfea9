//! Response bodies and their binary decoding.
//!
//! Decoding is total: a frame whose type byte is not in the downstream
//! catalog is skipped by the stream decoder, and a recognized frame whose
//! body fails structural validation becomes [`ResponseBody::Unknown`] so the
//! stream keeps making progress.

use crate::bitset::{decode_mask, ModeSet};
use crate::message::{
    AlertKind, AlertOperation, DeviceKind, ErrorCode, HubAction, IoEvent, ModeInformationKind,
    NetworkUpdate, PortCapabilities, PortInformationKind, PropertyKind, PropertyOperation,
};
use crate::value::{DatasetKind, ValueFormat};
use crate::version::Version;
use bitflags::bitflags;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

bitflags! {
    /// Output command feedback bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct FeedbackFlags: u8 {
        /// Buffer empty, command in progress
        const IN_PROGRESS = 0x01;
        /// Buffer empty, command completed
        const COMPLETED = 0x02;
        /// Current command(s) discarded
        const DISCARDED = 0x04;
        /// Port idle
        const IDLE = 0x08;
        /// Buffer full, port busy
        const BUSY = 0x10;
    }
}

/// Attachment lifecycle events for a port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IoAttachmentEvent {
    /// A device was attached
    Attached {
        /// Port id
        port: u8,
        /// Attached device type
        device: DeviceKind,
        /// Hardware revision of the device
        hw_version: Version,
        /// Software revision of the device
        sw_version: Version,
    },
    /// A virtual device spanning two ports was attached
    AttachedVirtual {
        /// Virtual port id
        port: u8,
        /// Attached device type
        device: DeviceKind,
        /// First constituent port id
        first: u8,
        /// Second constituent port id
        second: u8,
    },
    /// The device was detached
    Detached {
        /// Port id
        port: u8,
    },
}

impl IoAttachmentEvent {
    /// Port the event concerns.
    pub fn port(&self) -> u8 {
        match self {
            IoAttachmentEvent::Attached { port, .. }
            | IoAttachmentEvent::AttachedVirtual { port, .. }
            | IoAttachmentEvent::Detached { port } => *port,
        }
    }
}

/// Payload of a port information update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortInformationPayload {
    /// Capabilities and declared modes
    ModeInfo {
        /// Capability flags
        capabilities: PortCapabilities,
        /// Total number of modes
        mode_count: u8,
        /// Modes usable as inputs, ascending
        input_modes: ModeSet,
        /// Modes usable as outputs, ascending
        output_modes: ModeSet,
    },
    /// Mode combinations the port can report together
    PossibleCombinations {
        /// Each list holds the modes of one combination, ascending
        combinations: Vec<ModeSet>,
    },
}

impl PortInformationPayload {
    /// The request selector this payload answers.
    pub fn kind(&self) -> PortInformationKind {
        match self {
            PortInformationPayload::ModeInfo { .. } => PortInformationKind::ModeInfo,
            PortInformationPayload::PossibleCombinations { .. } => {
                PortInformationKind::PossibleCombinations
            }
        }
    }
}

/// Payload of a port mode information update.
#[derive(Debug, Clone, PartialEq)]
pub enum ModeInformationPayload {
    /// Mode name
    Name(String),
    /// Raw value range
    Raw {
        /// Lower bound
        min: f32,
        /// Upper bound
        max: f32,
    },
    /// Percent value range
    Pct {
        /// Lower bound
        min: f32,
        /// Upper bound
        max: f32,
    },
    /// SI value range
    Si {
        /// Lower bound
        min: f32,
        /// Upper bound
        max: f32,
    },
    /// Unit symbol
    Symbol(String),
    /// Input/output mapping flags
    Mapping {
        /// Input mapping flags
        input: u8,
        /// Output mapping flags
        output: u8,
    },
    /// Motor bias percentage
    MotorBias(u8),
    /// Sensor capability bits
    CapabilityBits([u8; 6]),
    /// Dataset count, type, and display format
    ValueFormat(ValueFormat),
}

impl ModeInformationPayload {
    /// The request selector this payload answers.
    pub fn kind(&self) -> ModeInformationKind {
        match self {
            ModeInformationPayload::Name(_) => ModeInformationKind::Name,
            ModeInformationPayload::Raw { .. } => ModeInformationKind::Raw,
            ModeInformationPayload::Pct { .. } => ModeInformationKind::Pct,
            ModeInformationPayload::Si { .. } => ModeInformationKind::Si,
            ModeInformationPayload::Symbol(_) => ModeInformationKind::Symbol,
            ModeInformationPayload::Mapping { .. } => ModeInformationKind::Mapping,
            ModeInformationPayload::MotorBias(_) => ModeInformationKind::MotorBias,
            ModeInformationPayload::CapabilityBits(_) => ModeInformationKind::CapabilityBits,
            ModeInformationPayload::ValueFormat(_) => ModeInformationKind::ValueFormat,
        }
    }
}

/// The closed set of response bodies.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Hub property update (0x01)
    Properties {
        /// Property selector
        property: PropertyKind,
        /// Operation, `Update` for unsolicited and requested updates
        operation: PropertyOperation,
        /// Property value bytes
        payload: Bytes,
    },
    /// Hub action notice (0x02)
    Action(HubAction),
    /// Hub alert update (0x03)
    Alert {
        /// Alert selector
        alert: AlertKind,
        /// Operation byte, `Update` for downstream traffic
        operation: AlertOperation,
        /// Alert status bytes (0x00 = ok)
        payload: Bytes,
    },
    /// Attached I/O notification (0x04)
    AttachedIo(IoAttachmentEvent),
    /// Generic command feedback (0x05)
    Feedback {
        /// Message type byte of the command this feedback answers
        command: u8,
        /// Feedback code
        error: ErrorCode,
    },
    /// Hardware network update (0x08)
    Network(NetworkUpdate),
    /// Firmware lock status (0x13)
    LockStatus {
        /// Whether firmware memory is locked
        locked: bool,
    },
    /// Port information update (0x43)
    PortInformation {
        /// Port id
        port: u8,
        /// Decoded payload
        info: PortInformationPayload,
    },
    /// Port mode information update (0x44)
    PortModeInformation {
        /// Port id
        port: u8,
        /// Mode id
        mode: u8,
        /// Decoded payload
        info: ModeInformationPayload,
    },
    /// Single-mode port value update (0x45)
    PortValueSingle {
        /// Port id
        port: u8,
        /// Raw value bytes, decoded against the subscribed mode's format
        payload: Bytes,
    },
    /// Combined-mode port value update (0x46)
    PortValueCombined {
        /// Port id
        port: u8,
        /// Entry indices present in this update, ascending
        entries: ModeSet,
        /// Packed value bytes
        payload: Bytes,
    },
    /// Single-mode input format echo (0x47)
    InputFormatSingle {
        /// Port id
        port: u8,
        /// Mode id
        mode: u8,
        /// Delta threshold in effect
        delta: u32,
        /// Whether notifications are enabled
        notify: bool,
    },
    /// Combined-mode input format echo (0x48)
    InputFormatCombined {
        /// Port id
        port: u8,
        /// Combination index and control flags in effect
        control: u8,
        /// Dataset indices in effect, ascending
        datasets: ModeSet,
    },
    /// Output command feedback (0x81)
    OutputFeedback {
        /// (port, feedback) pairs, one per reporting port
        feedback: SmallVec<[(u8, FeedbackFlags); 4]>,
    },
    /// Recognized message type whose body failed structural validation
    Unknown {
        /// Message type byte
        message_type: u8,
        /// Undecoded body bytes
        payload: Bytes,
    },
}

impl ResponseBody {
    /// Decode the body of a recognized downstream frame.
    ///
    /// Returns `None` when `message_type` is not a downstream type (the
    /// caller skips the frame); structural failures inside a recognized type
    /// yield [`ResponseBody::Unknown`].
    pub(crate) fn decode_frame(message_type: u8, payload: Bytes) -> Option<ResponseBody> {
        let decoded = match message_type {
            0x01 => decode_properties(&payload),
            0x02 => decode_action(&payload),
            0x03 => decode_alert(&payload),
            0x04 => decode_attached_io(&payload),
            0x05 => decode_feedback(&payload),
            0x08 => decode_network(&payload),
            0x13 => Some(decode_lock_status(&payload)),
            0x43 => decode_port_information(&payload),
            0x44 => decode_port_mode_information(&payload),
            0x45 => decode_port_value_single(&payload),
            0x46 => decode_port_value_combined(&payload),
            0x47 => decode_input_format_single(&payload),
            0x48 => decode_input_format_combined(&payload),
            0x81 => decode_output_feedback(&payload),
            _ => return None,
        };

        Some(decoded.unwrap_or(ResponseBody::Unknown {
            message_type,
            payload,
        }))
    }
}

fn decode_properties(payload: &Bytes) -> Option<ResponseBody> {
    let property = PropertyKind::try_from(*payload.first()?).ok()?;
    let operation = PropertyOperation::try_from(*payload.get(1)?).ok()?;
    Some(ResponseBody::Properties {
        property,
        operation,
        payload: payload.slice(2..),
    })
}

fn decode_action(payload: &Bytes) -> Option<ResponseBody> {
    let action = HubAction::try_from(*payload.first()?).ok()?;
    Some(ResponseBody::Action(action))
}

fn decode_alert(payload: &Bytes) -> Option<ResponseBody> {
    let alert = AlertKind::try_from(*payload.first()?).ok()?;
    let operation = payload
        .get(1)
        .map_or(Ok(AlertOperation::Update), |b| AlertOperation::try_from(*b))
        .ok()?;
    Some(ResponseBody::Alert {
        alert,
        operation,
        payload: payload.slice(payload.len().min(2)..),
    })
}

fn decode_attached_io(payload: &Bytes) -> Option<ResponseBody> {
    let port = *payload.first()?;
    let event = IoEvent::try_from(*payload.get(1)?).ok()?;

    let event = match event {
        IoEvent::Detached => IoAttachmentEvent::Detached { port },
        IoEvent::Attached => {
            if payload.len() < 12 {
                return None;
            }
            let device = DeviceKind::from_raw(u16::from_le_bytes([payload[2], payload[3]]));
            let hw_version =
                Version::from_le_bytes([payload[4], payload[5], payload[6], payload[7]]);
            let sw_version =
                Version::from_le_bytes([payload[8], payload[9], payload[10], payload[11]]);
            IoAttachmentEvent::Attached {
                port,
                device,
                hw_version,
                sw_version,
            }
        }
        IoEvent::AttachedVirtual => {
            if payload.len() < 6 {
                return None;
            }
            let device = DeviceKind::from_raw(u16::from_le_bytes([payload[2], payload[3]]));
            IoAttachmentEvent::AttachedVirtual {
                port,
                device,
                first: payload[4],
                second: payload[5],
            }
        }
    };

    Some(ResponseBody::AttachedIo(event))
}

fn decode_feedback(payload: &Bytes) -> Option<ResponseBody> {
    let command = *payload.first()?;
    let error = ErrorCode::try_from(*payload.get(1)?).ok()?;
    Some(ResponseBody::Feedback { command, error })
}

fn decode_network(payload: &Bytes) -> Option<ResponseBody> {
    let command = *payload.first()?;
    let update = match command {
        0x02 => NetworkUpdate::ConnectionRequest {
            pressed: *payload.get(1)? != 0,
        },
        0x05 => NetworkUpdate::JoinDenied,
        0x07 => NetworkUpdate::Family(*payload.get(1)?),
        0x09 => NetworkUpdate::Subfamily(*payload.get(1)?),
        0x0C => NetworkUpdate::ExtendedFamily(*payload.get(1)?),
        _ => return None,
    };
    Some(ResponseBody::Network(update))
}

fn decode_lock_status(payload: &Bytes) -> ResponseBody {
    // 0xFF reports unlocked; any other value, or an empty body, is locked.
    ResponseBody::LockStatus {
        locked: payload.first().map_or(true, |b| *b != 0xFF),
    }
}

fn decode_port_information(payload: &Bytes) -> Option<ResponseBody> {
    let port = *payload.first()?;
    let kind = PortInformationKind::try_from(*payload.get(1)?).ok()?;

    let info = match kind {
        PortInformationKind::ModeInfo => {
            if payload.len() < 8 {
                return None;
            }
            PortInformationPayload::ModeInfo {
                capabilities: PortCapabilities::from_bits_truncate(payload[2]),
                mode_count: payload[3],
                input_modes: decode_mask(u16::from_le_bytes([payload[4], payload[5]])),
                output_modes: decode_mask(u16::from_le_bytes([payload[6], payload[7]])),
            }
        }
        PortInformationKind::PossibleCombinations => {
            let rest = &payload[2..];
            if rest.len() % 2 != 0 {
                return None;
            }
            let combinations = rest
                .chunks_exact(2)
                .map(|pair| decode_mask(u16::from_le_bytes([pair[0], pair[1]])))
                .collect();
            PortInformationPayload::PossibleCombinations { combinations }
        }
    };

    Some(ResponseBody::PortInformation { port, info })
}

fn decode_ascii(bytes: &[u8]) -> Option<String> {
    let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
    std::str::from_utf8(&bytes[..end]).ok().map(str::to_owned)
}

fn decode_range(bytes: &[u8]) -> Option<(f32, f32)> {
    if bytes.len() < 8 {
        return None;
    }
    let min = f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let max = f32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    Some((min, max))
}

fn decode_port_mode_information(payload: &Bytes) -> Option<ResponseBody> {
    let port = *payload.first()?;
    let mode = *payload.get(1)?;
    let kind = ModeInformationKind::try_from(*payload.get(2)?).ok()?;
    let rest = &payload[3..];

    let info = match kind {
        ModeInformationKind::Name => ModeInformationPayload::Name(decode_ascii(rest)?),
        ModeInformationKind::Raw => {
            let (min, max) = decode_range(rest)?;
            ModeInformationPayload::Raw { min, max }
        }
        ModeInformationKind::Pct => {
            let (min, max) = decode_range(rest)?;
            ModeInformationPayload::Pct { min, max }
        }
        ModeInformationKind::Si => {
            let (min, max) = decode_range(rest)?;
            ModeInformationPayload::Si { min, max }
        }
        ModeInformationKind::Symbol => ModeInformationPayload::Symbol(decode_ascii(rest)?),
        ModeInformationKind::Mapping => ModeInformationPayload::Mapping {
            input: *rest.first()?,
            output: *rest.get(1)?,
        },
        ModeInformationKind::MotorBias => ModeInformationPayload::MotorBias(*rest.first()?),
        ModeInformationKind::CapabilityBits => {
            let bits: [u8; 6] = rest.get(..6)?.try_into().ok()?;
            ModeInformationPayload::CapabilityBits(bits)
        }
        ModeInformationKind::ValueFormat => {
            if rest.len() < 4 {
                return None;
            }
            ModeInformationPayload::ValueFormat(ValueFormat {
                datasets: rest[0],
                dataset_kind: DatasetKind::try_from(rest[1]).ok()?,
                figures: rest[2],
                decimals: rest[3],
            })
        }
    };

    Some(ResponseBody::PortModeInformation { port, mode, info })
}

fn decode_port_value_single(payload: &Bytes) -> Option<ResponseBody> {
    let port = *payload.first()?;
    Some(ResponseBody::PortValueSingle {
        port,
        payload: payload.slice(1..),
    })
}

fn decode_port_value_combined(payload: &Bytes) -> Option<ResponseBody> {
    if payload.len() < 3 {
        return None;
    }
    Some(ResponseBody::PortValueCombined {
        port: payload[0],
        entries: decode_mask(u16::from_le_bytes([payload[1], payload[2]])),
        payload: payload.slice(3..),
    })
}

fn decode_input_format_single(payload: &Bytes) -> Option<ResponseBody> {
    if payload.len() < 7 {
        return None;
    }
    Some(ResponseBody::InputFormatSingle {
        port: payload[0],
        mode: payload[1],
        delta: u32::from_le_bytes([payload[2], payload[3], payload[4], payload[5]]),
        notify: payload[6] != 0,
    })
}

fn decode_input_format_combined(payload: &Bytes) -> Option<ResponseBody> {
    if payload.len() < 4 {
        return None;
    }
    Some(ResponseBody::InputFormatCombined {
        port: payload[0],
        control: payload[1],
        datasets: decode_mask(u16::from_le_bytes([payload[2], payload[3]])),
    })
}

fn decode_output_feedback(payload: &Bytes) -> Option<ResponseBody> {
    if payload.is_empty() || payload.len() % 2 != 0 {
        return None;
    }
    let feedback = payload
        .chunks_exact(2)
        .map(|pair| (pair[0], FeedbackFlags::from_bits_truncate(pair[1])))
        .collect();
    Some(ResponseBody::OutputFeedback { feedback })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(message_type: u8, payload: &'static [u8]) -> ResponseBody {
        ResponseBody::decode_frame(message_type, Bytes::from_static(payload))
            .expect("recognized type")
    }

    #[test]
    fn test_attach_decode() {
        let body = decode(
            0x04,
            &[0x00, 0x01, 0x25, 0x00, 0x00, 0x00, 0x00, 0x10, 0x00, 0x00, 0x00, 0x10],
        );
        match body {
            ResponseBody::AttachedIo(IoAttachmentEvent::Attached {
                port,
                device,
                hw_version,
                ..
            }) => {
                assert_eq!(port, 0);
                assert_eq!(device, DeviceKind::VisionSensor);
                assert_eq!(hw_version.major, 1);
            }
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn test_virtual_attach_decode() {
        let body = decode(0x04, &[0x10, 0x02, 0x27, 0x00, 0x00, 0x01]);
        assert_eq!(
            body,
            ResponseBody::AttachedIo(IoAttachmentEvent::AttachedVirtual {
                port: 0x10,
                device: DeviceKind::InternalMotorWithTacho,
                first: 0x00,
                second: 0x01,
            })
        );
    }

    #[test]
    fn test_detach_decode() {
        let body = decode(0x04, &[0x01, 0x00]);
        assert_eq!(
            body,
            ResponseBody::AttachedIo(IoAttachmentEvent::Detached { port: 1 })
        );
    }

    #[test]
    fn test_truncated_attach_degrades_to_unknown() {
        let body = decode(0x04, &[0x00, 0x01, 0x25]);
        assert!(matches!(
            body,
            ResponseBody::Unknown {
                message_type: 0x04,
                ..
            }
        ));
    }

    #[test]
    fn test_lock_status_rule() {
        assert_eq!(decode(0x13, &[]), ResponseBody::LockStatus { locked: true });
        assert_eq!(
            decode(0x13, &[0xFF]),
            ResponseBody::LockStatus { locked: false }
        );
        assert_eq!(
            decode(0x13, &[0x00]),
            ResponseBody::LockStatus { locked: true }
        );
    }

    #[test]
    fn test_port_information_mode_info() {
        let body = decode(0x43, &[0x01, 0x01, 0x0F, 0x02, 0x03, 0x00, 0x01, 0x00]);
        match body {
            ResponseBody::PortInformation {
                port,
                info:
                    PortInformationPayload::ModeInfo {
                        capabilities,
                        mode_count,
                        input_modes,
                        output_modes,
                    },
            } => {
                assert_eq!(port, 1);
                assert!(capabilities.contains(PortCapabilities::COMBINABLE));
                assert_eq!(mode_count, 2);
                assert_eq!(input_modes.as_slice(), &[0, 1]);
                assert_eq!(output_modes.as_slice(), &[0]);
            }
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn test_port_information_combinations() {
        let body = decode(0x43, &[0x01, 0x02, 0x03, 0x00, 0x05, 0x00]);
        match body {
            ResponseBody::PortInformation {
                info: PortInformationPayload::PossibleCombinations { combinations },
                ..
            } => {
                assert_eq!(combinations.len(), 2);
                assert_eq!(combinations[0].as_slice(), &[0, 1]);
                assert_eq!(combinations[1].as_slice(), &[0, 2]);
            }
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn test_mode_name_decode() {
        let body = decode(0x44, &[0x00, 0x02, 0x00, b'S', b'P', b'E', b'E', b'D', 0, 0]);
        assert_eq!(
            body,
            ResponseBody::PortModeInformation {
                port: 0,
                mode: 2,
                info: ModeInformationPayload::Name("SPEED".to_owned()),
            }
        );
    }

    #[test]
    fn test_value_format_decode() {
        let body = decode(0x44, &[0x00, 0x02, 0x80, 1, 0x01, 4, 0]);
        assert_eq!(
            body,
            ResponseBody::PortModeInformation {
                port: 0,
                mode: 2,
                info: ModeInformationPayload::ValueFormat(ValueFormat {
                    datasets: 1,
                    dataset_kind: DatasetKind::Int16,
                    figures: 4,
                    decimals: 0,
                }),
            }
        );
    }

    #[test]
    fn test_output_feedback_decode() {
        let body = decode(0x81, &[0x00, 0x0A, 0x01, 0x02]);
        match body {
            ResponseBody::OutputFeedback { feedback } => {
                assert_eq!(feedback.len(), 2);
                assert_eq!(feedback[0].0, 0x00);
                assert!(feedback[0].1.contains(FeedbackFlags::COMPLETED));
                assert!(feedback[0].1.contains(FeedbackFlags::IDLE));
                assert_eq!(feedback[1], (0x01, FeedbackFlags::COMPLETED));
            }
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn test_request_only_type_is_unrecognized() {
        assert!(ResponseBody::decode_frame(0x21, Bytes::from_static(&[0x00, 0x01])).is_none());
        assert!(ResponseBody::decode_frame(0x7E, Bytes::new()).is_none());
    }
}
