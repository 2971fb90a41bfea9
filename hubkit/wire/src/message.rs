//! The closed catalog of protocol enums shared by requests and responses.
//!
//! Raw values follow the public numbering for this hub family. Every enum
//! converts to and from its wire byte; unknown bytes fail conversion so the
//! decoder can degrade to a sentinel body instead of guessing.

use crate::error::WireError;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Message type byte, second byte after the length prefix.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageType {
    /// Hub property operations and updates
    HubProperties = 0x01,
    /// Hub actions (switch off, disconnect, busy indication)
    HubActions = 0x02,
    /// Hub alert operations and updates
    HubAlerts = 0x03,
    /// Attached I/O notifications (attach, attach virtual, detach)
    HubAttachedIo = 0x04,
    /// Generic command feedback and protocol errors
    GenericError = 0x05,
    /// Hardware network commands
    HwNetwork = 0x08,
    /// Firmware: go into boot mode
    FwBootMode = 0x10,
    /// Firmware: lock memory
    FwLockMemory = 0x11,
    /// Firmware: request lock status
    FwLockStatusRequest = 0x12,
    /// Firmware: lock status update
    FwLockStatus = 0x13,
    /// Port information request
    PortInformationRequest = 0x21,
    /// Port mode information request
    PortModeInformationRequest = 0x22,
    /// Single-mode input format setup
    PortInputFormatSetupSingle = 0x41,
    /// Combined-mode input format setup
    PortInputFormatSetupCombined = 0x42,
    /// Port information update
    PortInformation = 0x43,
    /// Port mode information update
    PortModeInformation = 0x44,
    /// Single-mode port value update
    PortValueSingle = 0x45,
    /// Combined-mode port value update
    PortValueCombined = 0x46,
    /// Single-mode input format echo
    PortInputFormatSingle = 0x47,
    /// Combined-mode input format echo
    PortInputFormatCombined = 0x48,
    /// Virtual port setup
    VirtualPortSetup = 0x61,
    /// Port output command (upstream) / output command feedback (downstream)
    PortOutputCommand = 0x81,
}

impl TryFrom<u8> for MessageType {
    type Error = WireError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(MessageType::HubProperties),
            0x02 => Ok(MessageType::HubActions),
            0x03 => Ok(MessageType::HubAlerts),
            0x04 => Ok(MessageType::HubAttachedIo),
            0x05 => Ok(MessageType::GenericError),
            0x08 => Ok(MessageType::HwNetwork),
            0x10 => Ok(MessageType::FwBootMode),
            0x11 => Ok(MessageType::FwLockMemory),
            0x12 => Ok(MessageType::FwLockStatusRequest),
            0x13 => Ok(MessageType::FwLockStatus),
            0x21 => Ok(MessageType::PortInformationRequest),
            0x22 => Ok(MessageType::PortModeInformationRequest),
            0x41 => Ok(MessageType::PortInputFormatSetupSingle),
            0x42 => Ok(MessageType::PortInputFormatSetupCombined),
            0x43 => Ok(MessageType::PortInformation),
            0x44 => Ok(MessageType::PortModeInformation),
            0x45 => Ok(MessageType::PortValueSingle),
            0x46 => Ok(MessageType::PortValueCombined),
            0x47 => Ok(MessageType::PortInputFormatSingle),
            0x48 => Ok(MessageType::PortInputFormatCombined),
            0x61 => Ok(MessageType::VirtualPortSetup),
            0x81 => Ok(MessageType::PortOutputCommand),
            _ => Err(WireError::Type(value)),
        }
    }
}

/// Hub property selector.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyKind {
    /// Advertising name (settable)
    AdvertisingName = 0x01,
    /// Button pressed state
    Button = 0x02,
    /// Firmware version
    FirmwareVersion = 0x03,
    /// Hardware version
    HardwareVersion = 0x04,
    /// Received signal strength indication
    Rssi = 0x05,
    /// Battery charge percentage
    BatteryVoltage = 0x06,
    /// Battery type
    BatteryKind = 0x07,
    /// Manufacturer name
    ManufacturerName = 0x08,
    /// Radio firmware version
    RadioFirmwareVersion = 0x09,
    /// Wireless protocol version
    ProtocolVersion = 0x0A,
    /// System type identifier
    SystemTypeId = 0x0B,
    /// Hardware network identifier
    HwNetworkId = 0x0C,
    /// Primary MAC address
    PrimaryMac = 0x0D,
    /// Secondary MAC address
    SecondaryMac = 0x0E,
    /// Hardware network family
    NetworkFamily = 0x0F,
}

impl TryFrom<u8> for PropertyKind {
    type Error = WireError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(PropertyKind::AdvertisingName),
            0x02 => Ok(PropertyKind::Button),
            0x03 => Ok(PropertyKind::FirmwareVersion),
            0x04 => Ok(PropertyKind::HardwareVersion),
            0x05 => Ok(PropertyKind::Rssi),
            0x06 => Ok(PropertyKind::BatteryVoltage),
            0x07 => Ok(PropertyKind::BatteryKind),
            0x08 => Ok(PropertyKind::ManufacturerName),
            0x09 => Ok(PropertyKind::RadioFirmwareVersion),
            0x0A => Ok(PropertyKind::ProtocolVersion),
            0x0B => Ok(PropertyKind::SystemTypeId),
            0x0C => Ok(PropertyKind::HwNetworkId),
            0x0D => Ok(PropertyKind::PrimaryMac),
            0x0E => Ok(PropertyKind::SecondaryMac),
            0x0F => Ok(PropertyKind::NetworkFamily),
            _ => Err(WireError::Code {
                kind: "property",
                value,
            }),
        }
    }
}

/// Operation byte carried by property requests and updates.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyOperation {
    /// Set the property value
    Set = 0x01,
    /// Enable unsolicited updates
    EnableUpdates = 0x02,
    /// Disable unsolicited updates
    DisableUpdates = 0x03,
    /// Reset to default
    Reset = 0x04,
    /// Request a single update
    RequestUpdate = 0x05,
    /// Update (downstream only)
    Update = 0x06,
}

impl TryFrom<u8> for PropertyOperation {
    type Error = WireError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(PropertyOperation::Set),
            0x02 => Ok(PropertyOperation::EnableUpdates),
            0x03 => Ok(PropertyOperation::DisableUpdates),
            0x04 => Ok(PropertyOperation::Reset),
            0x05 => Ok(PropertyOperation::RequestUpdate),
            0x06 => Ok(PropertyOperation::Update),
            _ => Err(WireError::Code {
                kind: "property operation",
                value,
            }),
        }
    }
}

/// Hub action code.
///
/// Values from 0x30 up are downstream notices the hub emits before acting.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HubAction {
    /// Switch the hub off
    SwitchOff = 0x01,
    /// Disconnect the BLE link
    Disconnect = 0x02,
    /// Enable VCC on ports
    VccPortOn = 0x03,
    /// Disable VCC on ports
    VccPortOff = 0x04,
    /// Activate the busy indication
    ActivateBusy = 0x05,
    /// Reset the busy indication
    ResetBusy = 0x06,
    /// Immediate shutdown without notice
    Shutdown = 0x2F,
    /// Hub is about to switch off
    WillSwitchOff = 0x30,
    /// Hub is about to disconnect
    WillDisconnect = 0x31,
    /// Hub is about to enter boot mode
    WillGoIntoBootMode = 0x32,
}

impl TryFrom<u8> for HubAction {
    type Error = WireError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(HubAction::SwitchOff),
            0x02 => Ok(HubAction::Disconnect),
            0x03 => Ok(HubAction::VccPortOn),
            0x04 => Ok(HubAction::VccPortOff),
            0x05 => Ok(HubAction::ActivateBusy),
            0x06 => Ok(HubAction::ResetBusy),
            0x2F => Ok(HubAction::Shutdown),
            0x30 => Ok(HubAction::WillSwitchOff),
            0x31 => Ok(HubAction::WillDisconnect),
            0x32 => Ok(HubAction::WillGoIntoBootMode),
            _ => Err(WireError::Code {
                kind: "action",
                value,
            }),
        }
    }
}

/// Hub alert selector.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertKind {
    /// Battery voltage low
    LowVoltage = 0x01,
    /// Current draw too high
    HighCurrent = 0x02,
    /// Radio signal weak
    LowSignalStrength = 0x03,
    /// Sustained power draw over limit
    OverPower = 0x04,
}

impl TryFrom<u8> for AlertKind {
    type Error = WireError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(AlertKind::LowVoltage),
            0x02 => Ok(AlertKind::HighCurrent),
            0x03 => Ok(AlertKind::LowSignalStrength),
            0x04 => Ok(AlertKind::OverPower),
            _ => Err(WireError::Code {
                kind: "alert",
                value,
            }),
        }
    }
}

/// Operation byte carried by alert requests and updates.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertOperation {
    /// Enable unsolicited updates
    EnableUpdates = 0x01,
    /// Disable unsolicited updates
    DisableUpdates = 0x02,
    /// Request a single update
    RequestUpdate = 0x03,
    /// Update (downstream only)
    Update = 0x04,
}

impl TryFrom<u8> for AlertOperation {
    type Error = WireError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(AlertOperation::EnableUpdates),
            0x02 => Ok(AlertOperation::DisableUpdates),
            0x03 => Ok(AlertOperation::RequestUpdate),
            0x04 => Ok(AlertOperation::Update),
            _ => Err(WireError::Code {
                kind: "alert operation",
                value,
            }),
        }
    }
}

/// Hardware network request sub-commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkRequest {
    /// Connection request, payload reports button state
    ConnectionRequest {
        /// Whether the hub button is pressed
        pressed: bool,
    },
    /// Request a new family
    FamilyRequest,
    /// Set the family
    FamilySet(u8),
    /// Deny a join attempt
    JoinDenied,
    /// Query the current family
    GetFamily,
    /// Query the current subfamily
    GetSubfamily,
    /// Set the subfamily
    SubfamilySet(u8),
    /// Query the extended family
    GetExtendedFamily,
    /// Set the extended family
    ExtendedFamilySet(u8),
    /// Reset the long-press timer
    ResetLongPress,
}

impl NetworkRequest {
    /// Wire sub-command byte.
    pub fn command(&self) -> u8 {
        match self {
            NetworkRequest::ConnectionRequest { .. } => 0x02,
            NetworkRequest::FamilyRequest => 0x03,
            NetworkRequest::FamilySet(_) => 0x04,
            NetworkRequest::JoinDenied => 0x05,
            NetworkRequest::GetFamily => 0x06,
            NetworkRequest::GetSubfamily => 0x08,
            NetworkRequest::SubfamilySet(_) => 0x0A,
            NetworkRequest::GetExtendedFamily => 0x0B,
            NetworkRequest::ExtendedFamilySet(_) => 0x0D,
            NetworkRequest::ResetLongPress => 0x0E,
        }
    }
}

/// Hardware network updates delivered by the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkUpdate {
    /// Connection request relayed from the hub button
    ConnectionRequest {
        /// Whether the hub button is pressed
        pressed: bool,
    },
    /// Join attempt was denied
    JoinDenied,
    /// Current family
    Family(u8),
    /// Current subfamily
    Subfamily(u8),
    /// Current extended family
    ExtendedFamily(u8),
}

/// Protocol-level feedback codes carried by generic error messages.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    /// Positive acknowledgement
    Ack = 0x01,
    /// Negative acknowledgement
    Nack = 0x02,
    /// Receive buffer overflow
    BufferOverflow = 0x03,
    /// Command timed out inside the hub
    Timeout = 0x04,
    /// Command not recognized
    InvalidCommand = 0x05,
    /// Parameters out of range
    InvalidParameters = 0x06,
    /// Over-current condition
    OverCurrent = 0x07,
    /// Internal firmware error
    InternalError = 0x08,
}

impl TryFrom<u8> for ErrorCode {
    type Error = WireError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(ErrorCode::Ack),
            0x02 => Ok(ErrorCode::Nack),
            0x03 => Ok(ErrorCode::BufferOverflow),
            0x04 => Ok(ErrorCode::Timeout),
            0x05 => Ok(ErrorCode::InvalidCommand),
            0x06 => Ok(ErrorCode::InvalidParameters),
            0x07 => Ok(ErrorCode::OverCurrent),
            0x08 => Ok(ErrorCode::InternalError),
            _ => Err(WireError::Code {
                kind: "error code",
                value,
            }),
        }
    }
}

/// Attachment event byte in attached-I/O notifications.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IoEvent {
    /// Device detached
    Detached = 0x00,
    /// Device attached
    Attached = 0x01,
    /// Virtual device attached
    AttachedVirtual = 0x02,
}

impl TryFrom<u8> for IoEvent {
    type Error = WireError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(IoEvent::Detached),
            0x01 => Ok(IoEvent::Attached),
            0x02 => Ok(IoEvent::AttachedVirtual),
            _ => Err(WireError::Code {
                kind: "io event",
                value,
            }),
        }
    }
}

/// Device type identifier carried by attach notifications.
///
/// The catalog covers the device families this engine special-cases; anything
/// else round-trips through [`DeviceKind::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceKind {
    /// Simple motor without rotation sensing
    Motor,
    /// System train motor
    TrainMotor,
    /// Hub button
    Button,
    /// Simple light
    Light,
    /// Battery voltage sensor
    VoltageSensor,
    /// Current sensor
    CurrentSensor,
    /// Piezo tone speaker
    PiezoTone,
    /// RGB status light
    RgbLight,
    /// External tilt sensor
    ExternalTilt,
    /// Motion/distance sensor
    MotionSensor,
    /// Combined color and distance sensor
    VisionSensor,
    /// External motor with rotation sensing
    ExternalMotorWithTacho,
    /// Internal motor with rotation sensing
    InternalMotorWithTacho,
    /// Internal tilt sensor
    InternalTilt,
    /// Any device this engine does not special-case
    Unknown(u16),
}

impl DeviceKind {
    /// Map the raw 16-bit device type identifier.
    pub fn from_raw(raw: u16) -> Self {
        match raw {
            0x0001 => DeviceKind::Motor,
            0x0002 => DeviceKind::TrainMotor,
            0x0005 => DeviceKind::Button,
            0x0008 => DeviceKind::Light,
            0x0014 => DeviceKind::VoltageSensor,
            0x0015 => DeviceKind::CurrentSensor,
            0x0016 => DeviceKind::PiezoTone,
            0x0017 => DeviceKind::RgbLight,
            0x0022 => DeviceKind::ExternalTilt,
            0x0023 => DeviceKind::MotionSensor,
            0x0025 => DeviceKind::VisionSensor,
            0x0026 => DeviceKind::ExternalMotorWithTacho,
            0x0027 => DeviceKind::InternalMotorWithTacho,
            0x0028 => DeviceKind::InternalTilt,
            other => DeviceKind::Unknown(other),
        }
    }

    /// Raw 16-bit device type identifier.
    pub fn raw(&self) -> u16 {
        match self {
            DeviceKind::Motor => 0x0001,
            DeviceKind::TrainMotor => 0x0002,
            DeviceKind::Button => 0x0005,
            DeviceKind::Light => 0x0008,
            DeviceKind::VoltageSensor => 0x0014,
            DeviceKind::CurrentSensor => 0x0015,
            DeviceKind::PiezoTone => 0x0016,
            DeviceKind::RgbLight => 0x0017,
            DeviceKind::ExternalTilt => 0x0022,
            DeviceKind::MotionSensor => 0x0023,
            DeviceKind::VisionSensor => 0x0025,
            DeviceKind::ExternalMotorWithTacho => 0x0026,
            DeviceKind::InternalMotorWithTacho => 0x0027,
            DeviceKind::InternalTilt => 0x0028,
            DeviceKind::Unknown(raw) => *raw,
        }
    }

    /// Whether this device reports rotation and can pair into a dual-motor
    /// virtual port.
    pub fn is_tacho_motor(&self) -> bool {
        matches!(
            self,
            DeviceKind::ExternalMotorWithTacho | DeviceKind::InternalMotorWithTacho
        )
    }
}

/// Port information request selector.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortInformationKind {
    /// Capability flags, mode count, and input/output mode bitsets
    ModeInfo = 0x01,
    /// List of mode combinations the port supports
    PossibleCombinations = 0x02,
}

impl TryFrom<u8> for PortInformationKind {
    type Error = WireError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(PortInformationKind::ModeInfo),
            0x02 => Ok(PortInformationKind::PossibleCombinations),
            _ => Err(WireError::Code {
                kind: "port information",
                value,
            }),
        }
    }
}

/// Port mode information request selector.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModeInformationKind {
    /// Mode name
    Name = 0x00,
    /// Raw value range
    Raw = 0x01,
    /// Percent value range
    Pct = 0x02,
    /// SI value range
    Si = 0x03,
    /// Unit symbol
    Symbol = 0x04,
    /// Input/output mapping flags
    Mapping = 0x05,
    /// Motor bias
    MotorBias = 0x07,
    /// Sensor capability bits
    CapabilityBits = 0x08,
    /// Dataset count, type, and display format
    ValueFormat = 0x80,
}

impl TryFrom<u8> for ModeInformationKind {
    type Error = WireError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(ModeInformationKind::Name),
            0x01 => Ok(ModeInformationKind::Raw),
            0x02 => Ok(ModeInformationKind::Pct),
            0x03 => Ok(ModeInformationKind::Si),
            0x04 => Ok(ModeInformationKind::Symbol),
            0x05 => Ok(ModeInformationKind::Mapping),
            0x07 => Ok(ModeInformationKind::MotorBias),
            0x08 => Ok(ModeInformationKind::CapabilityBits),
            0x80 => Ok(ModeInformationKind::ValueFormat),
            _ => Err(WireError::Code {
                kind: "mode information",
                value,
            }),
        }
    }
}

bitflags! {
    /// Port capability flags reported in mode information.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct PortCapabilities: u8 {
        /// Port accepts output commands
        const OUTPUT = 0x01;
        /// Port produces input values
        const INPUT = 0x02;
        /// Port modes can be combined
        const COMBINABLE = 0x04;
        /// Port can synchronize with a sibling
        const SYNCHRONIZABLE = 0x08;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_type_conversion() {
        assert_eq!(MessageType::try_from(0x01).unwrap(), MessageType::HubProperties);
        assert_eq!(MessageType::try_from(0x81).unwrap(), MessageType::PortOutputCommand);
        assert!(MessageType::try_from(0xFF).is_err());
        assert!(MessageType::try_from(0x06).is_err());
    }

    #[test]
    fn test_device_kind_roundtrip() {
        for raw in [0x0001u16, 0x0017, 0x0026, 0x0027, 0x1234] {
            assert_eq!(DeviceKind::from_raw(raw).raw(), raw);
        }
        assert!(DeviceKind::from_raw(0x0026).is_tacho_motor());
        assert!(!DeviceKind::from_raw(0x0017).is_tacho_motor());
    }

    #[test]
    fn test_capabilities() {
        let caps = PortCapabilities::INPUT | PortCapabilities::COMBINABLE;
        assert!(caps.contains(PortCapabilities::COMBINABLE));
        assert!(!caps.contains(PortCapabilities::OUTPUT));
    }

    #[test]
    fn test_mode_information_kind() {
        assert_eq!(
            ModeInformationKind::try_from(0x80).unwrap(),
            ModeInformationKind::ValueFormat
        );
        assert!(ModeInformationKind::try_from(0x06).is_err());
    }
}
