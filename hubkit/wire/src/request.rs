//! Request bodies and their binary encoding.
//!
//! Every upstream message kind is a variant of [`RequestBody`]; `encode`
//! produces the exact frame bytes, length prefix included.

use crate::frame::finish_frame;
use crate::message::{
    AlertKind, AlertOperation, HubAction, ModeInformationKind, NetworkRequest,
    PortInformationKind, PropertyKind, PropertyOperation,
};
use bitflags::bitflags;
use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Safety token the firmware requires before entering boot mode.
pub const BOOT_MODE_TOKEN: &[u8] = b"LPF2-Boot";

/// Safety token the firmware requires before locking memory.
pub const LOCK_MEMORY_TOKEN: &[u8] = b"Lock-Mem";

bitflags! {
    /// Startup/completion flags byte of an output command.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct OutputCommandFlags: u8 {
        /// Request command feedback when the command resolves
        const REQUEST_FEEDBACK = 0x01;
        /// Execute immediately instead of buffering
        const EXECUTE_IMMEDIATELY = 0x10;
    }
}

/// Sub-commands of the combined input format setup message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CombinedFormatCommand {
    /// Select a combination and the (mode, dataset) pairs to report
    SetModeDataSet {
        /// Combination index to activate
        combination: u8,
        /// (mode, dataset) pairs, each packed into one byte on the wire
        entries: SmallVec<[(u8, u8); 8]>,
    },
    /// Lock the port for setup
    Lock,
    /// Unlock and start with multi-updates enabled
    UnlockEnabled,
    /// Unlock and start with multi-updates disabled
    UnlockDisabled,
    /// Reset the combined setup
    Reset,
}

impl CombinedFormatCommand {
    /// Wire sub-command byte.
    pub fn command(&self) -> u8 {
        match self {
            CombinedFormatCommand::SetModeDataSet { .. } => 0x01,
            CombinedFormatCommand::Lock => 0x02,
            CombinedFormatCommand::UnlockEnabled => 0x03,
            CombinedFormatCommand::UnlockDisabled => 0x04,
            CombinedFormatCommand::Reset => 0x06,
        }
    }
}

/// Virtual port setup sub-commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VirtualPortRequest {
    /// Tear a virtual port down
    Disconnect {
        /// Virtual port id
        port: u8,
    },
    /// Combine two ports into a virtual port
    Connect {
        /// First constituent port id
        first: u8,
        /// Second constituent port id
        second: u8,
    },
}

/// The closed set of request bodies.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Hub property operation (0x01)
    Properties {
        /// Property selector
        property: PropertyKind,
        /// Operation to perform
        operation: PropertyOperation,
        /// Operation payload (set value), usually empty
        payload: Bytes,
    },
    /// Hub action (0x02)
    Action(HubAction),
    /// Hub alert operation (0x03)
    Alert {
        /// Alert selector
        alert: AlertKind,
        /// Operation to perform
        operation: AlertOperation,
    },
    /// Hardware network command (0x08)
    Network(NetworkRequest),
    /// Go into firmware boot mode (0x10), carries the safety token
    BootMode,
    /// Lock firmware memory (0x11), carries the safety token
    LockMemory,
    /// Request the firmware lock status (0x12)
    LockStatusRequest,
    /// Request port information (0x21)
    PortInformationRequest {
        /// Port id
        port: u8,
        /// Information selector
        kind: PortInformationKind,
    },
    /// Request port mode information (0x22)
    PortModeInformationRequest {
        /// Port id
        port: u8,
        /// Mode id
        mode: u8,
        /// Information selector
        kind: ModeInformationKind,
    },
    /// Single-mode input format setup (0x41)
    InputFormatSingle {
        /// Port id
        port: u8,
        /// Mode id
        mode: u8,
        /// Delta threshold for value updates
        delta: u32,
        /// Whether the hub should push value notifications
        notify: bool,
    },
    /// Combined input format setup (0x42)
    InputFormatCombined {
        /// Port id
        port: u8,
        /// Sub-command
        command: CombinedFormatCommand,
    },
    /// Virtual port setup (0x61)
    VirtualPortSetup(VirtualPortRequest),
    /// Port output command (0x81)
    OutputCommand {
        /// Port id
        port: u8,
        /// Startup/completion flags
        flags: OutputCommandFlags,
        /// Sub-command and parameters, passed through verbatim
        payload: Bytes,
    },
}

impl RequestBody {
    /// Message type byte for this request kind.
    pub fn message_type(&self) -> u8 {
        match self {
            RequestBody::Properties { .. } => 0x01,
            RequestBody::Action(_) => 0x02,
            RequestBody::Alert { .. } => 0x03,
            RequestBody::Network(_) => 0x08,
            RequestBody::BootMode => 0x10,
            RequestBody::LockMemory => 0x11,
            RequestBody::LockStatusRequest => 0x12,
            RequestBody::PortInformationRequest { .. } => 0x21,
            RequestBody::PortModeInformationRequest { .. } => 0x22,
            RequestBody::InputFormatSingle { .. } => 0x41,
            RequestBody::InputFormatCombined { .. } => 0x42,
            RequestBody::VirtualPortSetup(_) => 0x61,
            RequestBody::OutputCommand { .. } => 0x81,
        }
    }

    /// Encode into a complete frame for the given hub.
    pub fn encode(&self, hub_id: u8) -> Bytes {
        let mut body = BytesMut::with_capacity(16);
        body.put_u8(hub_id);
        body.put_u8(self.message_type());

        match self {
            RequestBody::Properties {
                property,
                operation,
                payload,
            } => {
                body.put_u8(*property as u8);
                body.put_u8(*operation as u8);
                body.put_slice(payload);
            }
            RequestBody::Action(action) => {
                body.put_u8(*action as u8);
            }
            RequestBody::Alert { alert, operation } => {
                body.put_u8(*alert as u8);
                body.put_u8(*operation as u8);
            }
            RequestBody::Network(request) => {
                body.put_u8(request.command());
                match request {
                    NetworkRequest::ConnectionRequest { pressed } => {
                        body.put_u8(u8::from(*pressed));
                    }
                    NetworkRequest::FamilySet(family) => body.put_u8(*family),
                    NetworkRequest::SubfamilySet(subfamily) => body.put_u8(*subfamily),
                    NetworkRequest::ExtendedFamilySet(family) => body.put_u8(*family),
                    _ => {}
                }
            }
            RequestBody::BootMode => {
                body.put_slice(BOOT_MODE_TOKEN);
            }
            RequestBody::LockMemory => {
                body.put_slice(LOCK_MEMORY_TOKEN);
            }
            RequestBody::LockStatusRequest => {}
            RequestBody::PortInformationRequest { port, kind } => {
                body.put_u8(*port);
                body.put_u8(*kind as u8);
            }
            RequestBody::PortModeInformationRequest { port, mode, kind } => {
                body.put_u8(*port);
                body.put_u8(*mode);
                body.put_u8(*kind as u8);
            }
            RequestBody::InputFormatSingle {
                port,
                mode,
                delta,
                notify,
            } => {
                body.put_u8(*port);
                body.put_u8(*mode);
                body.put_u32_le(*delta);
                body.put_u8(u8::from(*notify));
            }
            RequestBody::InputFormatCombined { port, command } => {
                body.put_u8(*port);
                body.put_u8(command.command());
                if let CombinedFormatCommand::SetModeDataSet {
                    combination,
                    entries,
                } = command
                {
                    body.put_u8(*combination);
                    for (mode, dataset) in entries {
                        body.put_u8((mode << 4) | (dataset & 0x0F));
                    }
                }
            }
            RequestBody::VirtualPortSetup(setup) => match setup {
                VirtualPortRequest::Disconnect { port } => {
                    body.put_u8(0x00);
                    body.put_u8(*port);
                }
                VirtualPortRequest::Connect { first, second } => {
                    body.put_u8(0x01);
                    body.put_u8(*first);
                    body.put_u8(*second);
                }
            },
            RequestBody::OutputCommand {
                port,
                flags,
                payload,
            } => {
                body.put_u8(*port);
                body.put_u8(flags.bits());
                body.put_slice(payload);
            }
        }

        finish_frame(body)
    }
}
