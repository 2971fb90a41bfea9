//! Virtual two-port composites.

use hubkit_wire::DeviceKind;
use serde::{Deserialize, Serialize};

/// Concrete flavor of a virtual port, chosen from the attached device type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VirtualPortKind {
    /// Two rotation-sensing motors driven together
    DualMotor,
    /// Any other pairing
    Generic,
}

impl VirtualPortKind {
    /// Classify a virtual attachment by its device type.
    pub fn from_device(device: DeviceKind) -> Self {
        if device.is_tacho_motor() {
            VirtualPortKind::DualMotor
        } else {
            VirtualPortKind::Generic
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert_eq!(
            VirtualPortKind::from_device(DeviceKind::InternalMotorWithTacho),
            VirtualPortKind::DualMotor
        );
        assert_eq!(
            VirtualPortKind::from_device(DeviceKind::RgbLight),
            VirtualPortKind::Generic
        );
        assert_eq!(
            VirtualPortKind::from_device(DeviceKind::Unknown(0x99)),
            VirtualPortKind::Generic
        );
    }
}
