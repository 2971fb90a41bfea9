//! Per-mode metadata accumulated during port bring-up.

use hubkit_wire::{ModeInformationPayload, ValueFormat};
use serde::{Deserialize, Serialize};

/// Value range reported for a mode facet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    /// Lower bound
    pub min: f32,
    /// Upper bound
    pub max: f32,
}

/// Input/output mapping flags of a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeMapping {
    /// Input mapping flags
    pub input: u8,
    /// Output mapping flags
    pub output: u8,
}

/// Metadata for one port mode, filled in from up to seven separate
/// asynchronous responses.
///
/// Fields start unset and are only ever written, never removed, while the
/// port lives.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortModeInformation {
    /// Mode name
    pub name: Option<String>,
    /// Raw value range
    pub raw_range: Option<ValueRange>,
    /// Percent value range
    pub pct_range: Option<ValueRange>,
    /// SI value range
    pub si_range: Option<ValueRange>,
    /// Unit symbol
    pub symbol: Option<String>,
    /// Input/output mapping flags
    pub mapping: Option<ModeMapping>,
    /// Dataset count, type, and display format
    pub value_format: Option<ValueFormat>,
}

impl PortModeInformation {
    /// Fold one mode information payload into the accumulated metadata.
    ///
    /// Motor bias and capability bits are accepted but not modeled; their
    /// responses only count against the bring-up query counter.
    pub fn apply(&mut self, payload: &ModeInformationPayload) {
        match payload {
            ModeInformationPayload::Name(name) => self.name = Some(name.clone()),
            ModeInformationPayload::Raw { min, max } => {
                self.raw_range = Some(ValueRange {
                    min: *min,
                    max: *max,
                });
            }
            ModeInformationPayload::Pct { min, max } => {
                self.pct_range = Some(ValueRange {
                    min: *min,
                    max: *max,
                });
            }
            ModeInformationPayload::Si { min, max } => {
                self.si_range = Some(ValueRange {
                    min: *min,
                    max: *max,
                });
            }
            ModeInformationPayload::Symbol(symbol) => self.symbol = Some(symbol.clone()),
            ModeInformationPayload::Mapping { input, output } => {
                self.mapping = Some(ModeMapping {
                    input: *input,
                    output: *output,
                });
            }
            ModeInformationPayload::ValueFormat(format) => self.value_format = Some(*format),
            ModeInformationPayload::MotorBias(_) | ModeInformationPayload::CapabilityBits(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hubkit_wire::DatasetKind;

    #[test]
    fn test_accumulation_fills_lazily() {
        let mut info = PortModeInformation::default();
        assert!(info.name.is_none());

        info.apply(&ModeInformationPayload::Name("POWER".to_owned()));
        info.apply(&ModeInformationPayload::Raw {
            min: -100.0,
            max: 100.0,
        });
        info.apply(&ModeInformationPayload::ValueFormat(ValueFormat {
            datasets: 1,
            dataset_kind: DatasetKind::Int8,
            figures: 4,
            decimals: 0,
        }));

        assert_eq!(info.name.as_deref(), Some("POWER"));
        assert_eq!(
            info.raw_range,
            Some(ValueRange {
                min: -100.0,
                max: 100.0
            })
        );
        assert!(info.value_format.is_some());
        assert!(info.si_range.is_none());
    }

    #[test]
    fn test_non_modeled_payloads_are_ignored() {
        let mut info = PortModeInformation::default();
        info.apply(&ModeInformationPayload::MotorBias(50));
        info.apply(&ModeInformationPayload::CapabilityBits([0; 6]));
        assert_eq!(info, PortModeInformation::default());
    }
}
