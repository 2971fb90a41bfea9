//! Numeric value sinks bound to port modes.

use hubkit_wire::{ScalarValue, ValueFormat};
use serde::{Deserialize, Serialize};

/// Latest decoded value of one (mode, dataset) slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortValue {
    /// Mode the value belongs to
    pub mode: u8,
    /// Dataset index within the mode
    pub dataset: u8,
    /// Decoded value
    pub value: ScalarValue,
}

/// Decode a full single-mode value update against a resolved format.
///
/// Returns `None` unless the payload length matches the format exactly.
pub(crate) fn decode_single_update(
    mode: u8,
    format: &ValueFormat,
    payload: &[u8],
) -> Option<Vec<PortValue>> {
    if payload.len() != format.encoded_len() {
        return None;
    }

    let width = format.dataset_kind.width();
    let mut values = Vec::with_capacity(format.datasets as usize);
    for dataset in 0..format.datasets {
        let value = format
            .dataset_kind
            .decode_at(payload, dataset as usize * width)?;
        values.push(PortValue {
            mode,
            dataset,
            value,
        });
    }
    Some(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hubkit_wire::DatasetKind;

    fn fmt(datasets: u8, kind: DatasetKind) -> ValueFormat {
        ValueFormat {
            datasets,
            dataset_kind: kind,
            figures: 4,
            decimals: 0,
        }
    }

    #[test]
    fn test_single_update_decode() {
        let values = decode_single_update(1, &fmt(3, DatasetKind::Int16), &[1, 0, 2, 0, 0xFE, 0xFF])
            .unwrap();
        assert_eq!(values.len(), 3);
        assert_eq!(values[0].value, ScalarValue::Int(1));
        assert_eq!(values[2].value, ScalarValue::Int(-2));
        assert_eq!(values[2].dataset, 2);
    }

    #[test]
    fn test_single_update_length_must_match() {
        assert!(decode_single_update(1, &fmt(1, DatasetKind::Int32), &[1, 0, 0]).is_none());
        assert!(decode_single_update(1, &fmt(1, DatasetKind::Int8), &[1, 2]).is_none());
    }
}
