//! The port entity and its bring-up state machine.
//!
//! A port is created on an attach notification and torn down on detach. In
//! between it walks `Initializing -> Initialized` (all bring-up queries
//! resolved) or `Initializing -> Failure` (any query error); both end states
//! are terminal and non-regressing.

use crate::mode::PortModeInformation;
use crate::subscription::{CombinedSubscription, SingleSubscription, ValueSubscription};
use crate::value::{decode_single_update, PortValue};
use crate::virtual_port::VirtualPortKind;
use hubkit_wire::{
    DeviceKind, ModeInformationKind, ModeInformationPayload, ModeSet, PortCapabilities,
    PortInformationKind, PortInformationPayload, RequestBody, Version,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, trace, warn};

/// Bring-up status of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortStatus {
    /// Bring-up queries outstanding
    Initializing,
    /// All bring-up queries resolved successfully
    Initialized,
    /// A bring-up query failed; terminal
    Failure,
}

/// One bring-up query a port wants issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortQuery {
    /// Port information request
    Information(PortInformationKind),
    /// Port mode information request
    ModeDetail {
        /// Mode id
        mode: u8,
        /// Information selector
        kind: ModeInformationKind,
    },
}

impl PortQuery {
    /// Turn the query into a wire request for `port`.
    pub fn into_request(self, port: u8) -> RequestBody {
        match self {
            PortQuery::Information(kind) => RequestBody::PortInformationRequest { port, kind },
            PortQuery::ModeDetail { mode, kind } => {
                RequestBody::PortModeInformationRequest { port, mode, kind }
            }
        }
    }
}

/// Which detail queries bring-up issues per input mode.
///
/// Mapping, motor bias, and capability bits are off by default: hub firmware
/// revisions differ in whether they answer them, and an unanswered query
/// would hold the port in `Initializing` forever.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PortSetupConfig {
    /// Also query input/output mapping flags
    pub request_mapping: bool,
    /// Also query motor bias
    pub request_motor_bias: bool,
    /// Also query sensor capability bits
    pub request_capability_bits: bool,
}

impl PortSetupConfig {
    /// The detail query sequence issued for every input mode.
    pub fn detail_sequence(&self) -> Vec<ModeInformationKind> {
        let mut sequence = vec![
            ModeInformationKind::Name,
            ModeInformationKind::Raw,
            ModeInformationKind::Pct,
            ModeInformationKind::Si,
            ModeInformationKind::Symbol,
        ];
        if self.request_mapping {
            sequence.push(ModeInformationKind::Mapping);
        }
        sequence.push(ModeInformationKind::ValueFormat);
        if self.request_motor_bias {
            sequence.push(ModeInformationKind::MotorBias);
        }
        if self.request_capability_bits {
            sequence.push(ModeInformationKind::CapabilityBits);
        }
        sequence
    }
}

/// Capability flags and declared modes of a port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInformation {
    /// Capability flags
    pub capabilities: PortCapabilities,
    /// Total number of modes
    pub mode_count: u8,
    /// Modes usable as inputs, ascending
    pub input_modes: ModeSet,
    /// Modes usable as outputs, ascending
    pub output_modes: ModeSet,
    /// Known mode combinations, unset until queried
    pub combinations: Option<Vec<ModeSet>>,
}

/// Result of resolving one bring-up query.
#[derive(Debug, Default)]
pub struct QueryOutcome {
    /// Queries to issue next, already counted as pending
    pub follow_ups: Vec<PortQuery>,
    /// Status transition this resolution caused, if any
    pub transition: Option<PortStatus>,
}

/// One logical attachment point on a hub.
#[derive(Debug, Clone)]
pub struct Port {
    id: u8,
    device: DeviceKind,
    virtual_members: Option<(u8, u8)>,
    virtual_kind: Option<VirtualPortKind>,
    hw_version: Option<Version>,
    sw_version: Option<Version>,
    information: Option<PortInformation>,
    modes: HashMap<u8, PortModeInformation>,
    values: Vec<PortValue>,
    subscription: Option<ValueSubscription>,
    staged_combined: Option<CombinedSubscription>,
    status: PortStatus,
    pending_queries: u32,
}

impl Port {
    /// Create a port for a plain device attachment.
    pub fn new(id: u8, device: DeviceKind) -> Self {
        Self {
            id,
            device,
            virtual_members: None,
            virtual_kind: None,
            hw_version: None,
            sw_version: None,
            information: None,
            modes: HashMap::new(),
            values: Vec::new(),
            subscription: None,
            staged_combined: None,
            status: PortStatus::Initializing,
            pending_queries: 0,
        }
    }

    /// Create a virtual port spanning two already-registered ports.
    pub fn new_virtual(id: u8, device: DeviceKind, first: u8, second: u8) -> Self {
        let mut port = Self::new(id, device);
        port.virtual_members = Some((first, second));
        port.virtual_kind = Some(VirtualPortKind::from_device(device));
        port
    }

    /// Port id, unique per hub.
    pub fn id(&self) -> u8 {
        self.id
    }

    /// Attached device type.
    pub fn device(&self) -> DeviceKind {
        self.device
    }

    /// Current bring-up status.
    pub fn status(&self) -> PortStatus {
        self.status
    }

    /// Constituent port ids when this is a virtual port.
    pub fn virtual_members(&self) -> Option<(u8, u8)> {
        self.virtual_members
    }

    /// Virtual port flavor, if any.
    pub fn virtual_kind(&self) -> Option<VirtualPortKind> {
        self.virtual_kind
    }

    /// Device hardware revision from the attach notification.
    pub fn hw_version(&self) -> Option<Version> {
        self.hw_version
    }

    /// Device software revision from the attach notification.
    pub fn sw_version(&self) -> Option<Version> {
        self.sw_version
    }

    /// Record the revisions carried by the attach notification.
    pub fn set_versions(&mut self, hw: Version, sw: Version) {
        self.hw_version = Some(hw);
        self.sw_version = Some(sw);
    }

    /// Accumulated port information, if the mode-info query resolved.
    pub fn information(&self) -> Option<&PortInformation> {
        self.information.as_ref()
    }

    /// Accumulated metadata for one mode.
    pub fn mode_information(&self, mode: u8) -> Option<&PortModeInformation> {
        self.modes.get(&mode)
    }

    /// All accumulated mode metadata.
    pub fn modes(&self) -> &HashMap<u8, PortModeInformation> {
        &self.modes
    }

    /// Latest decoded values.
    pub fn values(&self) -> &[PortValue] {
        &self.values
    }

    /// Active subscription record, if any.
    pub fn subscription(&self) -> Option<&ValueSubscription> {
        self.subscription.as_ref()
    }

    /// Bring-up queries still outstanding.
    pub fn pending_queries(&self) -> u32 {
        self.pending_queries
    }

    /// Start bring-up: counts one pending query and returns it.
    pub fn begin_bringup(&mut self) -> PortQuery {
        self.pending_queries += 1;
        trace!(port = self.id, "bring-up started");
        PortQuery::Information(PortInformationKind::ModeInfo)
    }

    /// Resolve one outstanding query and compute what happens next.
    ///
    /// Follow-up queries returned here are already counted as pending; the
    /// caller must issue every one of them. A transition to a terminal
    /// status is reported exactly once.
    pub fn resolve_query(
        &mut self,
        query: PortQuery,
        ok: bool,
        setup: &PortSetupConfig,
    ) -> QueryOutcome {
        let mut follow_ups = Vec::new();
        if ok
            && self.status == PortStatus::Initializing
            && query == PortQuery::Information(PortInformationKind::ModeInfo)
        {
            follow_ups = self.plan_follow_ups(setup);
            self.pending_queries += follow_ups.len() as u32;
        }

        self.pending_queries = self.pending_queries.saturating_sub(1);

        let transition = if self.status == PortStatus::Initializing {
            if !ok {
                warn!(port = self.id, ?query, "bring-up query failed");
                self.status = PortStatus::Failure;
                Some(PortStatus::Failure)
            } else if self.pending_queries == 0 {
                debug!(port = self.id, "bring-up complete");
                self.status = PortStatus::Initialized;
                Some(PortStatus::Initialized)
            } else {
                None
            }
        } else {
            None
        };

        QueryOutcome {
            follow_ups: if self.status == PortStatus::Failure {
                Vec::new()
            } else {
                follow_ups
            },
            transition,
        }
    }

    fn plan_follow_ups(&self, setup: &PortSetupConfig) -> Vec<PortQuery> {
        let Some(info) = &self.information else {
            // Mode-info resolved without a decodable payload; nothing to
            // chase, bring-up finishes on the counter alone.
            return Vec::new();
        };

        let mut queries = Vec::new();
        if info.capabilities.contains(PortCapabilities::COMBINABLE) && info.combinations.is_none()
        {
            queries.push(PortQuery::Information(
                PortInformationKind::PossibleCombinations,
            ));
        }
        for mode in &info.input_modes {
            if !self.modes.contains_key(mode) {
                for kind in setup.detail_sequence() {
                    queries.push(PortQuery::ModeDetail { mode: *mode, kind });
                }
            }
        }
        queries
    }

    /// Fold a port information payload into the port.
    pub fn apply_information(&mut self, payload: &PortInformationPayload) {
        match payload {
            PortInformationPayload::ModeInfo {
                capabilities,
                mode_count,
                input_modes,
                output_modes,
            } => {
                let combinations = self
                    .information
                    .take()
                    .and_then(|info| info.combinations);
                self.information = Some(PortInformation {
                    capabilities: *capabilities,
                    mode_count: *mode_count,
                    input_modes: input_modes.clone(),
                    output_modes: output_modes.clone(),
                    combinations,
                });
            }
            PortInformationPayload::PossibleCombinations { combinations } => {
                if let Some(info) = &mut self.information {
                    info.combinations = Some(combinations.clone());
                } else {
                    warn!(
                        port = self.id,
                        "combination list arrived before mode info; dropped"
                    );
                }
            }
        }
    }

    /// Fold a mode information payload into the port.
    pub fn apply_mode_information(&mut self, mode: u8, payload: &ModeInformationPayload) {
        self.modes.entry(mode).or_default().apply(payload);
    }

    /// Commit the echoed single-mode input format.
    ///
    /// A notify-enabled echo installs (or replaces) the single subscription;
    /// a notify-disabled echo clears it.
    pub fn commit_single_format(&mut self, mode: u8, delta: u32, notify: bool) {
        if notify {
            self.subscription = Some(ValueSubscription::Single(SingleSubscription {
                mode,
                delta,
                notify,
            }));
        } else if matches!(self.subscription, Some(ValueSubscription::Single(_))) {
            self.subscription = None;
        }
    }

    /// Stage a combined subscription while its setup sequence is in flight.
    pub fn stage_combined(&mut self, subscription: CombinedSubscription) {
        self.staged_combined = Some(subscription);
    }

    /// Commit the staged combined subscription on the format echo, or clear
    /// an active combined subscription when nothing is staged (reset echo).
    pub fn commit_combined_format(&mut self) {
        match self.staged_combined.take() {
            Some(staged) => self.subscription = Some(ValueSubscription::Combined(staged)),
            None => {
                if matches!(self.subscription, Some(ValueSubscription::Combined(_))) {
                    self.subscription = None;
                }
            }
        }
    }

    /// Apply a single-mode value update.
    ///
    /// The update is dropped unless exactly one single subscription is
    /// active, its mode's value format is resolved, and the payload length
    /// matches that format.
    pub fn apply_single_value(&mut self, payload: &[u8]) -> Option<Vec<PortValue>> {
        let Some(ValueSubscription::Single(sub)) = &self.subscription else {
            trace!(port = self.id, "single value without single subscription; dropped");
            return None;
        };
        let format = self.modes.get(&sub.mode).and_then(|m| m.value_format)?;
        let values = decode_single_update(sub.mode, &format, payload)?;
        self.store_values(&values);
        Some(values)
    }

    /// Apply a combined value update.
    ///
    /// Every referenced entry must resolve to a known mode format and the
    /// payload length must match exactly, otherwise the whole update is
    /// dropped with no partial application.
    pub fn apply_combined_value(
        &mut self,
        entry_indices: &[u8],
        payload: &[u8],
    ) -> Option<Vec<PortValue>> {
        let Some(ValueSubscription::Combined(sub)) = &self.subscription else {
            trace!(port = self.id, "combined value without combined subscription; dropped");
            return None;
        };

        // First pass: resolve every referenced entry before touching state.
        let mut plan = Vec::with_capacity(entry_indices.len());
        let mut total = 0usize;
        for index in entry_indices {
            let entry = sub.entries.get(*index as usize)?;
            let format = self.modes.get(&entry.mode).and_then(|m| m.value_format)?;
            plan.push((entry.mode, entry.dataset, format.dataset_kind));
            total += format.dataset_kind.width();
        }
        if total != payload.len() {
            debug!(
                port = self.id,
                expected = total,
                got = payload.len(),
                "combined value length mismatch; dropped"
            );
            return None;
        }

        let mut values = Vec::with_capacity(plan.len());
        let mut offset = 0usize;
        for (mode, dataset, kind) in plan {
            let value = kind.decode_at(payload, offset)?;
            offset += kind.width();
            values.push(PortValue {
                mode,
                dataset,
                value,
            });
        }
        self.store_values(&values);
        Some(values)
    }

    fn store_values(&mut self, updates: &[PortValue]) {
        for update in updates {
            match self
                .values
                .iter_mut()
                .find(|v| v.mode == update.mode && v.dataset == update.dataset)
            {
                Some(slot) => *slot = *update,
                None => self.values.push(*update),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscription::CombinedEntry;
    use hubkit_wire::{DatasetKind, ScalarValue, ValueFormat};
    use smallvec::smallvec;

    fn mode_info_payload(combinable: bool, input_modes: &[u8]) -> PortInformationPayload {
        let mut capabilities = PortCapabilities::INPUT;
        if combinable {
            capabilities |= PortCapabilities::COMBINABLE;
        }
        PortInformationPayload::ModeInfo {
            capabilities,
            mode_count: input_modes.len() as u8,
            input_modes: ModeSet::from_slice(input_modes),
            output_modes: ModeSet::new(),
        }
    }

    fn value_format(kind: DatasetKind) -> ModeInformationPayload {
        ModeInformationPayload::ValueFormat(ValueFormat {
            datasets: 1,
            dataset_kind: kind,
            figures: 4,
            decimals: 0,
        })
    }

    #[test]
    fn test_bringup_counts_thirteen_responses_for_two_mode_combinable_port() {
        let setup = PortSetupConfig::default();
        let mut port = Port::new(0, DeviceKind::VisionSensor);

        let initial = port.begin_bringup();
        assert_eq!(port.pending_queries(), 1);

        port.apply_information(&mode_info_payload(true, &[0, 1]));
        let outcome = port.resolve_query(initial, true, &setup);
        assert!(outcome.transition.is_none());

        // 1 combinations query + 2 modes x 6 detail queries.
        assert_eq!(outcome.follow_ups.len(), 13);
        assert_eq!(port.pending_queries(), 13);
        assert_eq!(
            outcome.follow_ups[0],
            PortQuery::Information(PortInformationKind::PossibleCombinations)
        );

        let mut transitions = Vec::new();
        for (i, query) in outcome.follow_ups.iter().enumerate() {
            assert_eq!(port.status(), PortStatus::Initializing, "query {i}");
            let followup = port.resolve_query(*query, true, &setup);
            assert!(followup.follow_ups.is_empty());
            if let Some(t) = followup.transition {
                transitions.push(t);
            }
        }

        assert_eq!(transitions, vec![PortStatus::Initialized]);
        assert_eq!(port.status(), PortStatus::Initialized);
        assert_eq!(port.pending_queries(), 0);
    }

    #[test]
    fn test_bringup_fails_immediately_on_any_query_error() {
        let setup = PortSetupConfig::default();
        let mut port = Port::new(0, DeviceKind::VisionSensor);

        let initial = port.begin_bringup();
        port.apply_information(&mode_info_payload(true, &[0, 1]));
        let outcome = port.resolve_query(initial, true, &setup);

        let failed = port.resolve_query(outcome.follow_ups[3], false, &setup);
        assert_eq!(failed.transition, Some(PortStatus::Failure));
        assert_eq!(port.status(), PortStatus::Failure);

        // Remaining resolutions neither regress nor re-transition.
        for query in &outcome.follow_ups[4..] {
            let late = port.resolve_query(*query, true, &setup);
            assert!(late.transition.is_none());
            assert!(late.follow_ups.is_empty());
        }
        assert_eq!(port.status(), PortStatus::Failure);
    }

    #[test]
    fn test_bringup_without_inputs_finishes_on_mode_info() {
        let setup = PortSetupConfig::default();
        let mut port = Port::new(3, DeviceKind::RgbLight);

        let initial = port.begin_bringup();
        port.apply_information(&mode_info_payload(false, &[]));
        let outcome = port.resolve_query(initial, true, &setup);
        assert!(outcome.follow_ups.is_empty());
        assert_eq!(outcome.transition, Some(PortStatus::Initialized));
    }

    #[test]
    fn test_combinations_not_requeried_when_known() {
        let setup = PortSetupConfig::default();
        let mut port = Port::new(0, DeviceKind::VisionSensor);

        let initial = port.begin_bringup();
        port.apply_information(&mode_info_payload(true, &[0]));
        port.apply_information(&PortInformationPayload::PossibleCombinations {
            combinations: vec![smallvec![0]],
        });
        let outcome = port.resolve_query(initial, true, &setup);
        assert_eq!(outcome.follow_ups.len(), 6);
        assert!(outcome
            .follow_ups
            .iter()
            .all(|q| matches!(q, PortQuery::ModeDetail { .. })));
    }

    #[test]
    fn test_extended_detail_sequence_is_configurable() {
        let setup = PortSetupConfig {
            request_mapping: true,
            request_motor_bias: true,
            request_capability_bits: true,
        };
        assert_eq!(setup.detail_sequence().len(), 9);
        assert_eq!(PortSetupConfig::default().detail_sequence().len(), 6);
    }

    #[test]
    fn test_single_value_needs_subscription_and_format() {
        let mut port = Port::new(0, DeviceKind::VisionSensor);
        assert!(port.apply_single_value(&[5]).is_none());

        port.commit_single_format(2, 1, true);
        // Format not yet resolved.
        assert!(port.apply_single_value(&[5]).is_none());

        port.apply_mode_information(2, &value_format(DatasetKind::Int8));
        let values = port.apply_single_value(&[5]).unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].value, ScalarValue::Int(5));
        assert_eq!(port.values().len(), 1);
    }

    #[test]
    fn test_unsubscribe_clears_record() {
        let mut port = Port::new(0, DeviceKind::VisionSensor);
        port.commit_single_format(2, 1, true);
        assert!(port.subscription().is_some());
        port.commit_single_format(2, 0, false);
        assert!(port.subscription().is_none());
    }

    #[test]
    fn test_combined_value_all_or_nothing() {
        let mut port = Port::new(0, DeviceKind::VisionSensor);
        port.apply_mode_information(0, &value_format(DatasetKind::Int8));
        port.apply_mode_information(2, &value_format(DatasetKind::Int16));
        port.stage_combined(CombinedSubscription {
            combination: 1,
            entries: vec![
                CombinedEntry {
                    mode: 0,
                    dataset: 0,
                    delta: 1,
                },
                CombinedEntry {
                    mode: 2,
                    dataset: 0,
                    delta: 1,
                },
            ],
        });
        port.commit_combined_format();

        // One byte short: nothing is applied.
        assert!(port.apply_combined_value(&[0, 1], &[7, 1]).is_none());
        assert!(port.values().is_empty());

        let values = port.apply_combined_value(&[0, 1], &[7, 1, 0]).unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].value, ScalarValue::Int(7));
        assert_eq!(values[1].value, ScalarValue::Int(1));
        assert_eq!(values[1].mode, 2);

        // Unknown entry index: dropped.
        assert!(port.apply_combined_value(&[5], &[1]).is_none());
    }

    #[test]
    fn test_virtual_port_carries_members_and_kind() {
        let port = Port::new_virtual(0x10, DeviceKind::InternalMotorWithTacho, 0x00, 0x01);
        assert_eq!(port.virtual_members(), Some((0x00, 0x01)));
        assert_eq!(port.virtual_kind(), Some(VirtualPortKind::DualMotor));
        assert_eq!(port.status(), PortStatus::Initializing);
    }
}
