//! Value subscription records and combined-mode setup planning.

use hubkit_wire::{CombinedFormatCommand, ModeSet, RequestBody};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

/// Errors raised while validating a subscription request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// Combined subscriptions need at least two entries
    #[error("combined subscription requires more than one entry")]
    TooFewEntries,
    /// The port does not support mode combinations
    #[error("port does not support mode combinations")]
    NotCombinable,
}

/// Single-mode subscription record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleSubscription {
    /// Subscribed mode
    pub mode: u8,
    /// Delta threshold for updates
    pub delta: u32,
    /// Whether notifications are enabled
    pub notify: bool,
}

/// One entry of a combined subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedEntry {
    /// Mode to report
    pub mode: u8,
    /// Dataset index within the mode
    pub dataset: u8,
    /// Delta threshold for this mode
    pub delta: u32,
}

/// Combined subscription record: the active combination and its entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinedSubscription {
    /// Combination index in effect
    pub combination: u8,
    /// Entries in wire order; combined updates index into this list
    pub entries: Vec<CombinedEntry>,
}

impl CombinedSubscription {
    /// Build the request sequence that installs this subscription: lock the
    /// port, register each mode's delta, select the combination, then unlock
    /// with notifications enabled.
    pub fn setup_requests(&self, port: u8) -> Vec<RequestBody> {
        let mut requests = Vec::with_capacity(self.entries.len() + 3);
        requests.push(RequestBody::InputFormatCombined {
            port,
            command: CombinedFormatCommand::Lock,
        });
        for entry in &self.entries {
            requests.push(RequestBody::InputFormatSingle {
                port,
                mode: entry.mode,
                delta: entry.delta,
                notify: false,
            });
        }
        requests.push(RequestBody::InputFormatCombined {
            port,
            command: CombinedFormatCommand::SetModeDataSet {
                combination: self.combination,
                entries: self
                    .entries
                    .iter()
                    .map(|e| (e.mode, e.dataset))
                    .collect::<SmallVec<[(u8, u8); 8]>>(),
            },
        });
        requests.push(RequestBody::InputFormatCombined {
            port,
            command: CombinedFormatCommand::UnlockEnabled,
        });
        requests
    }
}

/// The at-most-one active subscription of a port.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueSubscription {
    /// One mode with a delta threshold
    Single(SingleSubscription),
    /// Several (mode, dataset) pairs reported together
    Combined(CombinedSubscription),
}

/// Resolve the combination index for a requested mode set.
///
/// The first known combination list containing every requested mode wins,
/// counted 1-based; a combinable port with no matching list falls back to
/// index 0 ("all values").
pub fn resolve_combination_index(requested: &[u8], combinations: &[ModeSet]) -> u8 {
    for (index, list) in combinations.iter().enumerate() {
        if requested.iter().all(|mode| list.contains(mode)) {
            return (index + 1) as u8;
        }
    }
    0
}
