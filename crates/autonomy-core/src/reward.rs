// crates/autonomy-core/src/reward.rs
// ============================================================================
// Module: Reward Signals
// Description: Scalar feedback attached to checkpoints and episodes for later training use.
// Purpose: Give the Reward/Trace Collector (C12) a typed signal independent of reward-model internals.
// Dependencies: serde
// ============================================================================

//! Scalar feedback attached to checkpoints and episodes for later training use.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::time::Timestamp;

/// A scalar reward signal decomposed into the named subscores that produced
/// it, tagged with the source that computed it so training pipelines can
/// separate hand-written rules from learned models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardSignal {
    /// Weighted total, clamped to `[0, 1]`.
    pub total: f64,
    /// Each named subscore's contribution to `total`, keyed by component
    /// name (e.g. `"validation"`, `"drift"`).
    pub breakdown: BTreeMap<String, f64>,
    /// Component names included in `breakdown`, in the order they were
    /// computed.
    pub dimensions: Vec<String>,
    /// What computed this signal.
    pub source: RewardSource,
    /// When this signal was computed.
    pub computed_at: Timestamp,
}

/// Provenance of a [`RewardSignal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardSource {
    /// Derived deterministically from pipeline outcomes (e.g. success/failure,
    /// compensation triggered, invariant violated).
    RuleBased,
    /// Produced by an external reward model.
    LearnedModel,
    /// Supplied directly by a human reviewer.
    HumanFeedback,
}

impl RewardSignal {
    /// Builds a reward signal from its named subscores, each already
    /// weighted. `total` is the sum of `breakdown`'s values, clamped to
    /// `[0, 1]`.
    #[must_use]
    pub fn from_breakdown(breakdown: BTreeMap<String, f64>, dimensions: Vec<String>, source: RewardSource, computed_at: Timestamp) -> Self {
        let total = dimensions.iter().filter_map(|name| breakdown.get(name)).sum::<f64>().clamp(0.0, 1.0);
        Self {
            total,
            breakdown,
            dimensions,
            source,
            computed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn ts() -> Timestamp {
        Timestamp::from_offset_date_time(datetime!(2026-01-01 00:00:00 UTC))
    }

    #[test]
    fn total_is_the_sum_of_named_dimensions() {
        let breakdown = BTreeMap::from([("validation".to_string(), 0.2), ("completion".to_string(), 0.4)]);
        let signal = RewardSignal::from_breakdown(
            breakdown,
            vec!["validation".to_string(), "completion".to_string()],
            RewardSource::RuleBased,
            ts(),
        );
        assert!((signal.total - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn total_is_clamped_to_the_unit_interval() {
        let breakdown = BTreeMap::from([("over".to_string(), 1.5)]);
        let signal = RewardSignal::from_breakdown(breakdown, vec!["over".to_string()], RewardSource::RuleBased, ts());
        assert!((signal.total - 1.0).abs() < f64::EPSILON);
    }
}
