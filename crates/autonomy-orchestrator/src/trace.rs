// crates/autonomy-orchestrator/src/trace.rs
// ============================================================================
// Module: Trace Collector (C12)
// Description: Accumulates goal runs into JSON-Lines-serializable training records.
// Purpose: Hand off execution traces to offline training pipelines without prescribing one.
// Dependencies: autonomy-core, serde_json
// ============================================================================

//! Accumulates goal runs into JSON-Lines-serializable training records.

use autonomy_core::GoalId;
use autonomy_core::OrchestratedResult;
use autonomy_core::PlanId;
use autonomy_core::RewardSignal;
use autonomy_core::Timestamp;
use serde::Deserialize;
use serde::Serialize;

use crate::reward::DEFAULT_TARGET_DURATION_MS;
use crate::reward::checkpoint_reward;
use crate::reward::episode_reward;

/// How much a training consumer should trust a recorded example, e.g. to
/// down-weight traces gathered while the kernel was in safe mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTrust {
    /// Gathered during normal operation.
    Trusted,
    /// Gathered while the kernel was degraded or in safe mode; usable but
    /// should be weighted down.
    Degraded,
}

/// Coarse reward bucket, convenient for stratified sampling during
/// training without re-deriving it from the raw scalar each time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardTier {
    /// Reward at or above 0.5.
    Positive,
    /// Reward between -0.5 and 0.5, exclusive of the positive tier.
    Neutral,
    /// Reward below -0.5.
    Negative,
}

impl RewardTier {
    fn from_value(value: f64) -> Self {
        if value >= 0.5 {
            Self::Positive
        } else if value <= -0.5 {
            Self::Negative
        } else {
            Self::Neutral
        }
    }
}

/// A single step's contribution to a training dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingExample {
    /// Goal the owning episode pursued.
    pub goal_id: GoalId,
    /// Plan the owning episode executed.
    pub plan_id: PlanId,
    /// Index of this step within the plan.
    pub step_index: usize,
    /// Reward computed for this step.
    pub reward: RewardSignal,
    /// Trust level of the run this example was recorded from.
    pub source_trust: SourceTrust,
    /// Coarse bucket derived from `reward.total`.
    pub reward_tier: RewardTier,
}

/// A complete goal run, ready to serialize as one JSON-Lines record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    /// Goal pursued.
    pub goal_id: GoalId,
    /// Plan executed.
    pub plan_id: PlanId,
    /// Reward for the episode as a whole.
    pub episode_reward: RewardSignal,
    /// Per-step training examples.
    pub examples: Vec<TrainingExample>,
}

/// Accumulates [`Episode`] records from [`OrchestratedResult`]s.
#[derive(Debug, Default)]
pub struct TraceCollector {
    episodes: Vec<Episode>,
}

impl TraceCollector {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self { episodes: Vec::new() }
    }

    /// Records `result`, computing its reward and per-step examples as of
    /// `computed_at`.
    pub fn record(&mut self, result: &OrchestratedResult, source_trust: SourceTrust, computed_at: Timestamp) {
        let episode_value = episode_reward(result, computed_at);
        let examples = result
            .step_results
            .iter()
            .enumerate()
            .map(|(step_index, step)| {
                let reward = checkpoint_reward(step, DEFAULT_TARGET_DURATION_MS, computed_at);
                let reward_tier = RewardTier::from_value(reward.total);
                TrainingExample {
                    goal_id: result.goal_id.clone(),
                    plan_id: result.plan_id.clone(),
                    step_index,
                    reward,
                    source_trust,
                    reward_tier,
                }
            })
            .collect();
        self.episodes.push(Episode {
            goal_id: result.goal_id.clone(),
            plan_id: result.plan_id.clone(),
            episode_reward: episode_value,
            examples,
        });
    }

    /// Returns every recorded episode.
    #[must_use]
    pub fn episodes(&self) -> &[Episode] {
        &self.episodes
    }

    /// Serializes every recorded episode as newline-delimited JSON, one
    /// episode per line.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if any episode cannot be serialized.
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        let mut out = String::new();
        for episode in &self.episodes {
            out.push_str(&serde_json::to_string(episode)?);
            out.push('\n');
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use autonomy_core::PlanStatus;
    use time::macros::datetime;

    use super::*;

    fn ts() -> Timestamp {
        Timestamp::from_offset_date_time(datetime!(2026-01-01 00:00:00 UTC))
    }

    fn episode_result() -> OrchestratedResult {
        OrchestratedResult {
            goal_id: "g1".into(),
            plan_id: "p1".into(),
            plan_status: PlanStatus::Completed,
            step_results: Vec::new(),
            memory: None,
            audit: None,
        }
    }

    #[test]
    fn recording_appends_an_episode() {
        let mut collector = TraceCollector::new();
        collector.record(&episode_result(), SourceTrust::Trusted, ts());
        assert_eq!(collector.episodes().len(), 1);
    }

    #[test]
    fn jsonl_output_has_one_line_per_episode() {
        let mut collector = TraceCollector::new();
        collector.record(&episode_result(), SourceTrust::Trusted, ts());
        collector.record(&episode_result(), SourceTrust::Degraded, ts());
        let jsonl = collector.to_jsonl().expect("serialize");
        assert_eq!(jsonl.lines().count(), 2);
    }

    #[test]
    fn reward_tier_buckets_correctly() {
        assert_eq!(RewardTier::from_value(1.0), RewardTier::Positive);
        assert_eq!(RewardTier::from_value(0.0), RewardTier::Neutral);
        assert_eq!(RewardTier::from_value(-1.0), RewardTier::Negative);
    }
}
