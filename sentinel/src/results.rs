//! Runtime result records, kept in arrays parallel to the definition
//! tables, plus the engine-wide statistics counters.
//!
//! All counters saturate rather than wrap; a record that has counted to
//! `u32::MAX` keeps reporting the ceiling until reset by command.

use serde::{Deserialize, Serialize};

use crate::types::{ActionResult, ActionState, WatchResult};

/// Saturating counter increment.
pub(crate) fn bump(counter: &mut u32) {
    *counter = counter.saturating_add(1);
}

/// Value and receipt time captured at a result transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionCapture {
    /// Processed field value (masked for integer types, raw bits for floats).
    pub value: u32,
    /// Receipt timestamp of the triggering message.
    pub timestamp: u64,
}

/// Runtime state of one watchpoint slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchpointRecord {
    pub result: WatchResult,
    /// Maintenance cycles remaining before the result auto-stales.
    pub stale_countdown: u32,
    pub evaluation_count: u32,
    pub false_to_true_count: u32,
    pub consecutive_true_count: u32,
    pub cumulative_true_count: u32,
    pub last_false_to_true: TransitionCapture,
    pub last_true_to_false: TransitionCapture,
}

impl WatchpointRecord {
    /// A never-evaluated record.
    pub fn fresh() -> Self {
        Self {
            result: WatchResult::Stale,
            stale_countdown: 0,
            evaluation_count: 0,
            false_to_true_count: 0,
            consecutive_true_count: 0,
            cumulative_true_count: 0,
            last_false_to_true: TransitionCapture::default(),
            last_true_to_false: TransitionCapture::default(),
        }
    }

    /// Clear statistics and return the record to the never-evaluated state.
    pub fn reset_stats(&mut self) {
        *self = Self::fresh();
    }
}

/// Runtime state of one actionpoint slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionpointRecord {
    pub current_state: ActionState,
    pub action_result: ActionResult,
    /// Failures past the threshold while the actionpoint or engine was passive.
    pub passive_count: u32,
    pub fail_to_pass_count: u32,
    pub pass_to_fail_count: u32,
    pub consecutive_fail_count: u32,
    pub cumulative_fail_count: u32,
    pub cumulative_rts_exec_count: u32,
    pub cumulative_event_msgs_sent: u32,
}

impl ActionpointRecord {
    /// A never-sampled record starting in the given state.
    pub fn fresh(state: ActionState) -> Self {
        Self {
            current_state: state,
            action_result: ActionResult::Stale,
            passive_count: 0,
            fail_to_pass_count: 0,
            pass_to_fail_count: 0,
            consecutive_fail_count: 0,
            cumulative_fail_count: 0,
            cumulative_rts_exec_count: 0,
            cumulative_event_msgs_sent: 0,
        }
    }

    /// Clear statistics, keeping the current operational state.
    pub fn reset_stats(&mut self) {
        let state = self.current_state;
        *self = Self::fresh(state);
    }
}

/// Engine-wide counters reported in housekeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStats {
    /// Messages received that at least one watchpoint references.
    pub monitored_msg_count: u32,
    /// Individual watchpoint evaluations performed.
    pub watchpoint_check_count: u32,
    /// Individual actionpoint evaluations performed.
    pub actionpoint_sample_count: u32,
    /// Corrective sequence requests issued.
    pub rts_request_count: u32,
    /// Threshold crossings suppressed by a passive state or mode.
    pub passive_rts_count: u32,
}

impl EngineStats {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_watchpoint_record_is_stale() {
        let rec = WatchpointRecord::fresh();
        assert_eq!(rec.result, WatchResult::Stale);
        assert_eq!(rec.stale_countdown, 0);
        assert_eq!(rec.evaluation_count, 0);
    }

    #[test]
    fn test_actionpoint_reset_keeps_state() {
        let mut rec = ActionpointRecord::fresh(ActionState::Passive);
        rec.consecutive_fail_count = 5;
        rec.action_result = ActionResult::Fail;

        rec.reset_stats();

        assert_eq!(rec.current_state, ActionState::Passive);
        assert_eq!(rec.consecutive_fail_count, 0);
        assert_eq!(rec.action_result, ActionResult::Stale);
    }

    #[test]
    fn test_bump_saturates() {
        let mut counter = u32::MAX - 1;
        bump(&mut counter);
        assert_eq!(counter, u32::MAX);
        bump(&mut counter);
        assert_eq!(counter, u32::MAX);
    }
}
