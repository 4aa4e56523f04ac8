//! Per-watchpoint evaluation against one incoming message.
//!
//! Orchestrates extraction and comparison (or the custom hook), then
//! updates the watchpoint's result record and transition statistics.

use log::{debug, warn};

use crate::compare::compare;
use crate::error::EvalError;
use crate::extract::extract;
use crate::hooks::{CustomEvaluator, HookVerdict};
use crate::results::{bump, TransitionCapture, WatchpointRecord};
use crate::tables::WatchpointDefinition;
use crate::types::{CompareOp, WatchResult};

/// Evaluate one watchpoint against `message` and fold the outcome into
/// its record.
///
/// Evaluation errors mark the record `Error` and zero its staleness
/// countdown; they never propagate, so one bad watchpoint cannot stop
/// the rest of a message's fan-out.
pub(crate) fn process_watchpoint(
    def: &WatchpointDefinition,
    rec: &mut WatchpointRecord,
    custom: &mut dyn CustomEvaluator,
    watch_index: u16,
    message: &[u8],
    timestamp: u64,
) {
    bump(&mut rec.evaluation_count);

    match evaluate(def, custom, watch_index, message) {
        Ok((matched, processed)) => apply_outcome(rec, matched, processed, timestamp, def),
        Err(err) => {
            warn!("watchpoint {watch_index}: evaluation failed: {err}");
            rec.result = WatchResult::Error;
            rec.consecutive_true_count = 0;
            // Immediately eligible to go stale on the next maintenance tick.
            rec.stale_countdown = 0;
        }
    }
}

/// Extract and compare, returning the boolean verdict together with the
/// processed value captured on transitions.
fn evaluate(
    def: &WatchpointDefinition,
    custom: &mut dyn CustomEvaluator,
    watch_index: u16,
    message: &[u8],
) -> Result<(bool, u32), EvalError> {
    let raw = extract(message, def.offset, def.data_type)?;
    let processed = if def.data_type.is_float() {
        raw
    } else {
        raw & def.bit_mask
    };

    if def.operator == CompareOp::Custom {
        debug!("watchpoint {watch_index}: delegating to custom evaluator");
        return match custom.evaluate(watch_index, processed, def.custom_function_arg, message) {
            HookVerdict::True => Ok((true, processed)),
            HookVerdict::False => Ok((false, processed)),
            HookVerdict::Error => Err(EvalError::CustomFailed),
        };
    }

    let matched = compare(
        def.data_type,
        raw,
        def.bit_mask,
        def.operator,
        &def.comparison_value,
    )?;
    Ok((matched, processed))
}

fn apply_outcome(
    rec: &mut WatchpointRecord,
    matched: bool,
    processed: u32,
    timestamp: u64,
    def: &WatchpointDefinition,
) {
    let previous = rec.result;

    if matched {
        if previous != WatchResult::True {
            bump(&mut rec.false_to_true_count);
            rec.last_false_to_true = TransitionCapture {
                value: processed,
                timestamp,
            };
            rec.consecutive_true_count = 1;
        } else {
            bump(&mut rec.consecutive_true_count);
        }
        bump(&mut rec.cumulative_true_count);
        rec.result = WatchResult::True;
    } else {
        if previous == WatchResult::True {
            rec.last_true_to_false = TransitionCapture {
                value: processed,
                timestamp,
            };
        }
        rec.consecutive_true_count = 0;
        rec.result = WatchResult::False;
    }

    // A successful evaluation refreshes the staleness clock.
    rec.stale_countdown = def.staleness_age;
}
