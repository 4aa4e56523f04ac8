//! Static vetting of candidate definition tables.
//!
//! Validation walks every slot and keeps going past individual errors so
//! the caller gets a complete tally, but the scalar result is the first
//! error kind encountered, matching what the ground expects to see in
//! the rejection report.

use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::rpn::check_rpn;
use crate::tables::{
    ActionpointDefinition, CompareValue, WatchpointDefinition, MAX_RTS_ID, MSG_ID_UNUSED,
};
use crate::types::{ActionState, CompareOp};

/// Per-table outcome tally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub good: usize,
    pub bad: usize,
    pub unused: usize,
}

/// Vet a watchpoint table. Returns the first error encountered (if any)
/// along with the full tally.
pub fn validate_watchpoints(
    definitions: &[WatchpointDefinition],
) -> (Option<ConfigError>, ValidationSummary) {
    let mut summary = ValidationSummary::default();
    let mut first = None;

    for (slot, def) in definitions.iter().enumerate() {
        if !def.is_used() {
            summary.unused += 1;
            continue;
        }
        match check_watchpoint(slot, def) {
            Ok(()) => summary.good += 1,
            Err(err) => {
                error!("watchpoint table: {err}");
                summary.bad += 1;
                first.get_or_insert(err);
            }
        }
    }

    info!(
        "watchpoint table: {} good, {} bad, {} unused",
        summary.good, summary.bad, summary.unused
    );
    (first, summary)
}

fn check_watchpoint(slot: usize, def: &WatchpointDefinition) -> Result<(), ConfigError> {
    if def.operator == CompareOp::None {
        return Err(ConfigError::Operator { slot });
    }
    if def.message_id == MSG_ID_UNUSED {
        return Err(ConfigError::MessageId {
            slot,
            msg_id: def.message_id,
        });
    }
    if !def.comparison_value.matches(def.data_type) {
        return Err(ConfigError::ValueDomain {
            slot,
            data_type: def.data_type,
        });
    }
    if let CompareValue::Float(value) = def.comparison_value {
        if value.is_nan() {
            return Err(ConfigError::FloatNan { slot });
        }
        if value.is_infinite() {
            return Err(ConfigError::FloatInf { slot });
        }
    }
    Ok(())
}

/// Vet an actionpoint table against a watchpoint table of `watch_count`
/// slots. Same first-error-plus-tally contract as the watchpoint pass.
pub fn validate_actionpoints(
    definitions: &[ActionpointDefinition],
    watch_count: usize,
) -> (Option<ConfigError>, ValidationSummary) {
    let mut summary = ValidationSummary::default();
    let mut first = None;

    for (slot, def) in definitions.iter().enumerate() {
        if !def.is_used() {
            summary.unused += 1;
            continue;
        }
        match check_actionpoint(slot, def, watch_count) {
            Ok(()) => summary.good += 1,
            Err(err) => {
                error!("actionpoint table: {err}");
                summary.bad += 1;
                first.get_or_insert(err);
            }
        }
    }

    info!(
        "actionpoint table: {} good, {} bad, {} unused",
        summary.good, summary.bad, summary.unused
    );
    (first, summary)
}

fn check_actionpoint(
    slot: usize,
    def: &ActionpointDefinition,
    watch_count: usize,
) -> Result<(), ConfigError> {
    if def.default_state == ActionState::PermanentlyOff {
        return Err(ConfigError::DefaultState { slot });
    }
    if def.rts_id == 0 || def.rts_id > MAX_RTS_ID {
        return Err(ConfigError::RtsId {
            slot,
            rts_id: def.rts_id,
        });
    }
    if def.max_fails_before_rts == 0 {
        return Err(ConfigError::FailCount { slot });
    }
    check_rpn(&def.rpn_expression, watch_count)
        .map_err(|reason| ConfigError::Rpn { slot, reason })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RpnError;
    use crate::tables::{RpnToken, NO_BIT_MASK};
    use crate::types::{DataType, EventSeverity};

    fn good_watch() -> WatchpointDefinition {
        WatchpointDefinition {
            data_type: DataType::UnsignedWordBe,
            operator: CompareOp::Gt,
            message_id: 0x0810,
            offset: 2,
            bit_mask: NO_BIT_MASK,
            comparison_value: CompareValue::Unsigned(1000),
            custom_function_arg: 0,
            staleness_age: 4,
        }
    }

    fn good_action() -> ActionpointDefinition {
        ActionpointDefinition {
            default_state: ActionState::Active,
            rts_id: 5,
            max_fails_before_rts: 3,
            event_type: EventSeverity::Warning,
            max_passive_events: 5,
            rpn_expression: vec![RpnToken::Watch(0)],
        }
    }

    #[test]
    fn test_clean_watchpoint_table() {
        let defs = vec![good_watch(), WatchpointDefinition::unused(), good_watch()];
        let (first, summary) = validate_watchpoints(&defs);
        assert!(first.is_none());
        assert_eq!(
            summary,
            ValidationSummary {
                good: 2,
                bad: 0,
                unused: 1
            }
        );
    }

    #[test]
    fn test_first_error_wins_with_complete_tally() {
        let mut no_operator = good_watch();
        no_operator.operator = CompareOp::None;
        let mut no_msg = good_watch();
        no_msg.message_id = MSG_ID_UNUSED;

        let defs = vec![no_operator, good_watch(), no_msg];
        let (first, summary) = validate_watchpoints(&defs);

        assert_eq!(first, Some(ConfigError::Operator { slot: 0 }));
        assert_eq!(summary.good, 1);
        assert_eq!(summary.bad, 2);
    }

    #[test]
    fn test_float_nan_and_inf_are_distinct_errors() {
        let mut nan = good_watch();
        nan.data_type = DataType::FloatBe;
        nan.comparison_value = CompareValue::Float(f32::NAN);
        let (first, _) = validate_watchpoints(&[nan]);
        assert_eq!(first, Some(ConfigError::FloatNan { slot: 0 }));

        let mut inf = good_watch();
        inf.data_type = DataType::FloatLe;
        inf.comparison_value = CompareValue::Float(f32::NEG_INFINITY);
        let (first, _) = validate_watchpoints(&[inf]);
        assert_eq!(first, Some(ConfigError::FloatInf { slot: 0 }));
    }

    #[test]
    fn test_value_domain_mismatch_rejected() {
        let mut mismatched = good_watch();
        mismatched.comparison_value = CompareValue::Signed(-1);
        let (first, _) = validate_watchpoints(&[mismatched]);
        assert_eq!(
            first,
            Some(ConfigError::ValueDomain {
                slot: 0,
                data_type: DataType::UnsignedWordBe
            })
        );
    }

    #[test]
    fn test_clean_actionpoint_table() {
        let defs = vec![good_action(), ActionpointDefinition::unused()];
        let (first, summary) = validate_actionpoints(&defs, 1);
        assert!(first.is_none());
        assert_eq!(summary.good, 1);
        assert_eq!(summary.unused, 1);
    }

    #[test]
    fn test_permanently_off_default_rejected() {
        let mut def = good_action();
        def.default_state = ActionState::PermanentlyOff;
        let (first, _) = validate_actionpoints(&[def], 1);
        assert_eq!(first, Some(ConfigError::DefaultState { slot: 0 }));
    }

    #[test]
    fn test_rts_id_bounds() {
        let mut zero = good_action();
        zero.rts_id = 0;
        let (first, _) = validate_actionpoints(&[zero], 1);
        assert_eq!(first, Some(ConfigError::RtsId { slot: 0, rts_id: 0 }));

        let mut high = good_action();
        high.rts_id = MAX_RTS_ID + 1;
        let (first, _) = validate_actionpoints(&[high], 1);
        assert!(matches!(first, Some(ConfigError::RtsId { .. })));
    }

    #[test]
    fn test_zero_fail_threshold_rejected() {
        let mut def = good_action();
        def.max_fails_before_rts = 0;
        let (first, _) = validate_actionpoints(&[def], 1);
        assert_eq!(first, Some(ConfigError::FailCount { slot: 0 }));
    }

    #[test]
    fn test_malformed_rpn_rejected() {
        let mut empty = good_action();
        empty.rpn_expression = vec![];
        let (first, _) = validate_actionpoints(&[empty], 1);
        assert_eq!(
            first,
            Some(ConfigError::Rpn {
                slot: 0,
                reason: RpnError::Empty
            })
        );

        let mut underflow = good_action();
        underflow.rpn_expression = vec![RpnToken::Watch(0), RpnToken::And];
        let (first, _) = validate_actionpoints(&[underflow], 1);
        assert!(matches!(first, Some(ConfigError::Rpn { .. })));
    }

    #[test]
    fn test_rpn_watch_index_checked_against_table_size() {
        let mut def = good_action();
        def.rpn_expression = vec![RpnToken::Watch(9)];
        let (first, _) = validate_actionpoints(&[def], 4);
        assert_eq!(
            first,
            Some(ConfigError::Rpn {
                slot: 0,
                reason: RpnError::WatchIndexOutOfRange { index: 9 }
            })
        );
    }
}
