//! End-to-end acceptance scenarios for the limit engine.

use crossbeam_channel::unbounded;

use sentinel::{
    ActionResult, ActionState, ActionpointDefinition, CommandError, CompareOp, CompareValue,
    DataType, Engine, EngineMode, EventSeverity, RpnToken, WatchResult, WatchpointDefinition,
    NO_BIT_MASK, SAMPLE_ALL,
};
use sentinel_harness::ChannelRequester;

fn byte_watch(message_id: u16, operator: CompareOp, limit: u32) -> WatchpointDefinition {
    WatchpointDefinition {
        data_type: DataType::UnsignedByte,
        operator,
        message_id,
        offset: 0,
        bit_mask: NO_BIT_MASK,
        comparison_value: CompareValue::Unsigned(limit),
        custom_function_arg: 0,
        staleness_age: 0,
    }
}

fn or_action(max_fails: u16) -> ActionpointDefinition {
    ActionpointDefinition {
        default_state: ActionState::Active,
        rts_id: 12,
        max_fails_before_rts: max_fails,
        event_type: EventSeverity::Critical,
        max_passive_events: 3,
        rpn_expression: vec![RpnToken::Watch(0), RpnToken::Watch(1), RpnToken::Or],
    }
}

/// Scenario A: unsigned byte >= 10 at offset 0.
#[test]
fn byte_threshold_watchpoint() {
    let mut engine = Engine::new(EngineMode::Active);
    engine
        .load_tables(vec![byte_watch(0x120, CompareOp::Ge, 10)], vec![])
        .unwrap();

    engine.dispatch_message(0x120, &[15], 0);
    assert_eq!(engine.watchpoint(0).unwrap().result, WatchResult::True);

    engine.dispatch_message(0x120, &[5], 1);
    assert_eq!(engine.watchpoint(0).unwrap().result, WatchResult::False);
}

/// Scenario B: an OR expression fails the actionpoint when it evaluates
/// true, passes when both operands are false.
#[test]
fn or_expression_verdicts() {
    let mut engine = Engine::new(EngineMode::Active);
    engine
        .load_tables(
            vec![
                byte_watch(0x120, CompareOp::Ge, 10),
                byte_watch(0x121, CompareOp::Ge, 10),
            ],
            vec![or_action(5)],
        )
        .unwrap();

    // Watchpoint 0 true, watchpoint 1 false.
    engine.dispatch_message(0x120, &[20], 0);
    engine.dispatch_message(0x121, &[2], 1);
    engine.sample_actionpoints(SAMPLE_ALL, 0, false).unwrap();
    assert_eq!(engine.actionpoint(0).unwrap().action_result, ActionResult::Fail);

    // Both false.
    engine.dispatch_message(0x120, &[2], 2);
    engine.sample_actionpoints(SAMPLE_ALL, 0, false).unwrap();
    assert_eq!(engine.actionpoint(0).unwrap().action_result, ActionResult::Pass);
    assert_eq!(engine.actionpoint(0).unwrap().fail_to_pass_count, 1);
}

/// Scenario C: three consecutive fails on an active actionpoint in an
/// active engine request exactly one corrective sequence, at the third
/// evaluation.
#[test]
fn three_fails_one_sequence_request() {
    let (request_tx, request_rx) = unbounded();
    let mut engine = Engine::new(EngineMode::Active)
        .with_requester(Box::new(ChannelRequester::new(request_tx)));
    engine
        .load_tables(
            vec![
                byte_watch(0x120, CompareOp::Ge, 10),
                byte_watch(0x121, CompareOp::Ge, 10),
            ],
            vec![or_action(3)],
        )
        .unwrap();

    engine.dispatch_message(0x120, &[20], 0);
    engine.dispatch_message(0x121, &[2], 1);

    for sample in 1..=3 {
        engine.sample_actionpoints(0, 0, false).unwrap();
        let requests: Vec<u16> = request_rx.try_iter().collect();
        if sample < 3 {
            assert!(requests.is_empty(), "no request at sample {sample}");
        } else {
            assert_eq!(requests, vec![12], "single request at sample {sample}");
        }
    }

    assert_eq!(engine.actionpoint(0).unwrap().cumulative_rts_exec_count, 1);
}

/// Scenario D: permanently-off is only reachable from Disabled and is
/// terminal against further state commands.
#[test]
fn permanently_off_requires_disabled_and_latches() {
    let mut engine = Engine::new(EngineMode::Active);
    engine
        .load_tables(
            vec![
                byte_watch(0x120, CompareOp::Ge, 10),
                byte_watch(0x121, CompareOp::Ge, 10),
            ],
            vec![or_action(3)],
        )
        .unwrap();

    let err = engine.set_actionpoint_permanently_off(0).unwrap_err();
    assert_eq!(
        err,
        CommandError::InvalidState {
            index: 0,
            state: ActionState::Active
        }
    );

    engine.set_actionpoint_state(0, ActionState::Disabled).unwrap();
    engine.set_actionpoint_permanently_off(0).unwrap();

    let err = engine.set_actionpoint_state(0, ActionState::Active).unwrap_err();
    assert_eq!(
        err,
        CommandError::InvalidState {
            index: 0,
            state: ActionState::PermanentlyOff
        }
    );
}

/// A stale operand poisons the whole expression without disturbing the
/// failure counters.
#[test]
fn stale_operand_yields_error_result() {
    let mut engine = Engine::new(EngineMode::Active);
    engine
        .load_tables(
            vec![
                byte_watch(0x120, CompareOp::Ge, 10),
                byte_watch(0x121, CompareOp::Ge, 10),
            ],
            vec![or_action(3)],
        )
        .unwrap();

    // Only watchpoint 0 ever gets data.
    engine.dispatch_message(0x120, &[20], 0);
    engine.sample_actionpoints(SAMPLE_ALL, 0, false).unwrap();

    let rec = engine.actionpoint(0).unwrap();
    assert_eq!(rec.action_result, ActionResult::Error);
    assert_eq!(rec.consecutive_fail_count, 0);
    assert_eq!(rec.cumulative_fail_count, 0);
}

/// Disabled and latched-off actionpoints are skipped by sampling.
#[test]
fn disabled_actionpoints_are_not_evaluated() {
    let mut engine = Engine::new(EngineMode::Active);
    engine
        .load_tables(
            vec![
                byte_watch(0x120, CompareOp::Ge, 10),
                byte_watch(0x121, CompareOp::Ge, 10),
            ],
            vec![or_action(3)],
        )
        .unwrap();

    engine.dispatch_message(0x120, &[20], 0);
    engine.dispatch_message(0x121, &[20], 1);
    engine.set_actionpoint_state(0, ActionState::Disabled).unwrap();

    engine.sample_actionpoints(SAMPLE_ALL, 0, false).unwrap();

    let rec = engine.actionpoint(0).unwrap();
    assert_eq!(rec.action_result, ActionResult::Stale);
    assert_eq!(engine.stats().actionpoint_sample_count, 0);
}
