//! Housekeeping status packing and persistence snapshots.
//!
//! Housekeeping telemetry carries the result tables as bit-packed
//! arrays: 2 bits per watchpoint and 4 bits per actionpoint (2 bits of
//! state, 2 bits of result), packed most-significant-slot-first within
//! each byte. The persistence snapshot is an exact serde copy of the
//! result tables plus the engine counters and mode.

use serde::{Deserialize, Serialize};

use crate::results::{ActionpointRecord, EngineStats, WatchpointRecord};
use crate::types::EngineMode;

/// Pack watchpoint results, four slots per byte, slot 0 in bits 7..6.
pub fn pack_watch_results(records: &[WatchpointRecord]) -> Vec<u8> {
    records
        .chunks(4)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |byte, (lane, rec)| {
                    byte | ((rec.result as u8) << (6 - 2 * lane as u8))
                })
        })
        .collect()
}

/// Pack actionpoint state and result, two slots per byte, slot 0 in the
/// high nibble with state above result.
pub fn pack_action_results(records: &[ActionpointRecord]) -> Vec<u8> {
    records
        .chunks(2)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |byte, (lane, rec)| {
                    let nibble = (rec.current_state.hk_bits() << 2) | rec.action_result as u8;
                    byte | (nibble << (4 - 4 * lane as u8))
                })
        })
        .collect()
}

/// Housekeeping report assembled for telemetry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Housekeeping {
    pub mode: EngineMode,
    pub stats: EngineStats,
    pub watchpoint_status: Vec<u8>,
    pub actionpoint_status: Vec<u8>,
}

/// Restart-surviving copy of the engine's mutable state.
///
/// The engine treats this purely as a snapshot of its own arrays; the
/// store that holds it imposes whatever format it likes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub mode: EngineMode,
    pub stats: EngineStats,
    pub watchpoints: Vec<WatchpointRecord>,
    pub actionpoints: Vec<ActionpointRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActionResult, ActionState, WatchResult};

    fn watch(result: WatchResult) -> WatchpointRecord {
        let mut rec = WatchpointRecord::fresh();
        rec.result = result;
        rec
    }

    fn action(state: ActionState, result: ActionResult) -> ActionpointRecord {
        let mut rec = ActionpointRecord::fresh(state);
        rec.action_result = result;
        rec
    }

    #[test]
    fn test_watch_packing_msb_first() {
        let records = vec![
            watch(WatchResult::False), // 00
            watch(WatchResult::True),  // 01
            watch(WatchResult::Error), // 10
            watch(WatchResult::Stale), // 11
        ];
        assert_eq!(pack_watch_results(&records), vec![0b00_01_10_11]);
    }

    #[test]
    fn test_watch_packing_partial_byte() {
        let records = vec![watch(WatchResult::True), watch(WatchResult::Error)];
        // Remaining lanes are zero-filled.
        assert_eq!(pack_watch_results(&records), vec![0b01_10_00_00]);
    }

    #[test]
    fn test_watch_packing_spans_bytes() {
        let records = vec![
            watch(WatchResult::True),
            watch(WatchResult::True),
            watch(WatchResult::True),
            watch(WatchResult::True),
            watch(WatchResult::Stale),
        ];
        assert_eq!(pack_watch_results(&records), vec![0b01_01_01_01, 0b11_00_00_00]);
    }

    #[test]
    fn test_action_packing_layout() {
        let records = vec![
            action(ActionState::Active, ActionResult::Fail), // state 01, result 01
            action(ActionState::Disabled, ActionResult::Pass), // state 11, result 00
        ];
        assert_eq!(pack_action_results(&records), vec![0b0101_1100]);
    }

    #[test]
    fn test_action_packing_permanently_off_reports_not_used() {
        let records = vec![action(ActionState::PermanentlyOff, ActionResult::Stale)];
        assert_eq!(pack_action_results(&records), vec![0b0011_0000]);
    }

    #[test]
    fn test_empty_tables_pack_empty() {
        assert!(pack_watch_results(&[]).is_empty());
        assert!(pack_action_results(&[]).is_empty());
    }
}
