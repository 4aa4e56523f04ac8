//! Countdown aging of watchpoint results.
//!
//! Runs on a fixed maintenance cadence independent of message arrival.
//! The countdown is cooperative: one decrement per tick, not wall-clock
//! driven.

use log::debug;

use crate::results::WatchpointRecord;
use crate::tables::WatchpointDefinition;
use crate::types::WatchResult;

/// Age every used watchpoint by one maintenance cycle.
///
/// A countdown reaching zero marks the result `Stale` unless it is
/// already `Error`; an error holds until the next successful refresh.
pub(crate) fn age_watchpoints(
    definitions: &[WatchpointDefinition],
    records: &mut [WatchpointRecord],
) {
    for (slot, def) in definitions.iter().enumerate() {
        if !def.is_used() {
            continue;
        }
        let rec = &mut records[slot];
        if rec.stale_countdown == 0 {
            continue;
        }
        rec.stale_countdown -= 1;
        if rec.stale_countdown == 0 && rec.result != WatchResult::Error {
            debug!("watchpoint {slot}: result aged to stale");
            rec.result = WatchResult::Stale;
        }
    }
}
