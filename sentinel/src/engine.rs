//! The owning engine context and its entry points.
//!
//! All mutable state lives in one `Engine` value passed to every entry
//! point; there are no process-wide globals, so each test constructs a
//! fresh engine. Message dispatch and the maintenance tick are expected
//! to be serialized by the caller; nothing here blocks on I/O.

use log::{debug, info, trace, warn};

use crate::dispatch::DispatchIndex;
use crate::error::{CommandError, SnapshotError, TableLoadError};
use crate::hooks::{
    CustomEvaluator, LogOnlyRequester, MessageBus, NullBus, RejectAllCustom, SequenceRequester,
};
use crate::results::{bump, ActionpointRecord, EngineStats, WatchpointRecord};
use crate::rpn::evaluate_rpn;
use crate::snapshot::{pack_action_results, pack_watch_results, EngineSnapshot, Housekeeping};
use crate::staleness::age_watchpoints;
use crate::tables::{
    ActionpointDefinition, WatchpointDefinition, MAX_ACTIONPOINTS, MAX_WATCHPOINTS, SAMPLE_ALL,
};
use crate::types::{ActionResult, ActionState, EngineMode};
use crate::validate::{validate_actionpoints, validate_watchpoints, ValidationSummary};
use crate::watch::process_watchpoint;

/// Limit-checking engine: definition tables, result records, dispatch
/// index, and the injected collaborator boundaries.
pub struct Engine {
    watch_defs: Vec<WatchpointDefinition>,
    action_defs: Vec<ActionpointDefinition>,
    watch_results: Vec<WatchpointRecord>,
    action_results: Vec<ActionpointRecord>,
    dispatch: DispatchIndex,
    mode: EngineMode,
    stats: EngineStats,
    bus: Box<dyn MessageBus>,
    requester: Box<dyn SequenceRequester>,
    custom: Box<dyn CustomEvaluator>,
}

impl Engine {
    /// An engine with empty tables and stand-in collaborators.
    pub fn new(mode: EngineMode) -> Self {
        Self {
            watch_defs: Vec::new(),
            action_defs: Vec::new(),
            watch_results: Vec::new(),
            action_results: Vec::new(),
            dispatch: DispatchIndex::empty(),
            mode,
            stats: EngineStats::default(),
            bus: Box::new(NullBus),
            requester: Box::new(LogOnlyRequester),
            custom: Box::new(RejectAllCustom),
        }
    }

    /// Install a message bus for dispatch subscriptions.
    pub fn with_bus(mut self, bus: Box<dyn MessageBus>) -> Self {
        self.bus = bus;
        self
    }

    /// Install a corrective sequence dispatcher.
    pub fn with_requester(mut self, requester: Box<dyn SequenceRequester>) -> Self {
        self.requester = requester;
        self
    }

    /// Install a mission-specific custom evaluator.
    pub fn with_custom_evaluator(mut self, custom: Box<dyn CustomEvaluator>) -> Self {
        self.custom = custom;
        self
    }

    /// Vet and install a candidate table pair.
    ///
    /// On rejection the previously loaded tables remain active. On
    /// success the result records are cold-initialized, the dispatch
    /// index is rebuilt, and every distinct message id is subscribed
    /// with the bus (subscription failures are logged, not fatal).
    pub fn load_tables(
        &mut self,
        watchpoints: Vec<WatchpointDefinition>,
        actionpoints: Vec<ActionpointDefinition>,
    ) -> Result<(ValidationSummary, ValidationSummary), TableLoadError> {
        if watchpoints.len() > MAX_WATCHPOINTS {
            return Err(TableLoadError::WatchpointCapacity {
                count: watchpoints.len(),
                max: MAX_WATCHPOINTS,
            });
        }
        if actionpoints.len() > MAX_ACTIONPOINTS {
            return Err(TableLoadError::ActionpointCapacity {
                count: actionpoints.len(),
                max: MAX_ACTIONPOINTS,
            });
        }

        let (first, watch_summary) = validate_watchpoints(&watchpoints);
        if let Some(first) = first {
            return Err(TableLoadError::Watchpoints {
                first,
                summary: watch_summary,
            });
        }
        let (first, action_summary) = validate_actionpoints(&actionpoints, watchpoints.len());
        if let Some(first) = first {
            return Err(TableLoadError::Actionpoints {
                first,
                summary: action_summary,
            });
        }

        self.watch_results = watchpoints.iter().map(|_| WatchpointRecord::fresh()).collect();
        self.action_results = actionpoints
            .iter()
            .map(|def| ActionpointRecord::fresh(def.default_state))
            .collect();
        self.dispatch = DispatchIndex::build(&watchpoints);
        self.watch_defs = watchpoints;
        self.action_defs = actionpoints;

        let subscriptions: Vec<u16> = self.dispatch.distinct_ids().collect();
        for msg_id in subscriptions {
            if let Err(err) = self.bus.subscribe(msg_id) {
                warn!("table load: {err}");
            }
        }

        info!(
            "tables loaded: {} watchpoints, {} actionpoints in use",
            watch_summary.good, action_summary.good
        );
        Ok((watch_summary, action_summary))
    }

    /// Message bus delivery entry point: fan the message out to every
    /// watchpoint inspecting its id.
    pub fn dispatch_message(&mut self, message_id: u16, payload: &[u8], timestamp: u64) {
        if self.mode == EngineMode::Disabled {
            trace!("message {message_id:#06x} ignored while disabled");
            return;
        }

        let matched: Vec<u16> = self.dispatch.lookup(message_id).collect();
        if matched.is_empty() {
            debug!("message id {message_id:#06x} is unreferenced");
            return;
        }

        bump(&mut self.stats.monitored_msg_count);
        for index in matched {
            let slot = usize::from(index);
            process_watchpoint(
                &self.watch_defs[slot],
                &mut self.watch_results[slot],
                self.custom.as_mut(),
                index,
                payload,
                timestamp,
            );
            bump(&mut self.stats.watchpoint_check_count);
        }
    }

    /// Evaluate actionpoints over an inclusive index range, or every
    /// slot when `start == SAMPLE_ALL`. With `refresh_staleness` the
    /// watchpoint aging pass runs first.
    pub fn sample_actionpoints(
        &mut self,
        start: u16,
        end: u16,
        refresh_staleness: bool,
    ) -> Result<(), CommandError> {
        let count = self.action_defs.len();
        let range = if start == SAMPLE_ALL {
            0..count
        } else {
            if start > end {
                return Err(CommandError::InvalidRange { start, end });
            }
            if usize::from(end) >= count {
                return Err(CommandError::InvalidIndex {
                    index: end,
                    limit: count,
                });
            }
            usize::from(start)..usize::from(end) + 1
        };

        if self.mode == EngineMode::Disabled {
            debug!("actionpoint sample request ignored while disabled");
            return Ok(());
        }

        if refresh_staleness {
            age_watchpoints(&self.watch_defs, &mut self.watch_results);
        }
        for slot in range {
            self.sample_actionpoint(slot);
        }
        Ok(())
    }

    /// Periodic maintenance: age watchpoint results by one cycle.
    pub fn run_maintenance_tick(&mut self) {
        age_watchpoints(&self.watch_defs, &mut self.watch_results);
    }

    fn sample_actionpoint(&mut self, slot: usize) {
        let state = self.action_results[slot].current_state;
        if !matches!(state, ActionState::Active | ActionState::Passive) {
            return;
        }
        bump(&mut self.stats.actionpoint_sample_count);

        match evaluate_rpn(&self.action_defs[slot].rpn_expression, &self.watch_results) {
            Err(err) => {
                debug!("actionpoint {slot}: {err}");
                self.action_results[slot].action_result = ActionResult::Error;
            }
            Ok(false) => {
                let rec = &mut self.action_results[slot];
                if rec.action_result == ActionResult::Fail {
                    bump(&mut rec.fail_to_pass_count);
                }
                rec.consecutive_fail_count = 0;
                rec.action_result = ActionResult::Pass;
            }
            Ok(true) => self.record_failure(slot, state),
        }
    }

    /// Fold in a failed evaluation and apply the autonomous-response
    /// policy. On issuing a request the actionpoint drops to Passive so
    /// one failure episode requests its sequence exactly once.
    fn record_failure(&mut self, slot: usize, state: ActionState) {
        let def = &self.action_defs[slot];
        let rec = &mut self.action_results[slot];

        let previous = rec.action_result;
        rec.action_result = ActionResult::Fail;
        bump(&mut rec.consecutive_fail_count);
        bump(&mut rec.cumulative_fail_count);
        if previous == ActionResult::Pass {
            bump(&mut rec.pass_to_fail_count);
        }

        if rec.consecutive_fail_count < u32::from(def.max_fails_before_rts) {
            return;
        }

        if state == ActionState::Active && self.mode == EngineMode::Active {
            rec.current_state = ActionState::Passive;
            bump(&mut rec.cumulative_rts_exec_count);
            bump(&mut self.stats.rts_request_count);
            log::log!(
                def.event_type.log_level(),
                "actionpoint {slot}: failure threshold reached, requesting sequence {}",
                def.rts_id
            );
            bump(&mut rec.cumulative_event_msgs_sent);
            self.requester.request_sequence(def.rts_id);
        } else {
            bump(&mut rec.passive_count);
            bump(&mut self.stats.passive_rts_count);
            if rec.cumulative_event_msgs_sent < u32::from(def.max_passive_events) {
                log::log!(
                    def.event_type.log_level(),
                    "actionpoint {slot}: failure threshold reached while passive"
                );
                bump(&mut rec.cumulative_event_msgs_sent);
            }
        }
    }

    /// Change the process-wide mode gating autonomous responses.
    pub fn set_engine_mode(&mut self, mode: EngineMode) {
        info!("engine mode {} -> {}", self.mode, mode);
        self.mode = mode;
    }

    /// Command one actionpoint (or every commandable one via
    /// `SAMPLE_ALL`) into Active, Passive, or Disabled.
    pub fn set_actionpoint_state(
        &mut self,
        index: u16,
        new_state: ActionState,
    ) -> Result<(), CommandError> {
        if !matches!(
            new_state,
            ActionState::Active | ActionState::Passive | ActionState::Disabled
        ) {
            return Err(CommandError::InvalidState {
                index,
                state: new_state,
            });
        }

        if index == SAMPLE_ALL {
            for rec in &mut self.action_results {
                if matches!(
                    rec.current_state,
                    ActionState::NotUsed | ActionState::PermanentlyOff
                ) {
                    continue;
                }
                rec.current_state = new_state;
            }
            return Ok(());
        }

        let slot = self.check_action_index(index)?;
        let rec = &mut self.action_results[slot];
        match rec.current_state {
            ActionState::NotUsed | ActionState::PermanentlyOff => Err(CommandError::InvalidState {
                index,
                state: rec.current_state,
            }),
            _ => {
                rec.current_state = new_state;
                Ok(())
            }
        }
    }

    /// Latch a Disabled actionpoint permanently off. Only a table
    /// reload can bring it back.
    pub fn set_actionpoint_permanently_off(&mut self, index: u16) -> Result<(), CommandError> {
        let slot = self.check_action_index(index)?;
        let rec = &mut self.action_results[slot];
        if rec.current_state != ActionState::Disabled {
            return Err(CommandError::InvalidState {
                index,
                state: rec.current_state,
            });
        }
        rec.current_state = ActionState::PermanentlyOff;
        info!("actionpoint {index} permanently off");
        Ok(())
    }

    /// Clear one watchpoint's statistics, or every slot's via `SAMPLE_ALL`.
    pub fn reset_watchpoint_stats(&mut self, index: u16) -> Result<(), CommandError> {
        if index == SAMPLE_ALL {
            for rec in &mut self.watch_results {
                rec.reset_stats();
            }
            return Ok(());
        }
        let limit = self.watch_results.len();
        let rec = self
            .watch_results
            .get_mut(usize::from(index))
            .ok_or(CommandError::InvalidIndex { index, limit })?;
        rec.reset_stats();
        Ok(())
    }

    /// Clear one actionpoint's statistics, or every slot's via `SAMPLE_ALL`.
    pub fn reset_actionpoint_stats(&mut self, index: u16) -> Result<(), CommandError> {
        if index == SAMPLE_ALL {
            for rec in &mut self.action_results {
                rec.reset_stats();
            }
            return Ok(());
        }
        let slot = self.check_action_index(index)?;
        self.action_results[slot].reset_stats();
        Ok(())
    }

    /// Clear the engine-wide housekeeping counters.
    pub fn reset_engine_stats(&mut self) {
        self.stats.reset();
    }

    fn check_action_index(&self, index: u16) -> Result<usize, CommandError> {
        let slot = usize::from(index);
        if slot >= self.action_results.len() {
            return Err(CommandError::InvalidIndex {
                index,
                limit: self.action_results.len(),
            });
        }
        Ok(slot)
    }

    /// Bit-packed status report for housekeeping telemetry.
    pub fn housekeeping(&self) -> Housekeeping {
        Housekeeping {
            mode: self.mode,
            stats: self.stats,
            watchpoint_status: pack_watch_results(&self.watch_results),
            actionpoint_status: pack_action_results(&self.action_results),
        }
    }

    /// Exact copy of the mutable state for the persistent store.
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            mode: self.mode,
            stats: self.stats,
            watchpoints: self.watch_results.clone(),
            actionpoints: self.action_results.clone(),
        }
    }

    /// Resume from a previously saved snapshot instead of the cold
    /// initialization done by `load_tables`. The snapshot must match
    /// the loaded tables' shape.
    pub fn restore(&mut self, snapshot: EngineSnapshot) -> Result<(), SnapshotError> {
        if snapshot.watchpoints.len() != self.watch_defs.len() {
            return Err(SnapshotError::WatchpointShape {
                expected: self.watch_defs.len(),
                found: snapshot.watchpoints.len(),
            });
        }
        if snapshot.actionpoints.len() != self.action_defs.len() {
            return Err(SnapshotError::ActionpointShape {
                expected: self.action_defs.len(),
                found: snapshot.actionpoints.len(),
            });
        }
        self.mode = snapshot.mode;
        self.stats = snapshot.stats;
        self.watch_results = snapshot.watchpoints;
        self.action_results = snapshot.actionpoints;
        info!("engine state restored from snapshot");
        Ok(())
    }

    pub fn mode(&self) -> EngineMode {
        self.mode
    }

    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    pub fn watchpoint_count(&self) -> usize {
        self.watch_defs.len()
    }

    pub fn actionpoint_count(&self) -> usize {
        self.action_defs.len()
    }

    pub fn watchpoint(&self, index: u16) -> Option<&WatchpointRecord> {
        self.watch_results.get(usize::from(index))
    }

    pub fn actionpoint(&self, index: u16) -> Option<&ActionpointRecord> {
        self.action_results.get(usize::from(index))
    }
}
