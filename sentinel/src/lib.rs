//! Sentinel telemetry limit checking and autonomous response engine
//!
//! Watches a stream of incoming telemetry messages for field values
//! crossing configured thresholds (watchpoints), combines watchpoint
//! outcomes through Reverse-Polish boolean expressions (actionpoints),
//! and requests a pre-programmed corrective sequence when an
//! actionpoint's failure policy is exceeded.

mod compare;
mod dispatch;
mod engine;
mod error;
mod extract;
mod hooks;
mod results;
mod rpn;
mod snapshot;
mod staleness;
mod tables;
mod types;
mod validate;
mod watch;

pub use compare::compare;
pub use dispatch::{DispatchIndex, WatchIter};
pub use engine::Engine;
pub use error::{
    BusError, CommandError, ConfigError, EvalError, RpnError, SnapshotError, TableLoadError,
};
pub use extract::extract;
pub use hooks::{
    CustomEvaluator, HookVerdict, LogOnlyRequester, MessageBus, NullBus, RejectAllCustom,
    SequenceRequester,
};
pub use results::{ActionpointRecord, EngineStats, TransitionCapture, WatchpointRecord};
pub use rpn::RpnRuntimeError;
pub use snapshot::{pack_action_results, pack_watch_results, EngineSnapshot, Housekeeping};
pub use tables::{
    ActionpointDefinition, CompareValue, RpnToken, WatchpointDefinition, HASH_BUCKETS,
    MAX_ACTIONPOINTS, MAX_RPN_TOKENS, MAX_RTS_ID, MAX_WATCHPOINTS, MSG_ID_UNUSED, NO_BIT_MASK,
    SAMPLE_ALL,
};
pub use types::{
    ActionResult, ActionState, CompareOp, DataType, EngineMode, EventSeverity, WatchResult,
};
pub use validate::{validate_actionpoints, validate_watchpoints, ValidationSummary};
