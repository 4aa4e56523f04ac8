//! Error taxonomies for configuration, evaluation, and command handling.
//!
//! None of these are process-fatal: configuration errors block acceptance
//! of the offending table, evaluation errors are local to one result
//! record, and bus/persistence failures degrade to a logged warning.

use thiserror::Error;

use crate::types::{ActionState, DataType};
use crate::validate::ValidationSummary;

/// Reason a definition slot failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    #[error("slot {slot}: data type is not usable")]
    DataType { slot: usize },
    #[error("slot {slot}: comparison operator is not usable")]
    Operator { slot: usize },
    #[error("slot {slot}: message id {msg_id:#06x} is reserved")]
    MessageId { slot: usize, msg_id: u16 },
    #[error("slot {slot}: comparison value domain does not match {data_type}")]
    ValueDomain { slot: usize, data_type: DataType },
    #[error("slot {slot}: float comparison value is NaN")]
    FloatNan { slot: usize },
    #[error("slot {slot}: float comparison value is infinite")]
    FloatInf { slot: usize },
    #[error("slot {slot}: default state is not a startable state")]
    DefaultState { slot: usize },
    #[error("slot {slot}: corrective sequence id {rts_id} out of range")]
    RtsId { slot: usize, rts_id: u16 },
    #[error("slot {slot}: failure threshold must be positive")]
    FailCount { slot: usize },
    #[error("slot {slot}: event type is not usable")]
    EventType { slot: usize },
    #[error("slot {slot}: expression rejected: {reason}")]
    Rpn { slot: usize, reason: RpnError },
}

/// Reason an RPN expression failed the load-time well-formedness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RpnError {
    #[error("expression is empty")]
    Empty,
    #[error("expression exceeds {limit} tokens")]
    TooLong { limit: usize },
    #[error("watchpoint index {index} out of range")]
    WatchIndexOutOfRange { index: u16 },
    #[error("operand stack underflow at token {at}")]
    Underflow { at: usize },
    #[error("operand stack overflow at token {at}")]
    Overflow { at: usize },
    #[error("{depth} operands remain after the final token")]
    Leftover { depth: usize },
}

/// Reason one watchpoint evaluation produced an Error result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("field at offset {offset} ({need} bytes) exceeds message length {len}")]
    OffsetOutOfRange {
        offset: usize,
        need: usize,
        len: usize,
    },
    #[error("data type is not evaluatable")]
    UnknownDataType,
    #[error("operator is not evaluatable")]
    UnknownOperator,
    #[error("comparison value domain does not match the data type")]
    ValueDomain,
    #[error("extracted float is NaN")]
    NanOperand,
    #[error("custom evaluation reported an error")]
    CustomFailed,
}

/// Rejection of a state-mutating command-layer request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("index {index} out of range (table holds {limit} slots)")]
    InvalidIndex { index: u16, limit: usize },
    #[error("actionpoint {index}: state {state} does not permit this request")]
    InvalidState { index: u16, state: ActionState },
    #[error("sample range {start}..={end} is not valid")]
    InvalidRange { start: u16, end: u16 },
}

/// Message bus subscription failure. Non-fatal: the watchpoint stays
/// registered but may never receive data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("bus rejected subscription for message id {msg_id:#06x}: {reason}")]
pub struct BusError {
    pub msg_id: u16,
    pub reason: String,
}

/// Rejection of a candidate table pair. The previously loaded tables
/// remain active.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableLoadError {
    #[error("{count} watchpoint slots exceeds capacity {max}")]
    WatchpointCapacity { count: usize, max: usize },
    #[error("{count} actionpoint slots exceeds capacity {max}")]
    ActionpointCapacity { count: usize, max: usize },
    #[error("watchpoint table rejected: {first}")]
    Watchpoints {
        first: ConfigError,
        summary: ValidationSummary,
    },
    #[error("actionpoint table rejected: {first}")]
    Actionpoints {
        first: ConfigError,
        summary: ValidationSummary,
    },
}

/// Rejection of a persisted result snapshot at restore time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("snapshot holds {found} watchpoint records, tables define {expected}")]
    WatchpointShape { expected: usize, found: usize },
    #[error("snapshot holds {found} actionpoint records, tables define {expected}")]
    ActionpointShape { expected: usize, found: usize },
}
