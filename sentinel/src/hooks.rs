//! Collaborator seams injected at engine construction.
//!
//! The engine never talks to a transport, sequence store, or
//! mission-specific evaluation code directly; each boundary is a trait
//! with a conservative default implementation so the engine is fully
//! testable in isolation.

use log::warn;

use crate::error::BusError;

/// Three-valued outcome of a custom watchpoint evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookVerdict {
    True,
    False,
    Error,
}

/// Mission-specific watchpoint evaluation, invoked only for
/// `CompareOp::Custom`.
pub trait CustomEvaluator {
    /// Judge the processed field value (masked for integer types, raw
    /// bits for floats) extracted for `watch_index` from `message`.
    /// `arg` is the definition's opaque custom-function argument.
    fn evaluate(&mut self, watch_index: u16, value: u32, arg: u32, message: &[u8]) -> HookVerdict;
}

/// Default hook: flags every custom evaluation as unexpected.
#[derive(Debug, Default)]
pub struct RejectAllCustom;

impl CustomEvaluator for RejectAllCustom {
    fn evaluate(&mut self, watch_index: u16, _value: u32, _arg: u32, _message: &[u8]) -> HookVerdict {
        warn!("watchpoint {watch_index}: no custom evaluator installed");
        HookVerdict::Error
    }
}

/// Message bus subscription interface. Delivery comes back through
/// `Engine::dispatch_message`.
pub trait MessageBus {
    fn subscribe(&mut self, message_id: u16) -> Result<(), BusError>;
}

/// Bus stand-in that accepts every subscription.
#[derive(Debug, Default)]
pub struct NullBus;

impl MessageBus for NullBus {
    fn subscribe(&mut self, _message_id: u16) -> Result<(), BusError> {
        Ok(())
    }
}

/// Corrective sequence dispatch boundary.
pub trait SequenceRequester {
    fn request_sequence(&mut self, rts_id: u16);
}

/// Requester stand-in that only logs the request.
#[derive(Debug, Default)]
pub struct LogOnlyRequester;

impl SequenceRequester for LogOnlyRequester {
    fn request_sequence(&mut self, rts_id: u16) {
        warn!("corrective sequence {rts_id} requested with no dispatcher installed");
    }
}
