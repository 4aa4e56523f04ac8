//! State enumerations shared across the engine.

use serde::{Deserialize, Serialize};
use strum::Display;

/// Typed interpretation of a watchpoint's telemetry field.
///
/// Word and double-word types carry an explicit byte order because the
/// monitored messages come from instruments with differing conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    SignedByte,
    UnsignedByte,
    SignedWordBe,
    SignedWordLe,
    UnsignedWordBe,
    UnsignedWordLe,
    SignedDwordBe,
    SignedDwordLe,
    UnsignedDwordBe,
    UnsignedDwordLe,
    FloatBe,
    FloatLe,
    /// Marks a definition slot as unused.
    Unused,
}

impl DataType {
    /// Field width in bytes. An unused slot has no width.
    pub fn size(&self) -> usize {
        match self {
            DataType::SignedByte | DataType::UnsignedByte => 1,
            DataType::SignedWordBe
            | DataType::SignedWordLe
            | DataType::UnsignedWordBe
            | DataType::UnsignedWordLe => 2,
            DataType::SignedDwordBe
            | DataType::SignedDwordLe
            | DataType::UnsignedDwordBe
            | DataType::UnsignedDwordLe
            | DataType::FloatBe
            | DataType::FloatLe => 4,
            DataType::Unused => 0,
        }
    }

    /// True for little-endian byte orders (byte types are order-free).
    pub fn is_little_endian(&self) -> bool {
        matches!(
            self,
            DataType::SignedWordLe
                | DataType::UnsignedWordLe
                | DataType::SignedDwordLe
                | DataType::UnsignedDwordLe
                | DataType::FloatLe
        )
    }

    /// True for IEEE-754 float types.
    pub fn is_float(&self) -> bool {
        matches!(self, DataType::FloatBe | DataType::FloatLe)
    }

    /// True for two's-complement signed integer types.
    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            DataType::SignedByte
                | DataType::SignedWordBe
                | DataType::SignedWordLe
                | DataType::SignedDwordBe
                | DataType::SignedDwordLe
        )
    }
}

/// Relational operator applied between the extracted field and the
/// configured comparison value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Lt,
    Le,
    Ne,
    Eq,
    Ge,
    Gt,
    /// Comparison is delegated to the injected custom evaluator.
    Custom,
    /// No operator configured.
    None,
}

/// Outcome of one watchpoint evaluation.
///
/// Discriminants are the 2-bit housekeeping encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum WatchResult {
    False = 0,
    True = 1,
    Error = 2,
    /// Not refreshed within the configured tolerance (or never evaluated).
    Stale = 3,
}

/// Outcome of one actionpoint evaluation.
///
/// Discriminants are the 2-bit housekeeping encoding. An actionpoint
/// "fails" when its expression evaluates true.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ActionResult {
    Pass = 0,
    Fail = 1,
    Error = 2,
    Stale = 3,
}

/// Operational state of one actionpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum ActionState {
    NotUsed,
    /// Evaluated; may request corrective sequences.
    Active,
    /// Evaluated; failures counted but never acted on.
    Passive,
    /// Not evaluated until re-enabled by command.
    Disabled,
    /// Terminal: reachable only from Disabled, cleared only by table reload.
    PermanentlyOff,
}

impl ActionState {
    /// 2-bit housekeeping encoding. The packed field has four codes, so
    /// `PermanentlyOff` reports as `NotUsed`.
    pub fn hk_bits(&self) -> u8 {
        match self {
            ActionState::NotUsed | ActionState::PermanentlyOff => 0,
            ActionState::Active => 1,
            ActionState::Passive => 2,
            ActionState::Disabled => 3,
        }
    }
}

/// Process-wide switch gating autonomous responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum EngineMode {
    Active,
    Passive,
    Disabled,
}

/// Severity classification attached to an actionpoint's failure events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Critical,
}

impl EventSeverity {
    /// Level used when the event is routed through the logger.
    pub fn log_level(&self) -> log::Level {
        match self {
            EventSeverity::Debug => log::Level::Debug,
            EventSeverity::Info => log::Level::Info,
            EventSeverity::Warning => log::Level::Warn,
            EventSeverity::Critical => log::Level::Error,
        }
    }
}
