//! Definition tables for watchpoints and actionpoints.
//!
//! Definitions are plain-old-data and serde-friendly so a ground table
//! store can persist them as JSON. Capacity limits are compile-time
//! constants; a table shorter than the capacity is permitted and unused
//! slots may appear anywhere in it.

use serde::{Deserialize, Serialize};

use crate::types::{ActionState, CompareOp, DataType, EventSeverity};

/// Maximum number of watchpoint definition slots.
pub const MAX_WATCHPOINTS: usize = 176;

/// Maximum number of actionpoint definition slots.
pub const MAX_ACTIONPOINTS: usize = 176;

/// Number of dispatch hash buckets. Must be a power of two.
pub const HASH_BUCKETS: usize = 32;

/// Maximum RPN expression length; also bounds the runtime operand stack.
pub const MAX_RPN_TOKENS: usize = 32;

/// Index sentinel selecting every slot in ranged entry points.
pub const SAMPLE_ALL: u16 = 0xFFFF;

/// Reserved message id marking "no message configured".
pub const MSG_ID_UNUSED: u16 = 0;

/// Bit mask value that disables masking.
pub const NO_BIT_MASK: u32 = 0xFFFF_FFFF;

/// Highest corrective sequence id an actionpoint may request.
pub const MAX_RTS_ID: u16 = 64;

/// Comparison value, tagged to match the watchpoint's data type domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareValue {
    Signed(i32),
    Unsigned(u32),
    Float(f32),
}

impl CompareValue {
    /// True when this value's domain matches the given data type.
    pub fn matches(&self, data_type: DataType) -> bool {
        match self {
            CompareValue::Signed(_) => data_type.is_signed(),
            CompareValue::Unsigned(_) => {
                !data_type.is_signed() && !data_type.is_float() && data_type != DataType::Unused
            }
            CompareValue::Float(_) => data_type.is_float(),
        }
    }
}

/// One token of an actionpoint's Reverse-Polish expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RpnToken {
    /// Pushes the referenced watchpoint's current result.
    Watch(u16),
    And,
    Or,
    Xor,
    Not,
    /// Boolean equality (XNOR).
    Equal,
}

/// Configuration for one watchpoint slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchpointDefinition {
    /// Field type; `Unused` marks the slot empty.
    pub data_type: DataType,
    /// Relational operator applied against `comparison_value`.
    pub operator: CompareOp,
    /// Identifier of the message this watchpoint inspects.
    pub message_id: u16,
    /// Byte offset of the field within the message body.
    pub offset: usize,
    /// Applied to the raw extracted integer; `NO_BIT_MASK` disables it.
    /// Never applied to float types.
    pub bit_mask: u32,
    /// Value the extracted field is compared against.
    pub comparison_value: CompareValue,
    /// Opaque value forwarded to the custom evaluator for `CompareOp::Custom`.
    pub custom_function_arg: u32,
    /// Maintenance cycles without a refresh before the result goes stale.
    /// Zero disables staling.
    pub staleness_age: u32,
}

impl WatchpointDefinition {
    /// An empty slot.
    pub fn unused() -> Self {
        Self {
            data_type: DataType::Unused,
            operator: CompareOp::None,
            message_id: MSG_ID_UNUSED,
            offset: 0,
            bit_mask: NO_BIT_MASK,
            comparison_value: CompareValue::Unsigned(0),
            custom_function_arg: 0,
            staleness_age: 0,
        }
    }

    pub fn is_used(&self) -> bool {
        self.data_type != DataType::Unused
    }
}

/// Configuration for one actionpoint slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionpointDefinition {
    /// State the actionpoint starts in after a table load.
    pub default_state: ActionState,
    /// Corrective sequence requested when the failure threshold is reached.
    pub rts_id: u16,
    /// Consecutive failures required before the sequence is requested.
    pub max_fails_before_rts: u16,
    /// Severity used when logging failure events for this actionpoint.
    pub event_type: EventSeverity,
    /// Cap on "failed while passive" event messages, enforced against the
    /// cumulative event counter.
    pub max_passive_events: u16,
    /// Postfix boolean expression over watchpoint results.
    pub rpn_expression: Vec<RpnToken>,
}

impl ActionpointDefinition {
    /// An empty slot.
    pub fn unused() -> Self {
        Self {
            default_state: ActionState::NotUsed,
            rts_id: 0,
            max_fails_before_rts: 0,
            event_type: EventSeverity::Info,
            max_passive_events: 0,
            rpn_expression: Vec::new(),
        }
    }

    pub fn is_used(&self) -> bool {
        self.default_state != ActionState::NotUsed
    }
}
