//! Ground-test fixtures for the sentinel limit engine.
//!
//! Provides packet builders for synthesizing telemetry with typed,
//! endian-aware fields, a demo monitoring table set, and channel-backed
//! collaborator implementations so tests and the simulator can observe
//! subscriptions and corrective-sequence requests from outside the
//! engine.

pub mod table_store;

use crossbeam_channel::Sender;
use log::warn;

use sentinel::{
    ActionResult, ActionState, ActionpointDefinition, BusError, CompareOp, CompareValue, DataType,
    EventSeverity, MessageBus, RpnToken, SequenceRequester, WatchpointDefinition, NO_BIT_MASK,
};

/// Write a typed field into `buffer` at `offset`, zero-extending the
/// buffer as needed. Inverse of the engine's extraction.
pub fn write_field(buffer: &mut Vec<u8>, offset: usize, data_type: DataType, value: CompareValue) {
    let width = data_type.size();
    if buffer.len() < offset + width {
        buffer.resize(offset + width, 0);
    }

    let bits: u32 = match value {
        CompareValue::Signed(v) => v as u32,
        CompareValue::Unsigned(v) => v,
        CompareValue::Float(v) => v.to_bits(),
    };

    let bytes = &mut buffer[offset..offset + width];
    match width {
        1 => bytes[0] = bits as u8,
        2 => {
            let word = bits as u16;
            bytes.copy_from_slice(&if data_type.is_little_endian() {
                word.to_le_bytes()
            } else {
                word.to_be_bytes()
            });
        }
        _ => {
            bytes.copy_from_slice(&if data_type.is_little_endian() {
                bits.to_le_bytes()
            } else {
                bits.to_be_bytes()
            });
        }
    }
}

/// Bus that reports every subscription over a channel.
pub struct ChannelBus {
    sender: Sender<u16>,
}

impl ChannelBus {
    pub fn new(sender: Sender<u16>) -> Self {
        Self { sender }
    }
}

impl MessageBus for ChannelBus {
    fn subscribe(&mut self, message_id: u16) -> Result<(), BusError> {
        self.sender.send(message_id).map_err(|_| BusError {
            msg_id: message_id,
            reason: "subscription channel closed".to_string(),
        })
    }
}

/// Requester that reports every corrective-sequence request over a
/// channel.
pub struct ChannelRequester {
    sender: Sender<u16>,
}

impl ChannelRequester {
    pub fn new(sender: Sender<u16>) -> Self {
        Self { sender }
    }
}

impl SequenceRequester for ChannelRequester {
    fn request_sequence(&mut self, rts_id: u16) {
        if self.sender.send(rts_id).is_err() {
            warn!("sequence {rts_id} request dropped: channel closed");
        }
    }
}

/// Demo monitoring configuration: a power message and a thermal
/// message, four watchpoints, three actionpoints.
pub mod demo {
    use super::*;

    /// Bus voltage (f32 LE at 0) and load current (u16 BE at 4).
    pub const MSG_POWER: u16 = 0x08A1;
    /// Radiator temperature in decidegrees (i16 BE at 2).
    pub const MSG_THERMAL: u16 = 0x08B2;

    pub const RTS_POWER_SHED: u16 = 3;
    pub const RTS_HEATER_CONFIG: u16 = 4;
    pub const RTS_SAFE_MODE: u16 = 5;

    pub fn power_packet(voltage: f32, current: u16) -> Vec<u8> {
        let mut packet = Vec::new();
        write_field(&mut packet, 0, DataType::FloatLe, CompareValue::Float(voltage));
        write_field(
            &mut packet,
            4,
            DataType::UnsignedWordBe,
            CompareValue::Unsigned(u32::from(current)),
        );
        packet
    }

    pub fn thermal_packet(decidegrees: i16) -> Vec<u8> {
        let mut packet = vec![0u8; 2];
        write_field(
            &mut packet,
            2,
            DataType::SignedWordBe,
            CompareValue::Signed(i32::from(decidegrees)),
        );
        packet
    }

    fn watch(
        message_id: u16,
        data_type: DataType,
        offset: usize,
        operator: CompareOp,
        comparison_value: CompareValue,
    ) -> WatchpointDefinition {
        WatchpointDefinition {
            data_type,
            operator,
            message_id,
            offset,
            bit_mask: NO_BIT_MASK,
            comparison_value,
            custom_function_arg: 0,
            staleness_age: 6,
        }
    }

    /// Watchpoints: 0 overvoltage, 1 overcurrent, 2 undertemp, 3 overtemp.
    /// Actionpoints: 0 power anomaly, 1 thermal excursion, 2 combined
    /// (loaded Disabled, armed by ground command).
    pub fn tables() -> (Vec<WatchpointDefinition>, Vec<ActionpointDefinition>) {
        let watchpoints = vec![
            watch(
                MSG_POWER,
                DataType::FloatLe,
                0,
                CompareOp::Gt,
                CompareValue::Float(32.0),
            ),
            watch(
                MSG_POWER,
                DataType::UnsignedWordBe,
                4,
                CompareOp::Ge,
                CompareValue::Unsigned(1500),
            ),
            watch(
                MSG_THERMAL,
                DataType::SignedWordBe,
                2,
                CompareOp::Lt,
                CompareValue::Signed(-250),
            ),
            watch(
                MSG_THERMAL,
                DataType::SignedWordBe,
                2,
                CompareOp::Gt,
                CompareValue::Signed(600),
            ),
        ];

        let actionpoints = vec![
            ActionpointDefinition {
                default_state: ActionState::Active,
                rts_id: RTS_POWER_SHED,
                max_fails_before_rts: 2,
                event_type: EventSeverity::Critical,
                max_passive_events: 5,
                rpn_expression: vec![RpnToken::Watch(0), RpnToken::Watch(1), RpnToken::Or],
            },
            ActionpointDefinition {
                default_state: ActionState::Active,
                rts_id: RTS_HEATER_CONFIG,
                max_fails_before_rts: 3,
                event_type: EventSeverity::Warning,
                max_passive_events: 5,
                rpn_expression: vec![RpnToken::Watch(2), RpnToken::Watch(3), RpnToken::Or],
            },
            ActionpointDefinition {
                default_state: ActionState::Disabled,
                rts_id: RTS_SAFE_MODE,
                max_fails_before_rts: 2,
                event_type: EventSeverity::Critical,
                max_passive_events: 5,
                rpn_expression: vec![RpnToken::Watch(1), RpnToken::Watch(3), RpnToken::And],
            },
        ];

        (watchpoints, actionpoints)
    }
}

/// Convenience check used by the simulator's final report.
pub fn any_failed(mut results: impl Iterator<Item = ActionResult>) -> bool {
    results.any(|result| result == ActionResult::Fail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use sentinel::extract;

    #[test]
    fn test_write_field_extends_buffer() {
        let mut buf = Vec::new();
        write_field(&mut buf, 3, DataType::UnsignedByte, CompareValue::Unsigned(0xAA));
        assert_eq!(buf, vec![0, 0, 0, 0xAA]);
    }

    #[test]
    fn test_write_field_inverse_of_extract() {
        let mut buf = Vec::new();
        write_field(
            &mut buf,
            2,
            DataType::UnsignedDwordLe,
            CompareValue::Unsigned(0xDEAD_BEEF),
        );
        assert_eq!(extract(&buf, 2, DataType::UnsignedDwordLe).unwrap(), 0xDEAD_BEEF);
    }

    #[test]
    fn test_demo_tables_validate() {
        let (watchpoints, actionpoints) = demo::tables();
        let (first, _) = sentinel::validate_watchpoints(&watchpoints);
        assert!(first.is_none());
        let (first, _) = sentinel::validate_actionpoints(&actionpoints, watchpoints.len());
        assert!(first.is_none());
    }

    #[test]
    fn test_demo_packets_cover_their_fields() {
        let packet = demo::power_packet(31.5, 900);
        let volts = f32::from_bits(extract(&packet, 0, DataType::FloatLe).unwrap());
        assert_relative_eq!(volts, 31.5, epsilon = 1e-6);
        assert_eq!(extract(&packet, 4, DataType::UnsignedWordBe).unwrap(), 900);

        let packet = demo::thermal_packet(-300);
        let raw = extract(&packet, 2, DataType::SignedWordBe).unwrap();
        assert_eq!(raw as u16 as i16, -300);
    }
}
