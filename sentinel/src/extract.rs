//! Bounds-checked field extraction from raw message bytes.
//!
//! Extraction widens every field into an unsigned 32-bit container
//! without interpreting sign or float bit patterns; reinterpretation
//! happens at comparison time.

use crate::error::EvalError;
use crate::types::DataType;

/// Read the field described by `(offset, data_type)` out of `buffer`.
///
/// Validates `offset + size <= buffer.len()` before touching the bytes.
/// Little-endian byte orders are reversed before widening, so the
/// returned container always holds the numeric value's natural bits.
pub fn extract(buffer: &[u8], offset: usize, data_type: DataType) -> Result<u32, EvalError> {
    if data_type == DataType::Unused {
        return Err(EvalError::UnknownDataType);
    }

    let need = data_type.size();
    let end = offset
        .checked_add(need)
        .filter(|end| *end <= buffer.len())
        .ok_or(EvalError::OffsetOutOfRange {
            offset,
            need,
            len: buffer.len(),
        })?;
    let bytes = &buffer[offset..end];

    let raw = match need {
        1 => u32::from(bytes[0]),
        2 => {
            let pair = [bytes[0], bytes[1]];
            let word = if data_type.is_little_endian() {
                u16::from_le_bytes(pair)
            } else {
                u16::from_be_bytes(pair)
            };
            u32::from(word)
        }
        _ => {
            let quad = [bytes[0], bytes[1], bytes[2], bytes[3]];
            if data_type.is_little_endian() {
                u32::from_le_bytes(quad)
            } else {
                u32::from_be_bytes(quad)
            }
        }
    };

    Ok(raw)
}
