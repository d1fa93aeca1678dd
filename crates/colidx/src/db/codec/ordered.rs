//! Module: codec::ordered
//! Responsibility: single-component ordered encoding and successor values.
//! Does not own: tuple framing or range bounds.
//! Boundary: consumed by `codec::composite` and by store row/column keys.

use crate::{
    db::codec::CodecError,
    value::{Value, ValueTag},
};
use ulid::Ulid;

const ESCAPE_BYTE: u8 = 0x00;
const ESCAPED_ZERO: u8 = 0xFF;
const TERMINATOR: [u8; 2] = [0x00, 0x00];

const INT_WIDTH: usize = 8;
const ULID_WIDTH: usize = 16;

/// Encode one value as `tag ++ payload` so byte order matches `Value` order.
#[must_use]
pub fn encode_component(value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    push_component(&mut out, value);

    out
}

pub(crate) fn push_component(out: &mut Vec<u8>, value: &Value) {
    out.push(value.tag().to_u8());

    match value {
        Value::Blob(v) => push_terminated_bytes(out, v),
        Value::Text(v) => push_terminated_bytes(out, v.as_bytes()),
        Value::Ulid(v) => out.extend_from_slice(&v.to_bytes()),
        Value::Int(v) => out.extend_from_slice(&ordered_i64_bytes(*v)),
    }
}

/// Decode one component from the front of `bytes`.
///
/// Returns the value and the number of bytes consumed, tag included.
pub fn decode_component(bytes: &[u8]) -> Result<(Value, usize), CodecError> {
    let (&tag_byte, payload) = bytes.split_first().ok_or(CodecError::Truncated {
        kind: "component",
        expected: 1,
        found: 0,
    })?;
    let tag = ValueTag::from_u8(tag_byte).ok_or(CodecError::UnknownTag(tag_byte))?;

    let (value, consumed) = match tag {
        ValueTag::Blob => {
            let (raw, consumed) = read_terminated_bytes(payload, tag)?;
            (Value::Blob(raw), consumed)
        }
        ValueTag::Text => {
            let (raw, consumed) = read_terminated_bytes(payload, tag)?;
            let text = String::from_utf8(raw).map_err(|_| CodecError::InvalidUtf8)?;
            (Value::Text(text), consumed)
        }
        ValueTag::Ulid => {
            let raw: [u8; ULID_WIDTH] = read_fixed(payload, tag)?;
            (Value::Ulid(Ulid::from_bytes(raw)), ULID_WIDTH)
        }
        ValueTag::Int => {
            let raw: [u8; INT_WIDTH] = read_fixed(payload, tag)?;
            (Value::Int(i64_from_ordered_bytes(raw)), INT_WIDTH)
        }
    };

    Ok((value, consumed + 1))
}

/// Decode a buffer holding exactly one component.
pub fn decode_value(bytes: &[u8]) -> Result<Value, CodecError> {
    let (value, consumed) = decode_component(bytes)?;
    if consumed != bytes.len() {
        return Err(CodecError::TrailingBytes(bytes.len() - consumed));
    }

    Ok(value)
}

/// Smallest value of the same kind that is strictly greater than `value`.
///
/// Text and Blob grow by one zero unit. Int and Ulid step by one and have no
/// successor at their maximum.
#[must_use]
pub fn next_value(value: &Value) -> Option<Value> {
    match value {
        Value::Blob(v) => {
            let mut next = v.clone();
            next.push(0);
            Some(Value::Blob(next))
        }
        Value::Text(v) => Some(Value::Text(format!("{v}\u{0}"))),
        Value::Ulid(v) => v.0.checked_add(1).map(|n| Value::Ulid(Ulid(n))),
        Value::Int(v) => v.checked_add(1).map(Value::Int),
    }
}

// Byte strings are escaped so tuple boundaries remain unambiguous:
// the terminator sorts below an escaped zero, which sorts below any other byte.
fn push_terminated_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    for &byte in bytes {
        if byte == ESCAPE_BYTE {
            out.extend_from_slice(&[ESCAPE_BYTE, ESCAPED_ZERO]);
        } else {
            out.push(byte);
        }
    }

    out.extend_from_slice(&TERMINATOR);
}

fn read_terminated_bytes(bytes: &[u8], tag: ValueTag) -> Result<(Vec<u8>, usize), CodecError> {
    let mut out = Vec::new();
    let mut offset = 0;

    while offset < bytes.len() {
        let byte = bytes[offset];
        if byte != ESCAPE_BYTE {
            out.push(byte);
            offset += 1;
            continue;
        }

        match bytes.get(offset + 1) {
            Some(&ESCAPE_BYTE) => return Ok((out, offset + TERMINATOR.len())),
            Some(&ESCAPED_ZERO) => {
                out.push(0);
                offset += 2;
            }
            Some(&other) => {
                return Err(CodecError::InvalidEscape {
                    kind: tag.label(),
                    byte: other,
                });
            }
            None => break,
        }
    }

    Err(CodecError::Unterminated { kind: tag.label() })
}

fn read_fixed<const N: usize>(bytes: &[u8], tag: ValueTag) -> Result<[u8; N], CodecError> {
    bytes
        .get(..N)
        .and_then(|raw| raw.try_into().ok())
        .ok_or(CodecError::Truncated {
            kind: tag.label(),
            expected: N,
            found: bytes.len(),
        })
}

const fn ordered_i64_bytes(value: i64) -> [u8; INT_WIDTH] {
    let biased = value.cast_unsigned() ^ (1u64 << 63);
    biased.to_be_bytes()
}

const fn i64_from_ordered_bytes(bytes: [u8; INT_WIDTH]) -> i64 {
    (u64::from_be_bytes(bytes) ^ (1u64 << 63)).cast_signed()
}
