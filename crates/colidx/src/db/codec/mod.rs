//! Module: codec
//! Responsibility: order-preserving bytes for values and value tuples.
//! Does not own: which tuples are written where (writer/reader own that).
//! Boundary: every row key and column key built by `db` goes through here.

mod composite;
mod ordered;


use crate::error::InternalError;
use thiserror::Error as ThisError;

// re-exports
pub use composite::CompositeKey;
pub use ordered::{decode_component, decode_value, encode_component, next_value};

///
/// CodecError
///
/// Malformed bytes met while decoding. Encoding is total over `Value`, so
/// every failure here means stored bytes were not produced by this codec.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum CodecError {
    #[error("unknown value tag {0:#04x}")]
    UnknownTag(u8),

    #[error("truncated {kind}: expected {expected} bytes, found {found}")]
    Truncated {
        kind: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("unterminated {kind} component")]
    Unterminated { kind: &'static str },

    #[error("invalid escape byte {byte:#04x} in {kind} component")]
    InvalidEscape { kind: &'static str, byte: u8 },

    #[error("text component is not valid utf-8")]
    InvalidUtf8,

    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),

    #[error("expected {expected} key components, found {found}")]
    Arity { expected: usize, found: usize },

    #[error("key component {position} is {found}, expected {expected}")]
    UnexpectedKind {
        position: usize,
        expected: &'static str,
        found: &'static str,
    },
}

impl From<CodecError> for InternalError {
    fn from(err: CodecError) -> Self {
        Self::codec_corruption(format!("undecodable key bytes: {err}"))
    }
}
