use crate::value::Value;

///
/// ValueTag
///
/// Stable value-variant tag written as the first byte of every encoded
/// component. Tag order is the cross-type order of the index, so values of
/// different kinds never interleave.
///
/// IMPORTANT:
/// Tag values are part of the stored key format and must remain fixed.
/// Every tag must stay below `0xFF`, which is reserved for prefix ends.
///

#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ValueTag {
    Blob = 0,
    Text = 1,
    Ulid = 2,
    Int = 3,
}

impl ValueTag {
    /// Stable key byte for this variant.
    #[must_use]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Map a key byte back to its variant, if any.
    #[must_use]
    pub const fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Blob),
            1 => Some(Self::Text),
            2 => Some(Self::Ulid),
            3 => Some(Self::Int),
            _ => None,
        }
    }

    /// Human-readable kind label for diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Blob => "Blob",
            Self::Text => "Text",
            Self::Ulid => "Ulid",
            Self::Int => "Int",
        }
    }
}

#[must_use]
pub(super) const fn canonical_tag(value: &Value) -> ValueTag {
    match value {
        Value::Blob(_) => ValueTag::Blob,
        Value::Text(_) => ValueTag::Text,
        Value::Ulid(_) => ValueTag::Ulid,
        Value::Int(_) => ValueTag::Int,
    }
}
