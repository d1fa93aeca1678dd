//! Module: layout
//! Responsibility: exact row and column keys of every stored record.
//! Does not own: when records are written or retired.
//! Boundary: writer/reader/membership build keys only through here.
//!
//! | store      | row                        | column                      | payload       |
//! |------------|----------------------------|-----------------------------|---------------|
//! | item       | enc(item)                  | attribute utf-8             | enc(value)    |
//! | history    | enc(item)                  | [attribute, version]        | enc(value)    |
//! | index      | "{owner}:{name}:{attr}"    | [value, item, version]      | empty         |
//! | membership | "{owner}:{name}"           | enc(item)                   | version bytes |

use crate::{
    db::{
        codec::{CompositeKey, encode_component},
        store::ColumnRange,
        version::Version,
    },
    value::Value,
};

pub(crate) const HISTORY_ARITY: usize = 2;
pub(crate) const INDEX_ARITY: usize = 3;

pub(crate) fn item_row(item: &Value) -> Vec<u8> {
    encode_component(item)
}

pub(crate) fn item_column(attribute: &str) -> Vec<u8> {
    attribute.as_bytes().to_vec()
}

pub(crate) fn history_row(item: &Value) -> Vec<u8> {
    encode_component(item)
}

pub(crate) fn history_column(attribute: &str, version: Version) -> Vec<u8> {
    CompositeKey::new()
        .with(attribute)
        .with(version.to_value())
        .encode()
}

/// Every history column of one attribute, from the zero version up.
pub(crate) fn history_range(attribute: &str) -> ColumnRange {
    ColumnRange::half_open(
        history_column(attribute, Version::ZERO),
        CompositeKey::new().with(attribute).prefix_end(),
    )
}

pub(crate) fn index_column(value: &Value, item: &Value, version: Version) -> Vec<u8> {
    CompositeKey::new()
        .with(value.clone())
        .with(item.clone())
        .with(version.to_value())
        .encode()
}

/// `[value, item]` prefix shared by every version of one index entry.
pub(crate) fn index_position(value: &Value, item: &Value) -> CompositeKey {
    CompositeKey::new().with(value.clone()).with(item.clone())
}

pub(crate) fn membership_column(item: &Value) -> Vec<u8> {
    encode_component(item)
}

///
/// TESTS
///
