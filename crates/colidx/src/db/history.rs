//! Module: history
//! Responsibility: reading the per-item record of still-live indexed versions.
//! Does not own: retirement decisions (writer) or key bytes (layout).
//! Boundary: writer and reader -> history::scan -> StoreAdapter.

use crate::{
    db::{
        codec::{CodecError, CompositeKey, decode_value},
        config::StoreConfig,
        layout,
        store::{Column, Direction, StoreAdapter},
        version::Version,
    },
    error::InternalError,
    obs::{MetricsEvent, MetricsSink},
    value::Value,
};
use tracing::warn;

///
/// HistoryEntry
///
/// One still-live version of an item attribute and the value indexed
/// under it.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HistoryEntry {
    pub version: Version,
    pub value: Value,
}

///
/// HistoryScan
///
/// Live history of one `(item, attribute)`, keeping raw column keys so the
/// writer can delete exactly what it read. Columns that failed to decode
/// are kept apart and are retired without touching the index.
///

#[derive(Debug, Default)]
pub(crate) struct HistoryScan {
    pub(crate) entries: Vec<(Vec<u8>, HistoryEntry)>,
    pub(crate) malformed: Vec<Vec<u8>>,
}

impl HistoryScan {
    pub(crate) fn into_entries(self) -> Vec<HistoryEntry> {
        self.entries.into_iter().map(|(_, entry)| entry).collect()
    }
}

pub(crate) fn scan<S: StoreAdapter + ?Sized>(
    store: &S,
    config: &StoreConfig,
    metrics: &dyn MetricsSink,
    item: &Value,
    attribute: &str,
) -> Result<HistoryScan, InternalError> {
    let columns = store.range_read(
        &config.history_store,
        &layout::history_row(item),
        &layout::history_range(attribute),
        Direction::Asc,
        config.history_scan_limit,
    )?;

    let mut scan = HistoryScan::default();
    for column in columns {
        match decode_entry(&column) {
            Ok(entry) => scan.entries.push((column.key, entry)),
            Err(err) => {
                warn!(
                    store = %config.history_store,
                    item = %item,
                    attribute,
                    error = %err,
                    "skipping undecodable history column"
                );
                metrics.record(MetricsEvent::DecodeSkipped {
                    store: &config.history_store,
                });
                scan.malformed.push(column.key);
            }
        }
    }

    Ok(scan)
}

fn decode_entry(column: &Column) -> Result<HistoryEntry, CodecError> {
    let key = CompositeKey::decode_exact(&column.key, layout::HISTORY_ARITY)?;

    match key.components() {
        // the range read already pinned the attribute component
        [Value::Text(_), Value::Ulid(version)] => Ok(HistoryEntry {
            version: Version::from_ulid(*version),
            value: decode_value(&column.value)?,
        }),
        [Value::Text(_), other] => Err(CodecError::UnexpectedKind {
            position: 1,
            expected: "Ulid",
            found: other.tag().label(),
        }),
        [other, _] => Err(CodecError::UnexpectedKind {
            position: 0,
            expected: "Text",
            found: other.tag().label(),
        }),
        _ => Err(CodecError::Arity {
            expected: layout::HISTORY_ARITY,
            found: key.len(),
        }),
    }
}
