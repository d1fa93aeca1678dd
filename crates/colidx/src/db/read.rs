//! Module: read
//! Responsibility: range searches over one container index and point reads
//! of current item values.
//! Does not own: index maintenance; the index is trusted as written.
//! Boundary: Collections -> IndexReader -> one StoreAdapter range read.

use crate::{
    db::{
        codec::{CodecError, CompositeKey, decode_value, encode_component, next_value},
        config::StoreConfig,
        history::{self, HistoryEntry},
        identity::Container,
        layout,
        store::{ColumnRange, Direction, StoreAdapter},
        version::Version,
    },
    error::InternalError,
    obs::{MetricsEvent, MetricsSink},
    value::Value,
};
use std::ops::Bound;
use tracing::warn;

///
/// SearchCursor
///
/// Continuation point of a paged search: the `(value, item)` of the last
/// hit already returned. The next page starts strictly beyond it in the
/// search direction.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct SearchCursor {
    pub value: Value,
    pub item: Value,
}

impl SearchCursor {
    #[must_use]
    pub const fn new(value: Value, item: Value) -> Self {
        Self { value, item }
    }

    fn position(&self) -> CompositeKey {
        layout::index_position(&self.value, &self.item)
    }
}

///
/// SearchRequest
///
/// One container search. `start` is inclusive and `end` exclusive; a
/// `start` without an `end` matches exactly that value; neither bound
/// scans the whole index.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SearchRequest {
    container: Container,
    attribute: String,
    start: Option<Value>,
    end: Option<Value>,
    after_item: Option<Value>,
    after: Option<SearchCursor>,
    limit: Option<usize>,
    reversed: bool,
}

impl SearchRequest {
    #[must_use]
    pub fn new(container: Container, attribute: impl Into<String>) -> Self {
        Self {
            container,
            attribute: attribute.into(),
            start: None,
            end: None,
            after_item: None,
            after: None,
            limit: None,
            reversed: false,
        }
    }

    /// Inclusive lower bound.
    #[must_use]
    pub fn start(mut self, value: impl Into<Value>) -> Self {
        self.start = Some(value.into());
        self
    }

    /// Exclusive upper bound.
    #[must_use]
    pub fn end(mut self, value: impl Into<Value>) -> Self {
        self.end = Some(value.into());
        self
    }

    /// Resume at `item` within the start value (the empty blob when no start
    /// is set). Inclusive: `item` itself is the first hit if still indexed.
    ///
    /// For equality or ascending paging only. A reversed search without a
    /// start has no value to place the item at and scans from the row's top.
    /// Use [`Self::after`] to continue strictly beyond a previous hit.
    #[must_use]
    pub fn start_after_item(mut self, item: impl Into<Value>) -> Self {
        self.after_item = Some(item.into());
        self
    }

    /// Continue strictly beyond a previous hit, skipping every version of
    /// its `(value, item)`. Takes precedence over [`Self::start_after_item`].
    #[must_use]
    pub fn after(mut self, cursor: SearchCursor) -> Self {
        self.after = Some(cursor);
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub const fn reversed(mut self, reversed: bool) -> Self {
        self.reversed = reversed;
        self
    }

    #[must_use]
    pub const fn container(&self) -> &Container {
        &self.container
    }

    #[must_use]
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    #[must_use]
    pub const fn direction(&self) -> Direction {
        Direction::from_reversed(self.reversed)
    }

    /// Column envelope of the index row this request scans.
    #[must_use]
    pub fn column_range(&self) -> ColumnRange {
        let lower = self
            .start
            .as_ref()
            .map_or(Bound::Unbounded, |start| Bound::Included(encode_component(start)));

        let upper = match (&self.start, &self.end) {
            (_, Some(end)) => Bound::Excluded(encode_component(end)),
            (Some(start), None) => Bound::Excluded(match next_value(start) {
                Some(next) => encode_component(&next),
                None => CompositeKey::new().with(start.clone()).prefix_end(),
            }),
            (None, None) => Bound::Unbounded,
        };

        let range = ColumnRange::new(lower, upper);
        let direction = self.direction();

        if let Some(cursor) = &self.after {
            let position = cursor.position();
            return match direction {
                Direction::Asc => range.narrow_lower(Bound::Included(position.prefix_end())),
                Direction::Desc => range.narrow_upper(Bound::Excluded(position.encode())),
            };
        }

        let Some(item) = &self.after_item else {
            return range;
        };
        let position = match (&self.start, direction) {
            (Some(start), _) => layout::index_position(start, item),
            (None, Direction::Asc) => layout::index_position(&Value::Blob(Vec::new()), item),
            (None, Direction::Desc) => return range,
        };

        match direction {
            Direction::Asc => range.narrow_lower(Bound::Included(position.encode())),
            Direction::Desc => range.narrow_upper(Bound::Excluded(position.prefix_end())),
        }
    }
}

///
/// IndexHit
///
/// One decoded index column.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IndexHit {
    pub value: Value,
    pub item: Value,
    pub version: Version,
}

impl IndexHit {
    /// Cursor that continues a search after this hit.
    #[must_use]
    pub fn cursor(&self) -> SearchCursor {
        SearchCursor::new(self.value.clone(), self.item.clone())
    }

    pub(crate) fn decode(column: &[u8]) -> Result<Self, CodecError> {
        let key = CompositeKey::decode_exact(column, layout::INDEX_ARITY)?;

        match key.components() {
            [value, item, Value::Ulid(version)] => Ok(Self {
                value: value.clone(),
                item: item.clone(),
                version: Version::from_ulid(*version),
            }),
            [_, _, other] => Err(CodecError::UnexpectedKind {
                position: 2,
                expected: "Ulid",
                found: other.tag().label(),
            }),
            other => Err(CodecError::Arity {
                expected: layout::INDEX_ARITY,
                found: other.len(),
            }),
        }
    }
}

///
/// IndexReader
///

pub struct IndexReader<'a, S: ?Sized> {
    store: &'a S,
    config: &'a StoreConfig,
    metrics: &'a dyn MetricsSink,
}

impl<'a, S: StoreAdapter + ?Sized> IndexReader<'a, S> {
    #[must_use]
    pub const fn new(store: &'a S, config: &'a StoreConfig, metrics: &'a dyn MetricsSink) -> Self {
        Self {
            store,
            config,
            metrics,
        }
    }

    /// Item keys whose indexed value falls in the request's range, in index
    /// order (or reverse), at most `limit`.
    pub fn search_container(&self, request: &SearchRequest) -> Result<Vec<Value>, InternalError> {
        Ok(self
            .search_container_hits(request)?
            .into_iter()
            .map(|hit| hit.item)
            .collect())
    }

    /// Like [`Self::search_container`], keeping the value and version of
    /// each hit.
    pub fn search_container_hits(
        &self,
        request: &SearchRequest,
    ) -> Result<Vec<IndexHit>, InternalError> {
        let row = request.container().index_key(request.attribute()).row_key();
        let columns = self.store.range_read(
            &self.config.index_store,
            &row,
            &request.column_range(),
            request.direction(),
            request.limit.unwrap_or(usize::MAX),
        )?;

        let mut hits = Vec::with_capacity(columns.len());
        for column in columns {
            match IndexHit::decode(&column.key) {
                Ok(hit) => hits.push(hit),
                Err(err) => {
                    warn!(
                        store = %self.config.index_store,
                        row = %String::from_utf8_lossy(&row),
                        error = %err,
                        "skipping undecodable index column"
                    );
                    self.metrics.record(MetricsEvent::DecodeSkipped {
                        store: &self.config.index_store,
                    });
                }
            }
        }

        self.metrics.record(MetricsEvent::Search {
            attribute: request.attribute(),
            hits: hits.len() as u64,
        });

        Ok(hits)
    }

    /// Current value of one item attribute.
    pub fn get_item_column(
        &self,
        item: &Value,
        attribute: &str,
    ) -> Result<Option<Value>, InternalError> {
        let columns = self.store.range_read(
            &self.config.item_store,
            &layout::item_row(item),
            &ColumnRange::single(layout::item_column(attribute)),
            Direction::Asc,
            1,
        )?;

        columns
            .first()
            .map(|column| decode_value(&column.value).map_err(InternalError::from))
            .transpose()
    }

    /// Live history entries of one item attribute, oldest first.
    pub fn item_history(
        &self,
        item: &Value,
        attribute: &str,
    ) -> Result<Vec<HistoryEntry>, InternalError> {
        let scan = history::scan(self.store, self.config, self.metrics, item, attribute)?;

        Ok(scan.into_entries())
    }
}
