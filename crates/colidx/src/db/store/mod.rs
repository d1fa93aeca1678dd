//! Module: store
//! Responsibility: capability surface of the external sorted wide-row store.
//! Does not own: key layout (codec) or which mutations a write needs (writer).
//! Boundary: writer/reader/membership -> store::StoreAdapter -> backend.

mod batch;
mod memory;
mod range;


use crate::{db::version::Version, error::InternalError};
use std::sync::Arc;
use thiserror::Error as ThisError;

// re-exports
pub use batch::{Batch, Mutation};
pub use memory::{FaultPlan, MemoryStore};
pub use range::ColumnRange;

///
/// Direction
///
/// Column traversal direction for one range read.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    #[must_use]
    pub const fn from_reversed(reversed: bool) -> Self {
        if reversed { Self::Desc } else { Self::Asc }
    }
}

///
/// Column
///
/// One live column returned by a range read.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Column {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
    pub version: Version,
}

///
/// StoreAdapter
///
/// Row-scoped operations the index needs from the backing store.
/// A batch is one request; no isolation stronger than the backend's own is
/// assumed, and a failed submit may have been partially applied.
///

pub trait StoreAdapter: Send + Sync {
    /// Live columns of one row inside `range`, in `direction`, at most `limit`.
    fn range_read(
        &self,
        store: &str,
        row: &[u8],
        range: &ColumnRange,
        direction: Direction,
        limit: usize,
    ) -> Result<Vec<Column>, InternalError>;

    /// Apply every mutation in `batch` as one request.
    fn submit(&self, batch: Batch) -> Result<(), InternalError>;
}

impl<T: StoreAdapter + ?Sized> StoreAdapter for Arc<T> {
    fn range_read(
        &self,
        store: &str,
        row: &[u8],
        range: &ColumnRange,
        direction: Direction,
        limit: usize,
    ) -> Result<Vec<Column>, InternalError> {
        (**self).range_read(store, row, range, direction, limit)
    }

    fn submit(&self, batch: Batch) -> Result<(), InternalError> {
        (**self).submit(batch)
    }
}

impl<T: StoreAdapter + ?Sized> StoreAdapter for &T {
    fn range_read(
        &self,
        store: &str,
        row: &[u8],
        range: &ColumnRange,
        direction: Direction,
        limit: usize,
    ) -> Result<Vec<Column>, InternalError> {
        (**self).range_read(store, row, range, direction, limit)
    }

    fn submit(&self, batch: Batch) -> Result<(), InternalError> {
        (**self).submit(batch)
    }
}

///
/// StoreError
///

#[derive(Debug, ThisError)]
pub enum StoreError {
    #[error("store '{store}' unavailable: {reason}")]
    Unavailable { store: String, reason: String },

    #[error("store lock poisoned")]
    LockPoisoned,
}

impl From<StoreError> for InternalError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable { .. } => Self::store_unavailable(err.to_string()),
            StoreError::LockPoisoned => Self::store_internal(err.to_string()),
        }
    }
}
