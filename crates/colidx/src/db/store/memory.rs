use crate::{
    db::{
        store::{Batch, Column, ColumnRange, Direction, Mutation, StoreAdapter, StoreError},
        version::Version,
    },
    error::InternalError,
};
use std::{
    collections::{BTreeMap, HashMap},
    sync::{Mutex, RwLock},
};

///
/// Cell
///
/// Stored column state. Deletes leave a tombstone so an older insert that
/// arrives late cannot resurrect the column.
///

#[derive(Clone, Debug)]
enum Cell {
    Live { value: Vec<u8>, version: Version },
    Tombstone { version: Version },
}

impl Cell {
    const fn version(&self) -> Version {
        match self {
            Self::Live { version, .. } | Self::Tombstone { version } => *version,
        }
    }

    // Deletes win ties.
    fn accepts_insert(&self, version: Version) -> bool {
        match self {
            Self::Live { version: current, .. } => version >= *current,
            Self::Tombstone { version: current } => version > *current,
        }
    }

    fn accepts_delete(&self, version: Version) -> bool {
        version >= self.version()
    }
}

type Row = BTreeMap<Vec<u8>, Cell>;

///
/// FaultPlan
///
/// Failures the memory store injects into its next calls.
/// `partial_submit` applies only that many mutations of the next batch and
/// then reports the batch as failed.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FaultPlan {
    pub fail_reads: u32,
    pub fail_submits: u32,
    pub partial_submit: Option<usize>,
}

///
/// MemoryStore
///
/// In-process sorted wide-row store: rows addressed by `(store, row key)`,
/// columns kept in byte order, last write wins by version.
///
/// Tombstones stay in their row until [`MemoryStore::compact`] drops them,
/// so a long-lived store that churns values grows with every delete.
///

#[derive(Default)]
pub struct MemoryStore {
    rows: RwLock<HashMap<(String, Vec<u8>), Row>>,
    faults: Mutex<FaultPlan>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the pending fault plan.
    pub fn inject(&self, plan: FaultPlan) -> Result<(), InternalError> {
        let mut faults = self.faults.lock().map_err(|_| StoreError::LockPoisoned)?;
        *faults = plan;

        Ok(())
    }

    /// All live columns of one row, ascending.
    pub fn live_columns(&self, store: &str, row: &[u8]) -> Result<Vec<Column>, InternalError> {
        self.range_read(store, row, &ColumnRange::all(), Direction::Asc, usize::MAX)
    }

    /// Number of live columns in one row.
    pub fn row_len(&self, store: &str, row: &[u8]) -> Result<usize, InternalError> {
        Ok(self.live_columns(store, row)?.len())
    }

    /// Drop tombstones older than `below`, and rows left with no cells.
    /// Returns how many tombstones were removed.
    ///
    /// Once a tombstone is gone an insert older than it is accepted again,
    /// so `below` must not exceed the oldest version still in flight.
    pub fn compact(&self, below: Version) -> Result<usize, InternalError> {
        let mut rows = self.rows.write().map_err(|_| StoreError::LockPoisoned)?;
        let mut removed = 0;

        rows.retain(|_, cells| {
            let before = cells.len();
            cells.retain(|_, cell| {
                !matches!(cell, Cell::Tombstone { version } if *version < below)
            });
            removed += before - cells.len();

            !cells.is_empty()
        });

        Ok(removed)
    }

    fn take_read_fault(&self, store: &str) -> Result<(), InternalError> {
        let mut faults = self.faults.lock().map_err(|_| StoreError::LockPoisoned)?;
        if faults.fail_reads > 0 {
            faults.fail_reads -= 1;
            return Err(StoreError::Unavailable {
                store: store.to_string(),
                reason: "injected read failure".to_string(),
            }
            .into());
        }

        Ok(())
    }

    // Returns how many mutations of the batch may be applied, and whether
    // the submit must then report failure.
    fn take_submit_fault(&self, batch_len: usize) -> Result<(usize, bool), InternalError> {
        let mut faults = self.faults.lock().map_err(|_| StoreError::LockPoisoned)?;
        if faults.fail_submits > 0 {
            faults.fail_submits -= 1;
            return Ok((0, true));
        }
        if let Some(applied) = faults.partial_submit.take() {
            return Ok((applied.min(batch_len), true));
        }

        Ok((batch_len, false))
    }

    fn apply(rows: &mut HashMap<(String, Vec<u8>), Row>, mutation: Mutation) {
        match mutation {
            Mutation::Insert {
                store,
                row,
                column,
                value,
                version,
            } => {
                let row = rows.entry((store, row)).or_default();
                if row.get(&column).is_none_or(|cell| cell.accepts_insert(version)) {
                    row.insert(column, Cell::Live { value, version });
                }
            }
            Mutation::Delete {
                store,
                row,
                column,
                version,
            } => {
                let row = rows.entry((store, row)).or_default();
                if row.get(&column).is_none_or(|cell| cell.accepts_delete(version)) {
                    row.insert(column, Cell::Tombstone { version });
                }
            }
        }
    }
}

impl StoreAdapter for MemoryStore {
    fn range_read(
        &self,
        store: &str,
        row: &[u8],
        range: &ColumnRange,
        direction: Direction,
        limit: usize,
    ) -> Result<Vec<Column>, InternalError> {
        self.take_read_fault(store)?;

        if limit == 0 || range.is_empty() {
            return Ok(Vec::new());
        }

        let rows = self.rows.read().map_err(|_| StoreError::LockPoisoned)?;
        let Some(cells) = rows.get(&(store.to_string(), row.to_vec())) else {
            return Ok(Vec::new());
        };

        let live = cells
            .range::<[u8], _>(range.as_bounds())
            .filter_map(|(key, cell)| match cell {
                Cell::Live { value, version } => Some(Column {
                    key: key.clone(),
                    value: value.clone(),
                    version: *version,
                }),
                Cell::Tombstone { .. } => None,
            });

        let columns = match direction {
            Direction::Asc => live.take(limit).collect(),
            Direction::Desc => live.rev().take(limit).collect(),
        };

        Ok(columns)
    }

    fn submit(&self, batch: Batch) -> Result<(), InternalError> {
        let store = batch
            .mutations()
            .first()
            .map(|m| m.store().to_string())
            .unwrap_or_default();
        let (applied, fail) = self.take_submit_fault(batch.len())?;

        {
            let mut rows = self.rows.write().map_err(|_| StoreError::LockPoisoned)?;
            for mutation in batch.into_mutations().into_iter().take(applied) {
                Self::apply(&mut rows, mutation);
            }
        }

        if fail {
            return Err(StoreError::Unavailable {
                store,
                reason: format!("injected batch failure after {applied} mutations"),
            }
            .into());
        }

        Ok(())
    }
}
