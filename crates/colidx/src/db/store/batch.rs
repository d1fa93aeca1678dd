use crate::db::version::Version;

///
/// Mutation
///
/// One column-level write addressed by `(store, row, column)`.
/// Both kinds carry the write version used for last-write-wins.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Mutation {
    Insert {
        store: String,
        row: Vec<u8>,
        column: Vec<u8>,
        value: Vec<u8>,
        version: Version,
    },
    Delete {
        store: String,
        row: Vec<u8>,
        column: Vec<u8>,
        version: Version,
    },
}

impl Mutation {
    #[must_use]
    pub fn store(&self) -> &str {
        match self {
            Self::Insert { store, .. } | Self::Delete { store, .. } => store,
        }
    }

    #[must_use]
    pub fn row(&self) -> &[u8] {
        match self {
            Self::Insert { row, .. } | Self::Delete { row, .. } => row,
        }
    }

    #[must_use]
    pub fn column(&self) -> &[u8] {
        match self {
            Self::Insert { column, .. } | Self::Delete { column, .. } => column,
        }
    }

    #[must_use]
    pub const fn version(&self) -> Version {
        match self {
            Self::Insert { version, .. } | Self::Delete { version, .. } => *version,
        }
    }

    #[must_use]
    pub const fn is_insert(&self) -> bool {
        matches!(self, Self::Insert { .. })
    }
}

///
/// Batch
///
/// Mutations scheduled by one call and submitted as a single request.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Batch {
    mutations: Vec<Mutation>,
}

impl Batch {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mutations: Vec::new(),
        }
    }

    pub fn insert(
        &mut self,
        store: &str,
        row: impl Into<Vec<u8>>,
        column: impl Into<Vec<u8>>,
        value: impl Into<Vec<u8>>,
        version: Version,
    ) {
        self.mutations.push(Mutation::Insert {
            store: store.to_string(),
            row: row.into(),
            column: column.into(),
            value: value.into(),
            version,
        });
    }

    pub fn delete(
        &mut self,
        store: &str,
        row: impl Into<Vec<u8>>,
        column: impl Into<Vec<u8>>,
        version: Version,
    ) {
        self.mutations.push(Mutation::Delete {
            store: store.to_string(),
            row: row.into(),
            column: column.into(),
            version,
        });
    }

    #[must_use]
    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    #[must_use]
    pub fn into_mutations(self) -> Vec<Mutation> {
        self.mutations
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.mutations.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    /// Count of (inserts, deletes) addressed to `store`.
    #[must_use]
    pub fn delta_for(&self, store: &str) -> (u64, u64) {
        self.mutations
            .iter()
            .filter(|m| m.store() == store)
            .fold((0, 0), |(inserts, deletes), m| {
                if m.is_insert() {
                    (inserts + 1, deletes)
                } else {
                    (inserts, deletes + 1)
                }
            })
    }
}
