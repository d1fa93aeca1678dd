//! Module: db
//! Responsibility: index maintenance and search over a sorted wide-row store.
//! Does not own: the store itself, which is reached only via `StoreAdapter`.
//! Boundary: callers -> Collections -> writer/reader/membership -> store.

pub mod codec;
pub mod store;

mod collections;
mod config;
mod history;
mod identity;
mod layout;
mod membership;
mod read;
mod version;
mod write;

#[cfg(test)]
mod tests;

// re-exports
pub use collections::Collections;
pub use config::{ConfigError, StoreConfig};
pub use history::HistoryEntry;
pub use identity::{Container, IndexKey};
pub use membership::Membership;
pub use read::{IndexHit, IndexReader, SearchCursor, SearchRequest};
pub use version::{SequenceClock, UlidClock, Version, VersionSource};
pub use write::{IndexWriter, WriteReport};
