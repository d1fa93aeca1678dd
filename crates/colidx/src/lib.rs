//! Secondary indexes for owner-scoped collections of items kept in a sorted
//! wide-row store that only offers per-row range scans and batched mutation.
//!
//! Attribute values of any supported kind share one ordered index per
//! `(collection, attribute)`; a per-item history row records which indexed
//! versions are still live so stale entries can be retired without scanning
//! the index.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod db;
pub mod error;
pub mod obs;
pub mod value;

#[cfg(test)]
pub(crate) mod test_support;

///
/// Prelude
///
/// Domain vocabulary only; stores, clocks and sinks are imported explicitly.
///

pub mod prelude {
    pub use crate::{
        db::{Collections, Container, SearchCursor, SearchRequest, StoreConfig},
        value::Value,
    };
}
