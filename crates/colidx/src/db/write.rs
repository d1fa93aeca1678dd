//! Module: write
//! Responsibility: keeping item values, history rows and container indexes
//! consistent as one attribute changes.
//! Does not own: key bytes (layout) or history decoding (history).
//! Boundary: Collections -> IndexWriter -> one StoreAdapter batch per call.

use crate::{
    db::{
        codec::encode_component,
        config::StoreConfig,
        history,
        identity::Container,
        layout,
        store::{Batch, StoreAdapter},
        version::{Version, VersionSource},
    },
    error::InternalError,
    obs::{MetricsEvent, MetricsSink},
    value::Value,
};
use tracing::debug;

///
/// WriteReport
///
/// What one `set_item_column` call scheduled and submitted.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WriteReport {
    pub version: Version,
    pub history_retired: u64,
    pub index_inserts: u64,
    pub index_removes: u64,
}

///
/// IndexWriter
///
/// Every call reads the full live history of the attribute and retires all
/// of it, so a write that follows a partially applied batch (or a failed
/// retry) converges on exactly one live entry.
///
/// Concurrent calls for the same `(item, attribute)` race between the
/// history read and the batch submit; callers serialize those themselves.
///

pub struct IndexWriter<'a, S: ?Sized> {
    store: &'a S,
    clock: &'a dyn VersionSource,
    config: &'a StoreConfig,
    metrics: &'a dyn MetricsSink,
}

impl<'a, S: StoreAdapter + ?Sized> IndexWriter<'a, S> {
    #[must_use]
    pub const fn new(
        store: &'a S,
        clock: &'a dyn VersionSource,
        config: &'a StoreConfig,
        metrics: &'a dyn MetricsSink,
    ) -> Self {
        Self {
            store,
            clock,
            config,
            metrics,
        }
    }

    /// Set (`Some`) or delete (`None`) one attribute of `item`, moving its
    /// index entries in every container of `containers`.
    pub fn set_item_column(
        &self,
        item: &Value,
        attribute: &str,
        value: Option<&Value>,
        containers: &[Container],
    ) -> Result<WriteReport, InternalError> {
        let version = self.clock.next_version()?;
        let scan = history::scan(self.store, self.config, self.metrics, item, attribute)?;
        if scan.entries.len() + scan.malformed.len() >= self.config.history_scan_limit {
            debug!(
                item = %item,
                attribute,
                limit = self.config.history_scan_limit,
                "history scan hit its limit; later writes retire the rest"
            );
        }

        let cfg = self.config;
        let history_row = layout::history_row(item);
        let index_rows: Vec<Vec<u8>> = containers
            .iter()
            .map(|container| container.index_key(attribute).row_key())
            .collect();
        let history_retired = (scan.entries.len() + scan.malformed.len()) as u64;

        let mut batch = Batch::new();

        // Any applied prefix of the batch must leave each live index column
        // with a history entry: index columns are deleted before their
        // history entry, and the new history entry precedes its index columns.

        // retire every live version in every container
        for (column, entry) in scan.entries {
            debug!(
                item = %item,
                attribute,
                value = %entry.value,
                version = %entry.version,
                "retiring history entry"
            );
            let stale = layout::index_column(&entry.value, item, entry.version);
            for row in &index_rows {
                batch.delete(&cfg.index_store, row.clone(), stale.clone(), version);
            }

            batch.delete(&cfg.history_store, history_row.clone(), column, version);
        }
        for column in scan.malformed {
            batch.delete(&cfg.history_store, history_row.clone(), column, version);
        }

        // install the new version, or drop the current value
        let item_row = layout::item_row(item);
        let item_column = layout::item_column(attribute);
        match value {
            Some(value) => {
                let payload = encode_component(value);
                batch.insert(
                    &cfg.history_store,
                    history_row,
                    layout::history_column(attribute, version),
                    payload.clone(),
                    version,
                );

                let entry = layout::index_column(value, item, version);
                for row in index_rows {
                    debug!(
                        row = %String::from_utf8_lossy(&row),
                        item = %item,
                        value = %value,
                        %version,
                        "indexing value"
                    );
                    batch.insert(&cfg.index_store, row, entry.clone(), Vec::new(), version);
                }

                batch.insert(&cfg.item_store, item_row, item_column, payload, version);
            }
            None => {
                batch.delete(&cfg.item_store, item_row, item_column, version);
            }
        }

        let (index_inserts, index_removes) = batch.delta_for(&cfg.index_store);
        self.store.submit(batch)?;

        self.metrics.record(MetricsEvent::HistoryRetired {
            attribute,
            entries: history_retired,
        });
        self.metrics.record(MetricsEvent::IndexDelta {
            attribute,
            inserts: index_inserts,
            removes: index_removes,
        });

        Ok(WriteReport {
            version,
            history_retired,
            index_inserts,
            index_removes,
        })
    }
}
