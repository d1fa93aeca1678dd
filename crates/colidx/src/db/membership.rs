use crate::{
    db::{
        codec::decode_value,
        config::StoreConfig,
        history,
        identity::Container,
        layout,
        store::{Batch, ColumnRange, Direction, StoreAdapter},
        version::{Version, VersionSource},
    },
    error::InternalError,
    obs::{MetricsEvent, MetricsSink},
    value::Value,
};
use tracing::{debug, warn};

///
/// Membership
///
/// Container membership rows. Adding is a single column insert; removal
/// also clears the item's index entries in that container so stale hits do
/// not outlive the membership.
///

pub struct Membership<'a, S: ?Sized> {
    store: &'a S,
    clock: &'a dyn VersionSource,
    config: &'a StoreConfig,
    metrics: &'a dyn MetricsSink,
}

impl<'a, S: StoreAdapter + ?Sized> Membership<'a, S> {
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

    pub fn add_item_to_collection(
        &self,
        container: &Container,
        item: &Value,
    ) -> Result<Version, InternalError> {
        let version = self.clock.next_version()?;

        let mut batch = Batch::new();
        batch.insert(
            &self.config.membership_store,
            container.row_key(),
            layout::membership_column(item),
            version.to_bytes().to_vec(),
            version,
        );
        self.store.submit(batch)?;

        debug!(container = %container, item = %item, %version, "added item to collection");

        Ok(version)
    }

    /// Drop `item` from `container` and retire its index entries there for
    /// each of `attributes`.
    ///
    /// History rows stay: they still describe entries in the item's other
    /// containers, and the next write to each attribute retires them.
    pub fn remove_item_from_collection(
        &self,
        container: &Container,
        item: &Value,
        attributes: &[&str],
    ) -> Result<Version, InternalError> {
        let version = self.clock.next_version()?;
        let cfg = self.config;

        let mut batch = Batch::new();
        batch.delete(
            &cfg.membership_store,
            container.row_key(),
            layout::membership_column(item),
            version,
        );

        for &attribute in attributes {
            let row = container.index_key(attribute).row_key();
            let scan = history::scan(self.store, cfg, self.metrics, item, attribute)?;
            for (_, entry) in scan.entries {
                batch.delete(
                    &cfg.index_store,
                    row.clone(),
                    layout::index_column(&entry.value, item, entry.version),
                    version,
                );
            }
        }

        let (_, removes) = batch.delta_for(&cfg.index_store);
        self.store.submit(batch)?;

        debug!(
            container = %container,
            item = %item,
            index_removes = removes,
            "removed item from collection"
        );

        Ok(version)
    }

    /// Every item currently in `container`, in key order.
    pub fn collection_items(&self, container: &Container) -> Result<Vec<Value>, InternalError> {
        let columns = self.store.range_read(
            &self.config.membership_store,
            &container.row_key(),
            &ColumnRange::all(),
            Direction::Asc,
            usize::MAX,
        )?;

        let mut items = Vec::with_capacity(columns.len());
        for column in columns {
            match decode_value(&column.key) {
                Ok(item) => items.push(item),
                Err(err) => {
                    warn!(
                        store = %self.config.membership_store,
                        container = %container,
                        error = %err,
                        "skipping undecodable membership column"
                    );
                    self.metrics.record(MetricsEvent::DecodeSkipped {
                        store: &self.config.membership_store,
                    });
                }
            }
        }

        Ok(items)
    }
}
