use crate::{
    db::{
        config::StoreConfig,
        history::HistoryEntry,
        identity::Container,
        membership::Membership,
        read::{IndexHit, IndexReader, SearchRequest},
        store::StoreAdapter,
        version::{UlidClock, Version, VersionSource},
        write::{IndexWriter, WriteReport},
    },
    error::InternalError,
    obs::{MetricsSink, NoopMetrics},
    value::Value,
};
use std::sync::Arc;

///
/// Collections
///
/// Handle over one store with its layout, clock and metrics policy.
/// Holds no cached state; any number of handles may share a store.
///

pub struct Collections<S: StoreAdapter> {
    store: S,
    config: StoreConfig,
    clock: Arc<dyn VersionSource>,
    metrics: Arc<dyn MetricsSink>,
}

impl<S: StoreAdapter> Collections<S> {
    /// Validate `config` and build a handle with a wall-clock version source
    /// and no metrics.
    pub fn new(store: S, config: StoreConfig) -> Result<Self, InternalError> {
        config.validate()?;

        Ok(Self {
            store,
            config,
            clock: Arc::new(UlidClock::new()),
            metrics: Arc::new(NoopMetrics),
        })
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn VersionSource>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = metrics;
        self
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    #[must_use]
    pub fn writer(&self) -> IndexWriter<'_, S> {
        IndexWriter::new(
            &self.store,
            self.clock.as_ref(),
            &self.config,
            self.metrics.as_ref(),
        )
    }

    #[must_use]
    pub fn reader(&self) -> IndexReader<'_, S> {
        IndexReader::new(&self.store, &self.config, self.metrics.as_ref())
    }

    #[must_use]
    pub fn membership(&self) -> Membership<'_, S> {
        Membership::new(
            &self.store,
            self.clock.as_ref(),
            &self.config,
            self.metrics.as_ref(),
        )
    }

    // ------------------------------------------------------------------
    // Shortcuts
    // ------------------------------------------------------------------

    pub fn set_item_column(
        &self,
        item: &Value,
        attribute: &str,
        value: Option<&Value>,
        containers: &[Container],
    ) -> Result<WriteReport, InternalError> {
        self.writer()
            .set_item_column(item, attribute, value, containers)
    }

    pub fn search_container(&self, request: &SearchRequest) -> Result<Vec<Value>, InternalError> {
        self.reader().search_container(request)
    }

    pub fn search_container_hits(
        &self,
        request: &SearchRequest,
    ) -> Result<Vec<IndexHit>, InternalError> {
        self.reader().search_container_hits(request)
    }

    pub fn get_item_column(
        &self,
        item: &Value,
        attribute: &str,
    ) -> Result<Option<Value>, InternalError> {
        self.reader().get_item_column(item, attribute)
    }

    pub fn item_history(
        &self,
        item: &Value,
        attribute: &str,
    ) -> Result<Vec<HistoryEntry>, InternalError> {
        self.reader().item_history(item, attribute)
    }

    pub fn add_item_to_collection(
        &self,
        container: &Container,
        item: &Value,
    ) -> Result<Version, InternalError> {
        self.membership().add_item_to_collection(container, item)
    }

    pub fn remove_item_from_collection(
        &self,
        container: &Container,
        item: &Value,
        attributes: &[&str],
    ) -> Result<Version, InternalError> {
        self.membership()
            .remove_item_from_collection(container, item, attributes)
    }

    pub fn collection_items(&self, container: &Container) -> Result<Vec<Value>, InternalError> {
        self.membership().collection_items(container)
    }
}
