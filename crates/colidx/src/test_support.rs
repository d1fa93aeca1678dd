use crate::{
    db::{Collections, Container, SearchRequest, SequenceClock, StoreConfig, store::MemoryStore},
    obs::CountingMetrics,
    value::Value,
};
use std::sync::Arc;

///
/// Fixture
///
/// Memory-backed collections with a deterministic clock and counting
/// metrics. The store handle is shared so tests can inject faults and
/// inspect rows directly.
///

pub(crate) struct Fixture {
    pub(crate) store: Arc<MemoryStore>,
    pub(crate) metrics: Arc<CountingMetrics>,
    pub(crate) db: Collections<Arc<MemoryStore>>,
}

pub(crate) fn fixture() -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let metrics = Arc::new(CountingMetrics::new());
    let db = Collections::new(Arc::clone(&store), StoreConfig::default())
        .expect("default config is valid")
        .with_clock(Arc::new(SequenceClock::default()))
        .with_metrics(metrics.clone());

    Fixture { store, metrics, db }
}

pub(crate) fn employees() -> Container {
    Container::new("acme", "employees")
}

pub(crate) fn item(name: &str) -> Value {
    Value::from(name)
}

impl Fixture {
    pub(crate) fn set(
        &self,
        item: &Value,
        attribute: &str,
        value: impl Into<Value>,
        containers: &[Container],
    ) {
        self.db
            .set_item_column(item, attribute, Some(&value.into()), containers)
            .expect("set item column");
    }

    pub(crate) fn search(&self, request: SearchRequest) -> Vec<Value> {
        self.db.search_container(&request).expect("search")
    }

    /// Search for one exact value.
    pub(crate) fn search_eq(
        &self,
        container: &Container,
        attribute: &str,
        value: impl Into<Value>,
    ) -> Vec<Value> {
        self.search(SearchRequest::new(container.clone(), attribute).start(value))
    }

    pub(crate) fn index_len(&self, container: &Container, attribute: &str) -> usize {
        let config = self.db.config();
        self.store
            .row_len(&config.index_store, &container.index_key(attribute).row_key())
            .expect("index row")
    }
}
