use crate::{
    db::{
        Container, SearchCursor, SearchRequest,
        codec::CompositeKey,
        layout,
        store::{Batch, FaultPlan, StoreAdapter},
        version::Version,
    },
    obs::MetricsSnapshot,
    test_support::{Fixture, employees, fixture, item},
    value::Value,
};
use proptest::prelude::*;
use std::collections::BTreeMap;
use ulid::Ulid;

fn ulid_item(n: u128) -> Value {
    Value::Ulid(Ulid(n))
}

fn range(
    container: &Container,
    attribute: &str,
    lo: impl Into<Value>,
    hi: impl Into<Value>,
) -> SearchRequest {
    SearchRequest::new(container.clone(), attribute).start(lo).end(hi)
}

// ----------------------------------------------------------------------
// Reference scenario
// ----------------------------------------------------------------------

#[test]
fn employees_scenario_tracks_names_and_heights() {
    let fx = fixture();
    let employees = employees();
    let containers = [employees.clone()];
    let (e1, e2, e3) = (ulid_item(1), ulid_item(2), ulid_item(3));

    for e in [&e1, &e2, &e3] {
        fx.db.add_item_to_collection(&employees, e).unwrap();
    }

    fx.set(&e1, "name", "bob", &containers);
    fx.set(&e2, "name", "fred", &containers);
    fx.set(&e3, "name", "bill", &containers);

    assert_eq!(fx.search_eq(&employees, "name", "fred"), vec![e2.clone()]);

    fx.set(&e2, "name", "steve", &containers);
    assert!(fx.search_eq(&employees, "name", "fred").is_empty());

    let found = fx.search(range(&employees, "name", "bill", "c"));
    assert_eq!(found, vec![e3.clone(), e1.clone()]);

    fx.set(&e1, "height", 5, &containers);
    fx.set(&e2, "height", 6, &containers);
    fx.set(&e3, "height", 7, &containers);

    assert_eq!(fx.search_eq(&employees, "height", 6), vec![e2.clone()]);
    assert_eq!(
        fx.search(range(&employees, "height", 6, 10)),
        vec![e2.clone(), e3.clone()]
    );

    fx.set(&e3, "height", 5, &containers);
    assert_eq!(fx.search(range(&employees, "height", 6, 10)), vec![e2]);
}

#[test]
fn byte_values_search_by_equality_and_range() {
    let fx = fixture();
    let employees = employees();
    let containers = [employees.clone()];
    let (e1, e2, e3) = (ulid_item(1), ulid_item(2), ulid_item(3));

    fx.set(&e1, "bytes", vec![1_u8, 2, 3], &containers);
    fx.set(&e2, "bytes", vec![1_u8, 2, 4], &containers);
    fx.set(&e3, "bytes", vec![1_u8, 2, 5], &containers);

    assert_eq!(fx.search_eq(&employees, "bytes", vec![1_u8, 2, 4]), vec![e2.clone()]);
    assert_eq!(
        fx.search(range(&employees, "bytes", vec![1_u8, 2, 4], vec![10_u8])),
        vec![e2, e3]
    );
}

// ----------------------------------------------------------------------
// Writer
// ----------------------------------------------------------------------

#[test]
fn null_write_removes_current_value_and_every_index_entry() {
    let fx = fixture();
    let (a, b) = (employees(), Container::new("acme", "managers"));
    let containers = [a.clone(), b.clone()];
    let e1 = item("e1");

    fx.set(&e1, "name", "bob", &containers);
    assert_eq!(fx.db.get_item_column(&e1, "name").unwrap(), Some(Value::from("bob")));

    let report = fx.db.set_item_column(&e1, "name", None, &containers).unwrap();
    assert_eq!(report.history_retired, 1);
    assert_eq!(report.index_removes, 2);
    assert_eq!(report.index_inserts, 0);

    assert_eq!(fx.db.get_item_column(&e1, "name").unwrap(), None);
    assert!(fx.db.item_history(&e1, "name").unwrap().is_empty());
    for c in &containers {
        assert!(fx.search_eq(c, "name", "bob").is_empty());
        assert_eq!(fx.index_len(c, "name"), 0);
    }
}

#[test]
fn null_write_without_history_only_drops_the_item_column() {
    let fx = fixture();
    let e1 = item("e1");

    let report = fx.db.set_item_column(&e1, "name", None, &[employees()]).unwrap();

    assert_eq!(report.history_retired, 0);
    assert_eq!(report.index_removes, 0);
    assert_eq!(fx.db.get_item_column(&e1, "name").unwrap(), None);
}

#[test]
fn overwrite_moves_entry_in_every_container() {
    let fx = fixture();
    let containers = [employees(), Container::new(7_i64, "teams")];
    let e1 = item("e1");

    fx.set(&e1, "name", "bob", &containers);
    let report = fx
        .db
        .set_item_column(&e1, "name", Some(&Value::from("robert")), &containers)
        .unwrap();

    assert_eq!(report.index_inserts, 2);
    assert_eq!(report.index_removes, 2);
    for c in &containers {
        assert!(fx.search_eq(c, "name", "bob").is_empty());
        assert_eq!(fx.search_eq(c, "name", "robert"), vec![e1.clone()]);
        assert_eq!(fx.index_len(c, "name"), 1);
    }

    let history = fx.db.item_history(&e1, "name").unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].value, Value::from("robert"));
    assert_eq!(history[0].version, report.version);
}

#[test]
fn rewriting_the_same_value_keeps_one_entry() {
    let fx = fixture();
    let containers = [employees()];
    let e1 = item("e1");

    fx.set(&e1, "name", "bob", &containers);
    fx.set(&e1, "name", "bob", &containers);

    assert_eq!(fx.search_eq(&employees(), "name", "bob"), vec![e1]);
    assert_eq!(fx.index_len(&employees(), "name"), 1);
}

#[test]
fn history_is_scoped_to_one_attribute() {
    let fx = fixture();
    let containers = [employees()];
    let e1 = item("e1");

    fx.set(&e1, "name", "bob", &containers);
    fx.set(&e1, "nickname", "bobby", &containers);
    fx.set(&e1, "name2", "b", &containers);
    fx.set(&e1, "name", "rob", &containers);

    assert_eq!(fx.search_eq(&employees(), "nickname", "bobby"), vec![e1.clone()]);
    assert_eq!(fx.search_eq(&employees(), "name2", "b"), vec![e1.clone()]);
    assert_eq!(fx.db.item_history(&e1, "nickname").unwrap().len(), 1);
    assert_eq!(fx.db.item_history(&e1, "name").unwrap().len(), 1);
}

#[test]
fn write_metrics_are_recorded() {
    let fx = fixture();
    let containers = [employees(), Container::new("acme", "managers")];
    let e1 = item("e1");

    fx.set(&e1, "name", "bob", &containers);
    fx.set(&e1, "name", "rob", &containers);

    assert_eq!(
        fx.metrics.snapshot(),
        MetricsSnapshot {
            writes: 2,
            index_inserts: 4,
            index_removes: 2,
            history_retired: 1,
            ..MetricsSnapshot::default()
        }
    );
}

// ----------------------------------------------------------------------
// Failure and recovery
// ----------------------------------------------------------------------

#[test]
fn failed_submit_is_retryable_and_retry_converges() {
    let fx = fixture();
    let containers = [employees()];
    let e1 = item("e1");
    fx.set(&e1, "name", "bob", &containers);

    fx.store
        .inject(FaultPlan {
            fail_submits: 1,
            ..FaultPlan::default()
        })
        .unwrap();
    let err = fx
        .db
        .set_item_column(&e1, "name", Some(&Value::from("rob")), &containers)
        .unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(fx.search_eq(&employees(), "name", "bob"), vec![e1.clone()]);

    fx.set(&e1, "name", "rob", &containers);
    assert!(fx.search_eq(&employees(), "name", "bob").is_empty());
    assert_eq!(fx.search_eq(&employees(), "name", "rob"), vec![e1]);
}

#[test]
fn every_partial_batch_is_healed_by_the_next_write() {
    // second write: 2 index deletes, 1 history delete, 1 history insert,
    // 2 index inserts, 1 item insert
    for applied in 0..=7 {
        let fx = fixture();
        let containers = [employees(), Container::new("acme", "managers")];
        let e1 = item("e1");
        fx.set(&e1, "name", "bob", &containers);

        fx.store
            .inject(FaultPlan {
                partial_submit: Some(applied),
                ..FaultPlan::default()
            })
            .unwrap();
        let _ = fx
            .db
            .set_item_column(&e1, "name", Some(&Value::from("rob")), &containers);

        let report = fx
            .db
            .set_item_column(&e1, "name", Some(&Value::from("robert")), &containers)
            .unwrap();

        for c in &containers {
            let hits = fx
                .db
                .search_container_hits(&SearchRequest::new(c.clone(), "name"))
                .unwrap();
            assert_eq!(hits.len(), 1, "applied {applied}");
            assert_eq!(hits[0].value, Value::from("robert"));
            assert_eq!(hits[0].version, report.version);
        }
        assert_eq!(fx.db.item_history(&e1, "name").unwrap().len(), 1);
    }
}

#[test]
fn failed_read_propagates_from_search_and_write() {
    let fx = fixture();
    let e1 = item("e1");
    fx.store
        .inject(FaultPlan {
            fail_reads: 2,
            ..FaultPlan::default()
        })
        .unwrap();

    assert!(fx.db.search_container(&SearchRequest::new(employees(), "name")).is_err());
    assert!(
        fx.db
            .set_item_column(&e1, "name", Some(&Value::from("bob")), &[employees()])
            .is_err()
    );
    assert_eq!(fx.index_len(&employees(), "name"), 0);
}

#[test]
fn undecodable_history_columns_are_retired() {
    let fx = fixture();
    let e1 = item("e1");
    let config = fx.db.config().clone();

    let mut garbage = CompositeKey::new().with("name").encode();
    garbage.push(0x7F);
    let mut batch = Batch::new();
    batch.insert(
        &config.history_store,
        layout::history_row(&e1),
        garbage,
        Vec::new(),
        Version::from_ulid(Ulid(0)),
    );
    fx.store.submit(batch).unwrap();

    let report = fx
        .db
        .set_item_column(&e1, "name", Some(&Value::from("bob")), &[employees()])
        .unwrap();

    assert_eq!(report.history_retired, 1);
    assert_eq!(fx.metrics.snapshot().decode_skipped, 1);
    assert_eq!(
        fx.store
            .row_len(&config.history_store, &layout::history_row(&e1))
            .unwrap(),
        1
    );
}

// ----------------------------------------------------------------------
// Reader
// ----------------------------------------------------------------------

fn seeded_names() -> (Fixture, Vec<Value>) {
    let fx = fixture();
    let containers = [employees()];
    let items: Vec<Value> = (1..=5).map(ulid_item).collect();
    for (e, name) in items.iter().zip(["ann", "bob", "bob", "bob", "cat"]) {
        fx.set(e, "name", name, &containers);
    }

    (fx, items)
}

#[test]
fn reversed_search_returns_descending_order() {
    let (fx, items) = seeded_names();

    let found = fx.search(SearchRequest::new(employees(), "name").reversed(true));
    let expected: Vec<Value> = items.iter().rev().cloned().collect();
    assert_eq!(found, expected);

    let found = fx.search(range(&employees(), "name", "b", "c").reversed(true).limit(2));
    assert_eq!(found, vec![items[3].clone(), items[2].clone()]);
}

#[test]
fn limit_truncates_in_index_order() {
    let (fx, items) = seeded_names();

    assert_eq!(
        fx.search(SearchRequest::new(employees(), "name").limit(2)),
        items[..2].to_vec()
    );
    assert!(fx.search(SearchRequest::new(employees(), "name").limit(0)).is_empty());
}

#[test]
fn cursor_pages_forward_and_backward_through_a_range() {
    let (fx, items) = seeded_names();

    let mut pages = Vec::new();
    let mut cursor: Option<SearchCursor> = None;
    loop {
        let mut request = SearchRequest::new(employees(), "name").limit(2);
        if let Some(c) = cursor.take() {
            request = request.after(c);
        }
        let hits = fx.db.search_container_hits(&request).unwrap();
        let Some(last) = hits.last() else { break };
        cursor = Some(last.cursor());
        pages.extend(hits.into_iter().map(|hit| hit.item));
    }
    assert_eq!(pages, items);

    let page = fx
        .db
        .search_container_hits(
            &SearchRequest::new(employees(), "name")
                .reversed(true)
                .after(SearchCursor::new(Value::from("bob"), items[2].clone())),
        )
        .unwrap();
    let found: Vec<Value> = page.into_iter().map(|hit| hit.item).collect();
    assert_eq!(found, vec![items[1].clone(), items[0].clone()]);
}

#[test]
fn start_after_item_resumes_an_equality_search_at_that_item() {
    let (fx, items) = seeded_names();

    let found = fx.search(
        SearchRequest::new(employees(), "name")
            .start("bob")
            .start_after_item(items[1].clone()),
    );
    assert_eq!(found, vec![items[1].clone(), items[2].clone(), items[3].clone()]);

    let found = fx.search(
        SearchRequest::new(employees(), "name")
            .start("bob")
            .start_after_item(items[2].clone())
            .reversed(true),
    );
    assert_eq!(found, vec![items[2].clone(), items[1].clone()]);
}

#[test]
fn reversed_start_after_item_without_start_scans_from_the_top() {
    let (fx, items) = seeded_names();

    let found = fx.search(
        SearchRequest::new(employees(), "name")
            .start_after_item(items[2].clone())
            .reversed(true),
    );
    let expected: Vec<Value> = items.iter().rev().cloned().collect();
    assert_eq!(found, expected);
}

#[test]
fn ulid_values_search_by_equality_including_the_max() {
    let fx = fixture();
    let (a, b, m) = (item("a"), item("b"), item("m"));
    fx.set(&a, "badge", Value::Ulid(Ulid(5)), &[employees()]);
    fx.set(&b, "badge", Value::Ulid(Ulid(6)), &[employees()]);
    fx.set(&m, "badge", Value::Ulid(Ulid(u128::MAX)), &[employees()]);

    assert_eq!(fx.search_eq(&employees(), "badge", Value::Ulid(Ulid(5))), vec![a]);
    assert_eq!(
        fx.search_eq(&employees(), "badge", Value::Ulid(Ulid(u128::MAX))),
        vec![m]
    );
}

#[test]
fn equality_on_max_int_uses_the_prefix_end() {
    let fx = fixture();
    let e1 = item("e1");
    fx.set(&e1, "score", i64::MAX, &[employees()]);
    fx.set(&item("e2"), "score", i64::MAX - 1, &[employees()]);

    assert_eq!(fx.search_eq(&employees(), "score", i64::MAX), vec![e1]);
}

#[test]
fn mixed_kinds_share_one_index_without_interleaving() {
    let fx = fixture();
    let containers = [employees()];
    fx.set(&item("blob"), "tag", vec![0xFF_u8], &containers);
    fx.set(&item("text"), "tag", "zzz", &containers);
    fx.set(&item("int"), "tag", -1, &containers);

    assert_eq!(
        fx.search(SearchRequest::new(employees(), "tag")),
        vec![item("blob"), item("text"), item("int")]
    );
    assert_eq!(
        fx.search(range(&employees(), "tag", "", i64::MIN)),
        vec![item("text")]
    );
}

#[test]
fn undecodable_index_columns_are_skipped() {
    let fx = fixture();
    let e1 = item("e1");
    fx.set(&e1, "name", "bob", &[employees()]);

    let config = fx.db.config().clone();
    let mut batch = Batch::new();
    batch.insert(
        &config.index_store,
        employees().index_key("name").row_key(),
        vec![0x7F, 0x00],
        Vec::new(),
        Version::from_ulid(Ulid(99)),
    );
    fx.store.submit(batch).unwrap();

    assert_eq!(fx.search(SearchRequest::new(employees(), "name")), vec![e1]);
    let snapshot = fx.metrics.snapshot();
    assert_eq!(snapshot.decode_skipped, 1);
    assert_eq!(snapshot.searches, 1);
    assert_eq!(snapshot.search_hits, 1);
}

// ----------------------------------------------------------------------
// Membership
// ----------------------------------------------------------------------

#[test]
fn membership_lists_added_items_in_key_order() {
    let fx = fixture();
    let employees = employees();

    fx.db.add_item_to_collection(&employees, &item("b")).unwrap();
    fx.db.add_item_to_collection(&employees, &item("a")).unwrap();
    fx.db.add_item_to_collection(&employees, &item("a")).unwrap();

    assert_eq!(
        fx.db.collection_items(&employees).unwrap(),
        vec![item("a"), item("b")]
    );
    assert!(fx.db.collection_items(&Container::new("acme", "empty")).unwrap().is_empty());
}

#[test]
fn removing_membership_clears_that_containers_index_only() {
    let fx = fixture();
    let (a, b) = (employees(), Container::new("acme", "managers"));
    let e1 = item("e1");
    for c in [&a, &b] {
        fx.db.add_item_to_collection(c, &e1).unwrap();
    }
    fx.set(&e1, "name", "bob", &[a.clone(), b.clone()]);
    fx.set(&e1, "height", 6, &[a.clone(), b.clone()]);

    fx.db
        .remove_item_from_collection(&b, &e1, &["name", "height"])
        .unwrap();

    assert!(fx.db.collection_items(&b).unwrap().is_empty());
    assert!(fx.search_eq(&b, "name", "bob").is_empty());
    assert!(fx.search_eq(&b, "height", 6).is_empty());
    assert_eq!(fx.search_eq(&a, "name", "bob"), vec![e1.clone()]);
    assert_eq!(fx.db.item_history(&e1, "name").unwrap().len(), 1);

    // later writes that omit the old container still converge
    fx.set(&e1, "name", "rob", &[a.clone()]);
    assert_eq!(fx.search_eq(&a, "name", "rob"), vec![e1]);
    assert_eq!(fx.index_len(&b, "name"), 0);
}

// ----------------------------------------------------------------------
// Properties
// ----------------------------------------------------------------------

const ITEMS: [&str; 4] = ["i0", "i1", "i2", "i3"];

fn op_strategy() -> impl Strategy<Value = (usize, Option<i64>)> {
    (0..ITEMS.len(), prop::option::weighted(0.8, -4_i64..4))
}

fn model_range(model: &BTreeMap<usize, i64>, lo: i64, hi: i64) -> Vec<Value> {
    let mut hits: Vec<(i64, Value)> = model
        .iter()
        .filter(|(_, v)| lo <= **v && **v < hi)
        .map(|(i, v)| (*v, item(ITEMS[*i])))
        .collect();
    hits.sort();

    hits.into_iter().map(|(_, item)| item).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn search_matches_model_after_any_write_sequence(
        ops in prop::collection::vec(op_strategy(), 1..24),
        lo in -5_i64..5,
        width in 0_i64..6,
    ) {
        let fx = fixture();
        let containers = [employees(), Container::new("acme", "managers")];
        let mut model = BTreeMap::new();

        for (i, value) in &ops {
            let value = value.map(Value::Int);
            fx.db
                .set_item_column(&item(ITEMS[*i]), "height", value.as_ref(), &containers)
                .unwrap();
            match value {
                Some(Value::Int(v)) => { model.insert(*i, v); }
                _ => { model.remove(i); }
            }
        }

        let hi = lo + width;
        for c in &containers {
            // half-open range
            prop_assert_eq!(fx.search(range(c, "height", lo, hi)), model_range(&model, lo, hi));

            // equality, and one live entry per indexed item
            prop_assert_eq!(
                fx.search_eq(c, "height", lo),
                model_range(&model, lo, lo + 1)
            );
            prop_assert_eq!(fx.index_len(c, "height"), model.len());
        }

        for (i, name) in ITEMS.iter().enumerate() {
            prop_assert_eq!(
                fx.db.get_item_column(&item(name), "height").unwrap(),
                model.get(&i).copied().map(Value::Int)
            );
        }
    }
}
