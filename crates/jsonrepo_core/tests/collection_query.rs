use jsonrepo_core::{
    FieldModel, JsonCollectionStore, QueryParams, Record, RecordRepository, StoreConfig,
};
use serde_json::{json, Value};
use std::path::Path;

fn people_store(dir: &Path, rows: Vec<Value>) -> JsonCollectionStore<FieldModel> {
    let model = FieldModel::new("Person", ["name", "age", "tag", "Display"]);
    let mut store = JsonCollectionStore::new(model, &StoreConfig::new(dir));
    for row in rows {
        store.add(Record::from_value(row).unwrap());
    }
    store
}

fn field(records: &[Record], name: &str) -> Vec<Value> {
    records
        .iter()
        .map(|record| record.get(name).cloned().unwrap_or(Value::Null))
        .collect()
}

#[test]
fn star_filter_without_sort_returns_everything_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = people_store(
        dir.path(),
        vec![json!({ "name": "Ann", "age": 30 }), json!({ "name": "Bob", "age": 25 })],
    );

    let results = store.get_all(&QueryParams::new().with("age", "*"));

    assert_eq!(
        results
            .into_iter()
            .map(Record::into_value)
            .collect::<Vec<_>>(),
        vec![
            json!({ "Id": 1, "name": "Ann", "age": 30 }),
            json!({ "Id": 2, "name": "Bob", "age": 25 }),
        ]
    );
}

#[test]
fn sort_by_single_field_orders_ascending() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = people_store(
        dir.path(),
        vec![json!({ "name": "Ann", "age": 30 }), json!({ "name": "Bob", "age": 25 })],
    );

    let results = store.get_all(&QueryParams::new().with("sort", "age"));

    assert_eq!(field(&results, "name"), vec![json!("Bob"), json!("Ann")]);
    // Sorting works on a copy; collection order is untouched.
    assert_eq!(field(store.objects(), "name"), vec![json!("Ann"), json!("Bob")]);
}

#[test]
fn prefix_pattern_matches_case_insensitively() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = people_store(
        dir.path(),
        vec![
            json!({ "name": "Ann" }),
            json!({ "name": "bob" }),
            json!({ "name": "alice" }),
            json!({ "name": "Dana" }),
        ],
    );

    let results = store.get_all(&QueryParams::new().with("name", "a*"));

    assert_eq!(field(&results, "name"), vec![json!("Ann"), json!("alice")]);
}

#[test]
fn star_matches_empty_strings_but_not_missing_or_null() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = people_store(
        dir.path(),
        vec![
            json!({ "name": "" }),
            json!({ "name": null }),
            json!({ "age": 3 }),
            json!({ "name": "Zed" }),
        ],
    );

    let results = store.get_all(&QueryParams::new().with("name", "*"));

    assert_eq!(field(&results, "Id"), vec![json!(1), json!(4)]);
}

#[test]
fn chained_sort_uses_direction_per_key_and_keeps_ties_stable() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = people_store(
        dir.path(),
        vec![
            json!({ "name": "Ann", "age": 30, "tag": "first" }),
            json!({ "name": "Cid", "age": 25 }),
            json!({ "name": "Bob", "age": 30 }),
            json!({ "name": "Ann", "age": 30, "tag": "second" }),
            json!({ "name": "Abe", "age": 25 }),
        ],
    );

    let params = QueryParams::new().with("sort", vec!["age", "name,desc"]);
    let results = store.get_all(&params);

    assert_eq!(
        field(&results, "Id"),
        vec![json!(2), json!(5), json!(3), json!(1), json!(4)]
    );
    assert_eq!(field(&results[3..], "tag"), vec![json!("first"), json!("second")]);
}

#[test]
fn descending_numeric_sort_is_numeric() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = people_store(
        dir.path(),
        vec![
            json!({ "name": "a", "age": 9 }),
            json!({ "name": "b", "age": 100 }),
            json!({ "name": "c", "age": 10 }),
        ],
    );

    let results = store.get_all(&QueryParams::parse_query_string("sort=age,desc"));

    assert_eq!(field(&results, "age"), vec![json!(100), json!(10), json!(9)]);
}

#[test]
fn unrecognized_filter_and_sort_fields_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = people_store(
        dir.path(),
        vec![json!({ "name": "Bob", "age": 25 }), json!({ "name": "Ann", "age": 30 })],
    );

    let params = QueryParams::new()
        .with("nickname", "nothing-matches-this")
        .with("Sort", vec!["height", "NAME"]);
    let results = store.get_all(&params);

    assert_eq!(field(&results, "name"), vec![json!("Bob"), json!("Ann")]);
}

#[test]
fn filters_combine_with_and_before_sorting() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = people_store(
        dir.path(),
        vec![
            json!({ "name": "Amy", "age": 31 }),
            json!({ "name": "Al", "age": 42 }),
            json!({ "name": "Ann", "age": 35 }),
            json!({ "name": "Bea", "age": 33 }),
        ],
    );

    let params = QueryParams::parse_query_string("name=a*&age=3*&sort=name,desc");
    let results = store.get_all(&params);

    assert_eq!(field(&results, "name"), vec![json!("Ann"), json!("Amy")]);
}

#[test]
fn repeated_filter_parameter_requires_every_pattern() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = people_store(
        dir.path(),
        vec![
            json!({ "name": "Ann" }),
            json!({ "name": "Alan" }),
            json!({ "name": "Amy" }),
        ],
    );

    let results = store.get_all(&QueryParams::parse_query_string("name=a*&name=*n"));

    assert_eq!(field(&results, "name"), vec![json!("Ann"), json!("Alan")]);
}

#[test]
fn filter_on_id_uses_its_printed_form() {
    let dir = tempfile::tempdir().unwrap();
    let rows = (0..12).map(|n| json!({ "name": format!("p{n}") })).collect();
    let mut store = people_store(dir.path(), rows);

    let results = store.get_all(&QueryParams::new().with("Id", "1*"));

    assert_eq!(
        field(&results, "Id"),
        vec![json!(1), json!(10), json!(11), json!(12)]
    );
}

#[test]
fn enrichment_runs_before_filtering() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = people_store(
        dir.path(),
        vec![json!({ "name": "Ann", "age": 30 }), json!({ "name": "Bob", "age": 25 })],
    );
    store.set_enrichment(|record| {
        let mut enriched = record.clone();
        let label = format!(
            "{} ({})",
            record.get("name").and_then(Value::as_str).unwrap_or_default(),
            record.get("age").and_then(Value::as_u64).unwrap_or_default()
        );
        enriched.set("Display", label);
        enriched
    });

    let results = store.get_all(&QueryParams::new().with("Display", "*(25)"));

    assert_eq!(field(&results, "Display"), vec![json!("Bob (25)")]);
}

#[test]
fn sort_places_records_missing_the_field_first_and_still_orders_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = people_store(
        dir.path(),
        vec![
            json!({ "name": "a", "age": 3 }),
            json!({ "name": "b" }),
            json!({ "name": "c", "age": 1 }),
            json!({ "name": "d", "age": "unknown" }),
            json!({ "name": "e", "age": null }),
            json!({ "name": "f", "age": 2 }),
        ],
    );

    let ascending = store.get_all(&QueryParams::new().with("sort", "age"));
    assert_eq!(
        field(&ascending, "name"),
        vec![json!("b"), json!("e"), json!("c"), json!("f"), json!("a"), json!("d")]
    );

    let descending = store.get_all(&QueryParams::new().with("sort", "age,desc"));
    assert_eq!(
        field(&descending, "name"),
        vec![json!("d"), json!("a"), json!("f"), json!("c"), json!("b"), json!("e")]
    );
}

#[test]
fn sort_over_many_mixed_rows_keeps_numbers_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let rows = (0..300u64)
        .map(|n| match n % 3 {
            0 => json!({ "name": format!("p{n}") }),
            1 => json!({ "name": format!("p{n}"), "age": format!("s{}", (n * 7) % 50) }),
            _ => json!({ "name": format!("p{n}"), "age": (n * 37) % 101 }),
        })
        .collect();
    let mut store = people_store(dir.path(), rows);

    let results = store.get_all(&QueryParams::new().with("sort", "age"));

    let numbers = results
        .iter()
        .filter_map(|record| record.get("age").and_then(Value::as_u64))
        .collect::<Vec<_>>();
    assert_eq!(numbers.len(), 100);
    assert!(numbers.windows(2).all(|pair| pair[0] <= pair[1]));
    let first_string = results
        .iter()
        .position(|record| record.get("age").is_some_and(Value::is_string))
        .unwrap();
    assert!(results[first_string..]
        .iter()
        .all(|record| record.get("age").is_some_and(Value::is_string)));
}
