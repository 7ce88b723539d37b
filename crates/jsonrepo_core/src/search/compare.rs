//! Natural ordering of field values and the chained record comparator.

use crate::model::record::Record;
use serde_json::Value;
use std::cmp::Ordering;

/// One sort criterion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub ascending: bool,
}

impl SortKey {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ascending: true,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ascending: false,
        }
    }
}

/// Compares two field values.
///
/// Values of different kinds order by kind: absent or null, then booleans,
/// numbers, strings, and finally arrays and objects. Within a kind, numbers
/// compare numerically, strings by code point and booleans with
/// `false < true`; arrays and objects tie with each other.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => compare_numbers(x, y),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => kind_rank(a).cmp(&kind_rank(b)),
    }
}

fn kind_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(Value::Array(_) | Value::Object(_)) => 4,
    }
}

fn compare_numbers(x: &serde_json::Number, y: &serde_json::Number) -> Ordering {
    if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
        return x.cmp(&y);
    }
    if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
        return x.cmp(&y);
    }
    match (x.as_f64(), y.as_f64()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        _ => Ordering::Equal,
    }
}

/// Folds `keys` in precedence order; the first non-tie decides.
pub fn compare_records(a: &Record, b: &Record, keys: &[SortKey]) -> Ordering {
    for key in keys {
        let ordering = compare_values(a.get(&key.field), b.get(&key.field));
        if ordering != Ordering::Equal {
            return if key.ascending {
                ordering
            } else {
                ordering.reverse()
            };
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::{compare_records, compare_values, SortKey};
    use crate::model::record::Record;
    use serde_json::json;
    use std::cmp::Ordering;

    fn record(value: serde_json::Value) -> Record {
        Record::from_value(value).unwrap()
    }

    #[test]
    fn numbers_compare_numerically_not_textually() {
        assert_eq!(compare_values(Some(&json!(9)), Some(&json!(10))), Ordering::Less);
        assert_eq!(compare_values(Some(&json!(-1)), Some(&json!(2.5))), Ordering::Less);
        assert_eq!(compare_values(Some(&json!(3.0)), Some(&json!(3))), Ordering::Equal);
    }

    #[test]
    fn values_of_different_kinds_order_by_kind() {
        let ranked = [json!(null), json!(true), json!(10), json!("9"), json!([1])];
        assert_eq!(compare_values(None, Some(&json!(null))), Ordering::Equal);
        assert_eq!(compare_values(None, Some(&json!(false))), Ordering::Less);
        for (low, high) in ranked.iter().zip(ranked.iter().skip(1)) {
            assert_eq!(compare_values(Some(low), Some(high)), Ordering::Less);
            assert_eq!(compare_values(Some(high), Some(low)), Ordering::Greater);
        }
        assert_eq!(
            compare_values(Some(&json!({ "k": 1 })), Some(&json!([2]))),
            Ordering::Equal
        );
    }

    #[test]
    fn comparison_is_transitive_across_missing_values() {
        let three = json!(3);
        let one = json!(1);
        assert_eq!(compare_values(None, Some(&three)), Ordering::Less);
        assert_eq!(compare_values(None, Some(&one)), Ordering::Less);
        assert_eq!(compare_values(Some(&three), Some(&one)), Ordering::Greater);
    }

    #[test]
    fn ties_fall_through_to_next_key_with_its_direction() {
        let a = record(json!({ "age": 30, "name": "Ann" }));
        let b = record(json!({ "age": 30, "name": "Bob" }));
        let keys = [SortKey::ascending("age"), SortKey::descending("name")];
        assert_eq!(compare_records(&a, &b, &keys), Ordering::Greater);
        assert_eq!(compare_records(&a, &a, &keys), Ordering::Equal);
    }
}
