//! Record values
//!
//! Records are schema-less JSON-like mappings. This module holds the
//! comparison rules shared by the query matcher, cursor sorting and the
//! aggregation shim.

use std::cmp::Ordering;

use serde_json::{Map, Value};

/// A schema-less record
pub type Document = Map<String, Value>;

/// Name of the identifier field assigned at insertion
pub const FIELD_ID: &str = "_id";

/// Build a document from a JSON object value
///
/// Non-object values produce an empty document.
pub fn document(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        _ => Document::new(),
    }
}

/// Equality used by queries: numbers compare by value, so `45000 == 45000.0`
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

/// Textual form of a field for `$regex` matching
///
/// A missing field is the empty string.
pub fn text_form(value: Option<&Value>) -> String {
    match value {
        None => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Rank of each type in the sort order
fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None => 0,
        Some(Value::Null) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(Value::Object(_)) => 4,
        Some(Value::Array(_)) => 5,
        Some(Value::Bool(_)) => 6,
    }
}

/// Total order used when sorting cursors
///
/// Types order as missing < null < numbers < text < mappings < arrays <
/// booleans; values of the same type compare naturally.
pub fn compare_for_sort(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => {
                let x = x.as_f64().unwrap_or(f64::NAN);
                let y = y.as_f64().unwrap_or(f64::NAN);
                x.total_cmp(&y)
            }
        },
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Array(xs)), Some(Value::Array(ys))) => {
            for (x, y) in xs.iter().zip(ys) {
                let ord = compare_for_sort(Some(x), Some(y));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            xs.len().cmp(&ys.len())
        }
        (Some(Value::Object(xs)), Some(Value::Object(ys))) => {
            for ((kx, x), (ky, y)) in xs.iter().zip(ys) {
                let ord = kx.cmp(ky).then_with(|| compare_for_sort(Some(x), Some(y)));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            xs.len().cmp(&ys.len())
        }
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numbers_equal_across_representations() {
        assert!(values_equal(&json!(45000), &json!(45000.0)));
        assert!(!values_equal(&json!(45000), &json!(45001)));
        assert!(!values_equal(&json!(1), &json!("1")));
    }

    #[test]
    fn test_nested_equality() {
        let a = json!({"name": "Bread", "price": 8000});
        let b = json!({"price": 8000.0, "name": "Bread"});
        assert!(values_equal(&a, &b));
        assert!(values_equal(&json!([1, 2]), &json!([1.0, 2.0])));
        assert!(!values_equal(&json!([1, 2]), &json!([2, 1])));
    }

    #[test]
    fn test_text_form() {
        assert_eq!(text_form(None), "");
        assert_eq!(text_form(Some(&json!("Chocolate Cake"))), "Chocolate Cake");
        assert_eq!(text_form(Some(&json!(12000))), "12000");
        assert_eq!(text_form(Some(&json!(true))), "true");
    }

    #[test]
    fn test_sort_order_across_types() {
        let mut values = vec![
            Some(json!(true)),
            Some(json!("b")),
            None,
            Some(json!(3)),
            Some(json!(null)),
            Some(json!("a")),
            Some(json!(1.5)),
        ];
        values.sort_by(|a, b| compare_for_sort(a.as_ref(), b.as_ref()));

        assert_eq!(
            values,
            vec![
                None,
                Some(json!(null)),
                Some(json!(1.5)),
                Some(json!(3)),
                Some(json!("a")),
                Some(json!("b")),
                Some(json!(true)),
            ]
        );
    }

    #[test]
    fn test_document_from_non_object() {
        assert!(document(json!([1, 2, 3])).is_empty());
        assert_eq!(document(json!({"a": 1})).len(), 1);
    }
}
