//! Field-level update specifications
//!
//! Supports `$set`, `$unset` and `$inc`. Other top-level operators are
//! ignored, and the identifier field can never be rewritten.

use serde_json::{Number, Value};
use tracing::{debug, warn};

use crate::value::{values_equal, Document, FIELD_ID};

mod ops {
    pub const SET: &str = "$set";
    pub const UNSET: &str = "$unset";
    pub const INC: &str = "$inc";
}

/// A parsed update mapping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateSpec {
    set: Document,
    unset: Vec<String>,
    inc: Vec<(String, Number)>,
}

impl UpdateSpec {
    /// Parse an update mapping such as `{"$set": {"price": 999}}`
    pub fn parse(update: &Document) -> Self {
        let mut spec = Self::default();
        for (op, fields) in update {
            let Value::Object(fields) = fields else {
                debug!("Ignoring {} with non-mapping operand", op);
                continue;
            };
            match op.as_str() {
                ops::SET => {
                    for (field, value) in fields {
                        spec = spec.set(field.clone(), value.clone());
                    }
                }
                ops::UNSET => {
                    for field in fields.keys() {
                        spec = spec.unset(field.clone());
                    }
                }
                ops::INC => {
                    for (field, amount) in fields {
                        match amount {
                            Value::Number(n) => spec.inc.push((field.clone(), n.clone())),
                            _ => debug!("Ignoring non-numeric $inc for '{}'", field),
                        }
                    }
                }
                other => debug!("Ignoring unsupported update operator {}", other),
            }
        }
        spec
    }

    /// Merge a field into the record
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set.insert(field.into(), value.into());
        self
    }

    /// Remove a field from the record
    pub fn unset(mut self, field: impl Into<String>) -> Self {
        self.unset.push(field.into());
        self
    }

    /// Add to a numeric field (absent counts as zero)
    pub fn inc(mut self, field: impl Into<String>, amount: impl Into<Number>) -> Self {
        self.inc.push((field.into(), amount.into()));
        self
    }

    /// Whether the spec changes nothing
    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.unset.is_empty() && self.inc.is_empty()
    }

    /// Apply the update to a record, returning whether anything changed
    pub fn apply(&self, record: &mut Document) -> bool {
        let mut changed = false;

        for (field, value) in &self.set {
            if field == FIELD_ID {
                continue;
            }
            let same = record
                .get(field)
                .is_some_and(|current| values_equal(current, value));
            if !same {
                record.insert(field.clone(), value.clone());
                changed = true;
            }
        }

        for field in &self.unset {
            if field != FIELD_ID && record.remove(field).is_some() {
                changed = true;
            }
        }

        for (field, amount) in &self.inc {
            if field == FIELD_ID {
                continue;
            }
            let current = match record.get(field) {
                None => Number::from(0),
                Some(Value::Number(n)) => n.clone(),
                Some(_) => {
                    warn!("Cannot $inc non-numeric field '{}'", field);
                    continue;
                }
            };
            let Some(sum) = add_numbers(&current, amount) else {
                continue;
            };
            let sum = Value::Number(sum);
            if !record.get(field).is_some_and(|old| values_equal(old, &sum)) {
                record.insert(field.clone(), sum);
                changed = true;
            }
        }

        changed
    }
}

/// Add two numbers, staying integral when both are integers
pub(crate) fn add_numbers(a: &Number, b: &Number) -> Option<Number> {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        if let Some(sum) = x.checked_add(y) {
            return Some(Number::from(sum));
        }
    }
    Number::from_f64(a.as_f64()? + b.as_f64()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::document;
    use serde_json::json;

    #[test]
    fn test_parse_set() {
        let spec = UpdateSpec::parse(&document(json!({"$set": {"price": 999}})));
        assert_eq!(spec, UpdateSpec::default().set("price", 999));
    }

    #[test]
    fn test_set_merges_fields() {
        let mut record = document(json!({"_id": "mock_1", "name": "Bread", "price": 8000}));
        let spec = UpdateSpec::default().set("price", 9000).set("stock", 4);

        assert!(spec.apply(&mut record));
        assert_eq!(record["price"], json!(9000));
        assert_eq!(record["stock"], json!(4));
        assert_eq!(record["name"], json!("Bread"));
    }

    #[test]
    fn test_set_same_value_is_not_a_change() {
        let mut record = document(json!({"price": 8000}));
        assert!(!UpdateSpec::default().set("price", 8000).apply(&mut record));
    }

    #[test]
    fn test_identifier_is_immutable() {
        let mut record = document(json!({"_id": "mock_1"}));
        let spec = UpdateSpec::parse(&document(json!({
            "$set": {"_id": "other"},
            "$unset": {"_id": ""},
            "$inc": {"_id": 1}
        })));

        assert!(!spec.apply(&mut record));
        assert_eq!(record["_id"], json!("mock_1"));
    }

    #[test]
    fn test_unset_removes_fields() {
        let mut record = document(json!({"name": "Bread", "promo": true}));
        let spec = UpdateSpec::parse(&document(json!({"$unset": {"promo": ""}})));

        assert!(spec.apply(&mut record));
        assert!(!record.contains_key("promo"));
        assert!(!spec.apply(&mut record));
    }

    #[test]
    fn test_inc() {
        let mut record = document(json!({"points": 10}));
        assert!(UpdateSpec::default().inc("points", 5).apply(&mut record));
        assert_eq!(record["points"], json!(15));

        assert!(UpdateSpec::default().inc("visits", 1).apply(&mut record));
        assert_eq!(record["visits"], json!(1));

        let spec = UpdateSpec::parse(&document(json!({"$inc": {"points": 0.5}})));
        assert!(spec.apply(&mut record));
        assert_eq!(record["points"], json!(15.5));
    }

    #[test]
    fn test_inc_skips_non_numeric() {
        let mut record = document(json!({"points": "many"}));
        assert!(!UpdateSpec::default().inc("points", 1).apply(&mut record));
        assert_eq!(record["points"], json!("many"));
    }

    #[test]
    fn test_unknown_operators_ignored() {
        let spec = UpdateSpec::parse(&document(json!({"$push": {"tags": "new"}, "price": 1})));
        assert!(spec.is_empty());
    }
}
