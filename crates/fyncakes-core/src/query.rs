//! Document query matcher
//!
//! Decides whether a record satisfies a query mapping, reproducing the
//! subset of document-database filter semantics the bakery app relies on:
//!
//! - `{field: literal}`: the field is present and equal to the literal
//! - `{"_id": id}`: exact identifier equality
//! - `{field: {"$ne": id}}` (or a top-level `"$ne"` key): the record's
//!   *identifier* differs from `id`, whichever field it is written under
//! - `{field: {"$regex": pattern, "$options": "i"}}`: regex search over the
//!   textual form of the field (empty string when absent)
//!
//! Conditions are ANDed. Operator mappings the matcher does not know fall
//! back to literal equality against the mapping itself.
//!
//! Queries are compiled once with [`Query::parse`]; evaluation never fails.

use regex::{Regex, RegexBuilder};
use serde_json::Value;

use crate::error::QueryError;
use crate::value::{text_form, values_equal, Document, FIELD_ID};

/// Operator keys understood by the matcher
mod ops {
    pub const NE: &str = "$ne";
    pub const REGEX: &str = "$regex";
    pub const OPTIONS: &str = "$options";
}

/// A single compiled field condition
#[derive(Debug, Clone)]
enum Condition {
    /// Identifier equals the operand
    IdEquals(Value),
    /// Identifier differs from the operand
    IdNotEquals(Value),
    /// Textual form of the field matches
    Regex { field: String, regex: Regex },
    /// Field is present and equal to the literal
    Equals { field: String, value: Value },
}

impl Condition {
    fn matches(&self, record: &Document) -> bool {
        match self {
            Condition::IdEquals(id) => record
                .get(FIELD_ID)
                .is_some_and(|actual| values_equal(actual, id)),
            Condition::IdNotEquals(id) => !record
                .get(FIELD_ID)
                .is_some_and(|actual| values_equal(actual, id)),
            Condition::Regex { field, regex } => regex.is_match(&text_form(record.get(field))),
            Condition::Equals { field, value } => record
                .get(field)
                .is_some_and(|actual| values_equal(actual, value)),
        }
    }
}

/// A compiled query
///
/// The empty query matches every record.
#[derive(Debug, Clone, Default)]
pub struct Query {
    conditions: Vec<Condition>,
}

impl Query {
    /// Query matching every record
    pub fn all() -> Self {
        Self::default()
    }

    /// Compile a query mapping
    ///
    /// Fails only when a `$regex` operand is not text or does not compile.
    pub fn parse(query: &Document) -> Result<Self, QueryError> {
        let mut conditions = Vec::with_capacity(query.len());
        for (field, value) in query {
            conditions.push(compile(field, value)?);
        }
        Ok(Self { conditions })
    }

    /// Add a literal equality condition
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        let field = field.into();
        let value = value.into();
        let condition = if field == FIELD_ID {
            Condition::IdEquals(value)
        } else {
            Condition::Equals { field, value }
        };
        self.conditions.push(condition);
        self
    }

    /// Exclude the record with the given identifier
    pub fn ne_id(mut self, id: impl Into<Value>) -> Self {
        self.conditions.push(Condition::IdNotEquals(id.into()));
        self
    }

    /// Add a regex condition on a field
    pub fn regex(
        mut self,
        field: impl Into<String>,
        pattern: &str,
        case_insensitive: bool,
    ) -> Result<Self, QueryError> {
        let field = field.into();
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(case_insensitive)
            .build()
            .map_err(|source| QueryError::InvalidRegex {
                field: field.clone(),
                source,
            })?;
        self.conditions.push(Condition::Regex { field, regex });
        Ok(self)
    }

    /// Case-insensitive "starts with" search on literal user text
    pub fn prefix(self, field: impl Into<String>, text: &str) -> Self {
        let pattern = format!("^{}", regex::escape(text));
        // An escaped literal behind an anchor always compiles
        match self.clone().regex(field, &pattern, true) {
            Ok(query) => query,
            Err(_) => self,
        }
    }

    /// Whether the query has no conditions
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Check a record against every condition
    pub fn matches(&self, record: &Document) -> bool {
        self.conditions.iter().all(|c| c.matches(record))
    }
}

impl TryFrom<&Document> for Query {
    type Error = QueryError;

    fn try_from(query: &Document) -> Result<Self, Self::Error> {
        Self::parse(query)
    }
}

/// Check whether `record` satisfies `query`
pub fn matches(record: &Document, query: &Query) -> bool {
    query.matches(record)
}

fn compile(field: &str, value: &Value) -> Result<Condition, QueryError> {
    if field == ops::NE {
        return Ok(Condition::IdNotEquals(value.clone()));
    }

    if let Value::Object(operators) = value {
        if let Some(operand) = operators.get(ops::NE) {
            return Ok(Condition::IdNotEquals(operand.clone()));
        }
    }

    if field == FIELD_ID {
        return Ok(Condition::IdEquals(value.clone()));
    }

    if let Value::Object(operators) = value {
        if let Some(pattern) = operators.get(ops::REGEX) {
            let pattern = pattern.as_str().ok_or_else(|| QueryError::InvalidOperand {
                field: field.to_string(),
                operator: ops::REGEX,
                expected: "a string",
            })?;
            let options = operators
                .get(ops::OPTIONS)
                .and_then(Value::as_str)
                .unwrap_or("");
            let regex = build_regex(pattern, options).map_err(|source| {
                QueryError::InvalidRegex {
                    field: field.to_string(),
                    source,
                }
            })?;
            return Ok(Condition::Regex {
                field: field.to_string(),
                regex,
            });
        }
    }

    Ok(Condition::Equals {
        field: field.to_string(),
        value: value.clone(),
    })
}

/// Build a regex honouring the `$options` letters `i`, `m`, `s` and `x`
fn build_regex(pattern: &str, options: &str) -> Result<Regex, regex::Error> {
    let mut builder = RegexBuilder::new(pattern);
    for flag in options.chars() {
        match flag {
            'i' => builder.case_insensitive(true),
            'm' => builder.multi_line(true),
            's' => builder.dot_matches_new_line(true),
            'x' => builder.ignore_whitespace(true),
            _ => &mut builder,
        };
    }
    builder.build()
}
