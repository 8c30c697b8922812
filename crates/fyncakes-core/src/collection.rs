//! In-memory collections
//!
//! A `Collection` is an insertion-ordered list of schema-less records with
//! the call shape of a document-database client: `find` returns a lazy
//! [`Cursor`], mutations report affected counts, and "not found" is never
//! an error.
//!
//! ## Usage
//!
//! ```ignore
//! let mut cakes = Collection::new("cakes");
//! let id = cakes.insert_one(document(json!({"name": "Bread", "price": 8000}))).inserted_id;
//!
//! let page: Vec<Document> = cakes
//!     .find(&Query::all().eq("category", "Bread"))
//!     .sort("name", SortOrder::Ascending)
//!     .skip(8)
//!     .limit(8)
//!     .to_vec();
//! ```

use serde_json::{Number, Value};
use tracing::debug;

use crate::query::Query;
use crate::update::{add_numbers, UpdateSpec};
use crate::value::{compare_for_sort, values_equal, Document, FIELD_ID};

/// Prefix of generated identifiers
const ID_PREFIX: &str = "mock_";

/// Sort direction for cursors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    /// Convert a document-store direction (`1` / `-1`)
    pub fn from_direction(direction: i64) -> Self {
        if direction < 0 {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        }
    }
}

/// Result of an insert
#[derive(Debug, Clone, PartialEq)]
pub struct InsertOneResult {
    pub inserted_id: Value,
}

/// Result of an update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateResult {
    /// Records the query selected
    pub matched_count: usize,
    /// Records whose contents actually changed
    pub modified_count: usize,
}

/// Result of a delete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeleteResult {
    pub deleted_count: usize,
}

/// A lazy view over the records matching a query
///
/// Ordering, skip and limit are applied in that order. Every call to
/// [`Cursor::iter`] starts again from the beginning.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    documents: &'a [Document],
    query: Query,
    sort: Option<(String, SortOrder)>,
    skip: usize,
    limit: Option<usize>,
}

impl<'a> Cursor<'a> {
    fn new(documents: &'a [Document], query: Query) -> Self {
        Self {
            documents,
            query,
            sort: None,
            skip: 0,
            limit: None,
        }
    }

    /// Order results by a field
    pub fn sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some((field.into(), order));
        self
    }

    /// Skip the first `n` results
    pub fn skip(mut self, n: usize) -> Self {
        self.skip = n;
        self
    }

    /// Return at most `n` results; `0` means no limit
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = if n == 0 { None } else { Some(n) };
        self
    }

    /// Iterate over the matching records
    pub fn iter(&self) -> Box<dyn Iterator<Item = &'a Document> + '_> {
        let limit = self.limit.unwrap_or(usize::MAX);
        let matching = self
            .documents
            .iter()
            .filter(move |record| self.query.matches(record));

        match &self.sort {
            None => Box::new(matching.skip(self.skip).take(limit)),
            Some((field, order)) => {
                let mut sorted: Vec<&'a Document> = matching.collect();
                sorted.sort_by(|a, b| {
                    let ord = compare_for_sort(a.get(field), b.get(field));
                    match order {
                        SortOrder::Ascending => ord,
                        SortOrder::Descending => ord.reverse(),
                    }
                });
                Box::new(sorted.into_iter().skip(self.skip).take(limit))
            }
        }
    }

    /// First record of the result set
    pub fn first(&self) -> Option<&'a Document> {
        self.iter().next()
    }

    /// Number of records the cursor yields
    pub fn count(&self) -> usize {
        self.iter().count()
    }

    /// Clone the results into a vector
    pub fn to_vec(&self) -> Vec<Document> {
        self.iter().cloned().collect()
    }
}

/// An insertion-ordered set of records
#[derive(Debug, Clone)]
pub struct Collection {
    name: String,
    documents: Vec<Document>,
    next_id: u64,
}

impl Collection {
    /// Create an empty collection
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documents: Vec::new(),
            next_id: 1,
        }
    }

    /// Collection name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of records stored
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the collection holds no records
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// All records in insertion order
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    // ==================== Reads ====================

    /// Lazily find all records matching the query
    pub fn find(&self, query: &Query) -> Cursor<'_> {
        Cursor::new(&self.documents, query.clone())
    }

    /// First matching record in insertion order
    pub fn find_one(&self, query: &Query) -> Option<&Document> {
        self.documents.iter().find(|record| query.matches(record))
    }

    /// Count matching records
    pub fn count_documents(&self, query: &Query) -> usize {
        self.documents
            .iter()
            .filter(|record| query.matches(record))
            .count()
    }

    /// Unique values of a field across all records, in first-seen order
    pub fn distinct(&self, field: &str) -> Vec<Value> {
        let mut values: Vec<Value> = Vec::new();
        for value in self.documents.iter().filter_map(|record| record.get(field)) {
            if !values.iter().any(|seen| values_equal(seen, value)) {
                values.push(value.clone());
            }
        }
        values
    }

    /// Run an aggregation pipeline
    ///
    /// Only one shape is recognized: a single `$group` stage with a null
    /// `_id` and one `$sum` accumulator over a field path, e.g.
    /// `[{"$group": {"_id": null, "total_sales": {"$sum": "$total_amount"}}}]`.
    /// It yields one summary record. Every other pipeline yields nothing.
    pub fn aggregate(&self, pipeline: &[Document]) -> Vec<Document> {
        let Some((output, field)) = sum_group(pipeline) else {
            debug!(collection = %self.name, "Unsupported aggregation pipeline");
            return Vec::new();
        };

        let mut total = Number::from(0);
        for record in &self.documents {
            if let Some(Value::Number(amount)) = record.get(&field) {
                if let Some(sum) = add_numbers(&total, amount) {
                    total = sum;
                }
            }
        }

        let mut summary = Document::new();
        summary.insert(FIELD_ID.to_string(), Value::Null);
        summary.insert(output, Value::Number(total));
        vec![summary]
    }

    // ==================== Writes ====================

    /// Insert a record under a freshly assigned identifier
    ///
    /// Any identifier already present on the record is replaced.
    pub fn insert_one(&mut self, mut record: Document) -> InsertOneResult {
        let id = Value::String(format!("{}{}", ID_PREFIX, self.next_id));
        self.next_id += 1;

        record.insert(FIELD_ID.to_string(), id.clone());
        self.documents.push(record);
        debug!(collection = %self.name, id = %id, "Inserted record");

        InsertOneResult { inserted_id: id }
    }

    /// Insert several records, returning their identifiers in order
    pub fn insert_many(&mut self, records: impl IntoIterator<Item = Document>) -> Vec<Value> {
        records
            .into_iter()
            .map(|record| self.insert_one(record).inserted_id)
            .collect()
    }

    /// Apply an update to the first matching record
    pub fn update_one(&mut self, query: &Query, update: &UpdateSpec) -> UpdateResult {
        let result = match self.documents.iter_mut().find(|record| query.matches(record)) {
            Some(record) => UpdateResult {
                matched_count: 1,
                modified_count: usize::from(update.apply(record)),
            },
            None => UpdateResult::default(),
        };
        debug!(collection = %self.name, matched = result.matched_count, modified = result.modified_count, "update_one");
        result
    }

    /// Apply an update to every matching record
    pub fn update_many(&mut self, query: &Query, update: &UpdateSpec) -> UpdateResult {
        let mut result = UpdateResult::default();
        for record in self.documents.iter_mut().filter(|record| query.matches(record)) {
            result.matched_count += 1;
            if update.apply(record) {
                result.modified_count += 1;
            }
        }
        debug!(collection = %self.name, matched = result.matched_count, modified = result.modified_count, "update_many");
        result
    }

    /// Remove the first matching record
    pub fn delete_one(&mut self, query: &Query) -> DeleteResult {
        let deleted_count = match self.documents.iter().position(|record| query.matches(record)) {
            Some(index) => {
                self.documents.remove(index);
                1
            }
            None => 0,
        };
        debug!(collection = %self.name, deleted = deleted_count, "delete_one");
        DeleteResult { deleted_count }
    }

    /// Remove every matching record
    pub fn delete_many(&mut self, query: &Query) -> DeleteResult {
        let before = self.documents.len();
        self.documents.retain(|record| !query.matches(record));
        let deleted_count = before - self.documents.len();
        debug!(collection = %self.name, deleted = deleted_count, "delete_many");
        DeleteResult { deleted_count }
    }
}

/// Recognize `[{"$group": {"_id": null, <out>: {"$sum": "$<field>"}}}]`
fn sum_group(pipeline: &[Document]) -> Option<(String, String)> {
    let [stage] = pipeline else {
        return None;
    };
    if stage.len() != 1 {
        return None;
    }

    let group = stage.get("$group")?.as_object()?;
    if group.len() != 2 || !group.get(FIELD_ID)?.is_null() {
        return None;
    }

    let (output, accumulator) = group.iter().find(|(key, _)| key.as_str() != FIELD_ID)?;
    let accumulator = accumulator.as_object()?;
    if accumulator.len() != 1 {
        return None;
    }
    let field = accumulator.get("$sum")?.as_str()?.strip_prefix('$')?;

    Some((output.clone(), field.to_string()))
}
