//! Query command handlers

use anyhow::{bail, Context, Result};
use serde_json::Value;

use fyncakes_core::{Collection, Database, Document, Query, SortOrder};

use crate::output::Output;

/// Options for the find command
#[derive(Debug, Default)]
pub struct FindOptions {
    pub filter: Option<String>,
    pub sort: Option<String>,
    pub descending: bool,
    pub skip: usize,
    pub limit: usize,
}

/// List records in a collection
pub fn find(db: &Database, name: &str, options: &FindOptions, output: &Output) -> Result<()> {
    let documents = with_collection(db, name, |collection| run_find(collection, options))?;
    output.print_documents(&documents);
    Ok(())
}

/// Count records in a collection
pub fn count(db: &Database, name: &str, filter: Option<&str>, output: &Output) -> Result<()> {
    let query = parse_filter(filter)?;
    let count = with_collection(db, name, |collection| collection.count_documents(&query));
    output.print_count("count", &Value::from(count));
    Ok(())
}

/// List distinct values of a field
pub fn distinct(db: &Database, name: &str, field: &str, output: &Output) -> Result<()> {
    let values = with_collection(db, name, |collection| collection.distinct(field));
    output.print_values(&values);
    Ok(())
}

/// Run a find against one collection
pub fn run_find(collection: &Collection, options: &FindOptions) -> Result<Vec<Document>> {
    let query = parse_filter(options.filter.as_deref())?;

    let mut cursor = collection
        .find(&query)
        .skip(options.skip)
        .limit(options.limit);
    if let Some(field) = &options.sort {
        let order = if options.descending {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        };
        cursor = cursor.sort(field.clone(), order);
    }

    Ok(cursor.to_vec())
}

/// Parse a JSON query document, no filter matching everything
pub fn parse_filter(filter: Option<&str>) -> Result<Query> {
    let Some(text) = filter.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(Query::all());
    };

    let value: Value = serde_json::from_str(text).context("Filter is not valid JSON")?;
    let Value::Object(query) = value else {
        bail!("Filter must be a JSON object, got: {}", text);
    };

    Query::parse(&query).context("Invalid filter")
}

/// Run `f` against a collection, an unknown name reading as empty
fn with_collection<R>(db: &Database, name: &str, f: impl FnOnce(&Collection) -> R) -> R {
    match db.collection(name) {
        Some(collection) => f(collection),
        None => f(&Collection::new(name)),
    }
}
