//! Storefront queries
//!
//! The handful of queries the shop pages issue against the store, kept in
//! one place so page handlers only pass user input through.

use serde_json::{json, Value};

use crate::collection::Collection;
use crate::query::Query;
use crate::value::{document, Document, FIELD_ID};

/// Categories shown in the catalog filter
pub const CATEGORIES: &[&str] = &[
    "Ready Cake",
    "Orange Cake",
    "Vanilla Cake",
    "Bread",
    "Cookies",
    "chocolate cakes",
    "Wedding Cake",
];

/// Cakes per catalog page
pub const CAKES_PER_PAGE: usize = 6;

/// Build the catalog listing query
///
/// Unknown categories are ignored rather than matching nothing. The search
/// text is matched literally as a case-insensitive prefix of the name.
pub fn catalog_query(category: Option<&str>, search: &str) -> Query {
    let mut query = Query::all();
    if let Some(category) = category.filter(|c| CATEGORIES.contains(c)) {
        query = query.eq("category", category);
    }
    let search = search.trim();
    if !search.is_empty() {
        query = query.prefix("name", search);
    }
    query
}

/// Records to skip for a 1-based page number
pub fn page_skip(page: usize) -> usize {
    (page.max(1) - 1).saturating_mul(CAKES_PER_PAGE)
}

/// Number of pages needed for `total` cakes
pub fn total_pages(total: usize) -> usize {
    total.div_ceil(CAKES_PER_PAGE)
}

/// Up to `n` other cakes, preferring the same category
pub fn related_cakes(cakes: &Collection, cake: &Document, n: usize) -> Vec<Document> {
    // limit(0) would mean unlimited
    if n == 0 {
        return Vec::new();
    }
    let id = cake.get(FIELD_ID).cloned().unwrap_or(Value::Null);

    let mut related = match cake.get("category") {
        Some(category) => cakes
            .find(&Query::all().eq("category", category.clone()).ne_id(id.clone()))
            .limit(n)
            .to_vec(),
        None => Vec::new(),
    };

    if related.len() < n {
        let more = cakes
            .find(&Query::all().ne_id(id))
            .iter()
            .filter(|other| !related.iter().any(|r| r.get(FIELD_ID) == other.get(FIELD_ID)))
            .take(n - related.len())
            .cloned()
            .collect::<Vec<_>>();
        related.extend(more);
    }

    related
}

/// Sum of `total_amount` across orders, zero when there are none
pub fn total_sales(orders: &Collection) -> Value {
    let pipeline = [document(json!({
        "$group": {"_id": null, "total_sales": {"$sum": "$total_amount"}}
    }))];

    orders
        .aggregate(&pipeline)
        .into_iter()
        .next()
        .and_then(|mut summary| summary.remove("total_sales"))
        .unwrap_or_else(|| Value::from(0))
}
