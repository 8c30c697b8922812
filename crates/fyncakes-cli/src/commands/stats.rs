//! Store summary commands

use anyhow::{Context, Result};
use serde_json::Value;

use fyncakes_core::{catalog, shop};
use fyncakes_core::{Collection, Database};

use crate::output::Output;

/// Show total sales across all orders
pub fn sales(db: &Database, output: &Output) -> Result<()> {
    output.print_count("total_sales", &sales_total(db));
    Ok(())
}

/// List collections with record counts
pub fn collections(db: &Database, output: &Output) -> Result<()> {
    output.print_collections(&collection_counts(db));
    Ok(())
}

/// Show the admin dashboard figures
pub fn dashboard(db: &Database, output: &Output) -> Result<()> {
    let stats = shop::dashboard_stats(db).context("Failed to read customer records")?;
    output.print_dashboard(&stats);
    Ok(())
}

fn sales_total(db: &Database) -> Value {
    match db.collection("orders") {
        Some(orders) => catalog::total_sales(orders),
        None => catalog::total_sales(&Collection::new("orders")),
    }
}

fn collection_counts(db: &Database) -> Vec<(String, usize)> {
    db.collection_names()
        .into_iter()
        .map(|name| {
            let count = db.collection(name).map(Collection::len).unwrap_or(0);
            (name.to_string(), count)
        })
        .collect()
}
