//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use fyncakes_core::shop::DashboardStats;
use fyncakes_core::{Document, FIELD_ID};
use serde_json::Value;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print a list of records
    pub fn print_documents(&self, documents: &[Document]) {
        match self.format {
            OutputFormat::Human => {
                if documents.is_empty() {
                    println!("No records found.");
                    return;
                }
                for doc in documents {
                    println!("{:<10} | {}", id_of(doc), truncate(&summarize(doc), 90));
                }
                println!("\n{} record(s)", documents.len());
            }
            OutputFormat::Json => {
                println!("{}", pretty(&Value::from(documents.to_vec())));
            }
            OutputFormat::Quiet => {
                for doc in documents {
                    println!("{}", id_of(doc));
                }
            }
        }
    }

    /// Print a labelled number
    pub fn print_count(&self, label: &str, count: &Value) {
        match self.format {
            OutputFormat::Human => println!("{}: {}", label, count),
            OutputFormat::Json => println!("{}", serde_json::json!({ label: count })),
            OutputFormat::Quiet => println!("{}", count),
        }
    }

    /// Print a list of distinct values
    pub fn print_values(&self, values: &[Value]) {
        match self.format {
            OutputFormat::Human => {
                if values.is_empty() {
                    println!("No values found.");
                    return;
                }
                for value in values {
                    println!("{}", display_value(value));
                }
                println!("\n{} value(s)", values.len());
            }
            OutputFormat::Json => println!("{}", pretty(&Value::from(values.to_vec()))),
            OutputFormat::Quiet => {
                for value in values {
                    println!("{}", display_value(value));
                }
            }
        }
    }

    /// Print collection names with record counts
    pub fn print_collections(&self, collections: &[(String, usize)]) {
        match self.format {
            OutputFormat::Human => {
                if collections.is_empty() {
                    println!("No collections.");
                    return;
                }
                for (name, count) in collections {
                    println!("{} ({})", name, count);
                }
                println!("\n{} collection(s)", collections.len());
            }
            OutputFormat::Json => {
                let json: Vec<_> = collections
                    .iter()
                    .map(|(name, count)| serde_json::json!({"name": name, "count": count}))
                    .collect();
                println!("{}", pretty(&Value::from(json)));
            }
            OutputFormat::Quiet => {
                for (name, _) in collections {
                    println!("{}", name);
                }
            }
        }
    }

    /// Print the admin dashboard figures
    pub fn print_dashboard(&self, stats: &DashboardStats) {
        match self.format {
            OutputFormat::Human => {
                println!("Total sales:     {}", stats.total_sales);
                println!("Total orders:    {}", stats.total_orders);
                println!("Total customers: {}", stats.total_customers);
                if !stats.recent_customers.is_empty() {
                    println!();
                    println!("Recent customers:");
                    for customer in &stats.recent_customers {
                        let marker = if customer.is_student { " (student)" } else { "" };
                        println!("  {}{}", customer.user.email, marker);
                    }
                }
            }
            OutputFormat::Json => {
                let customers: Vec<_> = stats
                    .recent_customers
                    .iter()
                    .map(|c| serde_json::json!({"email": c.user.email, "is_student": c.is_student}))
                    .collect();
                println!(
                    "{}",
                    pretty(&serde_json::json!({
                        "total_sales": stats.total_sales,
                        "total_orders": stats.total_orders,
                        "total_customers": stats.total_customers,
                        "recent_customers": customers,
                    }))
                );
            }
            OutputFormat::Quiet => println!("{}", stats.total_sales),
        }
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Identifier of a record, or `-` when it has none
fn id_of(doc: &Document) -> String {
    doc.get(FIELD_ID).map(display_value).unwrap_or_else(|| "-".to_string())
}

/// Text without JSON quotes, other values as compact JSON
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One-line `key=value` summary of a record's fields
fn summarize(doc: &Document) -> String {
    doc.iter()
        .filter(|(key, _)| key.as_str() != FIELD_ID)
        .map(|(key, value)| format!("{}={}", key, display_value(value)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
