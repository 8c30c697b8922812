//! Store error handling
//!
//! Typed errors for the boundaries around the document store: building a
//! query, converting records into entities, and opening a database.
//! Evaluating a compiled query never fails; "not found" is reported as
//! `None` or a zero count rather than as an error.

use thiserror::Error;

/// Errors raised while compiling a query mapping
#[derive(Error, Debug)]
pub enum QueryError {
    /// `$regex` pattern failed to compile
    #[error("Invalid $regex pattern for field '{field}': {source}")]
    InvalidRegex {
        field: String,
        #[source]
        source: regex::Error,
    },

    /// Operator operand has the wrong type
    #[error("Invalid operand for {operator} on field '{field}': expected {expected}")]
    InvalidOperand {
        field: String,
        operator: &'static str,
        expected: &'static str,
    },
}

/// Errors raised while converting between records and typed entities
#[derive(Error, Debug)]
pub enum ModelError {
    /// Record does not have the shape expected for its collection
    #[error("Invalid {collection} record: {source}")]
    Invalid {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Record parsed but holds a value the entity does not allow
    #[error("Rejected {collection} record: {reason}")]
    Rejected {
        collection: &'static str,
        reason: String,
    },

    /// Entity did not serialize to a mapping
    #[error("{collection} entity did not serialize to a document")]
    NotADocument { collection: &'static str },
}

/// Shop requests the store refuses to record
#[derive(Error, Debug)]
pub enum ShopError {
    /// A required request field was absent or blank
    #[error("Missing {0}")]
    MissingField(&'static str),

    #[error("Invalid delivery date '{value}': expected YYYY-MM-DD")]
    InvalidDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// The account already holds a class registration
    #[error("{email} is already registered for the class")]
    AlreadyRegistered { email: String },

    /// Every four-digit order number is taken
    #[error("No order numbers left")]
    OrderNumbersExhausted,

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Errors raised by the store as a whole
#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Model(#[from] ModelError),

    /// A real database was required but none could be reached
    #[error("Database at '{uri}' is unavailable: {reason}")]
    Unavailable { uri: String, reason: String },
}

impl StoreError {
    /// Whether the caller passed bad input, as opposed to the store failing
    pub fn is_malformed_input(&self) -> bool {
        matches!(self, StoreError::Query(_) | StoreError::Model(_))
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StoreError::Unavailable { .. } => Some(
                "Unset FYNCAKES_MONGO_URI or FYNCAKES_REQUIRE_DATABASE to use the in-memory store.",
            ),
            StoreError::Query(QueryError::InvalidRegex { .. }) => {
                Some("Escape regex metacharacters in the search text.")
            }
            _ => None,
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_display() {
        let err = StoreError::Unavailable {
            uri: "mongodb://localhost:27017/fyncakes".to_string(),
            reason: "no driver".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("unavailable"));
        assert!(msg.contains("mongodb://localhost"));
        assert!(!err.is_malformed_input());
        assert!(err.recovery_suggestion().is_some());
    }

    #[test]
    fn test_query_error_is_malformed_input() {
        let source = regex::Regex::new("(").unwrap_err();
        let err: StoreError = QueryError::InvalidRegex {
            field: "name".to_string(),
            source,
        }
        .into();

        assert!(err.is_malformed_input());
        assert!(err.to_string().contains("'name'"));
    }

    #[test]
    fn test_shop_error_display() {
        let source = chrono::NaiveDate::parse_from_str("15/01/2024", "%Y-%m-%d").unwrap_err();
        let err = ShopError::InvalidDate {
            value: "15/01/2024".to_string(),
            source,
        };
        assert!(err.to_string().contains("'15/01/2024'"));

        let err = ShopError::MissingField("phone number");
        assert_eq!(err.to_string(), "Missing phone number");
    }

    #[test]
    fn test_invalid_operand_display() {
        let err = QueryError::InvalidOperand {
            field: "name".to_string(),
            operator: "$regex",
            expected: "a string",
        };
        assert_eq!(
            err.to_string(),
            "Invalid operand for $regex on field 'name': expected a string"
        );
    }
}
