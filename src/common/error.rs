//! Error types for the index.

use thiserror::Error;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors raised by the index and its ingestion glue.
///
/// A missing key is deliberately absent from this list: `search` reports
/// absence as `None`, since looking up an unknown identifier is routine.
#[derive(Debug, Error)]
pub enum Error {
    /// Node capacity too small for a split to leave a key on both sides.
    ///
    /// Raised at construction time only.
    #[error("invalid configuration: capacity {capacity} is below the minimum of {minimum}")]
    InvalidConfiguration { capacity: usize, minimum: usize },

    /// An internal invariant does not hold.
    ///
    /// This indicates a bug in the tree itself, not caller misuse.
    #[error("corrupted tree: {0}")]
    CorruptedTree(String),

    /// I/O error while reading input or writing a dump.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input file is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Input file is not valid CSV.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A record has no value for the identifier field.
    #[error("record has no `{field}` field")]
    MissingKey { field: String },

    /// The identifier field holds something that is not an integer.
    #[error("field `{field}` is not an integer identifier: {value}")]
    InvalidKey { field: String, value: String },

    /// Input is well-formed JSON but not shaped like a table of records.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// Bad command-line argument or environment variable.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidConfiguration {
            capacity: 2,
            minimum: 3,
        };
        assert_eq!(
            format!("{}", err),
            "invalid configuration: capacity 2 is below the minimum of 3"
        );

        let err = Error::MissingKey {
            field: "VAERS_ID".into(),
        };
        assert_eq!(format!("{}", err), "record has no `VAERS_ID` field");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();

        match err {
            Error::Io(_) => {} // Success
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_result_type_alias() {
        fn might_fail() -> Result<u32> {
            Err(Error::CorruptedTree("leaf depths differ".into()))
        }

        assert!(matches!(might_fail(), Err(Error::CorruptedTree(_))));
    }
}
