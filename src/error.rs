use thiserror::Error;

/// Core error type for codec and dataset operations.
///
/// Every variant is terminal for the operation that raised it; retries, if
/// any, belong to the storage collaborator, not the codec.
#[derive(Error, Debug)]
pub enum ParquetError {
    /// A column's logical type has no codec
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// Categorical columns are not accepted by the accelerated writer path;
    /// decode them to a primitive type first
    #[error("'categorical' columns are not supported by the accelerated parquet writer: {0}")]
    UnsupportedCategoricalType(String),

    /// A projected column name is not present in the file schema
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    /// Schemas that were required to match do not, or a row-group range
    /// exceeds what the footer describes
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// The file footer could not be parsed or describes an unreadable schema
    #[error("corrupt footer: {0}")]
    CorruptFooter(String),

    /// A column chunk could not be decoded
    #[error("corrupt chunk: {0}")]
    CorruptChunk(String),

    /// IO errors from the underlying byte stream
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Dropping the partition columns left nothing to write
    #[error("no data left to save outside partition columns")]
    NoDataColumns,
}

/// Result type alias for codec and dataset operations.
pub type Result<T> = std::result::Result<T, ParquetError>;

impl ParquetError {
    /// Create a new unsupported-type error
    pub fn unsupported_type<S: Into<String>>(msg: S) -> Self {
        ParquetError::UnsupportedType(msg.into())
    }

    /// Create a new schema-mismatch error
    pub fn schema_mismatch<S: Into<String>>(msg: S) -> Self {
        ParquetError::SchemaMismatch(msg.into())
    }

    /// Create a new corrupt-footer error
    pub fn corrupt_footer<S: Into<String>>(msg: S) -> Self {
        ParquetError::CorruptFooter(msg.into())
    }

    /// Create a new corrupt-chunk error
    pub fn corrupt_chunk<S: Into<String>>(msg: S) -> Self {
        ParquetError::CorruptChunk(msg.into())
    }

    /// Wrap a library error from the write path as an IO failure
    pub fn io_other<E: std::fmt::Display>(err: E) -> Self {
        ParquetError::Io(std::io::Error::other(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ParquetError::UnknownColumn("price".to_string());
        assert_eq!(err.to_string(), "unknown column: price");

        let err = ParquetError::schema_mismatch("expected 3 columns, got 2");
        assert_eq!(err.to_string(), "schema mismatch: expected 3 columns, got 2");

        let err = ParquetError::NoDataColumns;
        assert!(err.to_string().contains("partition columns"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ParquetError = io_err.into();
        assert!(err.to_string().contains("IO error"));
    }
}
