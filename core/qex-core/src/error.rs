//! Error types for the QEX query executor.
//!
//! All public APIs return `QexResult<T>` — no panics in library code.
//! Running out of tuples is not an error: operators signal it with `Ok(None)`.

use thiserror::Error;

/// Unified error type for all QEX operations.
#[derive(Debug, Error)]
pub enum QexError {
    /// A single tuple cannot fit in one page (fatal for the write in progress)
    #[error("record too large: {size} bytes exceeds page capacity of {capacity} bytes")]
    RecordTooLarge { size: usize, capacity: usize },

    /// Comparing or combining incompatible value tags
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// Page contents inconsistent with page bounds or the record layout
    #[error("corrupt page: {0}")]
    CorruptPage(String),

    /// Standard I/O error
    #[error("io error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Schema definition or lookup error
    #[error("schema error: {0}")]
    Schema(String),

    /// Attribute name not present in the operator schema
    #[error("column '{0}' not found")]
    ColumnNotFound(String),

    /// Integer overflow or division by zero
    #[error("arithmetic overflow: {0}")]
    ArithmeticOverflow(String),

    /// Invalid executor configuration
    #[error("config error: {0}")]
    Config(String),
}

/// Result type alias for all QEX operations.
pub type QexResult<T> = Result<T, QexError>;

impl QexError {
    /// TypeMismatch 생성 헬퍼
    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        QexError::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

// From 구현들
impl From<serde_json::Error> for QexError {
    fn from(err: serde_json::Error) -> Self {
        QexError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_record_too_large() {
        let err = QexError::RecordTooLarge {
            size: 20000,
            capacity: 16380,
        };
        assert_eq!(
            err.to_string(),
            "record too large: 20000 bytes exceeds page capacity of 16380 bytes"
        );
    }

    #[test]
    fn error_display_type_mismatch() {
        let err = QexError::type_mismatch("Integer", "Text");
        assert_eq!(err.to_string(), "type mismatch: expected Integer, got Text");
    }

    #[test]
    fn error_display_corrupt_page() {
        let err = QexError::CorruptPage("tuple count 9999 overruns page".to_string());
        assert!(err.to_string().contains("corrupt page"));
        assert!(err.to_string().contains("9999"));
    }

    #[test]
    fn error_display_column_not_found() {
        let err = QexError::ColumnNotFound("Sailors.Z".to_string());
        assert_eq!(err.to_string(), "column 'Sailors.Z' not found");
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing run");
        let err: QexError = io.into();
        assert!(matches!(err, QexError::Io { .. }));
        assert!(err.to_string().contains("missing run"));
    }

    #[test]
    fn json_error_converts_to_config() {
        let err: QexError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, QexError::Config(_)));
    }

    #[test]
    fn qex_result_err() {
        let result: QexResult<i32> = Err(QexError::Schema("duplicate".to_string()));
        assert!(result.is_err());
    }
}
