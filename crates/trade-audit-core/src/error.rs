use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Input not found: {path}")]
    MissingInput { path: String },

    #[error("Missing column: '{0}' is required in the trade log header")]
    MissingColumn(String),

    #[error("Malformed row at line {line}: {field}: {reason}")]
    MalformedRow {
        line: u64,
        field: String,
        reason: String,
    },

    #[error("Malformed row at line {line}: unrecognised side '{value}' (expected BUY or SELL)")]
    UnknownSide { line: u64, value: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Arithmetic overflow in {context}")]
    Overflow { context: String },

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl AuditError {
    /// Conditions that end a run without output but are not failures of the tool.
    pub fn is_graceful(&self) -> bool {
        matches!(
            self,
            AuditError::MissingInput { .. } | AuditError::InsufficientData(_)
        )
    }
}

impl From<csv::Error> for AuditError {
    fn from(e: csv::Error) -> Self {
        AuditError::Csv(e.to_string())
    }
}

impl From<std::io::Error> for AuditError {
    fn from(e: std::io::Error) -> Self {
        AuditError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for AuditError {
    fn from(e: serde_json::Error) -> Self {
        AuditError::SerializationError(e.to_string())
    }
}
