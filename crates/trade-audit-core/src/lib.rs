pub mod error;
pub mod types;

#[cfg(feature = "trading")]
pub mod trading;

#[cfg(feature = "report")]
pub mod report;

pub use error::AuditError;
pub use types::*;

/// Standard result type for all trade-audit operations
pub type AuditResult<T> = Result<T, AuditError>;
