use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use trade_audit_core::trading::ledger::{self, Ledger, LedgerOptions};
use trade_audit_core::AuditError;

use super::stdin;

/// Read and parse a trade log. `-` reads from stdin.
pub fn read_ledger(path: &str, options: &LedgerOptions) -> Result<Ledger, Box<dyn Error>> {
    if path == "-" {
        return stdin::read_ledger(options);
    }

    let canonical = resolve_path(path)?;
    let file = File::open(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
    let ledger = ledger::load_ledger(BufReader::new(file), options)?;
    tracing::debug!(path = %canonical.display(), trades = ledger.trades.len(), "read trade log");
    Ok(ledger)
}

/// Resolve the path against the working directory. A missing file is reported
/// as `AuditError::MissingInput` so callers can exit gracefully.
fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn Error>> {
    let p = Path::new(path);
    let canonical = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !canonical.exists() {
        return Err(Box::new(AuditError::MissingInput {
            path: canonical.display().to_string(),
        }));
    }

    if !canonical.is_file() {
        return Err(format!("Not a file: {}", canonical.display()).into());
    }

    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("trade-audit-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_missing_file_is_missing_input() {
        let path = temp_path("does-not-exist.csv");
        let err = read_ledger(path.to_str().unwrap(), &LedgerOptions::default()).unwrap_err();
        let audit_err = err.downcast_ref::<AuditError>().expect("typed error");
        assert!(matches!(audit_err, AuditError::MissingInput { .. }));
        assert!(audit_err.is_graceful());
    }

    #[test]
    fn test_directory_is_rejected() {
        let dir = std::env::temp_dir();
        let err = read_ledger(dir.to_str().unwrap(), &LedgerOptions::default()).unwrap_err();
        assert!(err.to_string().starts_with("Not a file"));
    }

    #[test]
    fn test_reads_file() {
        let path = temp_path("ledger.csv");
        fs::write(
            &path,
            "Date,Time,Buy/Sell,Trade Value\n2025-08-01,09:15:00,BUY,10\n",
        )
        .unwrap();
        let ledger = read_ledger(path.to_str().unwrap(), &LedgerOptions::default()).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(ledger.trades.len(), 1);
    }

    #[test]
    fn test_malformed_row_surfaces_typed_error() {
        let path = temp_path("malformed.csv");
        fs::write(
            &path,
            "Date,Time,Buy/Sell,Trade Value\n2025-08-01,25:99:00,BUY,10\n",
        )
        .unwrap();
        let err = read_ledger(path.to_str().unwrap(), &LedgerOptions::default()).unwrap_err();
        fs::remove_file(&path).unwrap();
        assert!(matches!(
            err.downcast_ref::<AuditError>(),
            Some(AuditError::MalformedRow { line: 2, .. })
        ));
    }
}
