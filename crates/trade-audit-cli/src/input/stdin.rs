use std::error::Error;
use std::io;

use trade_audit_core::trading::ledger::{self, Ledger, LedgerOptions};

/// Read a trade log piped on stdin.
pub fn read_ledger(options: &LedgerOptions) -> Result<Ledger, Box<dyn Error>> {
    let stdin = io::stdin();
    let ledger = ledger::load_ledger(stdin.lock(), options)?;
    tracing::debug!(trades = ledger.trades.len(), "read trade log from stdin");
    Ok(ledger)
}
