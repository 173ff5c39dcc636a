use chrono::{NaiveDate, Timelike};
use serde::{Deserialize, Serialize};

use super::ledger::TradeRecord;
use crate::{types::*, AuditError, AuditResult};

/// Direction of an execution. Sell proceeds flow in, buy capital flows out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Classify a raw side cell, ignoring surrounding whitespace and case.
    pub fn classify(raw: &str) -> Option<Side> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("SELL") {
            Some(Side::Sell)
        } else if raw.eq_ignore_ascii_case("BUY") {
            Some(Side::Buy)
        } else {
            None
        }
    }

    pub fn signed(self, amount: Money) -> Money {
        match self {
            Side::Sell => amount,
            Side::Buy => -amount,
        }
    }
}

/// Signed cashflow of one trade, keyed for daily and hourly grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeCashflow {
    pub line: u64,
    pub date: NaiveDate,
    /// Hour of day, 0-23
    pub hour: u32,
    pub cashflow: Money,
}

pub fn derive_cashflow(trade: &TradeRecord) -> AuditResult<Money> {
    Side::classify(&trade.side)
        .map(|side| side.signed(trade.trade_value))
        .ok_or_else(|| AuditError::UnknownSide {
            line: trade.line,
            value: trade.side.trim().to_string(),
        })
}

/// Derive cashflows for the full trade sequence, stopping at the first
/// unclassifiable row.
pub fn derive_cashflows(trades: &[TradeRecord]) -> AuditResult<Vec<TradeCashflow>> {
    trades
        .iter()
        .map(|trade| {
            Ok(TradeCashflow {
                line: trade.line,
                date: trade.date,
                hour: trade.time.hour(),
                cashflow: derive_cashflow(trade)?,
            })
        })
        .collect()
}
