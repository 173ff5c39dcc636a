use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::str::FromStr;

use crate::{types::*, AuditError, AuditResult};

pub const DATE_COLUMN: &str = "Date";
pub const TIME_COLUMN: &str = "Time";
pub const SIDE_COLUMN: &str = "Buy/Sell";
pub const TRADE_VALUE_COLUMN: &str = "Trade Value";
pub const SEGMENT_COLUMN: &str = "Segment";

/// Accepted `Date` layouts, tried in order.
///
/// Month-first wins for ambiguous numeric dates (`01/08/2025` is 8 January);
/// the day-first layouts only catch cells that cannot be month-first.
pub const DEFAULT_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%Y/%m/%d",
    "%d-%b-%Y",
    "%d %b %Y",
];

pub const TIME_FORMAT: &str = "%H:%M:%S";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One executed transaction as read from the trade log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Physical line in the source file, for diagnostics
    pub line: u64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    /// Raw side text; classified by the cashflow deriver
    pub side: String,
    pub trade_value: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerOptions {
    pub date_formats: Vec<String>,
}

impl Default for LedgerOptions {
    fn default() -> Self {
        Self {
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// The parsed trade log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    pub trades: Vec<TradeRecord>,
    pub has_segment_column: bool,
}

struct ColumnMap {
    date: usize,
    time: usize,
    side: usize,
    trade_value: usize,
    segment: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> AuditResult<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
        };
        let required = |name: &str| find(name).ok_or_else(|| AuditError::MissingColumn(name.into()));

        Ok(Self {
            date: required(DATE_COLUMN)?,
            time: required(TIME_COLUMN)?,
            side: required(SIDE_COLUMN)?,
            trade_value: required(TRADE_VALUE_COLUMN)?,
            segment: find(SEGMENT_COLUMN),
        })
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Read a comma-delimited trade log. Header names are trimmed before lookup.
///
/// A source without any header row yields an empty ledger; the degenerate
/// case is reported later by the metrics stage.
pub fn load_ledger<R: Read>(reader: R, options: &LedgerOptions) -> AuditResult<Ledger> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    if headers.iter().all(|h| h.trim().is_empty()) {
        tracing::debug!("trade log has no header row");
        return Ok(Ledger::default());
    }
    let columns = ColumnMap::from_headers(&headers)?;

    let mut trades = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        trades.push(parse_record(&record, line, &columns, options)?);
    }

    tracing::debug!(
        trades = trades.len(),
        segment_column = columns.segment.is_some(),
        "loaded trade log"
    );

    Ok(Ledger {
        trades,
        has_segment_column: columns.segment.is_some(),
    })
}

/// Parse a `Date` cell with the configured layouts. A trailing ` HH:MM:SS` is tolerated.
pub fn parse_trade_date(raw: &str, formats: &[String]) -> Option<NaiveDate> {
    let raw = raw.trim();
    formats.iter().find_map(|fmt| {
        NaiveDate::parse_from_str(raw, fmt).ok().or_else(|| {
            NaiveDateTime::parse_from_str(raw, &format!("{} {}", fmt, TIME_FORMAT))
                .ok()
                .map(|dt| dt.date())
        })
    })
}

pub fn parse_trade_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), TIME_FORMAT).ok()
}

/// Parse a non-negative monetary amount, plain or scientific notation.
pub fn parse_trade_value(raw: &str) -> Option<Money> {
    let raw = raw.trim();
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_record(
    record: &StringRecord,
    line: u64,
    columns: &ColumnMap,
    options: &LedgerOptions,
) -> AuditResult<TradeRecord> {
    let cell = |idx: usize| record.get(idx).unwrap_or("");
    let malformed = |field: &str, reason: String| AuditError::MalformedRow {
        line,
        field: field.into(),
        reason,
    };

    let raw_date = cell(columns.date);
    let date = parse_trade_date(raw_date, &options.date_formats)
        .ok_or_else(|| malformed(DATE_COLUMN, format!("cannot parse '{}' as a date", raw_date)))?;

    let raw_time = cell(columns.time);
    let time = parse_trade_time(raw_time).ok_or_else(|| {
        malformed(
            TIME_COLUMN,
            format!("cannot parse '{}' as HH:MM:SS", raw_time),
        )
    })?;

    let raw_value = cell(columns.trade_value);
    let trade_value = parse_trade_value(raw_value).ok_or_else(|| {
        malformed(
            TRADE_VALUE_COLUMN,
            format!("cannot parse '{}' as an amount", raw_value),
        )
    })?;
    if trade_value < Decimal::ZERO {
        return Err(malformed(
            TRADE_VALUE_COLUMN,
            format!("amount must be non-negative, got {}", trade_value),
        ));
    }

    let segment = columns
        .segment
        .map(|idx| cell(idx).trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Ok(TradeRecord {
        line,
        date,
        time,
        side: cell(columns.side).to_string(),
        trade_value,
        segment,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
