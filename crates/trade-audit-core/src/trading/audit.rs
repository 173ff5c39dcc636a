use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::aggregate::{aggregate_daily, aggregate_hourly, build_equity_curve, DailyRow, HourlyRow};
use super::cashflow::derive_cashflows;
use super::ledger::{Ledger, TradeRecord};
use super::metrics::{calculate_metrics, PerformanceMetrics};
use crate::{types::*, AuditResult};

/// Segment label used when the trade log carries no segment information.
pub const DEFAULT_SEGMENT_LABEL: &str = "Equity & F&O (Options) [Derived]";

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditInput {
    /// Name of the data source, echoed in reports
    pub source_name: String,
    pub trades: Vec<TradeRecord>,
    pub has_segment_column: bool,
    /// Overrides `DEFAULT_SEGMENT_LABEL`
    pub segment_fallback: Option<String>,
}

impl AuditInput {
    pub fn from_ledger(source_name: impl Into<String>, ledger: Ledger) -> Self {
        Self {
            source_name: source_name.into(),
            trades: ledger.trades,
            has_segment_column: ledger.has_segment_column,
            segment_fallback: None,
        }
    }
}

/// Scalar audit record consumed by the text report, console and chart annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditSummary {
    pub source_name: String,
    pub total_trades: u32,
    pub segments: Vec<String>,
    pub metrics: PerformanceMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditOutput {
    pub summary: AuditSummary,
    /// Equity curve, ascending by date
    pub daily: Vec<DailyRow>,
    /// Intraday efficiency, ascending by hour
    pub hourly: Vec<HourlyRow>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run the full audit: cashflows, daily and hourly series, equity curve and metrics.
pub fn run_trade_audit(input: &AuditInput) -> AuditResult<ComputationOutput<AuditOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let flows = derive_cashflows(&input.trades)?;
    let daily = build_equity_curve(&aggregate_daily(&flows)?)?;
    let hourly = aggregate_hourly(&flows)?;

    let total_trades = input.trades.len() as u32;
    let metrics = calculate_metrics(&daily, total_trades)?;

    let mut segments = distinct_segments(&input.trades);
    if segments.is_empty() {
        let fallback = input
            .segment_fallback
            .clone()
            .unwrap_or_else(|| DEFAULT_SEGMENT_LABEL.to_string());
        let reason = if input.has_segment_column {
            "Segment column is empty"
        } else {
            "No Segment column"
        };
        tracing::warn!(label = %fallback, "{}; using fallback segment label", reason);
        warnings.push(format!("{}; segments reported as '{}'", reason, fallback));
        segments.push(fallback);
    }

    if metrics.trading_days == 1 {
        warnings.push("Single trading day: drawdown is trivially zero".into());
    }

    tracing::info!(
        source = %input.source_name,
        trades = total_trades,
        days = daily.len(),
        net_profit = %metrics.net_profit,
        "trade audit complete"
    );

    let output = AuditOutput {
        summary: AuditSummary {
            source_name: input.source_name.clone(),
            total_trades,
            segments,
            metrics,
        },
        daily,
        hourly,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Trade Log Audit: Daily Cashflow Equity Curve and Risk/Return Metrics",
        &serde_json::json!({
            "source": input.source_name,
            "cashflow_sign": "SELL = +trade value, BUY = -trade value",
            "grouping": "calendar date (observed dates only), hour of day",
            "zero_denominator_policy": "ratios with a zero denominator are reported as 0",
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Distinct non-empty segment labels in first-seen order.
pub fn distinct_segments(trades: &[TradeRecord]) -> Vec<String> {
    let mut segments: Vec<String> = Vec::new();
    for segment in trades.iter().filter_map(|t| t.segment.as_deref()) {
        if !segments.iter().any(|s| s == segment) {
            segments.push(segment.to_string());
        }
    }
    segments
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
