use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::aggregate::{add_or_overflow, DailyRow};
use crate::{types::*, AuditError, AuditResult};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A notable trading day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayExtreme {
    pub date: NaiveDate,
    pub daily_cashflow: Money,
}

/// Scalar risk/return statistics over the daily series.
///
/// Every ratio whose denominator is zero is reported as `0`, never as an
/// error or an infinity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_trades: u32,
    pub trading_days: u32,
    /// Sum of every trade cashflow; equals the final cumulative profit
    pub net_profit: Money,
    /// Sum of winning-day cashflows
    pub gross_profit: Money,
    /// Absolute sum of losing-day cashflows
    pub gross_loss: Money,
    /// gross_profit / gross_loss; 0 when there are no losing days
    pub profit_factor: Rate,
    /// Winning days as a percentage of all trading days (0-100)
    pub daily_win_rate: Rate,
    pub avg_daily_win: Money,
    /// Reported as a magnitude (non-negative)
    pub avg_daily_loss: Money,
    /// avg_daily_win / avg_daily_loss; 0 when avg_daily_loss is 0
    pub risk_reward_ratio: Rate,
    /// Most negative drawdown (<= 0)
    pub max_drawdown: Money,
    pub winning_days: u32,
    pub losing_days: u32,
    pub breakeven_days: u32,
    pub best_day: DayExtreme,
    pub worst_day: DayExtreme,
    pub max_consecutive_winning_days: u32,
    pub max_consecutive_losing_days: u32,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `numerator / denominator`, or zero when the denominator is zero.
///
/// A quotient outside the Decimal range is an `Overflow`, not a panic.
pub fn ratio_or_zero(
    numerator: Decimal,
    denominator: Decimal,
    context: &str,
) -> AuditResult<Decimal> {
    if denominator.is_zero() {
        return Ok(Decimal::ZERO);
    }
    numerator
        .checked_div(denominator)
        .ok_or_else(|| AuditError::Overflow {
            context: context.into(),
        })
}

fn checked_sum(values: impl IntoIterator<Item = Decimal>, context: &str) -> AuditResult<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| add_or_overflow(acc, v, context))
}

fn mean_or_zero(values: &[Decimal], context: &str) -> AuditResult<Decimal> {
    let total = checked_sum(values.iter().copied(), context)?;
    ratio_or_zero(total, Decimal::from(values.len() as u64), context)
}

// ---------------------------------------------------------------------------
// Main function
// ---------------------------------------------------------------------------

/// Reduce the equity curve and raw trade count into the audit statistics.
pub fn calculate_metrics(daily: &[DailyRow], total_trades: u32) -> AuditResult<PerformanceMetrics> {
    let (first, _) = daily.split_first().ok_or_else(|| {
        AuditError::InsufficientData(
            "no trading days in the input; win rate and ratios are undefined".into(),
        )
    })?;

    let wins: Vec<Money> = daily
        .iter()
        .map(|d| d.daily_cashflow)
        .filter(|&c| c > Decimal::ZERO)
        .collect();
    let losses: Vec<Money> = daily
        .iter()
        .map(|d| d.daily_cashflow)
        .filter(|&c| c < Decimal::ZERO)
        .collect();

    let trading_days = daily.len() as u32;
    let winning_days = wins.len() as u32;
    let losing_days = losses.len() as u32;

    let net_profit = checked_sum(daily.iter().map(|d| d.daily_cashflow), "net profit")?;
    let gross_profit = checked_sum(wins.iter().copied(), "gross profit")?;
    let gross_loss = checked_sum(losses.iter().copied(), "gross loss")?.abs();

    // winning_days <= trading_days, so the scaled share stays within 0-100
    let daily_win_rate = ratio_or_zero(
        Decimal::from(winning_days),
        Decimal::from(trading_days),
        "daily win rate",
    )? * Decimal::ONE_HUNDRED;
    let avg_daily_win = mean_or_zero(&wins, "average daily win")?;
    let avg_daily_loss = mean_or_zero(&losses, "average daily loss")?.abs();

    let profit_factor = ratio_or_zero(gross_profit, gross_loss, "profit factor")?;
    let risk_reward_ratio = ratio_or_zero(avg_daily_win, avg_daily_loss, "risk/reward ratio")?;

    let max_drawdown = daily
        .iter()
        .map(|d| d.drawdown)
        .min()
        .unwrap_or(Decimal::ZERO);

    // -- Best / worst day (earliest date wins ties) --
    let mut best = first;
    let mut worst = first;
    for day in daily {
        if day.daily_cashflow > best.daily_cashflow {
            best = day;
        }
        if day.daily_cashflow < worst.daily_cashflow {
            worst = day;
        }
    }

    // -- Streaks (breakeven days reset both) --
    let mut max_consec_wins: u32 = 0;
    let mut max_consec_losses: u32 = 0;
    let mut cur_wins: u32 = 0;
    let mut cur_losses: u32 = 0;
    for day in daily {
        if day.daily_cashflow > Decimal::ZERO {
            cur_wins += 1;
            cur_losses = 0;
            max_consec_wins = max_consec_wins.max(cur_wins);
        } else if day.daily_cashflow < Decimal::ZERO {
            cur_losses += 1;
            cur_wins = 0;
            max_consec_losses = max_consec_losses.max(cur_losses);
        } else {
            cur_wins = 0;
            cur_losses = 0;
        }
    }

    Ok(PerformanceMetrics {
        total_trades,
        trading_days,
        net_profit,
        gross_profit,
        gross_loss,
        profit_factor,
        daily_win_rate,
        avg_daily_win,
        avg_daily_loss,
        risk_reward_ratio,
        max_drawdown,
        winning_days,
        losing_days,
        breakeven_days: trading_days - winning_days - losing_days,
        best_day: DayExtreme {
            date: best.date,
            daily_cashflow: best.daily_cashflow,
        },
        worst_day: DayExtreme {
            date: worst.date,
            daily_cashflow: worst.daily_cashflow,
        },
        max_consecutive_winning_days: max_consec_wins,
        max_consecutive_losing_days: max_consec_losses,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
