use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::cashflow::TradeCashflow;
use crate::{types::*, AuditError, AuditResult};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Net cashflow of one observed trading date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyCashflow {
    pub date: NaiveDate,
    pub daily_cashflow: Money,
    pub num_trades: u32,
}

/// One point of the equity curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRow {
    pub date: NaiveDate,
    pub daily_cashflow: Money,
    pub num_trades: u32,
    pub cumulative_profit: Money,
    /// Highest cumulative profit seen so far; never decreases
    pub running_peak: Money,
    /// cumulative_profit - running_peak; always <= 0
    pub drawdown: Money,
}

/// Net cashflow of one hour of the trading day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyRow {
    /// 0-23
    pub hour: u32,
    pub hourly_cashflow: Money,
    pub num_trades: u32,
}

// ---------------------------------------------------------------------------
// Checked arithmetic
// ---------------------------------------------------------------------------

/// `a + b`, or `Overflow` naming `context` when the sum leaves the Decimal range.
pub(crate) fn add_or_overflow(a: Money, b: Money, context: &str) -> AuditResult<Money> {
    a.checked_add(b).ok_or_else(|| AuditError::Overflow {
        context: context.into(),
    })
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Sum cashflows per calendar date, ascending. Only observed dates appear.
pub fn aggregate_daily(flows: &[TradeCashflow]) -> AuditResult<Vec<DailyCashflow>> {
    let mut by_date: BTreeMap<NaiveDate, (Money, u32)> = BTreeMap::new();
    for flow in flows {
        let entry = by_date.entry(flow.date).or_insert((Decimal::ZERO, 0));
        entry.0 = add_or_overflow(entry.0, flow.cashflow, "daily cashflow")?;
        entry.1 += 1;
    }

    tracing::debug!(days = by_date.len(), "aggregated daily cashflows");

    Ok(by_date
        .into_iter()
        .map(|(date, (daily_cashflow, num_trades))| DailyCashflow {
            date,
            daily_cashflow,
            num_trades,
        })
        .collect())
}

/// Sum cashflows per hour of day, ascending by hour.
pub fn aggregate_hourly(flows: &[TradeCashflow]) -> AuditResult<Vec<HourlyRow>> {
    let mut by_hour: BTreeMap<u32, (Money, u32)> = BTreeMap::new();
    for flow in flows {
        let entry = by_hour.entry(flow.hour).or_insert((Decimal::ZERO, 0));
        entry.0 = add_or_overflow(entry.0, flow.cashflow, "hourly cashflow")?;
        entry.1 += 1;
    }

    Ok(by_hour
        .into_iter()
        .map(|(hour, (hourly_cashflow, num_trades))| HourlyRow {
            hour,
            hourly_cashflow,
            num_trades,
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Equity curve + drawdown
// ---------------------------------------------------------------------------

/// Single forward scan over date-ordered daily cashflows.
pub fn build_equity_curve(days: &[DailyCashflow]) -> AuditResult<Vec<DailyRow>> {
    let mut curve = Vec::with_capacity(days.len());
    let mut cumulative_profit = Decimal::ZERO;
    let mut running_peak: Option<Money> = None;

    for day in days {
        cumulative_profit =
            add_or_overflow(cumulative_profit, day.daily_cashflow, "cumulative profit")?;
        let peak = match running_peak {
            Some(p) if p >= cumulative_profit => p,
            _ => cumulative_profit,
        };
        running_peak = Some(peak);
        let drawdown = cumulative_profit
            .checked_sub(peak)
            .ok_or_else(|| AuditError::Overflow {
                context: "drawdown".into(),
            })?;

        curve.push(DailyRow {
            date: day.date,
            daily_cashflow: day.daily_cashflow,
            num_trades: day.num_trades,
            cumulative_profit,
            running_peak: peak,
            drawdown,
        });
    }

    Ok(curve)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn flow(date: NaiveDate, hour: u32, cashflow: Money) -> TradeCashflow {
        TradeCashflow {
            line: 0,
            date,
            hour,
            cashflow,
        }
    }

    fn day(date: NaiveDate, daily_cashflow: Money) -> DailyCashflow {
        DailyCashflow {
            date,
            daily_cashflow,
            num_trades: 1,
        }
    }

    #[test]
    fn test_daily_groups_and_sorts() {
        let flows = vec![
            flow(date(2025, 8, 5), 10, dec!(200)),
            flow(date(2025, 8, 1), 9, dec!(-1000)),
            flow(date(2025, 8, 1), 14, dec!(1500)),
        ];
        let daily = aggregate_daily(&flows).unwrap();

        assert_eq!(
            daily,
            vec![
                DailyCashflow {
                    date: date(2025, 8, 1),
                    daily_cashflow: dec!(500),
                    num_trades: 2,
                },
                DailyCashflow {
                    date: date(2025, 8, 5),
                    daily_cashflow: dec!(200),
                    num_trades: 1,
                },
            ]
        );
    }

    #[test]
    fn test_daily_does_not_fill_gaps() {
        let flows = vec![
            flow(date(2025, 8, 1), 9, dec!(1)),
            flow(date(2025, 8, 31), 9, dec!(1)),
        ];
        assert_eq!(aggregate_daily(&flows).unwrap().len(), 2);
    }

    #[test]
    fn test_hourly_groups_by_hour() {
        let flows = vec![
            flow(date(2025, 8, 1), 15, dec!(-300)),
            flow(date(2025, 8, 1), 9, dec!(100)),
            flow(date(2025, 8, 2), 9, dec!(50)),
        ];
        let hourly = aggregate_hourly(&flows).unwrap();

        assert_eq!(hourly.len(), 2);
        assert_eq!(hourly[0].hour, 9);
        assert_eq!(hourly[0].hourly_cashflow, dec!(150));
        assert_eq!(hourly[0].num_trades, 2);
        assert_eq!(hourly[1].hour, 15);
        assert_eq!(hourly[1].hourly_cashflow, dec!(-300));
    }

    #[test]
    fn test_equity_curve_scan() {
        // +1000, -400 => cumulative 1000, 600; peak 1000, 1000; dd 0, -400
        let curve = build_equity_curve(&[
            day(date(2025, 8, 1), dec!(1000)),
            day(date(2025, 8, 2), dec!(-400)),
        ])
        .unwrap();

        assert_eq!(curve[0].cumulative_profit, dec!(1000));
        assert_eq!(curve[1].cumulative_profit, dec!(600));
        assert_eq!(curve[0].running_peak, dec!(1000));
        assert_eq!(curve[1].running_peak, dec!(1000));
        assert_eq!(curve[0].drawdown, Decimal::ZERO);
        assert_eq!(curve[1].drawdown, dec!(-400));
    }

    #[test]
    fn test_peak_seeded_by_first_day_even_if_negative() {
        // First day loses: peak starts at -200, not at zero
        let curve = build_equity_curve(&[
            day(date(2025, 8, 1), dec!(-200)),
            day(date(2025, 8, 2), dec!(-100)),
            day(date(2025, 8, 3), dec!(500)),
        ])
        .unwrap();

        assert_eq!(curve[0].running_peak, dec!(-200));
        assert_eq!(curve[0].drawdown, Decimal::ZERO);
        assert_eq!(curve[1].drawdown, dec!(-100));
        assert_eq!(curve[2].running_peak, dec!(200));
        assert_eq!(curve[2].drawdown, Decimal::ZERO);
    }

    #[test]
    fn test_peak_monotonic_and_drawdown_non_positive() {
        let pnls = [
            dec!(500),
            dec!(-800),
            dec!(200),
            dec!(-300),
            dec!(600),
            dec!(0),
            dec!(-50),
        ];
        let days: Vec<DailyCashflow> = pnls
            .iter()
            .enumerate()
            .map(|(i, p)| day(date(2025, 9, (i + 1) as u32), *p))
            .collect();
        let curve = build_equity_curve(&days).unwrap();

        for pair in curve.windows(2) {
            assert!(pair[1].running_peak >= pair[0].running_peak);
        }
        for row in &curve {
            assert!(row.drawdown <= Decimal::ZERO);
            assert_eq!(row.drawdown, row.cumulative_profit - row.running_peak);
        }
    }

    #[test]
    fn test_empty_inputs() {
        assert!(aggregate_daily(&[]).unwrap().is_empty());
        assert!(aggregate_hourly(&[]).unwrap().is_empty());
        assert!(build_equity_curve(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_daily_sum_out_of_range_is_overflow() {
        let huge = Decimal::MAX - dec!(1);
        let flows = vec![
            flow(date(2025, 8, 1), 9, huge),
            flow(date(2025, 8, 1), 10, huge),
        ];

        let err = aggregate_daily(&flows).unwrap_err();
        assert!(matches!(err, AuditError::Overflow { ref context } if context == "daily cashflow"));
    }

    #[test]
    fn test_hourly_sum_out_of_range_is_overflow() {
        // Separate days keep each daily total in range; the shared hour does not
        let huge = Decimal::MAX - dec!(1);
        let flows = vec![
            flow(date(2025, 8, 1), 9, huge),
            flow(date(2025, 8, 2), 9, huge),
        ];

        assert_eq!(aggregate_daily(&flows).unwrap().len(), 2);
        let err = aggregate_hourly(&flows).unwrap_err();
        assert!(matches!(err, AuditError::Overflow { ref context } if context == "hourly cashflow"));
    }

    #[test]
    fn test_cumulative_profit_out_of_range_is_overflow() {
        let huge = Decimal::MAX - dec!(1);
        let err = build_equity_curve(&[
            day(date(2025, 8, 1), huge),
            day(date(2025, 8, 2), huge),
        ])
        .unwrap_err();
        assert!(matches!(err, AuditError::Overflow { ref context } if context == "cumulative profit"));
    }
}
