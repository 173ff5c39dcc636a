//! Plain-text renderings of an [`AuditSummary`]: the UTF-8 report file and the
//! condensed console summary.

use chrono::NaiveDateTime;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::trading::audit::AuditSummary;

const REPORT_RULE: &str = "==================================================================";
const REPORT_SECTION: &str = "------------------------------------------------------------------";
const CONSOLE_RULE: &str = "--------------------------------------------------";

/// Presentation settings shared by the report and console renderers.
#[derive(Debug, Clone)]
pub struct ReportContext {
    /// Banner title, e.g. "FY25-26 TRADING PERFORMANCE AUDIT"
    pub title: String,
    pub audited_at: NaiveDateTime,
    /// Currency glyph used in the UTF-8 report
    pub currency_symbol: String,
    /// ASCII currency label used on the console
    pub currency_label: String,
}

// ---------------------------------------------------------------------------
// Number formatting
// ---------------------------------------------------------------------------

/// Currency amount with thousands separators, rounded half away from zero.
///
/// The sign follows the symbol: `₹-1,234.50`.
pub fn format_money(amount: Decimal, decimals: u32, symbol: &str) -> String {
    let rounded = amount.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    let digits = format!("{:.*}", decimals as usize, rounded.abs());
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits.as_str(), None),
    };

    let mut out = format!("{}{}{}", symbol, sign, group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Percentage points to one decimal: `66.7%`.
pub fn format_percent(value: Decimal) -> String {
    format!(
        "{:.1}%",
        value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
    )
}

/// Ratio to two decimals: `2.50`.
pub fn format_ratio(value: Decimal) -> String {
    format!(
        "{:.2}",
        value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// ---------------------------------------------------------------------------
// Renderers
// ---------------------------------------------------------------------------

/// Full audit report, written to disk as UTF-8.
pub fn render_text_report(summary: &AuditSummary, ctx: &ReportContext) -> String {
    let m = &summary.metrics;
    let cur = ctx.currency_symbol.as_str();

    format!(
        "
{rule}
 {title} REPORT
{rule}
Audit Date:       {audited_at}
Data Source:      {source}
Total Executions: {trades}
Segments:         {segments}

{section}
 KEY PERFORMANCE METRICS
{section}
Net Profit (Realized):  {net_profit}
Profit Factor:          {profit_factor}
Daily Win Rate:         {win_rate}
Risk/Reward Ratio:      1 : {risk_reward}
Max Drawdown:           {max_drawdown}

{section}
 AVERAGE TRADE STATISTICS
{section}
Avg Daily Win:          {avg_win}
Avg Daily Loss:         {avg_loss}
Trading Days:           {days} ({up} up / {down} down / {flat} flat)
Best Day:               {best} on {best_date}
Worst Day:              {worst} on {worst_date}

{rule}
*Generated by trade-audit from the daily cashflow series*
{rule}
",
        rule = REPORT_RULE,
        section = REPORT_SECTION,
        title = ctx.title,
        audited_at = ctx.audited_at.format("%Y-%m-%d %H:%M:%S"),
        source = summary.source_name,
        trades = summary.total_trades,
        segments = summary.segments.join(", "),
        net_profit = format_money(m.net_profit, 2, cur),
        profit_factor = format_ratio(m.profit_factor),
        win_rate = format_percent(m.daily_win_rate),
        risk_reward = format_ratio(m.risk_reward_ratio),
        max_drawdown = format_money(m.max_drawdown, 0, cur),
        avg_win = format_money(m.avg_daily_win, 2, cur),
        avg_loss = format_money(m.avg_daily_loss, 2, cur),
        days = m.trading_days,
        up = m.winning_days,
        down = m.losing_days,
        flat = m.breakeven_days,
        best = format_money(m.best_day.daily_cashflow, 2, cur),
        best_date = m.best_day.date,
        worst = format_money(m.worst_day.daily_cashflow, 2, cur),
        worst_date = m.worst_day.date,
    )
}

/// Condensed summary for terminals; ASCII only apart from user-supplied labels.
pub fn render_console_summary(summary: &AuditSummary, ctx: &ReportContext) -> String {
    let m = &summary.metrics;
    let label = format!("{} ", ctx.currency_label);

    format!(
        "{rule}
 {title}
{rule}
 Data Source:     {source}
 Segments:        {segments}
 Total Trades:    {trades}
{rule}
 Net Profit:      {net_profit}
 Profit Factor:   {profit_factor}
 Daily Win Rate:  {win_rate}
 Avg Win:         {avg_win}
 Avg Loss:        {avg_loss}
 Risk/Reward:     1 : {risk_reward}
 Max Drawdown:    {max_drawdown}
{rule}
",
        rule = CONSOLE_RULE,
        title = ctx.title,
        source = summary.source_name,
        segments = summary.segments.join(", "),
        trades = summary.total_trades,
        net_profit = format_money(m.net_profit, 2, &label),
        profit_factor = format_ratio(m.profit_factor),
        win_rate = format_percent(m.daily_win_rate),
        avg_win = format_money(m.avg_daily_win, 0, &label),
        avg_loss = format_money(m.avg_daily_loss, 0, &label),
        risk_reward = format_ratio(m.risk_reward_ratio),
        max_drawdown = format_money(m.max_drawdown, 0, &label),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
