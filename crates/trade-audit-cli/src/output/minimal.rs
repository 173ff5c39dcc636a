use serde_json::Value;

use super::table::format_value;

/// Headline metrics, in order of preference.
const PRIORITY_KEYS: [&str; 4] = ["net_profit", "profit_factor", "daily_win_rate", "max_drawdown"];

/// Print just the headline number: net profit, falling back through the
/// priority list when a field is absent.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_answer(value));
}

fn minimal_answer(value: &Value) -> String {
    let metrics = value
        .get("result")
        .and_then(|r| r.get("summary"))
        .and_then(|s| s.get("metrics"));

    if let Some(Value::Object(map)) = metrics {
        for key in PRIORITY_KEYS {
            if let Some(val) = map.get(key).filter(|v| !v.is_null()) {
                return format_value(val);
            }
        }
    }
    format_value(value)
}
