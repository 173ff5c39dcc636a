use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

/// Print the audit envelope as tables: summary, daily equity curve, hourly cashflow.
pub fn print_table(value: &Value) {
    let Some(result) = value.get("result") else {
        println!("{}", value);
        return;
    };

    if let Some(Value::Object(summary)) = result.get("summary") {
        println!("{}", summary_table(summary));
    }

    if let Some(Value::Array(daily)) = result.get("daily") {
        println!("\nDaily equity curve:");
        print_array_table(daily);
    }

    if let Some(Value::Array(hourly)) = result.get("hourly") {
        println!("\nHourly net cashflow:");
        print_array_table(hourly);
    }

    if let Some(Value::Array(warnings)) = value.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = value.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

/// Two-column table; the nested metrics object is flattened into the same rows.
fn summary_table(summary: &Map<String, Value>) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in summary {
        match (key.as_str(), val) {
            ("metrics", Value::Object(metrics)) => {
                for (mkey, mval) in metrics {
                    builder.push_record([mkey.as_str(), &format_value(mval)]);
                }
            }
            _ => builder.push_record([key.as_str(), &format_value(val)]),
        }
    }
    Table::from(builder)
}

fn print_array_table(arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        println!("(empty)");
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(&headers);
    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                .collect();
            builder.push_record(row);
        }
    }
    println!("{}", Table::from(builder));
}

pub(crate) fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => arr.iter().map(format_value).collect::<Vec<_>>().join(", "),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{}={}", k, format_value(v)))
            .collect::<Vec<_>>()
            .join(" "),
    }
}
