pub mod canvas;
pub mod csv_out;
pub mod dashboard;
pub mod json;
pub mod minimal;
pub mod summary;
pub mod table;

use serde_json::Value;

use crate::commands::audit::AuditRun;
use crate::OutputFormat;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, run: &AuditRun) {
    let printer: fn(&Value) = match format {
        OutputFormat::Summary => return summary::print_summary(run),
        OutputFormat::Json => json::print_json,
        OutputFormat::Table => table::print_table,
        OutputFormat::Csv => csv_out::print_csv,
        OutputFormat::Minimal => minimal::print_minimal,
    };

    match serde_json::to_value(&run.output) {
        Ok(value) => printer(&value),
        Err(e) => eprintln!("JSON serialization error: {}", e),
    }
}
