use trade_audit_core::report::render_console_summary;

use crate::commands::audit::AuditRun;

/// Condensed console summary with the ASCII currency label.
pub fn print_summary(run: &AuditRun) {
    print!(
        "{}",
        render_console_summary(&run.output.result.summary, &run.context)
    );
    for warning in &run.output.warnings {
        eprintln!("warning: {}", warning);
    }
}
