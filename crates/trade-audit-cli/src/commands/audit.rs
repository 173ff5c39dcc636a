use chrono::Local;
use clap::Args;
use colored::Colorize;
use std::error::Error;
use std::fs;
use std::path::PathBuf;

use trade_audit_core::report::{render_text_report, ReportContext};
use trade_audit_core::trading::audit::{run_trade_audit, AuditInput, AuditOutput};
use trade_audit_core::ComputationOutput;

use crate::config::AuditConfig;
use crate::input;
use crate::output::dashboard;

/// Arguments for a full audit run
#[derive(Args)]
pub struct AuditArgs {
    /// Path to the trade log CSV, or "-" for stdin
    #[arg(long)]
    pub input: Option<String>,
    /// Directory for the text report and dashboard image
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
    /// Path to a YAML configuration file
    #[arg(long)]
    pub config: Option<String>,
}

/// Arguments for computing metrics without writing files
#[derive(Args)]
pub struct MetricsArgs {
    /// Path to the trade log CSV, or "-" for stdin
    #[arg(long)]
    pub input: Option<String>,
    /// Path to a YAML configuration file
    #[arg(long)]
    pub config: Option<String>,
}

/// A completed audit and the presentation settings it was run with.
pub struct AuditRun {
    pub output: ComputationOutput<AuditOutput>,
    pub context: ReportContext,
}

pub fn run_audit(args: AuditArgs) -> Result<AuditRun, Box<dyn Error>> {
    let mut config = AuditConfig::load(args.config.as_deref())?;
    if let Some(input) = args.input {
        config.input = input;
    }
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }
    config.validate()?;

    let output = compute(&config)?;
    let context = config.report_context(Local::now().naive_local());

    // Render both artifacts before touching the filesystem.
    let report = render_text_report(&output.result.summary, &context);
    let image = dashboard::render_dashboard(
        &output.result.daily,
        &output.result.hourly,
        &config.dashboard_config(),
    );
    let png = dashboard::encode_png(&image)?;

    write_artifacts(&config, &report, &png)?;
    Ok(AuditRun { output, context })
}

pub fn run_metrics(args: MetricsArgs) -> Result<AuditRun, Box<dyn Error>> {
    let mut config = AuditConfig::load(args.config.as_deref())?;
    if let Some(input) = args.input {
        config.input = input;
    }
    config.validate()?;

    let output = compute(&config)?;
    let context = config.report_context(Local::now().naive_local());
    Ok(AuditRun { output, context })
}

fn compute(config: &AuditConfig) -> Result<ComputationOutput<AuditOutput>, Box<dyn Error>> {
    tracing::info!(input = %config.input, "loading trade log");
    let ledger = input::file::read_ledger(&config.input, &config.ledger_options())?;

    let mut audit_input = AuditInput::from_ledger(config.source_name(), ledger);
    audit_input.segment_fallback = Some(config.segment_fallback.clone());
    Ok(run_trade_audit(&audit_input)?)
}

fn write_artifacts(config: &AuditConfig, report: &str, png: &[u8]) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(&config.output_dir).map_err(|e| {
        format!(
            "Failed to create output directory '{}': {}",
            config.output_dir.display(),
            e
        )
    })?;

    let report_path = config.report_path();
    fs::write(&report_path, report.as_bytes())
        .map_err(|e| format!("Failed to write '{}': {}", report_path.display(), e))?;

    // A report without its dashboard counts as a partial run; take it back out.
    let dashboard_path = config.dashboard_path();
    if let Err(e) = fs::write(&dashboard_path, png) {
        if let Err(cleanup) = fs::remove_file(&report_path) {
            tracing::warn!(
                path = %report_path.display(),
                error = %cleanup,
                "could not remove partial report"
            );
        }
        return Err(format!("Failed to write '{}': {}", dashboard_path.display(), e).into());
    }

    eprintln!(
        "-> {}: Metrics saved to '{}'",
        "SUCCESS".green().bold(),
        report_path.display()
    );
    eprintln!(
        "-> {}: Dashboard saved to '{}'",
        "SUCCESS".green().bold(),
        dashboard_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use trade_audit_core::AuditError;

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("trade-audit-cmd-{}-{}", std::process::id(), name))
    }

    fn write_log(dir: &Path, body: &str) -> String {
        fs::create_dir_all(dir).unwrap();
        let path = dir.join("trades.csv");
        fs::write(&path, body).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_audit_writes_report_and_dashboard() {
        let dir = temp_dir("ok");
        let input = write_log(
            &dir,
            "Date,Time,Buy/Sell,Trade Value\n\
             2025-08-01,09:15:00,BUY,1000\n\
             2025-08-01,11:00:00,SELL,1500\n\
             2025-08-04,10:00:00,BUY,400\n",
        );
        let out_dir = dir.join("out");

        let run = run_audit(AuditArgs {
            input: Some(input),
            output_dir: Some(out_dir.clone()),
            config: None,
        })
        .unwrap();

        let report = fs::read_to_string(out_dir.join("performance_metrics.txt")).unwrap();
        let png = fs::read(out_dir.join("trading_performance_dashboard.png")).unwrap();
        fs::remove_dir_all(&dir).unwrap();

        assert_eq!(run.output.result.summary.source_name, "trades.csv");
        assert!(report.contains("Total Executions: 3"));
        assert!(report.contains("Net Profit (Realized):  ₹100.00"));
        assert_eq!(&png[1..4], b"PNG");
    }

    #[test]
    fn test_degenerate_input_writes_nothing() {
        let dir = temp_dir("empty");
        let input = write_log(&dir, "Date,Time,Buy/Sell,Trade Value\n");
        let out_dir = dir.join("out");

        let err = run_audit(AuditArgs {
            input: Some(input),
            output_dir: Some(out_dir.clone()),
            config: None,
        })
        .err()
        .unwrap();
        let written = out_dir.exists();
        fs::remove_dir_all(&dir).unwrap();

        assert!(matches!(
            err.downcast_ref::<AuditError>(),
            Some(AuditError::InsufficientData(_))
        ));
        assert!(!written);
    }

    #[test]
    fn test_unknown_side_writes_nothing() {
        let dir = temp_dir("hold");
        let input = write_log(
            &dir,
            "Date,Time,Buy/Sell,Trade Value\n2025-08-01,09:15:00,HOLD,1000\n",
        );
        let out_dir = dir.join("out");

        let err = run_audit(AuditArgs {
            input: Some(input),
            output_dir: Some(out_dir.clone()),
            config: None,
        })
        .err()
        .unwrap();
        let written = out_dir.exists();
        fs::remove_dir_all(&dir).unwrap();

        assert!(matches!(
            err.downcast_ref::<AuditError>(),
            Some(AuditError::UnknownSide { line: 2, .. })
        ));
        assert!(!written);
    }

    #[test]
    fn test_metrics_command_missing_input() {
        let err = run_metrics(MetricsArgs {
            input: Some(temp_dir("absent").join("nope.csv").to_string_lossy().into_owned()),
            config: None,
        })
        .err()
        .unwrap();
        let audit_err = err.downcast_ref::<AuditError>().unwrap();
        assert!(audit_err.is_graceful());
    }

    #[test]
    fn test_failed_dashboard_write_removes_report() {
        let dir = temp_dir("partial");
        let config = AuditConfig {
            output_dir: dir.clone(),
            ..AuditConfig::default()
        };
        // A directory squatting on the image path makes the second write fail
        fs::create_dir_all(config.dashboard_path()).unwrap();

        let result = write_artifacts(&config, "report body", b"png");
        let report_left = config.report_path().exists();
        fs::remove_dir_all(&dir).unwrap();

        assert!(result.is_err());
        assert!(!report_left);
    }
}
