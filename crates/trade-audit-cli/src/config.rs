use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use trade_audit_core::report::ReportContext;
use trade_audit_core::trading::audit::DEFAULT_SEGMENT_LABEL;
use trade_audit_core::trading::ledger::{LedgerOptions, DEFAULT_DATE_FORMATS};

use crate::output::dashboard::DashboardConfig;

pub const DEFAULT_INPUT: &str = "TRADE_HISTORY_CSV_1103885929_2025-08-01_2026-02-16_0_.csv";

const MIN_DASHBOARD_WIDTH: u32 = 400;
const MIN_DASHBOARD_HEIGHT: u32 = 300;

/// Settings for one audit run. Every field has a default; a YAML file may
/// override any subset, and command-line flags override the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Trade log path, or "-" for stdin
    pub input: String,
    pub output_dir: PathBuf,
    pub report_file: String,
    pub dashboard_file: String,
    pub title: String,
    /// Currency glyph for the UTF-8 report
    pub currency_symbol: String,
    /// ASCII currency label for the console
    pub console_currency: String,
    pub segment_fallback: String,
    pub date_formats: Vec<String>,
    pub dashboard_width: u32,
    pub dashboard_height: u32,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            input: DEFAULT_INPUT.to_string(),
            output_dir: PathBuf::from("."),
            report_file: "performance_metrics.txt".to_string(),
            dashboard_file: "trading_performance_dashboard.png".to_string(),
            title: "FY25-26 TRADING PERFORMANCE AUDIT".to_string(),
            currency_symbol: "₹".to_string(),
            console_currency: "INR".to_string(),
            segment_fallback: DEFAULT_SEGMENT_LABEL.to_string(),
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect(),
            dashboard_width: 1600,
            dashboard_height: 1200,
        }
    }
}

impl AuditConfig {
    /// Load from an optional YAML file; defaults when no file is given.
    pub fn load(path: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        let config = match path {
            Some(p) => {
                let contents = std::fs::read_to_string(p)
                    .map_err(|e| format!("Failed to read config '{}': {}", p, e))?;
                Self::from_yaml(&contents).map_err(|e| format!("Invalid config '{}': {}", p, e))?
            }
            None => Self::default(),
        };
        tracing::debug!(?config, "loaded audit configuration");
        Ok(config)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.input.trim().is_empty() {
            return Err("input: must name a trade log file or '-'".into());
        }
        if self.report_file.trim().is_empty() {
            return Err("report_file: must not be empty".into());
        }
        if self.dashboard_file.trim().is_empty() {
            return Err("dashboard_file: must not be empty".into());
        }
        if self.date_formats.is_empty() {
            return Err("date_formats: at least one format is required".into());
        }
        if self.dashboard_width < MIN_DASHBOARD_WIDTH || self.dashboard_height < MIN_DASHBOARD_HEIGHT {
            return Err(format!(
                "dashboard: {}x{} is smaller than the minimum {}x{}",
                self.dashboard_width, self.dashboard_height, MIN_DASHBOARD_WIDTH, MIN_DASHBOARD_HEIGHT
            ));
        }
        Ok(())
    }

    /// Display name of the data source: the file name without its directory.
    pub fn source_name(&self) -> String {
        if self.input == "-" {
            return "<stdin>".to_string();
        }
        Path::new(&self.input)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.input.clone())
    }

    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(&self.report_file)
    }

    pub fn dashboard_path(&self) -> PathBuf {
        self.output_dir.join(&self.dashboard_file)
    }

    pub fn ledger_options(&self) -> LedgerOptions {
        LedgerOptions {
            date_formats: self.date_formats.clone(),
        }
    }

    pub fn report_context(&self, audited_at: NaiveDateTime) -> ReportContext {
        ReportContext {
            title: self.title.clone(),
            audited_at,
            currency_symbol: self.currency_symbol.clone(),
            currency_label: self.console_currency.clone(),
        }
    }

    pub fn dashboard_config(&self) -> DashboardConfig {
        DashboardConfig {
            width: self.dashboard_width,
            height: self.dashboard_height,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AuditConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.report_path(), PathBuf::from("./performance_metrics.txt"));
        assert_eq!(config.source_name(), DEFAULT_INPUT);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = AuditConfig::from_yaml(
            "input: data/trades.csv\noutput_dir: out\ncurrency_symbol: \"$\"\n",
        )
        .unwrap();
        assert_eq!(config.input, "data/trades.csv");
        assert_eq!(config.source_name(), "trades.csv");
        assert_eq!(config.dashboard_path(), PathBuf::from("out/trading_performance_dashboard.png"));
        assert_eq!(config.currency_symbol, "$");
        assert_eq!(config.console_currency, "INR");
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = AuditConfig::from_yaml("   \n").unwrap();
        assert_eq!(config.input, DEFAULT_INPUT);
    }

    #[test]
    fn test_unknown_type_rejected() {
        assert!(AuditConfig::from_yaml("dashboard_width: wide\n").is_err());
    }

    #[test]
    fn test_validation_rejects_tiny_dashboard() {
        let config = AuditConfig {
            dashboard_width: 100,
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().starts_with("dashboard"));
    }

    #[test]
    fn test_validation_rejects_empty_formats() {
        let config = AuditConfig {
            date_formats: vec![],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_stdin_source_name() {
        let config = AuditConfig {
            input: "-".into(),
            ..Default::default()
        };
        assert_eq!(config.source_name(), "<stdin>");
    }
}
