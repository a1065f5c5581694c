//! CLI command implementations
//!
//! Serve sequence:
//! 1. Configuration load (defaults when no file is given)
//! 2. Logger severity set from config
//! 3. SERVING loop: one request line in, one response line out
//! 4. Metrics report and shutdown on end of input

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::MarketHandler;
use crate::observability::{
    log_event, log_event_with_fields, Event, Logger, MetricsSnapshot, ObservationScope, Severity,
};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_requests, write_error, write_json, write_response};

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Minimum log severity (optional, default "info")
    #[serde(default = "default_log_severity")]
    pub log_severity: String,

    /// Longest accepted request line in bytes (optional, default 64KiB)
    #[serde(default = "default_max_request_bytes")]
    pub max_request_bytes: usize,

    /// Log a metrics snapshot at shutdown (optional, default true)
    #[serde(default = "default_report_metrics")]
    pub report_metrics: bool,
}

fn default_log_severity() -> String {
    "info".to_string()
}
fn default_max_request_bytes() -> usize {
    65536
}
fn default_report_metrics() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_severity: default_log_severity(),
            max_request_bytes: default_max_request_bytes(),
            report_metrics: default_report_metrics(),
        }
    }
}

impl Config {
    /// Load and validate configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;
        Self::parse(&content)
    }

    /// Parse and validate configuration text
    pub fn parse(content: &str) -> CliResult<Self> {
        let config: Config = serde_json::from_str(content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CliResult<()> {
        self.severity()?;

        if self.max_request_bytes == 0 {
            return Err(CliError::config_error("max_request_bytes must be > 0"));
        }

        Ok(())
    }

    pub fn severity(&self) -> CliResult<Severity> {
        Severity::from_str(&self.log_severity).map_err(CliError::config_error)
    }
}

/// Main CLI entry point; the only function main.rs calls
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config } => serve(config.as_deref()),
        Command::CheckConfig { config } => check_config(&config),
    }
}

/// Serve requests from stdin until end of input
pub fn serve(config_path: Option<&Path>) -> CliResult<()> {
    log_event(Event::StartupBegin);

    let config = match config_path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    Logger::set_min_severity(config.severity()?);
    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("log_severity", &config.log_severity),
            ("max_request_bytes", &config.max_request_bytes.to_string()),
        ],
    );

    let stdin = io::stdin();
    let stdout = io::stdout();
    serve_stream(&config, stdin.lock(), &mut stdout.lock())?;
    Ok(())
}

/// The SERVING loop over arbitrary streams.
///
/// A read failure ends the loop with an error line on `output`; request
/// failures are ordinary error responses and never end it.
pub fn serve_stream<R: BufRead, W: Write>(
    config: &Config,
    input: R,
    output: &mut W,
) -> CliResult<MetricsSnapshot> {
    let mut handler = MarketHandler::new(config.max_request_bytes);
    let scope = ObservationScope::new("SERVE");
    log_event(Event::Serving);

    for line in read_requests(input) {
        match line {
            Ok(line) => {
                let response = handler.handle(&line);
                write_json(output, &response.to_json())?;
            }
            Err(e) => {
                write_error(output, e.code_str(), e.message())?;
                scope.fail(e.message());
                return Err(e);
            }
        }
    }

    let metrics = handler.metrics();
    if config.report_metrics {
        report_metrics(&metrics);
    }
    scope.complete_with_fields(&[("requests", &metrics.requests.to_string())]);
    log_event(Event::ShutdownComplete);

    Ok(metrics)
}

/// Validate a config file and print it with defaults filled in
pub fn check_config(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let stdout = io::stdout();
    write_response(&mut stdout.lock(), serde_json::to_value(&config)?)
}

fn report_metrics(snapshot: &MetricsSnapshot) {
    let counters: Vec<(String, String)> = match serde_json::to_value(snapshot) {
        Ok(Value::Object(map)) => map.into_iter().map(|(k, v)| (k, v.to_string())).collect(),
        _ => Vec::new(),
    };
    let fields: Vec<(&str, &str)> = counters
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    log_event_with_fields(Event::MetricsReport, &fields);
}
