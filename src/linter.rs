//! RuboCop invocation over a scoped temp file.
//!
//! The linter runs as a subprocess with JSON output; its stdout/stderr are
//! captured and never reach the host process's streams. The temp file is
//! removed on drop on every exit path.

use crate::config::LintConfig;
use crate::error::LintingError;
use crate::types::Offense;
use serde::Deserialize;
use std::io::Write;
use std::process::Command;

pub trait LintRunner: Send + Sync {
    fn lint(&self, content: &str) -> Result<LintReport, LintingError>;
}

/// RuboCop's `--format json` report, deserialized defensively: a report with
/// no `files` key, or files with no `offenses` key, is a clean report.
#[derive(Debug, Default, Deserialize)]
pub struct LintReport {
    #[serde(default)]
    pub files: Vec<LintedFile>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LintedFile {
    #[serde(default)]
    pub offenses: Vec<RawOffense>,
}

#[derive(Debug, Deserialize)]
pub struct RawOffense {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub cop_name: String,
    #[serde(default)]
    pub location: OffenseLocation,
}

#[derive(Debug, Default, Deserialize)]
pub struct OffenseLocation {
    pub line: Option<u64>,
}

pub struct RuboCopRunner {
    command: String,
}

impl RuboCopRunner {
    pub fn new(config: &LintConfig) -> Self {
        Self {
            command: config.command.clone(),
        }
    }
}

impl LintRunner for RuboCopRunner {
    fn lint(&self, content: &str) -> Result<LintReport, LintingError> {
        // RuboCop keys some cops off the extension, so the temp file needs
        // a real .rb suffix.
        let mut temp = tempfile::Builder::new()
            .prefix("rubofix-")
            .suffix(".rb")
            .tempfile()?;
        temp.write_all(content.as_bytes())?;
        temp.flush()?;

        // output() captures both streams; a nonzero exit just means offenses
        // were found.
        let output = Command::new(&self.command)
            .arg("--format")
            .arg("json")
            .arg("--no-color")
            .arg("--force-exclusion")
            .arg(temp.path())
            .output()?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_report(stdout.trim())
    }
}

fn parse_report(stdout: &str) -> Result<LintReport, LintingError> {
    if stdout.is_empty() {
        return Ok(LintReport::default());
    }
    serde_json::from_str(stdout)
        .map_err(|e| LintingError::MalformedOutput(format!("{e}")))
}

/// Flatten a report into the offense list, preserving linter order.
/// Never fails; missing keys were already defaulted at deserialization.
pub fn extract_offenses(report: &LintReport) -> Vec<Offense> {
    report
        .files
        .iter()
        .flat_map(|file| &file.offenses)
        .map(|raw| Offense {
            line: raw.location.line,
            message: raw.message.clone(),
            rule_id: raw.cop_name.clone(),
        })
        .collect()
}

pub fn has_offenses(report: &LintReport) -> bool {
    !extract_offenses(report).is_empty()
}
