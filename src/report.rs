//! JSON summary of a conversion run.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::Layer;
use crate::runner::RunOutcome;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportEntry {
    pub input: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer: Option<Layer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    pub success: bool,
    pub elapsed_ms: u64,
    /// Converter stderr on failure, or the error that stopped the run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ReportEntry {
    pub fn from_outcome(input: &Path, layer: Layer, outcome: &RunOutcome) -> Self {
        let detail = if outcome.success() {
            None
        } else {
            Some(outcome.stderr.trim_end().to_string()).filter(|s| !s.is_empty())
        };
        Self {
            input: input.to_path_buf(),
            layer: Some(layer),
            table: Some(layer.table_name().to_string()),
            exit_code: outcome.exit_code,
            success: outcome.success(),
            elapsed_ms: outcome.elapsed.as_millis() as u64,
            detail,
        }
    }

    pub fn failed(input: &Path, layer: Option<Layer>, error: &dyn std::fmt::Display) -> Self {
        Self {
            input: input.to_path_buf(),
            layer,
            table: layer.map(|l| l.table_name().to_string()),
            exit_code: None,
            success: false,
            elapsed_ms: 0,
            detail: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    pub entries: Vec<ReportEntry>,
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}

impl RunReport {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, entry: ReportEntry) {
        self.entries.push(entry);
    }

    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|e| e.success).count()
    }

    pub fn failed(&self) -> usize {
        self.entries.len() - self.succeeded()
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Write the report as pretty JSON into `output_dir`, returning the file path
    pub fn write_to_dir(&self, output_dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(output_dir).with_context(|| {
            format!("Failed to create output directory {}", output_dir.display())
        })?;

        let stem = format!(
            "tigerload-report-{}",
            self.started_at.format("%Y%m%dT%H%M%S%.3fZ")
        );
        let json = serde_json::to_string_pretty(self)?;

        // Never overwrite an earlier report, even one started in the same millisecond.
        let mut attempt = 0;
        let (path, mut file) = loop {
            let file_name = if attempt == 0 {
                format!("{}.json", stem)
            } else {
                format!("{}-{}.json", stem, attempt)
            };
            let path = output_dir.join(file_name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => break (path, file),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!("Failed to create run report {}", path.display())
                    })
                }
            }
        };
        file.write_all(json.as_bytes())
            .context("Failed to write run report")?;

        info!("Wrote run report to {}", path.display());
        Ok(path)
    }
}
