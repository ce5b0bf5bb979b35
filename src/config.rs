//! TOML configuration for the converter and its directories.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::runner::RunOptions;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub paths: PathsConfig,
    pub converter: ConverterConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PathsConfig {
    /// Where run reports are written
    pub output_dir: PathBuf,
    /// Working directory of the converter process
    pub working_dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ConverterConfig {
    pub executable: PathBuf,

    /// Argument templates. `{input}`, `{table}` and `{connection}` are substituted per file.
    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default)]
    pub connection: String,

    #[serde(default)]
    pub timeout_secs: Option<u64>,

    #[serde(default)]
    pub options: RunOptions,
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config file")?;
        Ok(config)
    }
}

impl ConverterConfig {
    /// Expand the argument templates for one input file and target table
    pub fn render_args(&self, input: &Path, table: &str) -> Vec<String> {
        let input = input.to_string_lossy();
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{input}", &input)
                    .replace("{table}", table)
                    .replace("{connection}", &self.connection)
            })
            .collect()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
