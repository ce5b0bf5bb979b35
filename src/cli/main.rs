//! TIGER/Line import tool.
//!
//! Runs the configured shapefile converter over TIGER/Line files and checks
//! converted CSV exports against the record schemas.

mod convert;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use tigerload::models::{Bg, Csa, Layer, Zcta5};
use tigerload::reader::{validate_file, ValidationSummary};
use tigerload::Config;

use crate::convert::convert_all;

#[derive(Parser, Debug)]
#[command(name = "tigerload")]
#[command(about = "Load TIGER/Line shapefiles through an external converter")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a shapefile, or every shapefile under a directory
    Convert {
        /// Configuration file
        #[arg(short, long, default_value = "tigerload.toml")]
        config: PathBuf,

        /// Shapefile or directory of shapefiles
        input: PathBuf,

        /// Use this layer instead of detecting it from file names
        #[arg(long)]
        layer: Option<Layer>,

        /// Stop at the first file that fails
        #[arg(long)]
        fail_fast: bool,
    },

    /// Check a CSV export against a layer's field limits
    Validate {
        #[arg(long)]
        layer: Layer,

        /// CSV file with TIGER/Line column headers
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    match args.command {
        Command::Convert {
            config,
            input,
            layer,
            fail_fast,
        } => {
            let config = Config::load_from_file(&config)?;
            info!("Converter: {}", config.converter.executable.display());
            info!("Working directory: {}", config.paths.working_dir.display());

            let report = convert_all(&config, &input, layer, fail_fast).await?;
            report.write_to_dir(&config.paths.output_dir)?;

            info!(
                "Converted {} files ({} failed)",
                report.succeeded(),
                report.failed()
            );
            if report.failed() > 0 {
                anyhow::bail!(
                    "{} of {} files failed to convert",
                    report.failed(),
                    report.entries.len()
                );
            }
        }
        Command::Validate { layer, file } => {
            let summary = match layer {
                Layer::Bg => validate_file::<Bg>(&file)?,
                Layer::Csa => validate_file::<Csa>(&file)?,
                Layer::Zcta5 => validate_file::<Zcta5>(&file)?,
            };
            print_summary(&summary);
            if !summary.is_valid() {
                anyhow::bail!("{} invalid rows in {}", summary.invalid.len(), file.display());
            }
        }
    }

    Ok(())
}

fn print_summary(summary: &ValidationSummary) {
    for (row, message) in &summary.invalid {
        warn!("Row {}: {}", row, message);
    }
    if summary.missing_geometry > 0 {
        warn!("{} valid rows have no geometry", summary.missing_geometry);
    }
    if let Some(extent) = summary.extent {
        info!(
            "Internal points span lon {:.4}..{:.4}, lat {:.4}..{:.4}",
            extent.min().x,
            extent.max().x,
            extent.min().y,
            extent.max().y
        );
    }
    info!(
        "{} rows, {} invalid",
        summary.rows,
        summary.invalid.len()
    );
}
