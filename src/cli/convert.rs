use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info, warn};
use walkdir::WalkDir;

use tigerload::models::Layer;
use tigerload::report::{ReportEntry, RunReport};
use tigerload::{CommandRunner, Config};

/// The shapefile itself, or every `.shp` below a directory in path order
pub fn collect_shapefiles(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        anyhow::bail!("Input {} does not exist", input.display());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(input).sort_by_file_name() {
        let entry = entry.context("Failed to walk input directory")?;
        let is_shp = entry
            .path()
            .extension()
            .map(|e| e.eq_ignore_ascii_case("shp"))
            .unwrap_or(false);
        if entry.file_type().is_file() && is_shp {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

pub async fn convert_all(
    config: &Config,
    input: &Path,
    forced_layer: Option<Layer>,
    fail_fast: bool,
) -> Result<RunReport> {
    let files = collect_shapefiles(input)?;
    info!("Found {} shapefiles under {}", files.len(), input.display());

    let runner = CommandRunner::from_config(config);
    let mut report = RunReport::new();

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    for file in files {
        pb.set_message(
            file.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        );

        let layer = match forced_layer.map(Ok).unwrap_or_else(|| Layer::detect(&file)) {
            Ok(layer) => layer,
            Err(e) => {
                warn!("Skipping {}: {}", file.display(), e);
                report.push(ReportEntry::failed(&file, None, &e));
                pb.inc(1);
                if fail_fast {
                    break;
                }
                continue;
            }
        };

        // The converter runs in the working directory, so hand it an absolute input path.
        let absolute = std::path::absolute(&file)
            .with_context(|| format!("Failed to resolve {}", file.display()))?;
        let args = config.converter.render_args(&absolute, layer.table_name());

        let result = runner
            .run_path_async(
                config.converter.executable.clone(),
                args,
                Some(config.converter.options.clone()),
            )
            .await;

        let entry = match result {
            Ok(outcome) => {
                if !outcome.success() {
                    warn!(
                        "Converter failed on {} (exit code {:?})",
                        file.display(),
                        outcome.exit_code
                    );
                }
                ReportEntry::from_outcome(&file, layer, &outcome)
            }
            Err(e) => {
                error!("Failed to convert {}: {}", file.display(), e);
                ReportEntry::failed(&file, Some(layer), &e)
            }
        };
        let success = entry.success;
        report.push(entry);
        pb.inc(1);

        if fail_fast && !success {
            break;
        }
    }

    pb.finish_with_message("Conversion complete");
    report.finish();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_collect_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let shp = dir.path().join("tl_2020_01_bg.shp");
        fs::write(&shp, b"").unwrap();
        assert_eq!(collect_shapefiles(&shp).unwrap(), vec![shp]);
    }

    #[test]
    fn test_collect_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("02");
        fs::create_dir(&nested).unwrap();
        fs::write(dir.path().join("tl_2020_01_bg.shp"), b"").unwrap();
        fs::write(dir.path().join("tl_2020_01_bg.dbf"), b"").unwrap();
        fs::write(nested.join("tl_2020_02_bg.SHP"), b"").unwrap();

        let files = collect_shapefiles(dir.path()).unwrap();
        assert_eq!(
            files,
            vec![
                nested.join("tl_2020_02_bg.SHP"),
                dir.path().join("tl_2020_01_bg.shp"),
            ]
        );
    }

    #[test]
    fn test_collect_missing_input() {
        assert!(collect_shapefiles(Path::new("/nonexistent/shapes")).is_err());
    }

    #[cfg(unix)]
    fn config_for(dir: &Path, script: &str) -> Config {
        Config::from_toml(&format!(
            r#"
[paths]
output_dir = "{out}"
working_dir = "{work}"

[converter]
executable = "/bin/sh"
args = ["-c", "{script}", "sh", "{{input}}", "{{table}}"]

[converter.options]
redirect_standard_output = true
redirect_standard_error = true
"#,
            out = dir.join("out").display(),
            work = dir.display(),
            script = script,
        ))
        .unwrap()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_convert_all_records_each_file() {
        let dir = tempfile::tempdir().unwrap();
        let shapes = dir.path().join("shapes");
        fs::create_dir(&shapes).unwrap();
        fs::write(shapes.join("tl_2020_01_bg.shp"), b"").unwrap();
        fs::write(shapes.join("tl_2020_us_csa.shp"), b"").unwrap();
        fs::write(shapes.join("roads.shp"), b"").unwrap();

        // Fails for the csa table only
        let config = config_for(dir.path(), r#"test \"$2\" != csa"#);
        let report = convert_all(&config, &shapes, None, false).await.unwrap();

        assert_eq!(report.entries.len(), 3);
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 2);

        let roads = &report.entries[0];
        assert!(roads.layer.is_none());
        let bg = &report.entries[1];
        assert_eq!(bg.table.as_deref(), Some("bg"));
        assert!(bg.success);
        let csa = &report.entries[2];
        assert_eq!(csa.exit_code, Some(1));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_convert_all_fail_fast() {
        let dir = tempfile::tempdir().unwrap();
        let shapes = dir.path().join("shapes");
        fs::create_dir(&shapes).unwrap();
        fs::write(shapes.join("a.shp"), b"").unwrap();
        fs::write(shapes.join("b.shp"), b"").unwrap();

        let config = config_for(dir.path(), "exit 2");
        let report = convert_all(&config, &shapes, Some(Layer::Zcta5), true)
            .await
            .unwrap();
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].exit_code, Some(2));
    }
}
