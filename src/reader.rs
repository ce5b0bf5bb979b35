//! Reading converted rows back from CSV exports.
//!
//! GDAL's CSV driver (`ogr2ogr -f CSV -lco GEOMETRY=AS_WKT`) writes the same
//! TIGER/Line column names the models use, so a CSV export can be checked
//! against the schema before it is loaded.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use geo_types::{coord, Rect};
use tracing::{debug, info};

use crate::models::Record;

/// One parsed row, numbered from 1 (header excluded)
#[derive(Debug)]
pub struct RowResult<R> {
    pub row: usize,
    pub record: Result<R, String>,
}

#[derive(Debug, Default)]
pub struct ValidationSummary {
    pub rows: usize,
    /// `(row, message)` for rows that failed to parse or validate
    pub invalid: Vec<(usize, String)>,
    /// Valid rows that carry no boundary geometry
    pub missing_geometry: usize,
    /// Bounding box of the internal points of valid rows
    pub extent: Option<Rect<f64>>,
}

impl ValidationSummary {
    pub fn is_valid(&self) -> bool {
        self.invalid.is_empty()
    }

    fn extend(&mut self, x: f64, y: f64) {
        self.extent = Some(match self.extent {
            None => Rect::new(coord! { x: x, y: y }, coord! { x: x, y: y }),
            Some(rect) => Rect::new(
                coord! { x: rect.min().x.min(x), y: rect.min().y.min(y) },
                coord! { x: rect.max().x.max(x), y: rect.max().y.max(y) },
            ),
        });
    }
}

/// Parse every row of a CSV export as `R`
pub fn read_records<R: Record>(path: &Path) -> Result<Vec<RowResult<R>>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open CSV file {}", path.display()))?;
    read_records_from(file)
}

pub fn read_records_from<R: Record, S: Read>(source: S) -> Result<Vec<RowResult<R>>> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = csv_reader.headers()?.clone();
    debug!("CSV columns: {:?}", headers);

    let mut rows = Vec::new();
    for (idx, result) in csv_reader.records().enumerate() {
        let record = result
            .map_err(|e| e.to_string())
            .and_then(|raw| raw.deserialize::<R>(Some(&headers)).map_err(|e| e.to_string()));
        rows.push(RowResult {
            row: idx + 1,
            record,
        });
    }
    Ok(rows)
}

/// Parse and validate a CSV export, collecting every bad row
pub fn validate_file<R: Record>(path: &Path) -> Result<ValidationSummary> {
    info!("Validating {} rows from {}", R::LAYER, path.display());
    let summary = summarize(read_records::<R>(path)?);
    info!(
        "Checked {} rows ({} invalid)",
        summary.rows,
        summary.invalid.len()
    );
    Ok(summary)
}

pub fn summarize<R: Record>(rows: Vec<RowResult<R>>) -> ValidationSummary {
    let mut summary = ValidationSummary::default();

    for RowResult { row, record } in rows {
        summary.rows += 1;
        match record {
            Ok(record) => match record.validate() {
                Ok(()) => {
                    if record.geometry().is_none() {
                        summary.missing_geometry += 1;
                    }
                    let point = record.internal_point();
                    summary.extend(point.x(), point.y());
                }
                Err(errors) => summary.invalid.push((row, errors.to_string())),
            },
            Err(message) => summary.invalid.push((row, message)),
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Bg, Csa};
    use std::io::Write;

    const BG_CSV: &str = "\
WKT,STATEFP,COUNTYFP,TRACTCE,BLKGRPCE,GEOID,NAMELSAD,MTFCC,FUNCSTAT,ALAND,AWATER,INTPTLAT,INTPTLON
\"POLYGON ((-86.5 32.4,-86.4 32.4,-86.4 32.5,-86.5 32.4))\",01,001,020100,1,010010201001,Block Group 1,G5030,S,4264299,28435,+32.4771112,-086.4903033
,01,001,020200,2,010010202002,Block Group 22,G5030,S,,,+32.4757470,-086.4734110
,,,,,,,,,,,+32.0,-086.0
";

    #[test]
    fn test_reads_rows() {
        let rows = read_records_from::<Bg, _>(BG_CSV.as_bytes()).unwrap();
        assert_eq!(rows.len(), 3);

        let first = rows[0].record.as_ref().unwrap();
        assert_eq!(first.statefp, Some(1));
        assert_eq!(first.geoid, Some(10010201001));
        assert_eq!(first.namelsad.as_deref(), Some("Block Group 1"));
        assert!(first
            .geom
            .as_ref()
            .unwrap()
            .as_str()
            .starts_with("POLYGON"));

        let second = rows[1].record.as_ref().unwrap();
        assert_eq!(second.aland, None);
        assert!(second.geom.is_none());

        let third = rows[2].record.as_ref().unwrap();
        assert_eq!(third.statefp, None);
        assert_eq!(third.namelsad, None);
    }

    #[test]
    fn test_summary_flags_too_long_names() {
        let rows = read_records_from::<Bg, _>(BG_CSV.as_bytes()).unwrap();
        let summary = summarize(rows);
        assert_eq!(summary.rows, 3);
        assert_eq!(summary.invalid.len(), 1);
        assert_eq!(summary.invalid[0].0, 2);
        assert!(summary.invalid[0].1.contains("NAMELSAD"));
        assert!(!summary.is_valid());
        // Row 1 has a polygon, row 2 is invalid, row 3 has none
        assert_eq!(summary.missing_geometry, 1);

        let extent = summary.extent.unwrap();
        assert!(extent.min().x < -86.4 && extent.max().x > -86.5);
    }

    #[test]
    fn test_unparseable_row_is_reported() {
        let csv = "CSAFP,GEOID,NAME,NAMELSAD,LSAD,MTFCC,ALAND,AWATER,INTPTLAT,INTPTLON\n\
                   abc,122,Atlanta,Atlanta CSA,M0,G3100,1,1,+33.69,-084.39\n";
        let rows = read_records_from::<Csa, _>(csv.as_bytes()).unwrap();
        assert!(rows[0].record.is_err());
        let summary = summarize(rows);
        assert_eq!(summary.invalid.len(), 1);
        assert!(summary.extent.is_none());
    }

    #[test]
    fn test_validate_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(BG_CSV.as_bytes()).unwrap();
        let summary = validate_file::<Bg>(file.path()).unwrap();
        assert_eq!(summary.rows, 3);
        assert_eq!(summary.invalid.len(), 1);
    }

    #[test]
    fn test_validate_missing_file() {
        let err = validate_file::<Bg>(Path::new("/nonexistent/bg.csv")).unwrap_err();
        assert!(err.to_string().contains("Failed to open CSV file"));
    }
}
