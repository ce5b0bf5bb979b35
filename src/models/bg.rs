//! Census block group (`tl_<year>_<state>_bg`).

use serde::{Deserialize, Serialize};

use super::validate::FieldLimit;
use super::{Geometry, Layer, Record};

static NAMELSAD: FieldLimit = FieldLimit::new("NAMELSAD", 13);
static MTFCC: FieldLimit = FieldLimit::new("MTFCC", 5);

/// One block group row. Field names match the TIGER/Line columns exactly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct Bg {
    /// State FIPS code
    pub statefp: Option<i16>,
    /// County FIPS code
    pub countyfp: Option<i16>,
    /// Census tract code
    pub tractce: Option<i32>,
    /// Block group number
    pub blkgrpce: Option<i16>,
    pub geoid: Option<i64>,

    /// Name and legal/statistical description, e.g. "Block Group 1"
    pub namelsad: Option<String>,

    /// MAF/TIGER feature class code
    pub mtfcc: Option<String>,

    /// Functional status
    pub funcstat: Option<String>,

    /// Land area (square meters)
    pub aland: Option<i64>,
    /// Water area (square meters)
    pub awater: Option<i64>,

    pub intptlat: f32,
    pub intptlon: f32,

    #[serde(alias = "WKT", default)]
    pub geom: Option<Geometry>,
}

impl Record for Bg {
    const LAYER: Layer = Layer::Bg;

    fn limited_fields(&self) -> Vec<(&'static FieldLimit, Option<&str>)> {
        vec![
            (&NAMELSAD, self.namelsad.as_deref()),
            (&MTFCC, self.mtfcc.as_deref()),
        ]
    }

    fn internal_point_latlon(&self) -> (f32, f32) {
        (self.intptlat, self.intptlon)
    }

    fn geometry(&self) -> Option<&Geometry> {
        self.geom.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ValidationError;

    fn block_group(namelsad: &str) -> Bg {
        Bg {
            statefp: Some(1),
            countyfp: Some(1),
            tractce: Some(20100),
            blkgrpce: Some(1),
            geoid: Some(10010201001),
            namelsad: Some(namelsad.to_string()),
            mtfcc: Some("G5030".to_string()),
            funcstat: Some("S".to_string()),
            aland: Some(4264299),
            awater: Some(28435),
            intptlat: 32.4771112,
            intptlon: -86.4903033,
            geom: None,
        }
    }

    #[test]
    fn test_namelsad_at_limit_passes() {
        let bg = block_group("Block Group 1");
        assert_eq!(bg.namelsad.as_deref().map(str::len), Some(13));
        assert!(bg.validate().is_ok());
    }

    #[test]
    fn test_namelsad_over_limit_fails() {
        let bg = block_group("Block Group 12");
        let err = bg.validate().unwrap_err();
        assert_eq!(
            err.errors(),
            &[ValidationError::TooLong {
                field: "NAMELSAD",
                max_len: 13,
                actual: 14
            }]
        );
    }

    #[test]
    fn test_missing_codes_pass() {
        let bg = Bg::default();
        assert!(bg.validate().is_ok());
    }

    #[test]
    fn test_mtfcc_over_limit_fails() {
        let mut bg = block_group("Block Group 1");
        bg.mtfcc = Some("G50301".to_string());
        assert!(bg.validate().is_err());
    }

    #[test]
    fn test_serialized_names_match_schema() {
        let value = serde_json::to_value(block_group("Block Group 1")).unwrap();
        let obj = value.as_object().unwrap();
        for key in [
            "STATEFP", "COUNTYFP", "TRACTCE", "BLKGRPCE", "GEOID", "NAMELSAD", "MTFCC",
            "FUNCSTAT", "ALAND", "AWATER", "INTPTLAT", "INTPTLON", "GEOM",
        ] {
            assert!(obj.contains_key(key), "missing {}", key);
        }
        assert_eq!(obj.len(), 13);
    }

    #[test]
    fn test_internal_point_is_lon_lat() {
        let point = block_group("Block Group 1").internal_point();
        assert!((point.x() - -86.4903033).abs() < 1e-4);
        assert!((point.y() - 32.4771112).abs() < 1e-4);
    }
}
