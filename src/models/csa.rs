//! Combined statistical area (`tl_<year>_us_csa`).

use serde::{Deserialize, Serialize};

use super::validate::FieldLimit;
use super::{Geometry, Layer, Record};

static NAME: FieldLimit = FieldLimit::new("NAME", 58);
static NAMELSAD: FieldLimit = FieldLimit::new("NAMELSAD", 62);
static LSAD: FieldLimit = FieldLimit::new("LSAD", 2);
static MTFCC: FieldLimit = FieldLimit::new("MTFCC", 5);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct Csa {
    pub csafp: Option<i16>,
    pub geoid: Option<i16>,
    pub name: Option<String>,
    pub namelsad: Option<String>,
    /// Legal/statistical area description code
    pub lsad: Option<String>,
    pub mtfcc: Option<String>,
    pub aland: Option<i64>,
    pub awater: Option<i64>,
    pub intptlat: f32,
    pub intptlon: f32,
    #[serde(alias = "WKT", default)]
    pub geom: Option<Geometry>,
}

impl Record for Csa {
    const LAYER: Layer = Layer::Csa;

    fn limited_fields(&self) -> Vec<(&'static FieldLimit, Option<&str>)> {
        vec![
            (&NAME, self.name.as_deref()),
            (&NAMELSAD, self.namelsad.as_deref()),
            (&LSAD, self.lsad.as_deref()),
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

    fn csa() -> Csa {
        Csa {
            csafp: Some(122),
            geoid: Some(122),
            name: Some("Atlanta--Athens-Clarke County--Sandy Springs, GA-AL".to_string()),
            namelsad: Some(
                "Atlanta--Athens-Clarke County--Sandy Springs, GA-AL CSA".to_string(),
            ),
            lsad: Some("M0".to_string()),
            mtfcc: Some("G3100".to_string()),
            aland: Some(28538364568),
            awater: Some(501963434),
            intptlat: 33.6931,
            intptlon: -84.3994,
            geom: Some(Geometry::new("MULTIPOLYGON EMPTY")),
        }
    }

    #[test]
    fn test_valid_csa() {
        assert!(csa().validate().is_ok());
    }

    #[test]
    fn test_reports_every_violation() {
        let mut record = csa();
        record.name = Some("N".repeat(59));
        record.lsad = Some("M01".to_string());
        let err = record.validate().unwrap_err();
        assert_eq!(err.errors().len(), 2);
        assert!(err.to_string().contains("NAME's length must be 58 characters or less"));
        assert!(err.to_string().contains("LSAD's length must be 2 characters or less"));
    }

    #[test]
    fn test_name_limits() {
        let mut record = csa();
        record.name = Some("N".repeat(58));
        record.namelsad = Some("N".repeat(62));
        assert!(record.validate().is_ok());
        record.namelsad = Some("N".repeat(63));
        assert!(record.validate().is_err());
    }
}
