//! 5-digit ZIP code tabulation area, 2010 vintage columns (`tl_<year>_us_zcta510`).

use serde::{Deserialize, Serialize};

use super::validate::FieldLimit;
use super::{Geometry, Layer, Record};

static CLASSFP10: FieldLimit = FieldLimit::new("CLASSFP10", 2);
static MTFCC10: FieldLimit = FieldLimit::new("MTFCC10", 5);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct Zcta5 {
    pub zcta5ce10: Option<i32>,
    pub geoid10: Option<i32>,
    pub classfp10: Option<String>,
    pub mtfcc10: Option<String>,
    pub funcstat10: Option<String>,
    pub aland10: Option<i64>,
    pub awater10: Option<i64>,
    pub intptlat10: f32,
    pub intptlon10: f32,
    #[serde(alias = "WKT", default)]
    pub geom: Option<Geometry>,
}

impl Record for Zcta5 {
    const LAYER: Layer = Layer::Zcta5;

    fn limited_fields(&self) -> Vec<(&'static FieldLimit, Option<&str>)> {
        vec![
            (&CLASSFP10, self.classfp10.as_deref()),
            (&MTFCC10, self.mtfcc10.as_deref()),
        ]
    }

    fn internal_point_latlon(&self) -> (f32, f32) {
        (self.intptlat10, self.intptlon10)
    }

    fn geometry(&self) -> Option<&Geometry> {
        self.geom.as_ref()
    }
}
