//! TIGER/Line record models.
//!
//! Plain rows as the converter writes them. Each model knows its layer and
//! the maximum lengths of its string columns; nothing here touches the
//! database.

pub mod bg;
pub mod csa;
pub mod geometry;
pub mod layer;
pub mod validate;
pub mod zcta5;

use geo_types::Point;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub use bg::Bg;
pub use csa::Csa;
pub use geometry::Geometry;
pub use layer::{Layer, LayerError};
pub use validate::{FieldLimit, ValidationError, ValidationErrors};
pub use zcta5::Zcta5;

/// A row of one TIGER/Line layer
pub trait Record: DeserializeOwned + Serialize + Send + 'static {
    const LAYER: Layer;

    /// Length-limited string columns paired with their current values
    fn limited_fields(&self) -> Vec<(&'static FieldLimit, Option<&str>)>;

    /// `(INTPTLAT, INTPTLON)`
    fn internal_point_latlon(&self) -> (f32, f32);

    fn geometry(&self) -> Option<&Geometry>;

    /// Check all declared maximum lengths. Absent values always pass.
    fn validate(&self) -> Result<(), ValidationErrors> {
        validate::check_all(self.limited_fields())
    }

    /// Internal point as a lon/lat point
    fn internal_point(&self) -> Point<f64> {
        let (lat, lon) = self.internal_point_latlon();
        Point::new(f64::from(lon), f64::from(lat))
    }
}
