//! TIGER/Line layer detection from file names.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// TIGER/Line product a file belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    /// Block groups
    Bg,
    /// Combined statistical areas
    Csa,
    /// 5-digit ZIP code tabulation areas
    Zcta5,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayerError {
    #[error("'{0}' is not a recognised TIGER/Line shapefile name (expected e.g. tl_2020_01_bg.shp)")]
    UnrecognizedFileName(String),

    #[error("Unknown layer '{0}'. Expected one of: bg, csa, zcta5")]
    UnknownLayer(String),
}

fn tiger_file_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // tl_<vintage>_<state fips | us>_<product>, e.g. tl_2020_us_zcta510.
        // Only the 2010-vintage ZCTA columns are modelled, so zcta520 is not matched.
        Regex::new(r"(?i)^tl_\d{4}_[a-z0-9]+_(bg|csa|zcta5(?:10)?)$")
            .expect("TIGER/Line file name regex is valid")
    })
}

impl Layer {
    pub fn all() -> &'static [Layer] {
        &[Layer::Bg, Layer::Csa, Layer::Zcta5]
    }

    /// Database table the converter loads this layer into
    pub fn table_name(&self) -> &'static str {
        match self {
            Layer::Bg => "bg",
            Layer::Csa => "csa",
            Layer::Zcta5 => "zcta5",
        }
    }

    /// Work out the layer from a TIGER/Line file name such as `tl_2020_us_zcta510.shp`
    pub fn detect(path: &Path) -> Result<Layer, LayerError> {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let product = tiger_file_regex()
            .captures(&stem)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_ascii_lowercase())
            .ok_or_else(|| LayerError::UnrecognizedFileName(path.display().to_string()))?;

        if product == "bg" {
            Ok(Layer::Bg)
        } else if product == "csa" {
            Ok(Layer::Csa)
        } else {
            Ok(Layer::Zcta5)
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

impl FromStr for Layer {
    type Err = LayerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bg" => Ok(Layer::Bg),
            "csa" => Ok(Layer::Csa),
            "zcta5" | "zcta" => Ok(Layer::Zcta5),
            _ => Err(LayerError::UnknownLayer(s.to_string())),
        }
    }
}
