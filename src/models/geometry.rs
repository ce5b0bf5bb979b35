use serde::{Deserialize, Serialize};

/// Boundary geometry as produced by the converter (WKT, EWKT or hex WKB).
///
/// Stored and handed back unchanged; never parsed here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Geometry(String);

impl Geometry {
    pub fn new(payload: impl Into<String>) -> Self {
        Self(payload.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}
