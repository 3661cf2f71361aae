//! Terrain classification from point elevation.

use serde::{Deserialize, Serialize};

/// Coarse terrain class at an impact site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainClass {
    Ocean,
    Coastal,
    Lowland,
    Highland,
    Mountain,
}

impl TerrainClass {
    /// Classifies a site by elevation in meters; `None` means no land data.
    pub fn from_elevation(elevation_m: Option<f64>) -> Self {
        match elevation_m {
            None => TerrainClass::Ocean,
            Some(e) if e <= 0.0 => TerrainClass::Ocean,
            Some(e) if e < 10.0 => TerrainClass::Coastal,
            Some(e) if e < 500.0 => TerrainClass::Lowland,
            Some(e) if e < 2000.0 => TerrainClass::Highland,
            Some(_) => TerrainClass::Mountain,
        }
    }

    /// Typical density of the target material in kg/m³.
    pub fn target_density_kg_m3(&self) -> f64 {
        match self {
            TerrainClass::Ocean => 1000.0,
            TerrainClass::Coastal => 2000.0,
            TerrainClass::Lowland => 2500.0,
            TerrainClass::Highland => 2700.0,
            TerrainClass::Mountain => 2750.0,
        }
    }

    /// Dominant rock type label.
    pub fn rock_type(&self) -> &'static str {
        match self {
            TerrainClass::Ocean => "water over oceanic basalt",
            TerrainClass::Coastal => "unconsolidated sediment",
            TerrainClass::Lowland => "sedimentary rock",
            TerrainClass::Highland => "crystalline rock",
            TerrainClass::Mountain => "granite",
        }
    }

    /// Multiplier applied to economic loss per affected km².
    pub fn economic_multiplier(&self) -> f64 {
        match self {
            TerrainClass::Ocean => 0.2,
            TerrainClass::Coastal => 1.5,
            TerrainClass::Lowland => 1.0,
            TerrainClass::Highland => 0.8,
            TerrainClass::Mountain => 0.5,
        }
    }

    pub fn is_ocean(&self) -> bool {
        matches!(self, TerrainClass::Ocean)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TerrainClass::Ocean => "ocean",
            TerrainClass::Coastal => "coastal",
            TerrainClass::Lowland => "lowland",
            TerrainClass::Highland => "highland",
            TerrainClass::Mountain => "mountain",
        }
    }
}

impl std::fmt::Display for TerrainClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
