//! Process-wide physical constants (spec.md §6, §9). Read-only; never a
//! mutable global. Per-scenario parameters that interventions can touch live
//! in the typed structs built by `io::kv`, not here.

/// Soil texture, shared by both soil layers and by the crop database lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum SoilTexture {
    Sand,
    SandyLoam,
    Loam,
    ClayeyLoam,
    Clay,
}

impl SoilTexture {
    /// Available water capacity lookup, mm/m.
    pub fn awc(self) -> f64 {
        match self {
            SoilTexture::Sand => 90.0,
            SoilTexture::SandyLoam => 125.0,
            SoilTexture::Loam => 175.0,
            SoilTexture::ClayeyLoam => 200.0,
            SoilTexture::Clay => 215.0,
        }
    }
}

/// Hydrologic soil class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum HydrologicSoilClass {
    Poor,
    Good,
}

impl HydrologicSoilClass {
    pub fn as_str(self) -> &'static str {
        match self {
            HydrologicSoilClass::Poor => "Poor",
            HydrologicSoilClass::Good => "Good",
        }
    }
}

pub const THETA_FC_MM_PER_M: f64 = 420.0;
pub const THETA_WP_MM_PER_M: f64 = 300.0;
pub const ZE_M: f64 = 0.1;

pub const CN2_BUILT: f64 = 90.0;
pub const CN2_WATER: f64 = 0.0;
pub const CN2_PASTURE: f64 = 79.0;
pub const CN2_FOREST: f64 = 70.0;

/// Ia/S, identical at every AMC class.
pub const IA_COEFF: f64 = 0.2;

pub const K_GWR: f64 = 0.13;

pub const DEFAULT_IRRIGATION_EFFICIENCY_PCT: f64 = 50.0;
pub const DEFAULT_EFF_WATER_SAVED_PCT: f64 = 0.0;

pub const SMD_INITIAL_MM: f64 = 0.0;

/// Soil-evaporation coefficient for fallow/non-crop land. Kc_Fallow is
/// always 0, which forces Ke_Fallow to 1.05 (see `calc_ke` in the
/// original); see spec.md §9, last bullet.
pub const KE_FALLOW: f64 = 1.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Climate {
    SemiArid,
    Temperate,
}

impl Climate {
    /// KEI lookup (spec.md §6).
    pub fn kei(self) -> f64 {
        match self {
            Climate::SemiArid => 1.05,
            Climate::Temperate => 1.10,
        }
    }
}

/// Per-crop-name return-flow fraction pair (GW, SW), spec.md §4.9.
pub fn return_flow_fractions(crop_name: &str) -> (f64, f64) {
    if crop_name.eq_ignore_ascii_case("rice") {
        (0.325, 0.375)
    } else {
        (0.15, 0.20)
    }
}
