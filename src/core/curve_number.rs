//! C4: curve-number computer (spec.md §4.4).

use std::collections::HashMap;

use crate::config::SoilTexture;
use crate::error::safe_divide;

/// The crop database's cascading CN2 lookup (spec.md §4.4): exact match on
/// (cover, treatment, HSC, texture), falling back to dropping treatment,
/// then dropping HSC too, then a hardcoded cover×texture default table,
/// finally 0.
#[derive(Debug, Default)]
pub struct CropCnDatabase {
    full: HashMap<(String, String, String, SoilTextureKey), f64>,
    by_cover_hsc_texture: HashMap<(String, String, SoilTextureKey), f64>,
    by_cover_texture: HashMap<(String, SoilTextureKey), f64>,
    hardcoded_defaults: HashMap<(String, SoilTextureKey), f64>,
}

type SoilTextureKey = SoilTexture;

impl CropCnDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_full(&mut self, cover: &str, treatment: &str, hsc: &str, texture: SoilTexture, cn2: f64) {
        self.full
            .insert((cover.to_string(), treatment.to_string(), hsc.to_string(), texture), cn2);
        self.by_cover_hsc_texture
            .entry((cover.to_string(), hsc.to_string(), texture))
            .or_insert(cn2);
        self.by_cover_texture
            .entry((cover.to_string(), texture))
            .or_insert(cn2);
    }

    pub fn insert_hardcoded_default(&mut self, cover: &str, texture: SoilTexture, cn2: f64) {
        self.hardcoded_defaults.insert((cover.to_string(), texture), cn2);
    }

    pub fn lookup(&self, cover: &str, treatment: &str, hsc: &str, texture: SoilTexture) -> f64 {
        if let Some(v) = self
            .full
            .get(&(cover.to_string(), treatment.to_string(), hsc.to_string(), texture))
        {
            return *v;
        }
        if let Some(v) = self.by_cover_hsc_texture.get(&(cover.to_string(), hsc.to_string(), texture)) {
            return *v;
        }
        if let Some(v) = self.by_cover_texture.get(&(cover.to_string(), texture)) {
            return *v;
        }
        if let Some(v) = self.hardcoded_defaults.get(&(cover.to_string(), texture)) {
            return *v;
        }
        0.0
    }
}

/// Two-layer blend: `Actual_CN2 = (dist1*CN2_layer1 + dist2*CN2_layer2)/100`.
pub fn actual_cn2(cn2_layer1: f64, dist1_pct: f64, cn2_layer2: f64, dist2_pct: f64) -> f64 {
    (dist1_pct * cn2_layer1 + dist2_pct * cn2_layer2) / 100.0
}

/// Per-crop intervention areas touching CN reduction (spec.md §4.4).
#[derive(Debug, Clone, Copy, Default)]
pub struct CnInterventionAreas {
    pub cover_ha: f64,
    pub mulching_ha: f64,
    pub bunds_ha: f64,
    pub tillage_ha: f64,
    pub bbf_ha: f64,
    pub tank_ha: f64,
}

impl CnInterventionAreas {
    pub fn total(&self) -> f64 {
        self.cover_ha + self.mulching_ha + self.bunds_ha + self.tillage_ha + self.bbf_ha + self.tank_ha
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CnInterventionReductions {
    pub cover_red: f64,
    pub mulching_red: f64,
    pub bunds_red: f64,
    pub tillage_red: f64,
    pub bbf_red: f64,
}

/// Intervention-adjusted per-crop CN2, spec.md §4.4. Tank-Desilting uses the
/// Tillage reduction constant.
pub fn crop_cn2_after_interventions(
    actual_cn2: f64,
    areas: CnInterventionAreas,
    reductions: CnInterventionReductions,
    crop_area_ha: f64,
) -> f64 {
    let total_int_area = areas.total();
    if total_int_area <= 0.0 {
        return actual_cn2;
    }
    let red_cn2 = (areas.cover_ha * reductions.cover_red
        + areas.mulching_ha * reductions.mulching_red
        + areas.bunds_ha * reductions.bunds_red
        + areas.tillage_ha * reductions.tillage_red
        + areas.bbf_ha * reductions.bbf_red
        + areas.tank_ha * reductions.tillage_red)
        / total_int_area;
    let cn2_crop = actual_cn2 - red_cn2;
    let no_int_area = (crop_area_ha - total_int_area).max(0.0);
    safe_divide(total_int_area * cn2_crop + no_int_area * actual_cn2, crop_area_ha)
}

/// Daily area-weighted consolidation of per-crop CN2 into a single sown-area
/// weighted value, clipped to ≤ 100.
pub fn consolidated_crop_cn2(sown_area_and_cn2: &[(f64, f64)]) -> f64 {
    let total_sown: f64 = sown_area_and_cn2.iter().map(|(a, _)| a).sum();
    if total_sown <= 0.0 {
        return 0.0;
    }
    let v = sown_area_and_cn2
        .iter()
        .map(|(a, cn2)| (a / total_sown) * cn2)
        .sum::<f64>();
    v.min(100.0)
}

/// Fixed fallow CN2 (database row index 4 per soil-texture column),
/// weighted by the two layers' area distributions.
pub fn fallow_cn2(fallow_cn_layer1: f64, dist1_pct: f64, fallow_cn_layer2: f64, dist2_pct: f64) -> f64 {
    (dist1_pct * fallow_cn_layer1 + dist2_pct * fallow_cn_layer2) / 100.0
}

/// Watershed land-use areas (ha) feeding the 6-term final CN2 blend.
#[derive(Debug, Clone, Copy)]
pub struct LulcAreas {
    pub built_ha: f64,
    pub water_ha: f64,
    pub pasture_ha: f64,
    pub forest_ha: f64,
    pub crop_area_ha: f64,
    pub fallow_area_ha: f64,
}

/// Final CN2 on day i: area-weighted sum over {Built, Water, Pasture,
/// Forest, Crop_Area, Fallow_Area}.
pub fn final_cn2(areas: LulcAreas, crop_cn2: f64, fallow_cn2: f64, total_area_ha: f64) -> f64 {
    use crate::config::{CN2_BUILT, CN2_FOREST, CN2_PASTURE, CN2_WATER};
    safe_divide(
        areas.built_ha * CN2_BUILT
            + areas.water_ha * CN2_WATER
            + areas.pasture_ha * CN2_PASTURE
            + areas.forest_ha * CN2_FOREST
            + areas.crop_area_ha * crop_cn2
            + areas.fallow_area_ha * fallow_cn2,
        total_area_ha,
    )
}

/// Williams slope adjustment, spec.md §4.4: `s = slope/100`.
pub fn cn2_adjusted(cn2: f64, slope_pct: f64) -> f64 {
    let s = slope_pct / 100.0;
    (cn2 * (1.9274 * s + 2.1327) / (s + 2.1791)).min(100.0)
}

/// Dry/wet siblings of CN2.
pub fn cn1_from_cn2(cn2: f64) -> f64 {
    safe_divide(cn2, 2.281 - 0.01281 * cn2)
}

pub fn cn3_from_cn2(cn2: f64) -> f64 {
    safe_divide(cn2, 0.427 + 0.00573 * cn2)
}

/// Antecedent Moisture Condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Amc {
    Dry,
    Average,
    Wet,
}

/// AMC classification, spec.md §4.4: thresholds differ depending on whether
/// any crop is non-dormant (sown) that day.
pub fn classify_amc(rain5_mm: f64, any_non_dormant: bool) -> Amc {
    if any_non_dormant {
        if rain5_mm < 36.0 {
            Amc::Dry
        } else if rain5_mm > 53.0 {
            Amc::Wet
        } else {
            Amc::Average
        }
    } else if rain5_mm < 13.0 {
        Amc::Dry
    } else if rain5_mm > 28.0 {
        Amc::Wet
    } else {
        Amc::Average
    }
}

pub fn select_cn(amc: Amc, cn1: f64, cn2: f64, cn3: f64) -> f64 {
    match amc {
        Amc::Dry => cn1,
        Amc::Average => cn2,
        Amc::Wet => cn3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SoilTexture as Tex;

    #[test]
    fn test_cascading_lookup_falls_back_to_hardcoded() {
        let mut db = CropCnDatabase::new();
        db.insert_hardcoded_default("Row Crop", Tex::Loam, 78.0);
        assert_eq!(db.lookup("Row Crop", "None", "Good", Tex::Loam), 78.0);
    }

    #[test]
    fn test_cascading_lookup_exact_match_wins() {
        let mut db = CropCnDatabase::new();
        db.insert_full("Row Crop", "Contoured", "Good", Tex::Loam, 72.0);
        db.insert_hardcoded_default("Row Crop", Tex::Loam, 78.0);
        assert_eq!(db.lookup("Row Crop", "Contoured", "Good", Tex::Loam), 72.0);
    }

    #[test]
    fn test_lookup_missing_everywhere_returns_zero() {
        let db = CropCnDatabase::new();
        assert_eq!(db.lookup("Nothing", "None", "Good", Tex::Sand), 0.0);
    }

    #[test]
    fn test_cn_siblings_ordering() {
        let cn2 = 80.0;
        let cn1 = cn1_from_cn2(cn2);
        let cn3 = cn3_from_cn2(cn2);
        assert!(cn1 <= cn2);
        assert!(cn2 <= cn3);
    }

    #[test]
    fn test_slope_adjustment_monotone() {
        let cn2 = 75.0;
        let a = cn2_adjusted(cn2, 1.0);
        let b = cn2_adjusted(cn2, 5.0);
        assert!(a <= b);
    }

    #[test]
    fn test_amc_classification_non_dormant_thresholds() {
        assert_eq!(classify_amc(10.0, true), Amc::Dry);
        assert_eq!(classify_amc(40.0, true), Amc::Average);
        assert_eq!(classify_amc(60.0, true), Amc::Wet);
    }

    #[test]
    fn test_amc_classification_dormant_thresholds() {
        assert_eq!(classify_amc(5.0, false), Amc::Dry);
        assert_eq!(classify_amc(20.0, false), Amc::Average);
        assert_eq!(classify_amc(30.0, false), Amc::Wet);
    }
}
