//! C3: soil profile & capacity computer (spec.md §4.3).

use crate::config::{HydrologicSoilClass, SoilTexture, THETA_FC_MM_PER_M, THETA_WP_MM_PER_M, ZE_M};

#[derive(Debug, Clone, Copy)]
pub struct SoilLayer {
    pub texture: SoilTexture,
    pub hsc: HydrologicSoilClass,
    pub depth_m: f64,
    pub share_pct: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct SoilProfile {
    pub layer1: SoilLayer,
    pub layer2: SoilLayer,
}

/// A single conservation practice touching soil moisture (Cover, Mulching,
/// BBF, Bunds, Tillage), with its area and soil-moisture retention factor
/// (percent; 100 in the baseline configuration).
#[derive(Debug, Clone, Copy)]
pub struct SoilConservationPractice {
    pub area_ha: f64,
    pub sm_factor_pct: f64,
}

/// Weighted two-layer AWC capacity, spec.md §4.3: `Σ (depth·AWC·share)/100`.
pub fn calc_awc_capacity(profile: &SoilProfile) -> f64 {
    (profile.layer1.depth_m * profile.layer1.texture.awc() * profile.layer1.share_pct
        + profile.layer2.depth_m * profile.layer2.texture.awc() * profile.layer2.share_pct)
        / 100.0
}

/// Final per-plot capacity, blending untreated-area AWC (scaled by
/// `with_out_soil_con_pct/100`) with conservation-practice-treated-area AWC.
/// Baseline (no practices, `with_out_soil_con_pct = 100`) reduces to
/// `awc_capacity` unchanged.
pub fn calc_capacity(
    awc_capacity: f64,
    with_out_soil_con_pct: f64,
    practices: &[SoilConservationPractice],
    total_crop_area_ha: f64,
) -> f64 {
    let untreated_awc = awc_capacity * with_out_soil_con_pct / 100.0;
    if total_crop_area_ha <= 0.0 {
        return untreated_awc;
    }

    let treated_area: f64 = practices.iter().map(|p| p.area_ha).sum();
    if treated_area <= 0.0 {
        return untreated_awc;
    }

    let weighted_sm: f64 = practices
        .iter()
        .map(|p| p.area_ha * p.sm_factor_pct)
        .sum::<f64>()
        / treated_area;
    let treated_awc = awc_capacity * weighted_sm / 100.0;
    let untreated_area = (total_crop_area_ha - treated_area).max(0.0);

    (treated_area * treated_awc + untreated_area * untreated_awc) / total_crop_area_ha
}

/// `TEW = (theta_FC - 0.5*theta_WP) * Ze`, `REW = 0.4*TEW` — constants, not
/// plot-dependent, but kept here as a struct computed once and shared by
/// every plot (and the fallow recursion via row-mean, which for a constant
/// is itself).
#[derive(Debug, Clone, Copy)]
pub struct SurfaceEvapDepths {
    pub tew_mm: f64,
    pub rew_mm: f64,
}

pub fn calc_surface_evap_depths() -> SurfaceEvapDepths {
    let tew = (THETA_FC_MM_PER_M - 0.5 * THETA_WP_MM_PER_M) * ZE_M;
    SurfaceEvapDepths {
        tew_mm: tew,
        rew_mm: 0.4 * tew,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RootZoneDepths {
    pub taw_mm: f64,
    pub raw_mm: f64,
}

/// `TAW = capacity * crop_rd`, `RAW = final_depletion * TAW`.
pub fn calc_root_zone_depths(capacity: f64, crop_rd_m: f64, final_depletion: f64) -> RootZoneDepths {
    let taw = capacity * crop_rd_m;
    RootZoneDepths {
        taw_mm: taw,
        raw_mm: final_depletion * taw,
    }
}

/// Fallow REW/TEW are the row-mean of per-plot values (spec.md §4.3).
pub fn fallow_surface_evap_depths(per_plot: &[SurfaceEvapDepths]) -> SurfaceEvapDepths {
    if per_plot.is_empty() {
        return calc_surface_evap_depths();
    }
    let n = per_plot.len() as f64;
    SurfaceEvapDepths {
        tew_mm: per_plot.iter().map(|d| d.tew_mm).sum::<f64>() / n,
        rew_mm: per_plot.iter().map(|d| d.rew_mm).sum::<f64>() / n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HydrologicSoilClass as Hsc, SoilTexture as Tex};

    #[test]
    fn test_awc_capacity_clay_loam_blend() {
        let profile = SoilProfile {
            layer1: SoilLayer {
                texture: Tex::Clay,
                hsc: Hsc::Good,
                depth_m: 0.5,
                share_pct: 60.0,
            },
            layer2: SoilLayer {
                texture: Tex::Loam,
                hsc: Hsc::Good,
                depth_m: 0.5,
                share_pct: 40.0,
            },
        };
        let cap = calc_awc_capacity(&profile);
        let expected = (0.5 * 215.0 * 60.0 + 0.5 * 175.0 * 40.0) / 100.0;
        assert!((cap - expected).abs() < 1e-9);
    }

    #[test]
    fn test_capacity_with_no_practices_is_untreated_scaled() {
        let cap = calc_capacity(100.0, 100.0, &[], 50.0);
        assert!((cap - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_tew_rew_constants() {
        let d = calc_surface_evap_depths();
        assert!((d.tew_mm - 27.0).abs() < 1e-9);
        assert!((d.rew_mm - 10.8).abs() < 1e-9);
    }
}
