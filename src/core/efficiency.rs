//! C9: irrigation-efficiency mixer (spec.md §4.9).

use crate::error::safe_divide;

/// `base_eff = (GW_share*GW_eff + SW_share*SW_eff) / NetCropSownArea`.
/// Shares are areas (ha); efficiencies are fractions in [0,1] (already
/// divided by 100 by the caller, per spec.md §4.9).
pub fn base_efficiency(
    gw_share_ha: f64,
    gw_eff_frac: f64,
    sw_share_ha: f64,
    sw_eff_frac: f64,
    net_crop_sown_area_ha: f64,
) -> f64 {
    safe_divide(
        gw_share_ha * gw_eff_frac + sw_share_ha * sw_eff_frac,
        net_crop_sown_area_ha,
    )
}

/// Per-crop areas and efficiencies for the high-efficiency-equipment and
/// water-saving-practice bundles.
#[derive(Debug, Clone, Copy, Default)]
pub struct CropIntervention {
    pub drip_area_ha: f64,
    pub drip_eff_frac: f64,
    pub sprinkler_area_ha: f64,
    pub sprinkler_eff_frac: f64,
    pub bbf_area_ha: f64,
    pub bbf_eff_frac: f64,
    pub land_levelling_area_ha: f64,
    pub land_levelling_eff_frac: f64,
    pub dsr_area_ha: f64,
    pub dsr_eff_frac: f64,
    pub awd_area_ha: f64,
    pub awd_eff_frac: f64,
    pub sri_area_ha: f64,
    pub sri_eff_frac: f64,
    pub ridge_furrow_area_ha: f64,
    pub ridge_furrow_eff_frac: f64,
    pub deficit_area_ha: f64,
    pub deficit_eff_frac: f64,
}

impl CropIntervention {
    pub fn high_efficiency_area_ha(&self) -> f64 {
        self.drip_area_ha + self.sprinkler_area_ha + self.bbf_area_ha
    }

    pub fn high_efficiency_eff_frac(&self) -> f64 {
        let area = self.high_efficiency_area_ha();
        safe_divide(
            self.drip_area_ha * self.drip_eff_frac
                + self.sprinkler_area_ha * self.sprinkler_eff_frac
                + self.bbf_area_ha * self.bbf_eff_frac,
            area,
        )
    }

    pub fn water_saved_area_ha(&self) -> f64 {
        self.land_levelling_area_ha
            + self.dsr_area_ha
            + self.awd_area_ha
            + self.sri_area_ha
            + self.ridge_furrow_area_ha
            + self.deficit_area_ha
    }

    pub fn water_saved_eff_frac(&self) -> f64 {
        let area = self.water_saved_area_ha();
        safe_divide(
            self.land_levelling_area_ha * self.land_levelling_eff_frac
                + self.dsr_area_ha * self.dsr_eff_frac
                + self.awd_area_ha * self.awd_eff_frac
                + self.sri_area_ha * self.sri_eff_frac
                + self.ridge_furrow_area_ha * self.ridge_furrow_eff_frac
                + self.deficit_area_ha * self.deficit_eff_frac,
            area,
        )
    }
}

/// The per-crop efficiency pipeline result, spec.md §4.9.
#[derive(Debug, Clone, Copy)]
pub struct CropEfficiencyResult {
    pub overall_eff: f64,
    pub overall_water_saved_eff: f64,
    pub final_eff: f64,
}

/// Runs the per-crop efficiency blend. Returns `None` when
/// `irr_area_ha < high_efficiency_area_ha` (spec.md §4.9's NaN case).
pub fn crop_efficiency(
    intervention: &CropIntervention,
    base_eff: f64,
    irr_area_ha: f64,
    return_flow_frac: f64,
) -> Option<CropEfficiencyResult> {
    if irr_area_ha <= 0.0 {
        return Some(CropEfficiencyResult {
            overall_eff: 0.0,
            overall_water_saved_eff: 0.0,
            final_eff: 0.0,
        });
    }

    let he_area = intervention.high_efficiency_area_ha();
    if irr_area_ha < he_area {
        return None;
    }
    let area_without_intervention = irr_area_ha - he_area;
    let overall_eff =
        (he_area * intervention.high_efficiency_eff_frac() + area_without_intervention * base_eff) / irr_area_ha;

    let ws_area = intervention.water_saved_area_ha();
    let area_without_ws = irr_area_ha - ws_area;
    let overall_water_saved_eff =
        (ws_area * intervention.water_saved_eff_frac() + area_without_ws * overall_eff) / irr_area_ha;

    let eff_after_ws = overall_water_saved_eff;
    let final_eff = (1.0 - eff_after_ws) * return_flow_frac + eff_after_ws;

    Some(CropEfficiencyResult {
        overall_eff,
        overall_water_saved_eff,
        final_eff: if final_eff.is_finite() { final_eff } else { 0.0 },
    })
}

/// Combined per-crop return-flow fraction, weighted by GW/SW dependency
/// percentages (spec.md §4.9).
pub fn combined_return_flow(gw_dep_pct: f64, sw_dep_pct: f64, crop_name: &str) -> f64 {
    let (gw_rf, sw_rf) = crate::config::return_flow_fractions(crop_name);
    (gw_dep_pct / 100.0) * gw_rf + (sw_dep_pct / 100.0) * sw_rf
}

/// `Irr_water_need_c = (IWR_c/1000 * Irr_Area_c * 10000) / final_eff_c`, in m³.
pub fn irrigation_water_need_m3(iwr_mm: f64, irr_area_ha: f64, final_eff: f64) -> f64 {
    safe_divide((iwr_mm / 1000.0) * irr_area_ha * 10000.0, final_eff)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_efficiency_bundle_area_weighted() {
        let i = CropIntervention {
            drip_area_ha: 30.0,
            drip_eff_frac: 0.9,
            sprinkler_area_ha: 30.0,
            sprinkler_eff_frac: 0.7,
            ..Default::default()
        };
        let eff = i.high_efficiency_eff_frac();
        assert!((eff - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_none_when_irr_area_below_intervention_area() {
        let i = CropIntervention {
            drip_area_ha: 60.0,
            drip_eff_frac: 0.9,
            ..Default::default()
        };
        assert!(crop_efficiency(&i, 0.5, 50.0, 0.15).is_none());
    }

    #[test]
    fn test_drip_improves_final_eff_over_no_intervention() {
        let none = CropIntervention::default();
        let drip = CropIntervention {
            drip_area_ha: 60.0,
            drip_eff_frac: 0.9,
            ..Default::default()
        };
        let base = crop_efficiency(&none, 0.5, 60.0, 0.15).unwrap();
        let with_drip = crop_efficiency(&drip, 0.5, 60.0, 0.15).unwrap();
        assert!(with_drip.final_eff > base.final_eff);
    }

    #[test]
    fn test_irrigation_water_need_scales_with_area() {
        let small = irrigation_water_need_m3(10.0, 10.0, 0.5);
        let large = irrigation_water_need_m3(10.0, 20.0, 0.5);
        assert!((large - 2.0 * small).abs() < 1e-6);
    }
}
