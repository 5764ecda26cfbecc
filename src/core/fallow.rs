//! C7: fallow SMD recursion (spec.md §4.7) — a second independent SMD
//! recursion over fallow/built/water/pasture/forest land, with Kc=0 always
//! (so Ke=1.05 always; this is load-bearing per spec.md §9's last bullet:
//! any change to Kc_Fallow breaks this bucket) and no evaporation-reduction
//! multiplier.

use crate::config::KE_FALLOW;
use crate::core::smd::{ae_soil, classify_soil_regime, ks_soil, PlotDayOutput};

#[derive(Debug, Clone, Copy)]
pub struct FallowDayInputs {
    pub etoi_mm: f64,
    pub peff_mm: f64,
    pub tew_mm: f64,
    pub rew_mm: f64,
}

/// `ES_Fallow = EToi * Ke_Fallow`.
pub fn es_fallow(etoi_mm: f64) -> f64 {
    etoi_mm * KE_FALLOW
}

pub fn step_fallow_smd(prev_smd_mm: f64, inputs: &FallowDayInputs) -> PlotDayOutput {
    let es = es_fallow(inputs.etoi_mm);
    let regime = classify_soil_regime(KE_FALLOW, prev_smd_mm, inputs.rew_mm, inputs.tew_mm);
    let ks_s = ks_soil(regime, prev_smd_mm, inputs.rew_mm, inputs.tew_mm);
    let ae_s = ae_soil(regime, ks_s, inputs.peff_mm, es, 1.0);

    let balance = prev_smd_mm + ae_s - inputs.peff_mm;
    let smd = balance.max(0.0);
    let gwnr = if smd == 0.0 { balance.abs() } else { 0.0 };

    PlotDayOutput {
        smd_mm: smd,
        ae_soil_mm: ae_s,
        ae_crop_mm: 0.0,
        gwnr_mm: gwnr,
    }
}

/// Continuous carry-over across years: the reference's "September 1 reset"
/// is commented out (spec.md §9), so SMD_Fallow is never reset mid-series.
pub fn run_fallow_smd_recursion(daily_inputs: &[FallowDayInputs]) -> Vec<PlotDayOutput> {
    let mut out = Vec::with_capacity(daily_inputs.len());
    let mut prev_smd = crate::config::SMD_INITIAL_MM;
    for inputs in daily_inputs {
        let step = step_fallow_smd(prev_smd, inputs);
        prev_smd = step.smd_mm;
        out.push(step);
    }
    out
}

/// Area-weighted daily recharge across plots and fallow land, spec.md §4.7.
/// `crop_area_total` is the sum of crop *total* areas (not sown areas).
pub fn area_weighted_recharge(
    plot_gwnr_and_nsa: &[(f64, f64)],
    fallow_gwnr_mm: f64,
    fallow_area_recharge_ha: f64,
    crop_area_total_ha: f64,
) -> f64 {
    let numerator: f64 = plot_gwnr_and_nsa.iter().map(|(gwnr, nsa)| gwnr * nsa).sum::<f64>()
        + fallow_area_recharge_ha * fallow_gwnr_mm;
    let denominator = crop_area_total_ha + fallow_area_recharge_ha;
    crate::error::safe_divide(numerator, denominator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_es_fallow_uses_ke_1_05() {
        assert!((es_fallow(5.0) - 5.25).abs() < 1e-9);
    }

    #[test]
    fn test_fallow_smd_increases_when_dry() {
        let inputs = FallowDayInputs {
            etoi_mm: 5.0,
            peff_mm: 0.0,
            tew_mm: 27.0,
            rew_mm: 10.8,
        };
        let step = step_fallow_smd(0.0, &inputs);
        assert!(step.smd_mm > 0.0);
        assert_eq!(step.ae_crop_mm, 0.0);
    }

    #[test]
    fn test_area_weighted_recharge_matches_manual_computation() {
        let r = area_weighted_recharge(&[(10.0, 5.0)], 2.0, 3.0, 5.0);
        // (10*5 + 3*2) / (5+3) = 56/8 = 7
        assert!((r - 7.0).abs() < 1e-9);
    }
}
