//! C6: per-plot soil-moisture-deficit recursion (spec.md §4.6).
//!
//! Stress regimes are encoded as tagged variants per spec.md §9 ("do not
//! rely on integer constants 0/1/2/3 at the call site").

use crate::config::SMD_INITIAL_MM;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoilStressRegime {
    /// Ke == 0: the soil-evaporation channel is inactive.
    Inactive,
    BelowRew,
    BetweenRewAndTew,
    AboveTew,
}

pub fn classify_soil_regime(ke: f64, smd_shifted_mm: f64, rew_mm: f64, tew_mm: f64) -> SoilStressRegime {
    if ke == 0.0 {
        SoilStressRegime::Inactive
    } else if smd_shifted_mm < rew_mm {
        SoilStressRegime::BelowRew
    } else if smd_shifted_mm < tew_mm {
        SoilStressRegime::BetweenRewAndTew
    } else {
        SoilStressRegime::AboveTew
    }
}

pub fn ks_soil(regime: SoilStressRegime, smd_shifted_mm: f64, rew_mm: f64, tew_mm: f64) -> f64 {
    match regime {
        SoilStressRegime::BelowRew => 1.0,
        SoilStressRegime::BetweenRewAndTew => (tew_mm - smd_shifted_mm) / (tew_mm - rew_mm),
        SoilStressRegime::Inactive | SoilStressRegime::AboveTew => 0.0,
    }
}

/// `AE_soil`, spec.md §4.6. `final_evap_red` is the area-weighted
/// evaporation-reduction factor from conservation practices (1 when none).
pub fn ae_soil(regime: SoilStressRegime, ks_soil: f64, peff_mm: f64, es_mm: f64, final_evap_red: f64) -> f64 {
    if regime == SoilStressRegime::BelowRew || peff_mm > es_mm {
        es_mm * final_evap_red
    } else if regime == SoilStressRegime::BetweenRewAndTew && peff_mm < es_mm {
        (peff_mm + ks_soil * (es_mm - peff_mm)) * final_evap_red
    } else if regime == SoilStressRegime::AboveTew && peff_mm < es_mm {
        peff_mm * final_evap_red
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropStressRegime {
    /// Kc == 0: no crop growing this plot today.
    Inactive,
    BelowRaw,
    BetweenRawAndTaw,
    AboveTaw,
}

pub fn classify_crop_regime(kc: f64, smd_shifted_mm: f64, raw_mm: f64, taw_mm: f64) -> CropStressRegime {
    if kc == 0.0 {
        CropStressRegime::Inactive
    } else if smd_shifted_mm < raw_mm {
        CropStressRegime::BelowRaw
    } else if smd_shifted_mm < taw_mm {
        CropStressRegime::BetweenRawAndTaw
    } else {
        CropStressRegime::AboveTaw
    }
}

pub fn ks_crop(regime: CropStressRegime, smd_shifted_mm: f64, raw_mm: f64, taw_mm: f64) -> f64 {
    match regime {
        CropStressRegime::BelowRaw => 1.0,
        CropStressRegime::BetweenRawAndTaw => (taw_mm - smd_shifted_mm) / (taw_mm - raw_mm),
        CropStressRegime::Inactive | CropStressRegime::AboveTaw => 0.0,
    }
}

/// `AE_crop`, spec.md §4.6.
pub fn ae_crop(regime: CropStressRegime, ks_crop: f64, peff_mm: f64, etc_mm: f64) -> f64 {
    if regime == CropStressRegime::BelowRaw || peff_mm > etc_mm {
        etc_mm
    } else if regime == CropStressRegime::BetweenRawAndTaw && peff_mm < etc_mm {
        peff_mm + ks_crop * (etc_mm - peff_mm)
    } else if regime == CropStressRegime::AboveTaw && peff_mm < etc_mm {
        peff_mm
    } else {
        0.0
    }
}

/// Inputs for one plot on one simulation day.
#[derive(Debug, Clone, Copy)]
pub struct PlotDayInputs {
    pub kc: f64,
    pub ke: f64,
    pub etc_mm: f64,
    pub es_mm: f64,
    pub peff_mm: f64,
    pub taw_mm: f64,
    pub raw_mm: f64,
    pub tew_mm: f64,
    pub rew_mm: f64,
    pub final_evap_red: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct PlotDayOutput {
    pub smd_mm: f64,
    pub ae_soil_mm: f64,
    pub ae_crop_mm: f64,
    pub gwnr_mm: f64,
}

/// One recursion step: `SMD_i = max(0, SMD_{i-1} + AE_soil + AE_crop - Peff)`
/// and natural recharge on saturation (spec.md §4.6).
pub fn step_plot_smd(prev_smd_mm: f64, inputs: &PlotDayInputs) -> PlotDayOutput {
    let soil_regime = classify_soil_regime(inputs.ke, prev_smd_mm, inputs.rew_mm, inputs.tew_mm);
    let ks_s = ks_soil(soil_regime, prev_smd_mm, inputs.rew_mm, inputs.tew_mm);
    let ae_s = ae_soil(soil_regime, ks_s, inputs.peff_mm, inputs.es_mm, inputs.final_evap_red);

    let crop_regime = classify_crop_regime(inputs.kc, prev_smd_mm, inputs.raw_mm, inputs.taw_mm);
    let ks_c = ks_crop(crop_regime, prev_smd_mm, inputs.raw_mm, inputs.taw_mm);
    let ae_c = ae_crop(crop_regime, ks_c, inputs.peff_mm, inputs.etc_mm);

    let balance = prev_smd_mm + ae_s + ae_c - inputs.peff_mm;
    let smd = balance.max(0.0);
    let gwnr = if smd == 0.0 { balance.abs() } else { 0.0 };

    PlotDayOutput {
        smd_mm: smd,
        ae_soil_mm: ae_s,
        ae_crop_mm: ae_c,
        gwnr_mm: gwnr,
    }
}

/// Runs the strict sequential recursion over a full daily series for one
/// plot, starting from `SMD_0 = 0` (spec.md §3).
pub fn run_plot_smd_recursion(daily_inputs: &[PlotDayInputs]) -> Vec<PlotDayOutput> {
    let mut out = Vec::with_capacity(daily_inputs.len());
    let mut prev_smd = SMD_INITIAL_MM;
    for inputs in daily_inputs {
        let step = step_plot_smd(prev_smd, inputs);
        prev_smd = step.smd_mm;
        out.push(step);
    }
    out
}

/// IWR per crop per day: `max(0, ETc - AE_crop)`.
pub fn iwr(etc_mm: f64, ae_crop_mm: f64) -> f64 {
    (etc_mm - ae_crop_mm).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotone_smd_when_no_flux() {
        let inputs = PlotDayInputs {
            kc: 0.0,
            ke: 0.0,
            etc_mm: 0.0,
            es_mm: 0.0,
            peff_mm: 0.0,
            taw_mm: 100.0,
            raw_mm: 50.0,
            tew_mm: 27.0,
            rew_mm: 10.8,
            final_evap_red: 1.0,
        };
        let out = step_plot_smd(30.0, &inputs);
        assert_eq!(out.smd_mm, 30.0);
    }

    #[test]
    fn test_saturation_implies_recharge() {
        let inputs = PlotDayInputs {
            kc: 0.0,
            ke: 0.0,
            etc_mm: 0.0,
            es_mm: 0.0,
            peff_mm: 50.0,
            taw_mm: 100.0,
            raw_mm: 50.0,
            tew_mm: 27.0,
            rew_mm: 10.8,
            final_evap_red: 1.0,
        };
        let out = step_plot_smd(10.0, &inputs);
        assert_eq!(out.smd_mm, 0.0);
        assert!(out.gwnr_mm > 0.0);
        assert!((out.gwnr_mm - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_recharge_when_not_saturated() {
        let inputs = PlotDayInputs {
            kc: 0.0,
            ke: 0.0,
            etc_mm: 0.0,
            es_mm: 0.0,
            peff_mm: 0.0,
            taw_mm: 100.0,
            raw_mm: 50.0,
            tew_mm: 27.0,
            rew_mm: 10.8,
            final_evap_red: 1.0,
        };
        let out = step_plot_smd(10.0, &inputs);
        assert_eq!(out.gwnr_mm, 0.0);
    }

    #[test]
    fn test_iwr_floor_zero() {
        assert_eq!(iwr(3.0, 5.0), 0.0);
        assert_eq!(iwr(5.0, 3.0), 2.0);
    }
}
