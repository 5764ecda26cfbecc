//! Economics module — ambient stack, grounded on `Original/Economic.py`
//! (spec.md §1 lists it as an external collaborator; SPEC_FULL.md §10
//! brings it into this crate as an ordinary, non-core module).

use crate::error::{DrpfError, DrpfResult};

/// Number of replacement units needed over the project's economic life,
/// spec.md-adjacent: `ceil(economic_life / life_span)`, clamped to at least
/// 1 once the life span is exceeded, 0 when the life span is 0 or
/// non-finite.
pub fn number_of_units(current_economic_life_years: f64, life_span_years: f64) -> u32 {
    if life_span_years <= 0.0 || !life_span_years.is_finite() {
        return 0;
    }
    if current_economic_life_years - life_span_years <= 0.0 {
        1
    } else {
        (current_economic_life_years / life_span_years).ceil() as u32
    }
}

/// One intervention's cost record feeding the EAC/NPV pipeline.
#[derive(Debug, Clone, Copy)]
pub struct InterventionCost {
    pub volume_or_area: f64,
    pub cost_per_unit: f64,
    pub life_span_years: f64,
    pub maintenance_pct: f64,
}

pub fn capital_cost(cost: &InterventionCost) -> f64 {
    cost.volume_or_area * cost.cost_per_unit
}

/// Equalized Annual Cost via the capital-recovery-factor formula. Fatal
/// (`ZeroInEconomics`) when `interest_rate` or `time_period` is 0.
pub fn calculate_eac(total_capital_cost: f64, interest_rate_pct: f64, time_period_years: f64) -> DrpfResult<f64> {
    if interest_rate_pct == 0.0 {
        return Err(DrpfError::ZeroInEconomics("interest_rate"));
    }
    if time_period_years == 0.0 {
        return Err(DrpfError::ZeroInEconomics("time_period"));
    }
    let r = interest_rate_pct / 100.0;
    Ok((total_capital_cost * r) / (1.0 - (1.0 + r).powf(-time_period_years)))
}

pub fn calculate_maintenance_cost(eac: f64, maintenance_pct: f64, time_period_years: f64) -> f64 {
    eac * (maintenance_pct / 100.0) * time_period_years
}

/// Net Present Value of an intervention's full cost stream.
pub fn calc_npv(maintenance_cost: f64, eac: f64, interest_rate_pct: f64, time_period_years: f64) -> f64 {
    let r = interest_rate_pct / 100.0;
    maintenance_cost + (1.0 - 1.0 / (1.0 + r).powf(time_period_years)) * (eac / r)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_of_units_rounds_up() {
        assert_eq!(number_of_units(12.0, 5.0), 3);
        assert_eq!(number_of_units(10.0, 5.0), 2);
    }

    #[test]
    fn test_number_of_units_zero_life_span() {
        assert_eq!(number_of_units(12.0, 0.0), 0);
    }

    #[test]
    fn test_number_of_units_one_when_life_span_exceeds_economic_life() {
        assert_eq!(number_of_units(3.0, 20.0), 1);
    }

    #[test]
    fn test_eac_rejects_zero_interest_rate() {
        let err = calculate_eac(100_000.0, 0.0, 10.0).unwrap_err();
        assert!(matches!(err, DrpfError::ZeroInEconomics(_)));
    }

    #[test]
    fn test_eac_rejects_zero_time_period() {
        let err = calculate_eac(100_000.0, 8.0, 0.0).unwrap_err();
        assert!(matches!(err, DrpfError::ZeroInEconomics(_)));
    }

    #[test]
    fn test_eac_positive_for_normal_inputs() {
        let eac = calculate_eac(100_000.0, 8.0, 10.0).unwrap();
        assert!(eac > 0.0);
    }
}
