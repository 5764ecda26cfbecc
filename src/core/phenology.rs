//! C2: crop phenology builder (spec.md §4.2).

use chrono::{Datelike, Months, NaiveDate};

/// Stage lengths and coefficients for one crop, plus its sowing anchor and
/// root-depth/depletion parameters. Stage lengths are already rounded
/// (fractional part > 0.5 rounds up, else down — §4.2).
#[derive(Debug, Clone, Copy)]
pub struct CropPhenology {
    pub sowing_month: u32,
    pub sowing_week: u32,
    pub l_ini: i64,
    pub l_dev: i64,
    pub l_mid: i64,
    pub l_late: i64,
    pub kc_ini: f64,
    pub kc_dev: f64,
    pub kc_mid: f64,
    pub kc_end: f64,
    pub min_root_depth_m: f64,
    pub max_root_depth_m: f64,
    pub depletion_fraction: f64,
}

/// Rounds a fractional stage-length the way spec.md §4.2 specifies: strictly
/// greater than .5 rounds up, everything else (including exactly .5) rounds
/// down.
pub fn round_stage_length(x: f64) -> i64 {
    let floor = x.floor();
    if x - floor > 0.5 {
        floor as i64 + 1
    } else {
        floor as i64
    }
}

impl CropPhenology {
    pub fn total_growth_days(&self) -> i64 {
        self.l_ini + self.l_dev + self.l_mid + self.l_late
    }

    /// `start_year = Jan 1 of that year + (sowing_month-1) months + (sowing_week-1)*7 days`.
    pub fn sowing_anchor(&self, year: i32) -> NaiveDate {
        let jan1 = NaiveDate::from_ymd_opt(year, 1, 1).unwrap();
        let after_months = jan1
            .checked_add_months(Months::new(self.sowing_month - 1))
            .unwrap();
        after_months + chrono::Duration::days(7 * (self.sowing_week as i64 - 1))
    }
}

/// Per-day growth state for one crop: signed offset from the resolved
/// sowing anchor (negative or ≥ TGD means out of season) and TGD.
#[derive(Debug, Clone, Copy)]
struct GrowthOffset {
    offset_days: i64,
    tgd: i64,
}

/// Resolves the day offset from sowing for `date`, per spec.md §4.2's
/// first-simulation-year vs. subsequent-year rule: the first year never
/// rolls back to a prior-year anchor (there is no prior-year data); every
/// later year rolls back to the prior year's anchor when this year's
/// anchor falls after `date`.
fn resolve_offset(crop: &CropPhenology, date: NaiveDate, series_first_year: i32) -> GrowthOffset {
    let tgd = crop.total_growth_days();
    let this_year_anchor = crop.sowing_anchor(date.year());

    let offset_days = if date.year() == series_first_year {
        (date - this_year_anchor).num_days()
    } else if this_year_anchor <= date {
        (date - this_year_anchor).num_days()
    } else {
        let prev_anchor = crop.sowing_anchor(date.year() - 1);
        (date - prev_anchor).num_days()
    };

    GrowthOffset { offset_days, tgd }
}

fn in_season(g: GrowthOffset) -> bool {
    g.offset_days >= 0 && g.offset_days < g.tgd
}

/// Remaining-growth-days counter, spec.md §4.2. The `-1` is deliberate.
pub fn remaining_growth_days(crop: &CropPhenology, date: NaiveDate, series_first_year: i32) -> i64 {
    let g = resolve_offset(crop, date, series_first_year);
    if !in_season(g) {
        return 0;
    }
    (g.tgd - g.offset_days - 1).max(0)
}

/// The four stage Kc columns on `date`; at most one is nonzero (spec.md §8
/// property 8). Their sum is the crop's Kc for the day.
#[derive(Debug, Clone, Copy, Default)]
pub struct KcStages {
    pub kc_ini: f64,
    pub kc_dev: f64,
    pub kc_mid: f64,
    pub kc_end: f64,
}

impl KcStages {
    pub fn total(&self) -> f64 {
        self.kc_ini + self.kc_dev + self.kc_mid + self.kc_end
    }
}

pub fn kc_stages(crop: &CropPhenology, date: NaiveDate, series_first_year: i32) -> KcStages {
    let g = resolve_offset(crop, date, series_first_year);
    if !in_season(g) {
        return KcStages::default();
    }
    let d = g.offset_days;
    if d < crop.l_ini {
        KcStages {
            kc_ini: crop.kc_ini,
            ..Default::default()
        }
    } else if d < crop.l_ini + crop.l_dev {
        KcStages {
            kc_dev: crop.kc_dev,
            ..Default::default()
        }
    } else if d < crop.l_ini + crop.l_dev + crop.l_mid {
        KcStages {
            kc_mid: crop.kc_mid,
            ..Default::default()
        }
    } else {
        KcStages {
            kc_end: crop.kc_end,
            ..Default::default()
        }
    }
}

/// Root depth on `date`: 0 outside the growing window, else interpolated
/// between min and max root depth by remaining-growth fraction.
pub fn root_depth_m(crop: &CropPhenology, date: NaiveDate, series_first_year: i32) -> f64 {
    let rg = remaining_growth_days(crop, date, series_first_year);
    if rg <= 0 {
        return 0.0;
    }
    let tgd = crop.total_growth_days() as f64;
    crop.min_root_depth_m + (crop.max_root_depth_m - crop.min_root_depth_m) * (tgd - rg as f64) / tgd
}

/// Depletion fraction p on `date`: the crop's constant `p` while growing,
/// else 0.
pub fn depletion_fraction(crop: &CropPhenology, date: NaiveDate, series_first_year: i32) -> f64 {
    let rg = remaining_growth_days(crop, date, series_first_year);
    if rg > 0 {
        crop.depletion_fraction
    } else {
        0.0
    }
}

/// Per-plot aggregation: sum over the crops owned by a plot. With one crop
/// per plot this is a pass-through; the summation is preserved for
/// multi-crop plots per spec.md §4.2.
pub fn aggregate_plot<T: Copy + Default + std::ops::Add<Output = T>>(per_crop: &[T]) -> T {
    per_crop.iter().fold(T::default(), |acc, v| acc + *v)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_crop() -> CropPhenology {
        CropPhenology {
            sowing_month: 4,
            sowing_week: 1,
            l_ini: 20,
            l_dev: 30,
            l_mid: 40,
            l_late: 30,
            kc_ini: 0.5,
            kc_dev: 0.8,
            kc_mid: 1.1,
            kc_end: 0.7,
            min_root_depth_m: 0.3,
            max_root_depth_m: 1.0,
            depletion_fraction: 0.5,
        }
    }

    #[test]
    fn test_round_stage_length() {
        assert_eq!(round_stage_length(20.5), 20);
        assert_eq!(round_stage_length(20.51), 21);
        assert_eq!(round_stage_length(20.49), 20);
    }

    #[test]
    fn test_kc_partition_exactly_one_nonzero() {
        let crop = sample_crop();
        let anchor = crop.sowing_anchor(2024);
        for offset in 0..crop.total_growth_days() {
            let date = anchor + chrono::Duration::days(offset);
            let stages = kc_stages(&crop, date, 2024);
            let nonzero = [stages.kc_ini, stages.kc_dev, stages.kc_mid, stages.kc_end]
                .iter()
                .filter(|v| **v != 0.0)
                .count();
            assert_eq!(nonzero, 1, "offset {offset}");
        }
    }

    #[test]
    fn test_before_sowing_first_year_is_out_of_season() {
        let crop = sample_crop();
        let anchor = crop.sowing_anchor(2024);
        let date = anchor - chrono::Duration::days(5);
        assert_eq!(remaining_growth_days(&crop, date, 2024), 0);
        assert_eq!(kc_stages(&crop, date, 2024).total(), 0.0);
    }

    #[test]
    fn test_remaining_growth_days_deliberate_minus_one() {
        let crop = sample_crop();
        let anchor = crop.sowing_anchor(2024);
        let tgd = crop.total_growth_days();
        // on the sowing date itself, RG = TGD - 0 - 1
        assert_eq!(remaining_growth_days(&crop, anchor, 2024), tgd - 1);
    }

    #[test]
    fn test_subsequent_year_rolls_back_anchor() {
        let crop = sample_crop();
        // Jan 1 of the second year is before that year's sowing anchor (April),
        // so it must roll back to the previous year's season instead of reading 0
        // from a not-yet-reached anchor.
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let rg = remaining_growth_days(&crop, date, 2024);
        assert_eq!(rg, 0); // prior season already finished by January
    }
}
