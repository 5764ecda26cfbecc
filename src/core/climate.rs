//! C1: climate & reference-ET preprocessor (spec.md §4.1).

use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;

use crate::error::{DrpfError, DrpfResult};

/// One calendar month's mean temperatures, aligned to the daily series.
#[derive(Debug, Clone, Copy)]
pub struct MonthlyTemp {
    pub year: i32,
    pub month: u32,
    pub tmax: f64,
    pub tmin: f64,
    pub tmean: f64,
}

/// Extraterrestrial radiation by latitude (rounded to the nearest whole
/// degree, matching the reference table's row keys) and calendar month.
#[derive(Debug, Clone)]
pub struct RadiationTable {
    rows: HashMap<i32, [f64; 12]>,
}

impl RadiationTable {
    pub fn new(rows: HashMap<i32, [f64; 12]>) -> Self {
        RadiationTable { rows }
    }

    pub fn lookup(&self, latitude: f64, month: u32) -> DrpfResult<f64> {
        let key = latitude.round() as i32;
        let row = self
            .rows
            .get(&key)
            .ok_or_else(|| DrpfError::InputMalformed {
                field: "radiation_db".to_string(),
                reason: format!("no radiation row for latitude {latitude}"),
            })?;
        Ok(row[(month - 1) as usize])
    }
}

/// Per-day climate record produced by this component and consumed by every
/// downstream component that needs reference ET or antecedent rainfall.
#[derive(Debug, Clone, Copy)]
pub struct DailyClimate {
    pub date: NaiveDate,
    pub pi_mm: f64,
    pub etoi_mm: f64,
    pub rain5_mm: f64,
}

/// Hargreaves monthly reference ET, spec.md §4.1:
/// `ETom = 0.0023 * Ra * sqrt(Tmax - Tmin) * (Tmean + 17.8) * days_in_month`.
pub fn calc_etom(temp: &MonthlyTemp, ra: f64, days_in_month: u32) -> f64 {
    0.0023
        * ra
        * (temp.tmax - temp.tmin).max(0.0).sqrt()
        * (temp.tmean + 17.8)
        * days_in_month as f64
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let first = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
    let next_month_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1).unwrap()
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1).unwrap()
    };
    (next_month_first - first).num_days() as u32
}

/// Builds the full daily climate series: monthly Hargreaves ET0, split
/// uniformly across days in the month, plus a right-closed 5-day rolling
/// rainfall sum (min_periods=1) used by C4's AMC classification.
pub fn build_daily_climate(
    precip: &[(NaiveDate, f64)],
    monthly_temps: &[MonthlyTemp],
    radiation: &RadiationTable,
    latitude: f64,
) -> DrpfResult<Vec<DailyClimate>> {
    let mut temps_by_ym: HashMap<(i32, u32), MonthlyTemp> = HashMap::new();
    for t in monthly_temps {
        temps_by_ym.insert((t.year, t.month), *t);
    }

    let mut etom_by_ym: HashMap<(i32, u32), f64> = HashMap::new();
    let mut sorted_precip = precip.to_vec();
    sorted_precip.sort_by_key(|(d, _)| *d);

    let mut out = Vec::with_capacity(sorted_precip.len());
    let mut rain_window: Vec<f64> = Vec::new();

    for (date, pi) in &sorted_precip {
        let ym = (date.year(), date.month());
        let etom = match etom_by_ym.get(&ym) {
            Some(v) => *v,
            None => {
                let temp = temps_by_ym.get(&ym).ok_or_else(|| {
                    DrpfError::InputMissing(format!(
                        "monthly temperature for {}-{:02}",
                        ym.0, ym.1
                    ))
                })?;
                let ra = radiation.lookup(latitude, ym.1)?;
                let dim = days_in_month(ym.0, ym.1);
                let v = calc_etom(temp, ra, dim);
                etom_by_ym.insert(ym, v);
                v
            }
        };
        let dim = days_in_month(ym.0, ym.1) as f64;
        let etoi = etom / dim;

        rain_window.push(*pi);
        if rain_window.len() > 5 {
            rain_window.remove(0);
        }
        let rain5 = rain_window.iter().sum::<f64>();

        out.push(DailyClimate {
            date: *date,
            pi_mm: *pi,
            etoi_mm: etoi,
            rain5_mm: rain5,
        });
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calc_etom_flat_profile() {
        let temp = MonthlyTemp {
            year: 2024,
            month: 1,
            tmax: 30.0,
            tmin: 20.0,
            tmean: 25.0,
        };
        let etom = calc_etom(&temp, 16.0, 31);
        // 0.0023 * 16 * sqrt(10) * 42.8 * 31
        let expected = 0.0023 * 16.0 * 10f64.sqrt() * 42.8 * 31.0;
        assert!((etom - expected).abs() < 1e-9);
    }

    #[test]
    fn test_rolling_5_day_rain_min_periods_one() {
        let precip = vec![
            (NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 10.0),
            (NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), 0.0),
            (NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(), 0.0),
        ];
        let temps = vec![MonthlyTemp {
            year: 2024,
            month: 1,
            tmax: 30.0,
            tmin: 20.0,
            tmean: 25.0,
        }];
        let mut rows = HashMap::new();
        rows.insert(20, [16.0; 12]);
        let rad = RadiationTable::new(rows);
        let series = build_daily_climate(&precip, &temps, &rad, 20.0).unwrap();
        assert_eq!(series[0].rain5_mm, 10.0);
        assert_eq!(series[2].rain5_mm, 10.0);
    }

    #[test]
    fn test_missing_radiation_row_is_fatal() {
        let rad = RadiationTable::new(HashMap::new());
        let err = rad.lookup(99.0, 1).unwrap_err();
        assert!(matches!(err, DrpfError::InputMalformed { .. }));
    }
}
