//! Daily/monthly wide-format CSV readers (spec.md §6): `pcp.csv`,
//! `temp.csv`, `irrigation.csv`, `crop_db.csv`, `radiation_db.csv`.
//! Grounded on `Original/user_input.py`'s mandatory-input loaders.

use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;

use crate::core::climate::{MonthlyTemp, RadiationTable};
use crate::error::{DrpfError, DrpfResult};

/// `pcp.csv`: `MM/DD/YYYY,value_mm`, no header.
pub fn read_daily_precip(path: &Path) -> DrpfResult<Vec<(NaiveDate, f64)>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|_| DrpfError::InputMissing(path.display().to_string()))?;

    let mut out = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| DrpfError::InputMalformed {
            field: "pcp.csv".to_string(),
            reason: e.to_string(),
        })?;
        if record.len() < 2 {
            continue;
        }
        let date = NaiveDate::parse_from_str(record[0].trim(), "%m/%d/%Y").map_err(|e| DrpfError::InputMalformed {
            field: "pcp.csv".to_string(),
            reason: e.to_string(),
        })?;
        let value: f64 = record[1].trim().parse().map_err(|_| DrpfError::InputMalformed {
            field: "pcp.csv".to_string(),
            reason: format!("'{}' is not numeric", &record[1]),
        })?;
        out.push((date, value));
    }
    out.sort_by_key(|(d, _)| *d);
    Ok(out)
}

/// `temp.csv`: header `Year,Month,Tmax,Tmin,Tmean`, one row per calendar
/// month of the daily series.
pub fn read_monthly_temp(path: &Path) -> DrpfResult<Vec<MonthlyTemp>> {
    let mut reader = csv::Reader::from_path(path).map_err(|_| DrpfError::InputMissing(path.display().to_string()))?;

    let mut out = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| DrpfError::InputMalformed {
            field: "temp.csv".to_string(),
            reason: e.to_string(),
        })?;
        if record.len() < 5 {
            return Err(DrpfError::InputMalformed {
                field: "temp.csv".to_string(),
                reason: "expected Year,Month,Tmax,Tmin,Tmean".to_string(),
            });
        }
        let parse = |i: usize| -> DrpfResult<f64> {
            record[i].trim().parse().map_err(|_| DrpfError::InputMalformed {
                field: "temp.csv".to_string(),
                reason: format!("'{}' is not numeric", &record[i]),
            })
        };
        out.push(MonthlyTemp {
            year: parse(0)? as i32,
            month: parse(1)? as u32,
            tmax: parse(2)?,
            tmin: parse(3)?,
            tmean: parse(4)?,
        });
    }
    Ok(out)
}

/// `irrigation.csv`: twelve rows of monthly `Canal_WA` (m³); blank/NaN ⇒ 0.
pub fn read_irrigation(path: &Path) -> DrpfResult<[f64; 12]> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|_| DrpfError::InputMissing(path.display().to_string()))?;

    let mut out = [0.0_f64; 12];
    let mut i = 0;
    for record in reader.records() {
        let record = record.map_err(|e| DrpfError::InputMalformed {
            field: "irrigation.csv".to_string(),
            reason: e.to_string(),
        })?;
        if i >= 12 || record.is_empty() {
            continue;
        }
        out[i] = record[0].trim().parse::<f64>().unwrap_or(0.0);
        i += 1;
    }
    if i != 12 {
        return Err(DrpfError::InputMalformed {
            field: "irrigation.csv".to_string(),
            reason: format!("expected 12 monthly rows, found {i}"),
        });
    }
    Ok(out)
}

/// One row of `crop_db.csv`: per-crop phenology, Ky, yield/price, cover and
/// treatment type, and the per-soil-texture CN columns. Columns beyond the
/// fixed phenology fields are kept as a raw key/value map so the per-texture
/// CN lookup (`Sand`, `Sandy Loam`, `Loam`, `Clayey Loam`, `Clay`) doesn't
/// need a fixed struct shape.
#[derive(Debug, Clone)]
pub struct CropDbRow {
    pub crop_name: String,
    pub cover_type: String,
    pub treatment_type: String,
    pub ky: f64,
    pub max_yield_t_per_ha: f64,
    pub price_per_t: f64,
    pub fields: HashMap<String, String>,
}

/// `crop_db.csv`: header row, first column `Crop`. Unknown extra columns are
/// retained verbatim in `fields` for the CN cascade and phenology builder.
pub fn read_crop_db(path: &Path) -> DrpfResult<Vec<CropDbRow>> {
    let mut reader = csv::Reader::from_path(path).map_err(|_| DrpfError::InputMissing(path.display().to_string()))?;
    let headers = reader
        .headers()
        .map_err(|e| DrpfError::InputMalformed {
            field: "crop_db.csv".to_string(),
            reason: e.to_string(),
        })?
        .clone();

    let mut out = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| DrpfError::InputMalformed {
            field: "crop_db.csv".to_string(),
            reason: e.to_string(),
        })?;
        let mut fields = HashMap::new();
        for (h, v) in headers.iter().zip(record.iter()) {
            fields.insert(h.to_string(), v.to_string());
        }

        let get = |key: &str| -> DrpfResult<String> {
            fields
                .get(key)
                .cloned()
                .ok_or_else(|| DrpfError::InputMissing(format!("crop_db.csv column '{key}'")))
        };
        let get_f64 = |key: &str| -> DrpfResult<f64> {
            let raw = get(key)?;
            raw.trim().parse().map_err(|_| DrpfError::InputMalformed {
                field: format!("crop_db.csv[{key}]"),
                reason: format!("'{raw}' is not numeric"),
            })
        };

        out.push(CropDbRow {
            crop_name: get("Crop")?,
            cover_type: fields.get("Cover_Type").cloned().unwrap_or_default(),
            treatment_type: fields.get("Treatment_Type").cloned().unwrap_or_default(),
            ky: get_f64("Ky")?,
            max_yield_t_per_ha: fields.get("Max_Yield").and_then(|v| v.parse().ok()).unwrap_or(0.0),
            price_per_t: fields.get("Price").and_then(|v| v.parse().ok()).unwrap_or(0.0),
            fields,
        });
    }
    Ok(out)
}

/// `radiation_db.csv`: header `Latitude,Jan,Feb,...,Dec`.
pub fn read_radiation_db(path: &Path) -> DrpfResult<RadiationTable> {
    let mut reader = csv::Reader::from_path(path).map_err(|_| DrpfError::InputMissing(path.display().to_string()))?;

    let mut rows = HashMap::new();
    for record in reader.records() {
        let record = record.map_err(|e| DrpfError::InputMalformed {
            field: "radiation_db.csv".to_string(),
            reason: e.to_string(),
        })?;
        if record.len() < 13 {
            return Err(DrpfError::InputMalformed {
                field: "radiation_db.csv".to_string(),
                reason: "expected Latitude + 12 monthly columns".to_string(),
            });
        }
        let lat: f64 = record[0].trim().parse().map_err(|_| DrpfError::InputMalformed {
            field: "radiation_db.csv".to_string(),
            reason: format!("'{}' is not numeric", &record[0]),
        })?;
        let mut months = [0.0_f64; 12];
        for (i, m) in months.iter_mut().enumerate() {
            *m = record[i + 1].trim().parse().map_err(|_| DrpfError::InputMalformed {
                field: "radiation_db.csv".to_string(),
                reason: format!("'{}' is not numeric", &record[i + 1]),
            })?;
        }
        rows.insert(lat.round() as i32, months);
    }
    Ok(RadiationTable::new(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_fixture(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_read_irrigation_pads_blank_to_zero() {
        let path = write_fixture(
            "drpf_test_irrigation.csv",
            "\n1.0\n\n3.0\n\n\n\n\n\n\n\n\n",
        );
        let vals = read_irrigation(&path).unwrap();
        assert_eq!(vals[0], 0.0);
        assert_eq!(vals[1], 1.0);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_read_daily_precip_sorts_by_date() {
        let path = write_fixture(
            "drpf_test_pcp.csv",
            "01/02/2024,5.0\n01/01/2024,10.0\n",
        );
        let series = read_daily_precip(&path).unwrap();
        assert_eq!(series[0].0, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let _ = std::fs::remove_file(&path);
    }
}
