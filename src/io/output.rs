//! CSV writers for the `df_*` artefacts of spec.md §6, all formatted to 6
//! significant digits.

use std::path::Path;

use serde::Serialize;

use crate::error::{DrpfError, DrpfResult};

/// Rounds to 6 significant digits, matching the reference's float
/// formatting. `0.0` and non-finite values pass through unchanged.
pub fn round_sig6(x: f64) -> f64 {
    if x == 0.0 || !x.is_finite() {
        return x;
    }
    let magnitude = x.abs().log10().floor() as i32;
    let factor = 10f64.powi(5 - magnitude);
    (x * factor).round() / factor
}

/// Writes one `df_*` artefact: a header-derived CSV via `serde`, matching
/// the wide-format tables `run <scenario_number>` produces under
/// `Datasets/Outputs/{Baseline_Scenario|Scenario_{n}}/`.
pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> DrpfResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| DrpfError::InputMalformed {
            field: path.display().to_string(),
            reason: e.to_string(),
        })?;
    }
    let mut writer = csv::Writer::from_path(path).map_err(|e| DrpfError::InputMalformed {
        field: path.display().to_string(),
        reason: e.to_string(),
    })?;
    for row in rows {
        writer.serialize(row).map_err(|e| DrpfError::InputMalformed {
            field: path.display().to_string(),
            reason: e.to_string(),
        })?;
    }
    writer.flush().map_err(|e| DrpfError::InputMalformed {
        field: path.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_sig6_basic() {
        assert_eq!(round_sig6(123.456789), 123.457);
        assert_eq!(round_sig6(0.0001234567), 0.000123457);
    }

    #[test]
    fn test_round_sig6_passes_through_zero() {
        assert_eq!(round_sig6(0.0), 0.0);
    }

    #[derive(Serialize)]
    struct Row {
        a: f64,
        b: String,
    }

    #[test]
    fn test_write_csv_roundtrip() {
        let path = std::env::temp_dir().join("drpf_test_output.csv");
        let rows = vec![Row { a: 1.5, b: "x".to_string() }];
        write_csv(&path, &rows).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("1.5"));
        let _ = std::fs::remove_file(&path);
    }
}
