//! Key/value CSV reader for watershed and intervention parameters
//! (spec.md §6). Grounded on `Original/user_input.py`'s
//! `collect_inp_variables`/`collect_int_variables` and its per-path
//! memoisation cache (spec.md §3: "the file-path cache is a pure
//! memoisation").

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{DrpfError, DrpfResult};

static CACHE: Mutex<Option<HashMap<PathBuf, HashMap<String, String>>>> = Mutex::new(None);

/// Reads a two-column `key,value` CSV, memoising by path. A fresh scenario
/// run with fresh inputs always produces a fresh cache entry — no state
/// survives across runs against a different path.
pub fn read_kv_csv(path: &Path) -> DrpfResult<HashMap<String, String>> {
    let mut guard = CACHE.lock().unwrap();
    let cache = guard.get_or_insert_with(HashMap::new);
    if let Some(existing) = cache.get(path) {
        return Ok(existing.clone());
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|_| DrpfError::InputMissing(path.display().to_string()))?;

    let mut map = HashMap::new();
    for record in reader.records() {
        let record = record.map_err(|e| DrpfError::InputMalformed {
            field: path.display().to_string(),
            reason: e.to_string(),
        })?;
        if record.len() < 2 {
            continue;
        }
        map.insert(record[0].trim().to_string(), record[1].trim().to_string());
    }

    cache.insert(path.to_path_buf(), map.clone());
    Ok(map)
}

/// Clears the file-path cache — called at the start of a scenario run so
/// that a differently-configured rerun never observes stale values.
pub fn clear_file_paths_cache() {
    *CACHE.lock().unwrap() = None;
}

/// Float coercion with a graceful fallback to a default, matching
/// `user_input.py::to_float`.
pub fn to_float(value: Option<&String>, default: f64) -> f64 {
    value.and_then(|v| v.parse::<f64>().ok()).unwrap_or(default)
}

pub fn require_float(map: &HashMap<String, String>, key: &str) -> DrpfResult<f64> {
    let raw = map.get(key).ok_or_else(|| DrpfError::InputMissing(key.to_string()))?;
    raw.parse::<f64>().map_err(|_| DrpfError::InputMalformed {
        field: key.to_string(),
        reason: format!("'{raw}' is not numeric"),
    })
}

pub fn require_string<'a>(map: &'a HashMap<String, String>, key: &str) -> DrpfResult<&'a str> {
    map.get(key)
        .map(|s| s.as_str())
        .ok_or_else(|| DrpfError::InputMissing(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_float_falls_back_on_missing() {
        assert_eq!(to_float(None, 7.0), 7.0);
    }

    #[test]
    fn test_to_float_falls_back_on_unparsable() {
        let v = "not_a_number".to_string();
        assert_eq!(to_float(Some(&v), 7.0), 7.0);
    }

    #[test]
    fn test_to_float_parses_valid_value() {
        let v = "3.5".to_string();
        assert_eq!(to_float(Some(&v), 7.0), 3.5);
    }
}
