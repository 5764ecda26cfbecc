//! The failure taxonomy of spec.md §7, as a `thiserror` enum. Every variant
//! here is fatal at the point it's raised; there is no retry path.

#[derive(Debug, thiserror::Error)]
pub enum DrpfError {
    #[error("missing required input: {0}")]
    InputMissing(String),

    #[error("malformed input in {field}: {reason}")]
    InputMalformed { field: String, reason: String },

    #[error("crop '{0}' not present in crop database")]
    CropNotInDb(String),

    #[error(
        "intervention area invariant violated for crop '{crop}': {intervention} area {area} exceeds crop area {crop_area}"
    )]
    AreaInvariant {
        crop: String,
        intervention: String,
        area: f64,
        crop_area: f64,
    },

    #[error("economics: {0} cannot be zero when EAC is requested")]
    ZeroInEconomics(&'static str),

    #[error("structural division by zero: {0}")]
    DivByZeroGuarded(String),
}

pub type DrpfResult<T> = Result<T, DrpfError>;

/// `0` when `denominator == 0`, matching spec.md §7's "denominators in CN
/// and yield formulas return 0 instead of NaN (recoverable)".
pub fn safe_divide(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

pub fn safe_subtract(x: f64, y: f64) -> f64 {
    (x - y).max(0.0)
}
