use crate::IpmError;

/// Returns `v` unchanged when it is finite.
pub fn ensure_finite(v: f64, what: &'static str) -> Result<f64, IpmError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(IpmError::NonFinite { what, value: v })
    }
}

/// Ratio that evaluates to zero when the denominator is not positive.
///
/// Watercut and GOR are undefined for a well test with no liquid or no oil;
/// the engine expects zero in that case rather than NaN.
pub fn ratio_or_zero(num: f64, den: f64) -> f64 {
    if den > 0.0 && num.is_finite() {
        num / den
    } else {
        0.0
    }
}
