//! Ready-made evaluation policies
//!
//! Divide-by-zero policies take `(dividend, divisor)` and return the value used
//! in place of the quotient.

/// Treat `x / 0` as 0
pub fn zero(_dividend: f64, _divisor: f64) -> f64 {
    0.0
}

/// Treat `x / 0` as `x`
pub fn dividend(dividend: f64, _divisor: f64) -> f64 {
    dividend
}

/// Treat `x / 0` as NaN
pub fn nan(_dividend: f64, _divisor: f64) -> f64 {
    f64::NAN
}

/// Missing-variable fallback that always supplies `value`
pub fn missing_as(value: f64) -> impl FnMut(&str) -> Option<f64> {
    move |_: &str| Some(value)
}
