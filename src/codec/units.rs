use crate::error::{ControlError, ControlResult};

/// Microunits per unit (µA per A, µV per V)
pub const MICRO: f64 = 1e6;

/// Convert a physical value to integer microunits.
/// Rounds half away from zero, so 1.2345675 becomes 1234568.
pub fn to_micro(name: &'static str, value: f64) -> ControlResult<i64> {
    let scaled = (value * MICRO).round();
    // i64::MAX as f64 rounds up to 2^63, which is already out of range
    if !scaled.is_finite() || scaled < i64::MIN as f64 || scaled >= i64::MAX as f64 {
        return Err(ControlError::InvalidSetpoint { name, value });
    }
    Ok(scaled as i64)
}

pub fn from_micro(micro: i64) -> f64 {
    micro as f64 / MICRO
}
