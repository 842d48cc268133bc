//! Small numeric helpers shared by the exposure and white-balance steps

/// Bound `value` to the closed range `[lo, hi]`
///
/// Expects `lo <= hi`; configured gain bounds are checked by
/// `ControllerConfig::validate`. Unlike [`f32::clamp`] a NaN input does not
/// propagate: it is mapped to `lo`, so the result is always a usable bound.
/// A NaN would otherwise be written straight into the sensor state.
pub fn clamp(value: f32, lo: f32, hi: f32) -> f32 {
    if value.is_nan() || value < lo {
        lo
    } else if value > hi {
        hi
    } else {
        value
    }
}

/// Sign of `x` as `-1.0`, `0.0` or `1.0`
pub fn sign(x: f32) -> f32 {
    if x < 0.0 {
        -1.0
    } else if x > 0.0 {
        1.0
    } else {
        0.0
    }
}
