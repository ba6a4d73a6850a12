/// Largest integer value exactly representable as an `f64` (`2^53 - 1`).
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Truncates a double to a 32-bit two's-complement integer.
///
/// The fractional part is discarded; out-of-range values saturate at
/// `i32::MIN`/`i32::MAX` and `NaN` becomes `0`.
///
/// ## Example
/// ```
/// use hsl::util::num::truncate_to_i32;
///
/// assert_eq!(truncate_to_i32(5.9), 5);
/// assert_eq!(truncate_to_i32(-5.9), -5);
/// assert_eq!(truncate_to_i32(1e12), i32::MAX);
/// assert_eq!(truncate_to_i32(f64::NAN), 0);
/// ```
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub fn truncate_to_i32(value: f64) -> i32 {
    value as i32
}

/// Converts a loop count to a number of iterations.
///
/// The count is truncated; negative counts and `NaN` run zero times.
///
/// ## Example
/// ```
/// use hsl::util::num::repeat_count;
///
/// assert_eq!(repeat_count(3.7), 3);
/// assert_eq!(repeat_count(-2.0), 0);
/// ```
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
#[must_use]
pub fn repeat_count(value: f64) -> u64 {
    if value.is_nan() || value <= 0.0 {
        return 0;
    }
    value as u64
}

/// Converts a double to an index if and only if it is a non-negative
/// integer below `length`.
///
/// ## Errors
/// Returns `Err(error)` for fractional, negative, non-finite or
/// out-of-bounds values.
///
/// ## Example
/// ```
/// use hsl::util::num::f64_to_index_checked;
///
/// assert_eq!(f64_to_index_checked(2.0, 3, "bad"), Ok(2));
/// assert_eq!(f64_to_index_checked(3.0, 3, "bad"), Err("bad"));
/// assert_eq!(f64_to_index_checked(0.5, 3, "bad"), Err("bad"));
/// ```
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
pub fn f64_to_index_checked<E>(value: f64, length: usize, error: E) -> Result<usize, E> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > MAX_SAFE_INTEGER {
        return Err(error);
    }
    let index = value as usize;
    if index >= length {
        return Err(error);
    }
    Ok(index)
}

/// Converts a length to a double.
///
/// Lengths in the interpreter are far below `2^53`, so the conversion is
/// exact in practice.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    value as f64
}

/// Truncates a double to an `i64` for diagnostics, saturating at the
/// bounds.
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub fn truncate_to_i64(value: f64) -> i64 {
    value as i64
}
