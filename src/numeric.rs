//! Numeric conversion helpers used across the project.
//!
//! These utilities guard conversions between integer and floating-point
//! domains. They rely on debug assertions to flag unexpected precision loss
//! while keeping the call-sites ergonomic.

use std::time::Duration;

/// Convert a finite `f64` into `f32`, asserting that it fits the target type.
#[expect(
    clippy::cast_possible_truncation,
    reason = "Callers assert that the value fits within f32 bounds."
)]
#[must_use]
pub fn expect_f32(value: f64) -> f32 {
    debug_assert!(value.is_finite(), "expected finite f64 for f32 conversion");
    debug_assert!(
        value <= f64::from(f32::MAX),
        "f64 value {value} exceeds f32::MAX"
    );
    debug_assert!(
        value >= f64::from(f32::MIN),
        "f64 value {value} is below f32::MIN"
    );
    value as f32
}

/// Convert a small count (enemy slots, ring positions) into `f32`.
#[expect(
    clippy::cast_precision_loss,
    reason = "Counts are tiny; f32 represents them exactly below 2^24."
)]
#[must_use]
pub fn count_to_f32(count: usize) -> f32 {
    debug_assert!(count < (1 << 24), "count {count} loses precision as f32");
    count as f32
}

/// Fraction of `total` covered by `elapsed`, clamped to `[0, 1]`.
///
/// A zero `total` counts as already complete.
#[must_use]
pub fn duration_fraction(elapsed: Duration, total: Duration) -> f32 {
    if total.is_zero() {
        return 1.0;
    }
    expect_f32((elapsed.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case::start(Duration::ZERO, Duration::from_millis(3000), 0.0)]
    #[case::halfway(Duration::from_millis(1500), Duration::from_millis(3000), 0.5)]
    #[case::overshoot(Duration::from_secs(9), Duration::from_millis(3000), 1.0)]
    #[case::zero_total(Duration::from_secs(1), Duration::ZERO, 1.0)]
    fn fraction_is_clamped(#[case] elapsed: Duration, #[case] total: Duration, #[case] want: f32) {
        assert_relative_eq!(duration_fraction(elapsed, total), want);
    }

    #[rstest]
    fn counts_convert_exactly() {
        assert_relative_eq!(count_to_f32(7), 7.0);
    }
}
