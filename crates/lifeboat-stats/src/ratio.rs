//! Ratios expressed as rounded percentages.

/// Returns `part / total` as a percentage rounded to two decimal places.
///
/// A zero `total` yields `0.0` instead of dividing by zero.
///
/// # Examples
///
/// ```
/// use lifeboat_stats::ratio::percentage;
///
/// assert_eq!(percentage(7, 10), 70.0);
/// assert_eq!(percentage(1, 3), 33.33);
/// assert_eq!(percentage(2, 3), 66.67);
/// assert_eq!(percentage(0, 0), 0.0);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_to(part as f64 / total as f64 * 100.0, 2)
}

/// Rounds `value` to `decimals` decimal places.
///
/// Rounding works on the exact binary value, and exact ties go to the even
/// digit: `3.125` becomes `3.12`.
///
/// # Examples
///
/// ```
/// use lifeboat_stats::ratio::round_to;
///
/// assert_eq!(round_to(12.3456, 2), 12.35);
/// assert_eq!(round_to(12.3456, 0), 12.0);
/// assert_eq!(round_to(3.125, 2), 3.12);
/// ```
#[must_use]
pub fn round_to(value: f64, decimals: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{value:.decimals$}")
        .parse()
        .expect("formatted float parses back")
}
