//! Floating-point tolerance shared by the solver.
//!
//! Every "is this zero" or "is this negative" decision goes through the
//! helpers here so that pruning and feasibility tests agree with each other.

/// Absolute tolerance for floating-point comparisons.
pub const EPSILON: f64 = 1e-8;

/// Check whether a value is within [`EPSILON`] of zero.
#[inline]
pub fn near_zero(value: f64) -> bool {
    value.abs() < EPSILON
}

/// Check whether a value is negative beyond the tolerance.
#[inline]
pub fn is_negative(value: f64) -> bool {
    value < -EPSILON
}

/// Check whether a value is positive beyond the tolerance.
#[inline]
pub fn is_positive(value: f64) -> bool {
    value > EPSILON
}

/// Check whether two values are equal within the tolerance.
#[inline]
pub fn approx_eq(a: f64, b: f64) -> bool {
    near_zero(a - b)
}
