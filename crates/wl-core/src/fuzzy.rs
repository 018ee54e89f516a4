//! Tolerance-based floating point comparison.
//!
//! Only the script operators `<=` and `>=` go through these helpers; `<`,
//! `>`, `==` and `!=` compare exactly. That asymmetry is inherited from the
//! source semantics and is load-bearing for existing programs.

pub const DEFAULT_EPSILON: f64 = 1e-4;

/// True if `x == y` within `DEFAULT_EPSILON`. NaN is equal to nothing.
pub fn fuzzy_equals(x: f64, y: f64) -> bool {
    if x.is_nan() || y.is_nan() {
        return false;
    }
    (x - y).abs() <= DEFAULT_EPSILON || x == y
}

/// True if `x <= y` within `DEFAULT_EPSILON`.
pub fn fuzzy_less_than_or_equal(x: f64, y: f64) -> bool {
    fuzzy_equals(x, y) || x < y
}

/// True if `x >= y` within `DEFAULT_EPSILON`.
pub fn fuzzy_greater_than_or_equal(x: f64, y: f64) -> bool {
    fuzzy_equals(x, y) || x > y
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_within_epsilon_compare_equal() {
        assert!(fuzzy_equals(1.0, 1.0 + 5e-5));
        assert!(!fuzzy_equals(1.0, 1.001));
    }

    #[test]
    fn nan_is_never_fuzzy_equal() {
        assert!(!fuzzy_equals(f64::NAN, f64::NAN));
        assert!(!fuzzy_less_than_or_equal(f64::NAN, 1.0));
    }

    #[test]
    fn ordering_helpers_accept_near_ties() {
        assert!(fuzzy_less_than_or_equal(1.00005, 1.0));
        assert!(fuzzy_greater_than_or_equal(0.99995, 1.0));
        assert!(!fuzzy_less_than_or_equal(1.1, 1.0));
        assert!(fuzzy_greater_than_or_equal(f64::INFINITY, 1.0));
    }
}
