//! Saturating arithmetic for geometric growth
//!
//! Long horizons with compounding reinvestment grow geometrically. Every share
//! count, price, per-share dividend and currency amount produced by the engine
//! passes through [`saturate`], which caps it at [`MAX_MAGNITUDE`] and maps
//! non-finite values to the same ceiling. The cap is monotone, so a clamped
//! series that was non-decreasing stays non-decreasing.

/// Ceiling for shares and currency amounts
pub const MAX_MAGNITUDE: f64 = 1e15;

/// Floor for price per share; keeps the purchase division well-defined
pub const MIN_PRICE: f64 = 1.0;

/// A value after saturation, with a flag telling whether the cap engaged
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Saturated {
    pub value: f64,
    pub clamped: bool,
}

/// Cap a non-negative magnitude at `MAX_MAGNITUDE`.
///
/// NaN and +inf map to the ceiling; negative values are left alone (callers
/// only pass quantities that are non-negative by construction).
pub fn saturate(value: f64) -> Saturated {
    if value.is_nan() || value > MAX_MAGNITUDE {
        Saturated { value: MAX_MAGNITUDE, clamped: true }
    } else {
        Saturated { value, clamped: false }
    }
}

/// Saturating product
pub fn mul(a: f64, b: f64) -> Saturated {
    saturate(a * b)
}

/// Saturating sum
pub fn add(a: f64, b: f64) -> Saturated {
    saturate(a + b)
}

/// Grow a price by a factor, then apply both the floor and the ceiling
pub fn grow_price(price: f64, factor: f64) -> Saturated {
    let grown = saturate(price * factor);
    Saturated {
        value: grown.value.max(MIN_PRICE),
        clamped: grown.clamped,
    }
}

/// Factor that compounds to `(1 + annual_rate)` over `steps` equal sub-periods
pub fn step_factor(annual_rate: f64, steps: u32) -> f64 {
    if steps <= 1 {
        1.0 + annual_rate
    } else {
        (1.0 + annual_rate).powf(1.0 / steps as f64)
    }
}
