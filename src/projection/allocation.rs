//! Division of a pooled contribution across holdings

use super::config::AllocationPolicy;

/// Split `total` across holdings with the given start-of-period market values.
///
/// The returned amounts always sum to `total`: the last holding receives the
/// remainder after the others are assigned. Proportional allocation falls back
/// to an even split when the portfolio has no market value.
pub fn allocate(total: f64, market_values: &[f64], policy: AllocationPolicy) -> Vec<f64> {
    let n = market_values.len();
    if n == 0 {
        return Vec::new();
    }

    let total_value: f64 = market_values.iter().sum();
    let weights: Vec<f64> = match policy {
        AllocationPolicy::Proportional if total_value > 0.0 && total_value.is_finite() => {
            market_values.iter().map(|v| v / total_value).collect()
        }
        _ => vec![1.0 / n as f64; n],
    };

    let mut amounts = Vec::with_capacity(n);
    let mut assigned = 0.0;
    for weight in &weights[..n - 1] {
        let amount = total * weight;
        assigned += amount;
        amounts.push(amount);
    }
    amounts.push((total - assigned).max(0.0));
    amounts
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_even_split() {
        let amounts = allocate(1200.0, &[10.0, 500.0, 0.0], AllocationPolicy::Even);
        assert_eq!(amounts.len(), 3);
        for a in &amounts {
            assert_relative_eq!(*a, 400.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_proportional_split() {
        let amounts = allocate(1000.0, &[100.0, 300.0], AllocationPolicy::Proportional);
        assert_relative_eq!(amounts[0], 250.0, epsilon = 1e-9);
        assert_relative_eq!(amounts[1], 750.0, epsilon = 1e-9);
    }

    #[test]
    fn test_proportional_without_value_is_even() {
        let amounts = allocate(90.0, &[0.0, 0.0, 0.0], AllocationPolicy::Proportional);
        assert_eq!(amounts, allocate(90.0, &[0.0, 0.0, 0.0], AllocationPolicy::Even));
    }

    #[test]
    fn test_no_leakage() {
        let total = 6_000_000.0 * 12.0;
        for policy in [AllocationPolicy::Even, AllocationPolicy::Proportional] {
            let amounts = allocate(total, &[3.0, 7.0, 11.0, 13.0, 17.0, 19.0, 23.0], policy);
            let sum: f64 = amounts.iter().sum();
            assert_relative_eq!(sum, total, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_empty() {
        assert!(allocate(100.0, &[], AllocationPolicy::Even).is_empty());
    }
}
