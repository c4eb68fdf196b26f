//! Statistics over price and performance series
//!
//! Population moments (divide by `n`) throughout, so a window with a single
//! observation has zero dispersion instead of an undefined one.

/// Trading days per year, used to annualize per-tick volatility
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population variance
pub fn variance(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    Some(values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / values.len() as f64)
}

/// Population standard deviation
pub fn std_dev(values: &[f64]) -> Option<f64> {
    variance(values).map(f64::sqrt)
}

/// First differences: `out[i] = values[i + 1] - values[i]`
pub fn diff(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

/// The last `len` elements, or the whole slice when it is shorter
pub fn trailing(values: &[f64], len: usize) -> &[f64] {
    &values[values.len().saturating_sub(len)..]
}

/// Annualized volatility of the last `window` log-prices
///
/// Returns 0 when fewer than two prices are available.
pub fn annualized_volatility(log_prices: &[f64], window: usize) -> f64 {
    let changes = diff(trailing(log_prices, window));
    std_dev(&changes).unwrap_or(0.0) * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Excess (Fisher) kurtosis, biased estimator
///
/// Positive values indicate fatter tails than a normal distribution.
/// `None` when the series is empty or has zero variance.
pub fn excess_kurtosis(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let n = values.len() as f64;
    let m2 = values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / n;
    if m2 == 0.0 {
        return None;
    }
    let m4 = values.iter().map(|x| (x - m).powi(4)).sum::<f64>() / n;
    Some(m4 / (m2 * m2) - 3.0)
}

/// Largest peak-to-trough decline as a fraction of the peak
///
/// Expects strictly positive level prices; 0 for a non-decreasing series.
pub fn max_drawdown(levels: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;
    for &level in levels {
        peak = peak.max(level);
        if peak > 0.0 {
            worst = worst.max((peak - level) / peak);
        }
    }
    worst
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_and_std_dev() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(mean(&values).unwrap(), 5.0);
        assert_relative_eq!(std_dev(&values).unwrap(), 2.0);
        assert!(mean(&[]).is_none());
    }

    #[test]
    fn test_trailing_falls_back_to_full_series() {
        let values = [1.0, 2.0, 3.0];
        assert_eq!(trailing(&values, 2), &[2.0, 3.0]);
        assert_eq!(trailing(&values, 10), &values);
    }

    #[test]
    fn test_flat_prices_have_zero_volatility() {
        assert_eq!(annualized_volatility(&[0.5; 40], 30), 0.0);
        assert_eq!(annualized_volatility(&[0.5], 30), 0.0);
    }

    #[test]
    fn test_volatility_uses_trailing_window() {
        // Early jump falls outside a 3-price window
        let prices = [0.0, 10.0, 10.0, 10.1, 10.2];
        let vol = annualized_volatility(&prices, 3);
        assert_relative_eq!(vol, 0.0, epsilon = 1e-9);

        let alternating = [0.0, 1.0, 0.0, 1.0];
        // diffs = [1, -1, 1], std = sqrt(8/9)
        let expected = (8.0_f64 / 9.0).sqrt() * 252.0_f64.sqrt();
        assert_relative_eq!(annualized_volatility(&alternating, 30), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_excess_kurtosis() {
        // Symmetric two-point distribution has kurtosis 1, excess -2
        let values = [1.0, -1.0, 1.0, -1.0];
        assert_relative_eq!(excess_kurtosis(&values).unwrap(), -2.0);
        assert!(excess_kurtosis(&[3.0, 3.0]).is_none());
    }

    #[test]
    fn test_max_drawdown() {
        let levels = [100.0, 120.0, 90.0, 110.0, 60.0, 130.0];
        assert_relative_eq!(max_drawdown(&levels), 0.5);
        assert_eq!(max_drawdown(&[1.0, 2.0, 3.0]), 0.0);
    }
}
