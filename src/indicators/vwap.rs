//! Volume Weighted Average Price (VWAP) indicator.

use super::{IndicatorError, Result};

/// Calculate trailing-window Volume Weighted Average Price (VWAP).
///
/// Each value is the volume-weighted mean of the trailing `period` prices.
/// The first `period - 1` elements are `None`, as is any window whose total
/// volume is zero (a data condition, not an error). Prices and volumes must
/// have the same length.
///
/// # Arguments
///
/// * `prices` - Prices, oldest first (typically close prices)
/// * `volumes` - Trading volumes, same order and length
/// * `period` - Window length in bars
///
/// # Formula
///
/// VWAP = Σ(Price × Volume) / Σ(Volume) over the trailing `period` bars
///
/// # Example
///
/// ```
/// use finance_rules::indicators::vwap;
///
/// let prices = vec![10.0, 20.0, 30.0, 40.0];
/// let volumes = vec![1.0, 1.0, 1.0, 1.0];
///
/// let result = vwap(&prices, &volumes, 2).unwrap();
/// assert_eq!(result, vec![None, Some(15.0), Some(25.0), Some(35.0)]);
/// ```
pub fn vwap(prices: &[f64], volumes: &[f64], period: i64) -> Result<Vec<Option<f64>>> {
    if period <= 0 {
        return Ok(vec![None; prices.len()]);
    }
    if prices.len() != volumes.len() {
        return Err(IndicatorError::LengthMismatch);
    }
    let period = period as usize;

    let mut result = Vec::with_capacity(prices.len());
    for i in 0..prices.len() {
        if i + 1 < period {
            result.push(None);
            continue;
        }
        let window = i + 1 - period..i + 1;
        let total_volume: f64 = volumes[window.clone()].iter().sum();
        if total_volume == 0.0 {
            result.push(None);
        } else {
            let weighted_sum: f64 = window
                .clone()
                .map(|idx| prices[idx] * volumes[idx])
                .sum();
            result.push(Some(weighted_sum / total_volume));
        }
    }

    Ok(result)
}
