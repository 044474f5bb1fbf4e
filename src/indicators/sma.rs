//! Simple Moving Average (SMA) indicator.

/// Calculate Simple Moving Average (SMA).
///
/// Returns a vector where each element is the average of the trailing
/// `period` values. The first `period - 1` elements are `None` since there's
/// insufficient data, and a non-positive period yields an all-missing series.
///
/// Uses a running window sum, so the whole series costs O(n).
///
/// # Arguments
///
/// * `data` - Price data, oldest first (typically close prices)
/// * `period` - Number of periods for the moving average
///
/// # Formula
///
/// SMA = (P1 + P2 + ... + Pn) / n
///
/// Where:
/// - P = Price at each period
/// - n = Number of periods
///
/// # Example
///
/// ```
/// use finance_rules::indicators::sma;
///
/// let prices = vec![1.0, 2.0, 3.0, 4.0, 5.0];
/// let result = sma(&prices, 3);
///
/// assert_eq!(result, vec![None, None, Some(2.0), Some(3.0), Some(4.0)]);
/// ```
pub fn sma(data: &[f64], period: i64) -> Vec<Option<f64>> {
    if period <= 0 {
        return vec![None; data.len()];
    }
    let period = period as usize;

    let mut result = Vec::with_capacity(data.len());
    let mut window_sum = 0.0;

    for (i, &value) in data.iter().enumerate() {
        window_sum += value;
        if i >= period {
            window_sum -= data[i - period];
        }
        if i + 1 < period {
            result.push(None);
        } else {
            result.push(Some(window_sum / period as f64));
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma_basic() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = sma(&data, 3);

        assert_eq!(result.len(), 5);
        assert_eq!(
            result,
            vec![None, None, Some(2.0), Some(3.0), Some(4.0)]
        );
    }

    #[test]
    fn test_sma_period_1() {
        let data = vec![10.0, 20.0, 30.0];
        let result = sma(&data, 1);

        assert_eq!(result, vec![Some(10.0), Some(20.0), Some(30.0)]);
    }

    #[test]
    fn test_sma_non_positive_period() {
        let data = vec![1.0, 2.0, 3.0];
        assert_eq!(sma(&data, 0), vec![None, None, None]);
        assert_eq!(sma(&data, -3), vec![None, None, None]);
    }

    #[test]
    fn test_sma_period_longer_than_data() {
        let data = vec![1.0, 2.0];
        assert_eq!(sma(&data, 5), vec![None, None]);
    }

    #[test]
    fn test_sma_empty_data() {
        let data: Vec<f64> = vec![];
        assert!(sma(&data, 5).is_empty());
    }
}
