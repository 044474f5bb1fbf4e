//! Relative Strength Index (RSI) indicator.

/// Calculate Relative Strength Index (RSI) with Wilder smoothing.
///
/// RSI measures the magnitude of recent price changes to evaluate overbought
/// or oversold conditions. Values range from 0 to 100, with readings above 70
/// indicating overbought and below 30 indicating oversold.
///
/// The first value lands at index `period` (computed from the first `period`
/// bar-over-bar changes); everything earlier is `None`, as is the whole
/// series when the input has `period` or fewer values or the period is
/// non-positive.
///
/// # Arguments
///
/// * `data` - Price data, oldest first (typically close prices)
/// * `period` - Number of periods (typically 14)
///
/// # Formula
///
/// 1. Split the first `period` price changes into gains and losses and
///    average them
/// 2. Smooth subsequent averages: avg = (prev_avg × (period − 1) + current) / period
/// 3. RS = Average Gain / Average Loss
/// 4. RSI = 100 - (100 / (1 + RS)), or 100 when the average loss is zero
///
/// # Example
///
/// ```
/// use finance_rules::indicators::rsi;
///
/// let prices = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
/// let result = rsi(&prices, 3);
///
/// assert_eq!(result[2], None);
/// // All gains, no losses
/// assert_eq!(result[3], Some(100.0));
/// ```
pub fn rsi(data: &[f64], period: i64) -> Vec<Option<f64>> {
    if period <= 0 {
        return vec![None; data.len()];
    }
    let period = period as usize;

    let mut result = vec![None; data.len()];
    if data.len() <= period {
        return result;
    }

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..=period {
        let change = data[i] - data[i - 1];
        avg_gain += change.max(0.0);
        avg_loss += (-change).max(0.0);
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;

    result[period] = Some(rsi_value(avg_gain, avg_loss));

    for i in period + 1..data.len() {
        let change = data[i] - data[i - 1];
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);
        avg_gain = (avg_gain * (period as f64 - 1.0) + gain) / period as f64;
        avg_loss = (avg_loss * (period as f64 - 1.0) + loss) / period as f64;
        result[i] = Some(rsi_value(avg_gain, avg_loss));
    }

    result
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        // No losses means maximum RSI
        100.0
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - (100.0 / (1.0 + rs))
    }
}
