//! Technical indicators for signal generation
//!
//! Streaming calculators fed one close (or volume) at a time; each returns
//! `None` until it holds enough history. [`compute_indicators`] drives them
//! over a candle series and assembles one [`IndicatorFrame`] per point.

use crate::config::IndicatorConfig;
use std::collections::VecDeque;
use types::{IndicatorFrame, PricePoint};

/// Simple Moving Average calculator
#[derive(Debug, Clone)]
pub struct MovingAverage {
    period: usize,
    values: VecDeque<f64>,
    sum: f64,
}

impl MovingAverage {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            values: VecDeque::with_capacity(period + 1),
            sum: 0.0,
        }
    }

    /// Add a new value and return current MA
    pub fn update(&mut self, value: f64) -> Option<f64> {
        self.values.push_back(value);
        self.sum += value;

        if self.values.len() > self.period {
            if let Some(old_value) = self.values.pop_front() {
                self.sum -= old_value;
            }
        }

        self.current()
    }

    pub fn current(&self) -> Option<f64> {
        if self.is_ready() {
            Some(self.sum / self.period as f64)
        } else {
            None
        }
    }

    pub fn is_ready(&self) -> bool {
        self.period > 0 && self.values.len() == self.period
    }

    /// Sample standard deviation (n-1) of the current window
    pub fn sample_std_dev(&self) -> Option<f64> {
        if !self.is_ready() || self.period < 2 {
            return None;
        }
        let mean = self.sum / self.period as f64;
        let variance = self
            .values
            .iter()
            .map(|x| {
                let diff = x - mean;
                diff * diff
            })
            .sum::<f64>()
            / (self.period - 1) as f64;
        Some(variance.sqrt())
    }
}

/// Exponential moving average seeded with the SMA of its first `period` values
#[derive(Debug, Clone)]
pub struct ExponentialMovingAverage {
    alpha: f64,
    seed: MovingAverage,
    value: Option<f64>,
}

impl ExponentialMovingAverage {
    pub fn new(period: usize) -> Self {
        Self {
            alpha: 2.0 / (period as f64 + 1.0),
            seed: MovingAverage::new(period),
            value: None,
        }
    }

    pub fn update(&mut self, value: f64) -> Option<f64> {
        self.value = match self.value {
            Some(prev) => Some(prev + self.alpha * (value - prev)),
            None => self.seed.update(value),
        };
        self.value
    }
}

/// Relative Strength Index with Wilder smoothing
#[derive(Debug, Clone)]
pub struct RelativeStrength {
    period: usize,
    prev_close: Option<f64>,
    seed_gains: f64,
    seed_losses: f64,
    seed_count: usize,
    avg_gain: Option<f64>,
    avg_loss: f64,
}

impl RelativeStrength {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            prev_close: None,
            seed_gains: 0.0,
            seed_losses: 0.0,
            seed_count: 0,
            avg_gain: None,
            avg_loss: 0.0,
        }
    }

    pub fn update(&mut self, close: f64) -> Option<f64> {
        let prev = self.prev_close.replace(close)?;
        let change = close - prev;
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);
        let n = self.period as f64;

        match self.avg_gain {
            Some(avg_gain) => {
                self.avg_gain = Some((avg_gain * (n - 1.0) + gain) / n);
                self.avg_loss = (self.avg_loss * (n - 1.0) + loss) / n;
            }
            None => {
                self.seed_gains += gain;
                self.seed_losses += loss;
                self.seed_count += 1;
                if self.seed_count < self.period {
                    return None;
                }
                self.avg_gain = Some(self.seed_gains / n);
                self.avg_loss = self.seed_losses / n;
            }
        }

        self.current()
    }

    pub fn current(&self) -> Option<f64> {
        let avg_gain = self.avg_gain?;
        let avg_loss = self.avg_loss;
        if avg_loss == 0.0 {
            return Some(if avg_gain == 0.0 { 50.0 } else { 100.0 });
        }
        let rs = avg_gain / avg_loss;
        Some(100.0 - 100.0 / (1.0 + rs))
    }
}

/// MACD line, signal line and histogram
#[derive(Debug, Clone)]
pub struct Macd {
    fast: ExponentialMovingAverage,
    slow: ExponentialMovingAverage,
    signal: ExponentialMovingAverage,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdReading {
    pub macd: Option<f64>,
    pub signal: Option<f64>,
    pub histogram: Option<f64>,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        Self {
            fast: ExponentialMovingAverage::new(fast),
            slow: ExponentialMovingAverage::new(slow),
            signal: ExponentialMovingAverage::new(signal),
        }
    }

    pub fn update(&mut self, close: f64) -> MacdReading {
        let fast = self.fast.update(close);
        let slow = self.slow.update(close);
        let macd = fast.zip(slow).map(|(f, s)| f - s);
        let signal = macd.and_then(|m| self.signal.update(m));
        MacdReading {
            macd,
            signal,
            histogram: macd.zip(signal).map(|(m, s)| m - s),
        }
    }
}

/// Mean of the `lookback` values preceding the current one
#[derive(Debug, Clone)]
pub struct TrailingAverage {
    window: MovingAverage,
}

impl TrailingAverage {
    pub fn new(lookback: usize) -> Self {
        Self {
            window: MovingAverage::new(lookback),
        }
    }

    /// Returns the average before `value` is folded in
    pub fn update(&mut self, value: f64) -> Option<f64> {
        let before = self.window.current();
        self.window.update(value);
        before
    }
}

/// Compute one indicator frame per price point
///
/// Series with fewer than two points produce no frames.
pub fn compute_indicators(points: &[PricePoint], config: &IndicatorConfig) -> Vec<IndicatorFrame> {
    if points.len() < 2 {
        return Vec::new();
    }

    let mut sma = MovingAverage::new(config.sma_window);
    let mut rsi = RelativeStrength::new(config.rsi_period);
    let mut macd = Macd::new(config.macd_fast, config.macd_slow, config.macd_signal);
    let mut volume = TrailingAverage::new(config.volume_lookback);

    points
        .iter()
        .map(|point| {
            let mean = sma.update(point.close);
            let band = sma.sample_std_dev().map(|sd| config.bollinger_k * sd);
            let reading = macd.update(point.close);

            IndicatorFrame {
                point: *point,
                sma: mean,
                rsi: rsi.update(point.close),
                macd: reading.macd,
                macd_signal: reading.signal,
                macd_hist: reading.histogram,
                bb_upper: mean.zip(band).map(|(m, b)| m + b),
                bb_lower: mean.zip(band).map(|(m, b)| m - b),
                volume_avg: volume.update(point.volume),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use proptest::prelude::*;

    fn series(closes: &[f64]) -> Vec<PricePoint> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                timestamp: DateTime::from_timestamp(i as i64 * 3600, 0).unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1.0 + i as f64,
            })
            .collect()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_moving_average() {
        let mut ma = MovingAverage::new(3);

        assert_eq!(ma.update(10.0), None);
        assert_eq!(ma.update(20.0), None);
        assert_eq!(ma.update(30.0), Some(20.0));
        assert_eq!(ma.update(40.0), Some(30.0));
        assert_close(ma.sample_std_dev().unwrap(), 10.0);
    }

    #[test]
    fn test_ema_seeded_with_sma() {
        let mut ema = ExponentialMovingAverage::new(3);
        assert_eq!(ema.update(1.0), None);
        assert_eq!(ema.update(2.0), None);
        assert_eq!(ema.update(3.0), Some(2.0));
        // alpha = 0.5
        assert_eq!(ema.update(6.0), Some(4.0));
    }

    #[test]
    fn test_rsi_extremes() {
        let mut rising = RelativeStrength::new(3);
        let readings: Vec<_> = [1.0, 2.0, 3.0, 4.0, 5.0].iter().map(|&c| rising.update(c)).collect();
        assert_eq!(readings, vec![None, None, None, Some(100.0), Some(100.0)]);

        let mut flat = RelativeStrength::new(3);
        let last = [5.0; 6].iter().map(|&c| flat.update(c)).last().flatten();
        assert_eq!(last, Some(50.0));

        let mut falling = RelativeStrength::new(3);
        let last = [5.0, 4.0, 3.0, 2.0].iter().map(|&c| falling.update(c)).last().flatten();
        assert_eq!(last, Some(0.0));
    }

    #[test]
    fn test_rsi_wilder_smoothing() {
        let mut rsi = RelativeStrength::new(2);
        assert_eq!(rsi.update(10.0), None);
        assert_eq!(rsi.update(12.0), None); // gain 2
        // seed: gains 2, losses 1 -> avg 1.0 / 0.5 -> RS 2
        assert_close(rsi.update(11.0).unwrap(), 100.0 - 100.0 / 3.0);
        // gain 1: avg_gain (1*1+1)/2 = 1, avg_loss (0.5*1+0)/2 = 0.25 -> RS 4
        assert_close(rsi.update(12.0).unwrap(), 80.0);
    }

    #[test]
    fn test_short_series_has_no_window_fields() {
        let config = IndicatorConfig::default();
        let frames = compute_indicators(&series(&[1.0, 2.0, 3.0, 4.0, 5.0]), &config);

        assert_eq!(frames.len(), 5);
        for frame in &frames {
            assert!(frame.sma.is_none());
            assert!(frame.bb_upper.is_none());
            assert!(frame.bb_lower.is_none());
            assert!(frame.macd.is_none());
            assert!(frame.rsi.is_none());
        }
    }

    #[test]
    fn test_empty_and_single_point_series() {
        let config = IndicatorConfig::default();
        assert!(compute_indicators(&[], &config).is_empty());
        assert!(compute_indicators(&series(&[1.0]), &config).is_empty());
    }

    #[test]
    fn test_definition_boundaries() {
        let config = IndicatorConfig::default();
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0).collect();
        let frames = compute_indicators(&series(&closes), &config);

        assert!(frames[13].rsi.is_none());
        assert!(frames[14].rsi.is_some());
        assert!(frames[24].macd.is_none());
        assert!(frames[25].macd.is_some());
        assert!(frames[32].macd_signal.is_none());
        assert!(frames[33].macd_signal.is_some());
        assert!(frames[33].macd_hist.is_some());
        assert!(frames[48].sma.is_none());
        assert!(frames[49].sma.is_some());
        assert!(frames[49].bb_upper.unwrap() >= frames[49].bb_lower.unwrap());
        assert!(frames[19].volume_avg.is_none());
        assert!(frames[20].volume_avg.is_some());
    }

    #[test]
    fn test_volume_avg_excludes_current_point() {
        let config = IndicatorConfig {
            volume_lookback: 3,
            ..Default::default()
        };
        // volumes are 1, 2, 3, 4, 5
        let frames = compute_indicators(&series(&[1.0; 5]), &config);
        assert_eq!(frames[2].volume_avg, None);
        assert_eq!(frames[3].volume_avg, Some(2.0));
        assert_eq!(frames[4].volume_avg, Some(3.0));
    }

    #[test]
    fn test_constant_series_bands_collapse() {
        let config = IndicatorConfig {
            sma_window: 5,
            ..Default::default()
        };
        let frames = compute_indicators(&series(&[42.0; 40]), &config);
        let last = frames.last().unwrap();
        assert_eq!(last.sma, Some(42.0));
        assert_close(last.bb_upper.unwrap(), 42.0);
        assert_close(last.bb_lower.unwrap(), 42.0);
        assert_close(last.macd.unwrap(), 0.0);
        assert_close(last.macd_hist.unwrap(), 0.0);
        assert_eq!(last.rsi, Some(50.0));
    }

    proptest! {
        #[test]
        fn prop_rsi_bounded(closes in proptest::collection::vec(1.0f64..1_000_000.0, 2..120)) {
            let frames = compute_indicators(&series(&closes), &IndicatorConfig::default());
            prop_assert_eq!(frames.len(), closes.len());
            for frame in frames {
                if let Some(rsi) = frame.rsi {
                    prop_assert!((0.0..=100.0).contains(&rsi));
                }
            }
        }

        #[test]
        fn prop_short_series_never_has_sma(len in 2usize..50) {
            let closes: Vec<f64> = (0..len).map(|i| i as f64 + 1.0).collect();
            let frames = compute_indicators(&series(&closes), &IndicatorConfig::default());
            prop_assert!(frames.iter().all(|f| f.sma.is_none() && f.bb_upper.is_none()));
        }
    }
}
