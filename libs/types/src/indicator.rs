//! Indicator frame: a price point plus its derived indicator values

use crate::market::PricePoint;
use serde::{Deserialize, Serialize};

/// A `PricePoint` extended with technical indicators
///
/// Every derived field is `None` until the series holds enough history to
/// compute it. Consumers must not substitute zero for `None`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorFrame {
    pub point: PricePoint,
    pub sma: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_hist: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_lower: Option<f64>,
    /// Mean volume of the points preceding this one
    pub volume_avg: Option<f64>,
}

impl IndicatorFrame {
    /// Frame with no indicator computed yet
    pub fn bare(point: PricePoint) -> Self {
        Self {
            point,
            sma: None,
            rsi: None,
            macd: None,
            macd_signal: None,
            macd_hist: None,
            bb_upper: None,
            bb_lower: None,
            volume_avg: None,
        }
    }

    pub fn close(&self) -> f64 {
        self.point.close
    }

    pub fn volume(&self) -> f64 {
        self.point.volume
    }
}
