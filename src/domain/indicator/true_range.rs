//! True Range.
//!
//! TR[0] = high[0] - low[0] (no previous close).
//! TR[i] = max(high[i]-low[i], |high[i]-close[i-1]|, |low[i]-close[i-1]|).
//! Ready from the first bar.

use crate::domain::indicator::{IndicatorPoint, IndicatorType, RollingIndicator};
use crate::domain::ohlcv::Bar;

#[derive(Debug, Clone, Default)]
pub struct TrueRange {
    prev_close: Option<f64>,
}

impl TrueRange {
    pub fn new() -> Self {
        Self::default()
    }

    /// True range of `bar`, advancing the stored previous close.
    pub fn next_value(&mut self, bar: &Bar) -> f64 {
        let tr = match self.prev_close {
            Some(prev) => bar.true_range(prev),
            None => bar.range(),
        };
        self.prev_close = Some(bar.close);
        tr
    }
}

impl RollingIndicator for TrueRange {
    fn indicator_type(&self) -> IndicatorType {
        IndicatorType::TrueRange
    }

    fn update(&mut self, bar: &Bar) -> IndicatorPoint {
        let tr = self.next_value(bar);
        IndicatorPoint::ready(bar.date, tr)
    }
}
