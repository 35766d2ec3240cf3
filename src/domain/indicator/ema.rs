//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seed with first SMA, then EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! Warmup: first (n-1) bars are not ready.

use crate::domain::error::EngineError;
use crate::domain::indicator::{check_period, IndicatorPoint, IndicatorType, RollingIndicator};
use crate::domain::ohlcv::Bar;

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    k: f64,
    seen: usize,
    sum: f64,
    ema: f64,
}

impl Ema {
    pub fn new(period: usize) -> Result<Self, EngineError> {
        check_period(period, "EMA")?;
        Ok(Ema {
            period,
            k: 2.0 / (period as f64 + 1.0),
            seen: 0,
            sum: 0.0,
            ema: 0.0,
        })
    }
}

impl RollingIndicator for Ema {
    fn indicator_type(&self) -> IndicatorType {
        IndicatorType::Ema(self.period)
    }

    fn update(&mut self, bar: &Bar) -> IndicatorPoint {
        self.seen += 1;
        if self.seen < self.period {
            self.sum += bar.close;
            IndicatorPoint::warming_up(bar.date)
        } else if self.seen == self.period {
            self.sum += bar.close;
            self.ema = self.sum / self.period as f64;
            IndicatorPoint::ready(bar.date, self.ema)
        } else {
            self.ema = bar.close * self.k + self.ema * (1.0 - self.k);
            IndicatorPoint::ready(bar.date, self.ema)
        }
    }
}
