//! Simple Moving Average indicator.
//!
//! SMA(n)[i] = (C[i-n+1] + ... + C[i]) / n
//! Warmup: first (n-1) bars are not ready.

use std::collections::VecDeque;

use crate::domain::error::EngineError;
use crate::domain::indicator::{check_period, IndicatorPoint, IndicatorType, RollingIndicator};
use crate::domain::ohlcv::Bar;

/// Fixed-size window of the most recent values with an arithmetic mean.
#[derive(Debug, Clone)]
pub(crate) struct RollingWindow {
    period: usize,
    values: VecDeque<f64>,
}

impl RollingWindow {
    pub(crate) fn new(period: usize) -> Self {
        RollingWindow {
            period,
            values: VecDeque::with_capacity(period + 1),
        }
    }

    /// Push a value; returns the mean once the window is full.
    pub(crate) fn push(&mut self, value: f64) -> Option<f64> {
        self.values.push_back(value);
        if self.values.len() > self.period {
            self.values.pop_front();
        }
        if self.values.len() == self.period {
            Some(self.values.iter().sum::<f64>() / self.period as f64)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    window: RollingWindow,
}

impl Sma {
    pub fn new(period: usize) -> Result<Self, EngineError> {
        check_period(period, "SMA")?;
        Ok(Sma {
            period,
            window: RollingWindow::new(period),
        })
    }
}

impl RollingIndicator for Sma {
    fn indicator_type(&self) -> IndicatorType {
        IndicatorType::Sma(self.period)
    }

    fn update(&mut self, bar: &Bar) -> IndicatorPoint {
        match self.window.push(bar.close) {
            Some(mean) => IndicatorPoint::ready(bar.date, mean),
            None => IndicatorPoint::warming_up(bar.date),
        }
    }
}
