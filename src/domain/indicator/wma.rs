//! Weighted Moving Average indicator.
//!
//! O(1) per bar using the running weighted/unweighted sum technique.
//! WMA(n) = (1*P[i-n+1] + 2*P[i-n+2] + ... + n*P[i]) / (n*(n+1)/2)
//! Warmup: first (n-1) bars are not ready.

use std::collections::VecDeque;

use crate::domain::error::EngineError;
use crate::domain::indicator::{check_period, IndicatorPoint, IndicatorType, RollingIndicator};
use crate::domain::ohlcv::Bar;

#[derive(Debug, Clone)]
pub struct Wma {
    period: usize,
    divisor: f64,
    weighted_sum: f64,
    window_sum: f64,
    window: VecDeque<f64>,
}

impl Wma {
    pub fn new(period: usize) -> Result<Self, EngineError> {
        check_period(period, "WMA")?;
        Ok(Wma {
            period,
            divisor: (period * (period + 1)) as f64 / 2.0,
            weighted_sum: 0.0,
            window_sum: 0.0,
            window: VecDeque::with_capacity(period),
        })
    }
}

impl RollingIndicator for Wma {
    fn indicator_type(&self) -> IndicatorType {
        IndicatorType::Wma(self.period)
    }

    fn update(&mut self, bar: &Bar) -> IndicatorPoint {
        if self.window.len() < self.period {
            let weight = (self.window.len() + 1) as f64;
            self.weighted_sum += weight * bar.close;
            self.window_sum += bar.close;
        } else {
            let oldest = self.window.pop_front().unwrap_or_default();
            self.weighted_sum += self.period as f64 * bar.close - self.window_sum;
            self.window_sum += bar.close - oldest;
        }
        self.window.push_back(bar.close);

        if self.window.len() == self.period {
            IndicatorPoint::ready(bar.date, self.weighted_sum / self.divisor)
        } else {
            IndicatorPoint::warming_up(bar.date)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::{calculate, make_bars};
    use approx::assert_abs_diff_eq;

    #[test]
    fn wma_warmup() {
        let series = calculate(&make_bars(&[10.0, 20.0, 30.0, 40.0, 50.0]), IndicatorType::Wma(3)).unwrap();

        assert!(!series.points()[0].ready);
        assert!(!series.points()[1].ready);
        assert!(series.points()[2].ready);
        assert!(series.points()[3].ready);
        assert!(series.points()[4].ready);
    }

    #[test]
    fn wma_known_values() {
        let series = calculate(&make_bars(&[10.0, 20.0, 30.0, 40.0, 50.0]), IndicatorType::Wma(3)).unwrap();
        let divisor = (3.0 * 4.0) / 2.0;

        assert_abs_diff_eq!(
            series.value_at(2).unwrap(),
            (1.0 * 10.0 + 2.0 * 20.0 + 3.0 * 30.0) / divisor,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            series.value_at(3).unwrap(),
            (1.0 * 20.0 + 2.0 * 30.0 + 3.0 * 40.0) / divisor,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            series.value_at(4).unwrap(),
            (1.0 * 30.0 + 2.0 * 40.0 + 3.0 * 50.0) / divisor,
            epsilon = 1e-12
        );
    }

    #[test]
    fn wma_equal_prices() {
        let series = calculate(&make_bars(&[100.0, 100.0, 100.0, 100.0]), IndicatorType::Wma(3)).unwrap();
        assert_abs_diff_eq!(series.value_at(3).unwrap(), 100.0, epsilon = 1e-12);
    }

    #[test]
    fn wma_period_1() {
        let series = calculate(&make_bars(&[10.0, 20.0, 30.0]), IndicatorType::Wma(1)).unwrap();
        assert_abs_diff_eq!(series.value_at(0).unwrap(), 10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(series.value_at(2).unwrap(), 30.0, epsilon = 1e-12);
    }

    #[test]
    fn wma_period_0() {
        assert!(Wma::new(0).is_err());
    }
}
