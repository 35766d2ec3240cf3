//! Average True Range.
//!
//! Simple moving average of the last n True Range values (not Wilder
//! smoothing). Warmup: first (n-1) bars are not ready.

use crate::domain::error::EngineError;
use crate::domain::indicator::sma::RollingWindow;
use crate::domain::indicator::{check_period, IndicatorPoint, IndicatorType, RollingIndicator, TrueRange};
use crate::domain::ohlcv::Bar;

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    true_range: TrueRange,
    window: RollingWindow,
}

impl Atr {
    pub fn new(period: usize) -> Result<Self, EngineError> {
        check_period(period, "ATR")?;
        Ok(Atr {
            period,
            true_range: TrueRange::new(),
            window: RollingWindow::new(period),
        })
    }
}

impl RollingIndicator for Atr {
    fn indicator_type(&self) -> IndicatorType {
        IndicatorType::Atr(self.period)
    }

    fn update(&mut self, bar: &Bar) -> IndicatorPoint {
        let tr = self.true_range.next_value(bar);
        match self.window.push(tr) {
            Some(atr) => IndicatorPoint::ready(bar.date, atr),
            None => IndicatorPoint::warming_up(bar.date),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::calculate;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    fn reference_bars() -> Vec<Bar> {
        let high = [127.01, 127.62, 126.59, 127.35, 128.17];
        let low = [125.36, 126.56, 125.07, 126.32, 126.80];
        let close = [126.00, 127.29, 126.00, 127.04, 127.88];
        (0..5)
            .map(|i| Bar {
                date: NaiveDate::from_ymd_opt(2024, 3, (i + 1) as u32).unwrap(),
                open: close[i],
                high: high[i],
                low: low[i],
                close: close[i],
                volume: 0.0,
            })
            .collect()
    }

    #[test]
    fn atr_reference_example() {
        let series = calculate(&reference_bars(), IndicatorType::Atr(3)).unwrap();

        assert!(!series.points()[0].ready);
        assert!(!series.points()[1].ready);

        // TR = 1.65, 1.62, 2.22, 1.35, 1.37
        assert_abs_diff_eq!(series.value_at(2).unwrap(), (1.65 + 1.62 + 2.22) / 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(series.value_at(3).unwrap(), (1.62 + 2.22 + 1.35) / 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(series.value_at(4).unwrap(), (2.22 + 1.35 + 1.37) / 3.0, epsilon = 1e-9);
    }

    #[test]
    fn atr_is_mean_of_true_range() {
        let bars = reference_bars();
        let tr = calculate(&bars, IndicatorType::TrueRange).unwrap();
        let atr = calculate(&bars, IndicatorType::Atr(2)).unwrap();
        for i in 1..bars.len() {
            let expected = (tr.value_at(i - 1).unwrap() + tr.value_at(i).unwrap()) / 2.0;
            assert_abs_diff_eq!(atr.value_at(i).unwrap(), expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn atr_insufficient_bars() {
        let series = calculate(&reference_bars()[..2], IndicatorType::Atr(5)).unwrap();
        assert_eq!(series.len(), 2);
        assert!(series.points().iter().all(|p| !p.ready));
    }

    #[test]
    fn atr_period_0() {
        assert!(matches!(Atr::new(0), Err(EngineError::Configuration { .. })));
    }
}
