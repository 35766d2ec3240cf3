//! OHLCV bar representation.

use chrono::NaiveDate;

/// One price bar as delivered by the data feed. Never mutated by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// high - low
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.range();
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn bar(high: f64, low: f64) -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            open: low,
            high,
            low,
            close: high,
            volume: 0.0,
        }
    }

    #[test]
    fn range() {
        assert_relative_eq!(bar(52.0, 48.0).range(), 4.0);
        assert_eq!(bar(50.0, 50.0).range(), 0.0);
    }

    #[test]
    fn true_range_inside_previous_close() {
        assert_relative_eq!(bar(52.0, 48.0).true_range(50.0), 4.0);
    }

    #[test]
    fn true_range_after_gap() {
        // gap up: high - prev = 12
        assert_relative_eq!(bar(52.0, 48.0).true_range(40.0), 12.0);
        // gap down: prev - low = 12
        assert_relative_eq!(bar(52.0, 48.0).true_range(60.0), 12.0);
    }
}
