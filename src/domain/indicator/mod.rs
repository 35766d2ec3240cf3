//! Technical indicators computed bar by bar.
//!
//! Every indicator implements [`RollingIndicator`]: it consumes one [`Bar`] at a
//! time and returns the point for that bar. Points carry a `ready` flag which
//! stays false until the indicator has seen enough bars to fill its window.
//! - `IndicatorPoint`: a single point in an indicator time series
//! - `IndicatorType`: indicator identity + parameters
//! - `IndicatorSeries`: append-only series aligned 1:1 with consumed bars

pub mod atr;
pub mod ema;
pub mod sma;
pub mod true_range;
pub mod wma;

use chrono::NaiveDate;
use std::fmt;

use crate::domain::error::EngineError;
use crate::domain::ohlcv::Bar;

pub use atr::Atr;
pub use ema::Ema;
pub use sma::Sma;
pub use true_range::TrueRange;
pub use wma::Wma;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub ready: bool,
    pub value: f64,
}

impl IndicatorPoint {
    pub fn warming_up(date: NaiveDate) -> Self {
        IndicatorPoint {
            date,
            ready: false,
            value: 0.0,
        }
    }

    pub fn ready(date: NaiveDate, value: f64) -> Self {
        IndicatorPoint {
            date,
            ready: true,
            value,
        }
    }

    /// The value, or `None` during warm-up.
    pub fn get(&self) -> Option<f64> {
        self.ready.then_some(self.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Wma(usize),
    TrueRange,
    Atr(usize),
}

impl IndicatorType {
    /// Number of bars needed before the first ready point.
    pub fn window(&self) -> usize {
        match self {
            IndicatorType::Sma(p)
            | IndicatorType::Ema(p)
            | IndicatorType::Wma(p)
            | IndicatorType::Atr(p) => *p,
            IndicatorType::TrueRange => 1,
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Wma(period) => write!(f, "WMA({})", period),
            IndicatorType::TrueRange => write!(f, "TR"),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
        }
    }
}

/// Moving-average flavour used as the trend line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovingAverageKind {
    Simple,
    Exponential,
    Weighted,
}

impl MovingAverageKind {
    pub fn parse(name: &str) -> Result<Self, EngineError> {
        match name.trim().to_lowercase().as_str() {
            "sma" | "simple" => Ok(MovingAverageKind::Simple),
            "ema" | "exponential" => Ok(MovingAverageKind::Exponential),
            "wma" | "weighted" => Ok(MovingAverageKind::Weighted),
            other => Err(EngineError::configuration(format!(
                "unknown moving average '{}' (expected sma, ema or wma)",
                other
            ))),
        }
    }

    pub fn indicator_type(self, period: usize) -> IndicatorType {
        match self {
            MovingAverageKind::Simple => IndicatorType::Sma(period),
            MovingAverageKind::Exponential => IndicatorType::Ema(period),
            MovingAverageKind::Weighted => IndicatorType::Wma(period),
        }
    }
}

/// An indicator fed one bar at a time.
pub trait RollingIndicator {
    fn indicator_type(&self) -> IndicatorType;

    /// Consume the next bar and return the point aligned with it.
    fn update(&mut self, bar: &Bar) -> IndicatorPoint;
}

/// Ordered, append-only sequence of indicator points.
#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    indicator_type: IndicatorType,
    values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn new(indicator_type: IndicatorType) -> Self {
        IndicatorSeries {
            indicator_type,
            values: Vec::new(),
        }
    }

    pub fn indicator_type(&self) -> IndicatorType {
        self.indicator_type
    }

    pub fn push(&mut self, point: IndicatorPoint) {
        self.values.push(point);
    }

    pub fn points(&self) -> &[IndicatorPoint] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn latest(&self) -> Option<&IndicatorPoint> {
        self.values.last()
    }

    /// Ready value at `index`; `None` when out of range or still warming up.
    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.values.get(index).and_then(IndicatorPoint::get)
    }

    pub fn latest_value(&self) -> Option<f64> {
        self.latest().and_then(IndicatorPoint::get)
    }
}

pub(crate) fn check_period(period: usize, name: &str) -> Result<(), EngineError> {
    if period == 0 {
        return Err(EngineError::configuration(format!(
            "{} period must be positive",
            name
        )));
    }
    Ok(())
}

/// Build a fresh rolling indicator for `indicator_type`.
pub fn build(indicator_type: IndicatorType) -> Result<Box<dyn RollingIndicator>, EngineError> {
    Ok(match indicator_type {
        IndicatorType::Sma(p) => Box::new(Sma::new(p)?),
        IndicatorType::Ema(p) => Box::new(Ema::new(p)?),
        IndicatorType::Wma(p) => Box::new(Wma::new(p)?),
        IndicatorType::TrueRange => Box::new(TrueRange::new()),
        IndicatorType::Atr(p) => Box::new(Atr::new(p)?),
    })
}

/// Run an indicator over a whole slice of bars.
pub fn calculate(bars: &[Bar], indicator_type: IndicatorType) -> Result<IndicatorSeries, EngineError> {
    let mut indicator = build(indicator_type)?;
    let mut series = IndicatorSeries::new(indicator_type);
    for bar in bars {
        series.push(indicator.update(bar));
    }
    Ok(series)
}

#[cfg(test)]
pub(crate) fn make_bars(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000.0,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indicator_type_display() {
        assert_eq!(IndicatorType::Sma(20).to_string(), "SMA(20)");
        assert_eq!(IndicatorType::Ema(25).to_string(), "EMA(25)");
        assert_eq!(IndicatorType::Wma(25).to_string(), "WMA(25)");
        assert_eq!(IndicatorType::TrueRange.to_string(), "TR");
        assert_eq!(IndicatorType::Atr(14).to_string(), "ATR(14)");
    }

    #[test]
    fn window_matches_period() {
        assert_eq!(IndicatorType::Sma(15).window(), 15);
        assert_eq!(IndicatorType::Atr(3).window(), 3);
        assert_eq!(IndicatorType::TrueRange.window(), 1);
    }

    #[test]
    fn moving_average_kind_parse() {
        assert_eq!(MovingAverageKind::parse("SMA").unwrap(), MovingAverageKind::Simple);
        assert_eq!(MovingAverageKind::parse(" ema ").unwrap(), MovingAverageKind::Exponential);
        assert_eq!(MovingAverageKind::parse("weighted").unwrap(), MovingAverageKind::Weighted);
        assert!(matches!(
            MovingAverageKind::parse("hull"),
            Err(EngineError::Configuration { .. })
        ));
    }

    #[test]
    fn build_rejects_zero_period() {
        for t in [
            IndicatorType::Sma(0),
            IndicatorType::Ema(0),
            IndicatorType::Wma(0),
            IndicatorType::Atr(0),
        ] {
            assert!(matches!(build(t), Err(EngineError::Configuration { .. })), "{t}");
        }
    }

    #[test]
    fn series_aligned_with_bars() {
        let bars = make_bars(&[1.0, 2.0, 3.0, 4.0]);
        let series = calculate(&bars, IndicatorType::Sma(2)).unwrap();
        assert_eq!(series.len(), bars.len());
        for (point, bar) in series.points().iter().zip(&bars) {
            assert_eq!(point.date, bar.date);
        }
        assert_eq!(series.value_at(0), None);
        assert_eq!(series.value_at(1), Some(1.5));
        assert_eq!(series.value_at(10), None);
        assert_eq!(series.latest_value(), Some(3.5));
    }

    #[test]
    fn empty_series() {
        let series = calculate(&[], IndicatorType::Ema(3)).unwrap();
        assert!(series.is_empty());
        assert!(series.latest().is_none());
        assert_eq!(series.indicator_type(), IndicatorType::Ema(3));
    }
}
