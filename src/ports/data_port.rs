//! Bar data port trait.

use crate::domain::error::EngineError;
use crate::domain::ohlcv::Bar;
use chrono::NaiveDate;

pub trait BarSource {
    /// Bars in ascending date order, optionally clipped to `[start, end]`.
    fn fetch_bars(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Bar>, EngineError>;
}
