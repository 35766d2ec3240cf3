//! Trade report port trait.

use std::path::Path;

use crate::domain::error::EngineError;
use crate::domain::ledger::ClosedTrade;

/// Port for writing the closed-trade table.
pub trait TradeReportPort {
    fn write_trades(&self, trades: &[ClosedTrade], output_path: &Path) -> Result<(), EngineError>;
}
