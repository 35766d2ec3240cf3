//! Execution collaborator port: order matching and portfolio accounting.
//!
//! The engine only ever sees notifications and snapshots; how orders are
//! matched and how cash is tracked is entirely the adapter's business.

use crate::domain::events::PortfolioSnapshot;
use crate::domain::ledger::TradeNotification;
use crate::domain::ohlcv::Bar;
use crate::domain::order::{OrderNotification, OrderRequest};

#[derive(Debug, Clone, PartialEq)]
pub enum BrokerNotification {
    Order(OrderNotification),
    Trade(TradeNotification),
}

pub trait ExecutionPort {
    /// Accept a new order placed on `bar`. Returns the immediate
    /// acknowledgements (Submitted, Accepted) or an immediate rejection.
    fn submit(&mut self, request: &OrderRequest, bar: &Bar) -> Vec<BrokerNotification>;

    /// Advance to `bar`, resolving any working order against it.
    fn on_bar(&mut self, bar: &Bar) -> Vec<BrokerNotification>;

    /// Position and cash marked at `mark`.
    fn snapshot(&self, mark: f64) -> PortfolioSnapshot;
}
