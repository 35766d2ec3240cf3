//! Append-only record of closed trades.

use chrono::NaiveDate;

/// A finished round trip as reported by the broker.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosedTrade {
    pub date: NaiveDate,
    /// Entry price of the trade.
    pub price: f64,
    /// Gross profit/loss.
    pub pnl: f64,
    /// Net profit/loss after commission.
    pub pnl_comm: f64,
}

impl ClosedTrade {
    pub fn is_profit(&self) -> bool {
        self.pnl_comm > 0.0
    }
}

/// Trade status change reported by the execution collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeNotification {
    pub is_closed: bool,
    pub date: NaiveDate,
    pub price: f64,
    pub pnl: f64,
    pub pnl_comm: f64,
}

impl TradeNotification {
    pub fn opened(date: NaiveDate, price: f64) -> Self {
        TradeNotification {
            is_closed: false,
            date,
            price,
            pnl: 0.0,
            pnl_comm: 0.0,
        }
    }

    pub fn closed(date: NaiveDate, price: f64, pnl: f64, pnl_comm: f64) -> Self {
        TradeNotification {
            is_closed: true,
            date,
            price,
            pnl,
            pnl_comm,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeOutcome {
    /// A closed trade was appended at this position.
    Recorded(usize),
    /// The trade is still open; nothing was appended.
    StillOpen,
}

#[derive(Debug, Clone, Default)]
pub struct TradeLedger {
    trades: Vec<ClosedTrade>,
}

impl TradeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, notification: &TradeNotification) -> TradeOutcome {
        if !notification.is_closed {
            return TradeOutcome::StillOpen;
        }
        self.trades.push(ClosedTrade {
            date: notification.date,
            price: notification.price,
            pnl: notification.pnl,
            pnl_comm: notification.pnl_comm,
        });
        TradeOutcome::Recorded(self.trades.len() - 1)
    }

    pub fn trades(&self) -> &[ClosedTrade] {
        &self.trades
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ClosedTrade> {
        self.trades.iter()
    }

    pub fn last(&self) -> Option<&ClosedTrade> {
        self.trades.last()
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }
}
