//! Observation stream of engine decisions and state transitions.
//!
//! The engine never logs. It appends [`EngineEvent`]s to an [`EventLog`];
//! subscribers implementing [`EventSink`] read them and decide on formatting.

use chrono::NaiveDate;

use crate::domain::order::{OrderDirection, OrderStatus};
use crate::domain::signal::Signal;

/// Portfolio view supplied by the execution collaborator each bar.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PortfolioSnapshot {
    pub position_size: f64,
    pub cash: f64,
    pub value: f64,
}

impl PortfolioSnapshot {
    pub fn flat(cash: f64) -> Self {
        PortfolioSnapshot {
            position_size: 0.0,
            cash,
            value: cash,
        }
    }

    pub fn in_market(&self) -> bool {
        self.position_size > 0.0
    }

    /// Value held in the position.
    pub fn investment_value(&self) -> f64 {
        self.value - self.cash
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Per-bar status line.
    BarStatus {
        bar_index: usize,
        date: NaiveDate,
        close: f64,
        portfolio: PortfolioSnapshot,
    },
    SignalEvaluated {
        bar_index: usize,
        date: NaiveDate,
        signal: Signal,
        close: f64,
        trend: Option<f64>,
        volatility: Option<f64>,
    },
    /// The entry gate turned an `Enter` into `Hold`.
    EntrySuppressed { bar_index: usize, date: NaiveDate },
    /// Signal evaluation skipped because an order is still pending.
    OrderBlocked {
        bar_index: usize,
        date: NaiveDate,
        pending: OrderDirection,
    },
    OrderSubmitted {
        bar_index: usize,
        date: NaiveDate,
        direction: OrderDirection,
        close: f64,
    },
    OrderAcknowledged {
        bar_index: usize,
        direction: OrderDirection,
        status: OrderStatus,
    },
    OrderExecuted {
        bar_index: usize,
        direction: OrderDirection,
        price: Option<f64>,
        commission: Option<f64>,
    },
    OrderFailed {
        bar_index: usize,
        direction: OrderDirection,
        status: OrderStatus,
    },
    TradeClosed {
        date: NaiveDate,
        pnl: f64,
        pnl_comm: f64,
    },
    TradeUpdated { date: NaiveDate, price: f64 },
}

/// Subscriber to the event stream.
pub trait EventSink {
    fn observe(&mut self, event: &EngineEvent);
}

/// Collects events in memory.
impl EventSink for Vec<EngineEvent> {
    fn observe(&mut self, event: &EngineEvent) {
        self.push(event.clone());
    }
}

/// Append-only event log with cursor-based reads.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<EngineEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: EngineEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[EngineEvent] {
        &self.events
    }

    /// Events appended at or after `cursor`.
    pub fn since(&self, cursor: usize) -> &[EngineEvent] {
        self.events.get(cursor..).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Forward everything after `cursor` to `sink`; returns the new cursor.
    pub fn publish(&self, cursor: usize, sink: &mut dyn EventSink) -> usize {
        for event in self.since(cursor) {
            sink.observe(event);
        }
        self.events.len()
    }
}
