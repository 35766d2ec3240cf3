//! Renders engine events as `tracing` records.

use crate::domain::events::{EngineEvent, EventSink};
use tracing::{debug, info, warn};

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}", v))
}

/// One human-readable line per event.
pub fn describe(event: &EngineEvent) -> String {
    match event {
        EngineEvent::BarStatus {
            date,
            close,
            portfolio,
            ..
        } => format!(
            "{} close {:.2}, position {}, cash {:.2}, investment {:.2}, portfolio {:.2}",
            date,
            close,
            portfolio.position_size,
            portfolio.cash,
            portfolio.investment_value(),
            portfolio.value
        ),
        EngineEvent::SignalEvaluated {
            date,
            signal,
            close,
            trend,
            volatility,
            ..
        } => format!(
            "{} signal {} (close {:.2}, trend {}, atr {})",
            date,
            signal,
            close,
            fmt_opt(*trend),
            fmt_opt(*volatility)
        ),
        EngineEvent::EntrySuppressed { date, .. } => {
            format!("{} entry suppressed by gate", date)
        }
        EngineEvent::OrderBlocked { date, pending, .. } => {
            format!("{} {} order pending, no new order", date, pending)
        }
        EngineEvent::OrderSubmitted {
            date,
            direction,
            close,
            ..
        } => format!("{} {} CREATE, {:.2}", date, direction, close),
        EngineEvent::OrderAcknowledged {
            direction, status, ..
        } => format!("{} order {}", direction, status),
        EngineEvent::OrderExecuted {
            direction,
            price,
            commission,
            ..
        } => format!(
            "{} EXECUTED, price {}, commission {}",
            direction,
            fmt_opt(*price),
            fmt_opt(*commission)
        ),
        EngineEvent::OrderFailed {
            direction, status, ..
        } => format!("{} order {}", direction, status),
        EngineEvent::TradeClosed {
            date,
            pnl,
            pnl_comm,
        } => format!(
            "{} OPERATION PROFIT, gross {:.2}, net {:.2}",
            date, pnl, pnl_comm
        ),
        EngineEvent::TradeUpdated { date, price } => {
            format!("{} trade open at {:.2}", date, price)
        }
    }
}

#[derive(Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn observe(&mut self, event: &EngineEvent) {
        let line = describe(event);
        match event {
            EngineEvent::BarStatus { bar_index, .. } => debug!(bar = bar_index, "{}", line),
            EngineEvent::SignalEvaluated { bar_index, .. }
            | EngineEvent::EntrySuppressed { bar_index, .. }
            | EngineEvent::OrderBlocked { bar_index, .. }
            | EngineEvent::OrderAcknowledged { bar_index, .. } => {
                debug!(bar = bar_index, "{}", line)
            }
            EngineEvent::OrderSubmitted { bar_index, .. }
            | EngineEvent::OrderExecuted { bar_index, .. } => info!(bar = bar_index, "{}", line),
            EngineEvent::OrderFailed { bar_index, .. } => warn!(bar = bar_index, "{}", line),
            EngineEvent::TradeClosed { .. } => info!("{}", line),
            EngineEvent::TradeUpdated { .. } => debug!("{}", line),
        }
    }
}
