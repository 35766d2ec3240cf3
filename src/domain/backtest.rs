//! Bar loop driving a [`DecisionEngine`] against an execution collaborator.
//!
//! Per bar: broker notifications resolved on this bar are delivered first,
//! then the engine sees the bar, then any order it requests is handed to the
//! broker. New events are forwarded to the sink once the bar is complete.

use crate::domain::engine::DecisionEngine;
use crate::domain::error::EngineError;
use crate::domain::events::EventSink;
use crate::domain::ledger::TradeLedger;
use crate::domain::ohlcv::Bar;
use crate::ports::execution_port::{BrokerNotification, ExecutionPort};

/// Aggregate figures for a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestSummary {
    pub bars: usize,
    pub trades: usize,
    pub winning_trades: usize,
    pub gross_pnl: f64,
    pub net_pnl: f64,
    pub final_value: f64,
}

impl BacktestSummary {
    pub fn from_ledger(ledger: &TradeLedger, bars: usize, final_value: f64) -> Self {
        BacktestSummary {
            bars,
            trades: ledger.len(),
            winning_trades: ledger.iter().filter(|t| t.is_profit()).count(),
            gross_pnl: ledger.iter().map(|t| t.pnl).sum(),
            net_pnl: ledger.iter().map(|t| t.pnl_comm).sum(),
            final_value,
        }
    }
}

/// Hands broker notifications to the engine, attributed to `bar_index`.
pub fn deliver(
    engine: &mut DecisionEngine,
    notifications: Vec<BrokerNotification>,
    bar_index: usize,
) -> Result<(), EngineError> {
    for notification in notifications {
        match notification {
            BrokerNotification::Order(order) => {
                engine.on_order_at(&order, bar_index)?;
            }
            BrokerNotification::Trade(trade) => {
                engine.on_trade(&trade);
            }
        }
    }
    Ok(())
}

pub fn run_backtest(
    engine: &mut DecisionEngine,
    bars: &[Bar],
    broker: &mut dyn ExecutionPort,
    sink: &mut dyn EventSink,
) -> Result<BacktestSummary, EngineError> {
    let mut cursor = engine.events().len();

    for bar in bars {
        let bar_index = engine.bars_seen();
        deliver(engine, broker.on_bar(bar), bar_index)?;

        let snapshot = broker.snapshot(bar.close);
        if let Some(request) = engine.on_bar(bar, &snapshot)? {
            deliver(engine, broker.submit(&request, bar), bar_index)?;
        }

        cursor = engine.events().publish(cursor, sink);
    }

    let final_value = bars
        .last()
        .map(|b| broker.snapshot(b.close).value)
        .unwrap_or_else(|| broker.snapshot(0.0).cash);
    Ok(BacktestSummary::from_ledger(
        engine.ledger(),
        bars.len(),
        final_value,
    ))
}
