//! Per-instrument decision engine.
//!
//! Owns the indicators, the signal policy, the entry gate, the order
//! lifecycle tracker, the trade ledger and the event log. The execution
//! collaborator drives it through three entry points:
//!
//! - [`DecisionEngine::on_bar`] once per bar, returning at most one order
//! - [`DecisionEngine::on_order`] for every order status notification
//! - [`DecisionEngine::on_trade`] for every trade status notification

use std::collections::VecDeque;

use chrono::NaiveDate;

use crate::domain::config::EngineConfig;
use crate::domain::error::EngineError;
use crate::domain::events::{EngineEvent, EventLog, PortfolioSnapshot};
use crate::domain::gate::EntryGate;
use crate::domain::indicator::{self, Atr, IndicatorSeries, RollingIndicator};
use crate::domain::ledger::{TradeLedger, TradeNotification, TradeOutcome};
use crate::domain::lifecycle::{OrderLifecycleTracker, OrderTransition};
use crate::domain::ohlcv::Bar;
use crate::domain::order::{OrderDirection, OrderNotification, OrderRequest};
use crate::domain::signal::{apply_gate, Signal, SignalContext, SignalPolicy};

pub struct DecisionEngine {
    trend: Box<dyn RollingIndicator>,
    volatility: Atr,
    trend_series: IndicatorSeries,
    volatility_series: IndicatorSeries,
    closes: VecDeque<f64>,
    policy: Box<dyn SignalPolicy>,
    gate: Box<dyn EntryGate>,
    tracker: OrderLifecycleTracker,
    ledger: TradeLedger,
    events: EventLog,
    bars_seen: usize,
}

impl DecisionEngine {
    pub fn new(config: &EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Self::from_parts(
            indicator::build(config.trend_indicator())?,
            Atr::new(config.atr_period)?,
            config.policy.build()?,
            config.build_gate()?,
        )
    }

    pub fn from_parts(
        trend: Box<dyn RollingIndicator>,
        volatility: Atr,
        policy: Box<dyn SignalPolicy>,
        gate: Box<dyn EntryGate>,
    ) -> Result<Self, EngineError> {
        let trend_series = IndicatorSeries::new(trend.indicator_type());
        let volatility_series = IndicatorSeries::new(volatility.indicator_type());
        let lookback = policy.lookback().max(1);
        Ok(DecisionEngine {
            trend,
            volatility,
            trend_series,
            volatility_series,
            closes: VecDeque::with_capacity(lookback + 1),
            policy,
            gate,
            tracker: OrderLifecycleTracker::new(),
            ledger: TradeLedger::new(),
            events: EventLog::new(),
            bars_seen: 0,
        })
    }

    /// Replace the entry gate, e.g. with a deterministic one in tests.
    pub fn with_gate(mut self, gate: Box<dyn EntryGate>) -> Self {
        self.gate = gate;
        self
    }

    /// Process one bar. Returns the order to hand to the broker, if any.
    pub fn on_bar(
        &mut self,
        bar: &Bar,
        portfolio: &PortfolioSnapshot,
    ) -> Result<Option<OrderRequest>, EngineError> {
        let bar_index = self.bars_seen;
        self.bars_seen += 1;

        self.trend_series.push(self.trend.update(bar));
        self.volatility_series.push(self.volatility.update(bar));
        self.closes.push_back(bar.close);
        while self.closes.len() > self.policy.lookback().max(1) {
            self.closes.pop_front();
        }

        self.events.push(EngineEvent::BarStatus {
            bar_index,
            date: bar.date,
            close: bar.close,
            portfolio: *portfolio,
        });

        if let Some(pending) = self.tracker.pending() {
            self.events.push(EngineEvent::OrderBlocked {
                bar_index,
                date: bar.date,
                pending: pending.direction,
            });
            return Ok(None);
        }

        let trend = self.trend_series.latest_value();
        let volatility = self.volatility_series.latest_value();
        let closes = self.closes.make_contiguous();
        let ctx = SignalContext {
            bar_index,
            close: bar.close,
            trend,
            volatility,
            recent_closes: closes,
            in_market: portfolio.in_market(),
            last_executed_bar: self.tracker.last_executed_bar(),
        };
        let raw = self.policy.evaluate(&ctx);
        let gated = apply_gate(raw, self.gate.as_mut());

        if gated.suppressed {
            self.events.push(EngineEvent::EntrySuppressed {
                bar_index,
                date: bar.date,
            });
        }
        self.events.push(EngineEvent::SignalEvaluated {
            bar_index,
            date: bar.date,
            signal: gated.signal,
            close: bar.close,
            trend,
            volatility,
        });

        let direction = match gated.signal {
            Signal::Enter => OrderDirection::Buy,
            Signal::Exit => OrderDirection::Sell,
            Signal::Hold => return Ok(None),
        };
        self.submit_order(direction, bar.date, bar.close, bar_index)
            .map(Some)
    }

    fn submit_order(
        &mut self,
        direction: OrderDirection,
        date: NaiveDate,
        close: f64,
        bar_index: usize,
    ) -> Result<OrderRequest, EngineError> {
        let request = self.tracker.submit(direction, bar_index)?;
        self.events.push(EngineEvent::OrderSubmitted {
            bar_index,
            date,
            direction,
            close,
        });
        Ok(request)
    }

    /// Order status notification from the execution collaborator.
    ///
    /// Notifications delivered before the next `on_bar` are attributed to
    /// that upcoming bar, which is also what a completed order records as
    /// its execution bar.
    pub fn on_order(
        &mut self,
        notification: &OrderNotification,
    ) -> Result<OrderTransition, EngineError> {
        self.on_order_at(notification, self.bars_seen)
    }

    /// Like [`on_order`](Self::on_order), attributed to an explicit bar.
    /// Used for acknowledgements returned while the order is being placed.
    pub fn on_order_at(
        &mut self,
        notification: &OrderNotification,
        bar_index: usize,
    ) -> Result<OrderTransition, EngineError> {
        let transition = self.tracker.on_notification(notification, bar_index)?;
        let event = match transition {
            OrderTransition::Acknowledged { direction, status } => EngineEvent::OrderAcknowledged {
                bar_index,
                direction,
                status,
            },
            OrderTransition::Executed {
                direction,
                execution,
            } => EngineEvent::OrderExecuted {
                bar_index,
                direction,
                price: execution.map(|e| e.price),
                commission: execution.map(|e| e.commission),
            },
            OrderTransition::Failed { direction, status } => EngineEvent::OrderFailed {
                bar_index,
                direction,
                status,
            },
        };
        self.events.push(event);
        Ok(transition)
    }

    /// Trade status notification from the execution collaborator.
    pub fn on_trade(&mut self, notification: &TradeNotification) -> TradeOutcome {
        let outcome = self.ledger.record(notification);
        let event = match outcome {
            TradeOutcome::Recorded(_) => EngineEvent::TradeClosed {
                date: notification.date,
                pnl: notification.pnl,
                pnl_comm: notification.pnl_comm,
            },
            TradeOutcome::StillOpen => EngineEvent::TradeUpdated {
                date: notification.date,
                price: notification.price,
            },
        };
        self.events.push(event);
        outcome
    }

    pub fn bars_seen(&self) -> usize {
        self.bars_seen
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    pub fn tracker(&self) -> &OrderLifecycleTracker {
        &self.tracker
    }

    pub fn ledger(&self) -> &TradeLedger {
        &self.ledger
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn trend_series(&self) -> &IndicatorSeries {
        &self.trend_series
    }

    pub fn volatility_series(&self) -> &IndicatorSeries {
        &self.volatility_series
    }
}
