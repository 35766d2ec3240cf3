//! Next-open market-order simulator with fixed-stake sizing.
//!
//! One working order at a time. Orders placed on bar `i` fill at the open
//! of bar `i + 1`; entry fills open a trade, exit fills close it and report
//! gross and net P&L.

use crate::domain::config::read_double;
use crate::domain::error::EngineError;
use crate::domain::events::PortfolioSnapshot;
use crate::domain::ledger::TradeNotification;
use crate::domain::ohlcv::Bar;
use crate::domain::order::{OrderDirection, OrderNotification, OrderRequest, OrderStatus};
use crate::ports::config_port::ConfigPort;
use crate::ports::execution_port::{BrokerNotification, ExecutionPort};

pub const DEFAULT_CASH: f64 = 100_000.0;
pub const DEFAULT_STAKE: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BrokerConfig {
    pub cash: f64,
    pub stake: f64,
    pub commission_per_trade: f64,
    pub commission_pct: f64,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        BrokerConfig {
            cash: DEFAULT_CASH,
            stake: DEFAULT_STAKE,
            commission_per_trade: 0.0,
            commission_pct: 0.0,
        }
    }
}

impl BrokerConfig {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, EngineError> {
        let broker = BrokerConfig {
            cash: read_double(config, "broker", "cash", DEFAULT_CASH)?,
            stake: read_double(config, "broker", "stake", DEFAULT_STAKE)?,
            commission_per_trade: read_double(config, "broker", "commission_per_trade", 0.0)?,
            commission_pct: read_double(config, "broker", "commission_pct", 0.0)?,
        };
        broker.validate()?;
        Ok(broker)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.cash.is_finite() && self.cash >= 0.0) {
            return Err(EngineError::configuration("cash must be a non-negative number"));
        }
        if !(self.stake.is_finite() && self.stake > 0.0) {
            return Err(EngineError::configuration("stake must be positive"));
        }
        let fee_ok = |v: f64| v.is_finite() && v >= 0.0;
        if !(fee_ok(self.commission_per_trade) && fee_ok(self.commission_pct)) {
            return Err(EngineError::configuration("commissions must not be negative"));
        }
        Ok(())
    }

    /// Flat fee plus a percentage of traded value.
    pub fn commission(&self, trade_value: f64) -> f64 {
        self.commission_per_trade + trade_value * self.commission_pct / 100.0
    }
}

#[derive(Debug, Clone, Copy)]
struct OpenTrade {
    price: f64,
    size: f64,
    commission: f64,
}

pub struct SimulatedBroker {
    config: BrokerConfig,
    cash: f64,
    position: f64,
    open_trade: Option<OpenTrade>,
    working: Option<OrderDirection>,
}

impl SimulatedBroker {
    pub fn new(config: BrokerConfig) -> Self {
        SimulatedBroker {
            cash: config.cash,
            config,
            position: 0.0,
            open_trade: None,
            working: None,
        }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn has_working_order(&self) -> bool {
        self.working.is_some()
    }

    fn fill_buy(&mut self, bar: &Bar) -> Vec<BrokerNotification> {
        let price = bar.open;
        let size = self.config.stake;
        let cost = price * size;
        let commission = self.config.commission(cost);
        if cost + commission > self.cash {
            return vec![BrokerNotification::Order(OrderNotification::new(
                OrderDirection::Buy,
                OrderStatus::Margin,
            ))];
        }
        self.cash -= cost + commission;
        self.position += size;
        self.open_trade = Some(OpenTrade {
            price,
            size,
            commission,
        });
        vec![
            BrokerNotification::Order(OrderNotification::completed(
                OrderDirection::Buy,
                price,
                commission,
            )),
            BrokerNotification::Trade(TradeNotification::opened(bar.date, price)),
        ]
    }

    fn fill_sell(&mut self, bar: &Bar) -> Vec<BrokerNotification> {
        let Some(trade) = self.open_trade.take() else {
            return vec![BrokerNotification::Order(OrderNotification::new(
                OrderDirection::Sell,
                OrderStatus::Rejected,
            ))];
        };
        let price = bar.open;
        let proceeds = price * trade.size;
        let commission = self.config.commission(proceeds);
        self.cash += proceeds - commission;
        self.position -= trade.size;

        let pnl = (price - trade.price) * trade.size;
        let pnl_comm = pnl - trade.commission - commission;
        vec![
            BrokerNotification::Order(OrderNotification::completed(
                OrderDirection::Sell,
                price,
                commission,
            )),
            BrokerNotification::Trade(TradeNotification::closed(
                bar.date, trade.price, pnl, pnl_comm,
            )),
        ]
    }
}

impl ExecutionPort for SimulatedBroker {
    fn submit(&mut self, request: &OrderRequest, _bar: &Bar) -> Vec<BrokerNotification> {
        let direction = request.direction;
        let submitted = BrokerNotification::Order(OrderNotification::new(
            direction,
            OrderStatus::Submitted,
        ));
        let refused = self.working.is_some()
            || (direction == OrderDirection::Sell && self.open_trade.is_none());
        if refused {
            return vec![
                submitted,
                BrokerNotification::Order(OrderNotification::new(
                    direction,
                    OrderStatus::Rejected,
                )),
            ];
        }
        self.working = Some(direction);
        vec![
            submitted,
            BrokerNotification::Order(OrderNotification::new(direction, OrderStatus::Accepted)),
        ]
    }

    fn on_bar(&mut self, bar: &Bar) -> Vec<BrokerNotification> {
        match self.working.take() {
            Some(OrderDirection::Buy) => self.fill_buy(bar),
            Some(OrderDirection::Sell) => self.fill_sell(bar),
            None => Vec::new(),
        }
    }

    fn snapshot(&self, mark: f64) -> PortfolioSnapshot {
        PortfolioSnapshot {
            position_size: self.position,
            cash: self.cash,
            value: self.cash + self.position * mark,
        }
    }
}
