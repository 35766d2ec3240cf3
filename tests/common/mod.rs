#![allow(dead_code)]

use bartrader::domain::events::PortfolioSnapshot;
use bartrader::domain::ledger::TradeNotification;
pub use bartrader::domain::ohlcv::Bar;
use bartrader::domain::order::{OrderDirection, OrderNotification, OrderRequest, OrderStatus};
use bartrader::ports::execution_port::{BrokerNotification, ExecutionPort};
use chrono::NaiveDate;
use std::collections::VecDeque;
use std::io::Write;

pub fn date(offset: usize) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(offset as i64)
}

pub fn make_bar(offset: usize, open: f64, high: f64, low: f64, close: f64) -> Bar {
    Bar {
        date: date(offset),
        open,
        high,
        low,
        close,
        volume: 1_000.0,
    }
}

/// Bars opening at the close with a one-point range around it.
pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(i, c, c + 0.5, c - 0.5, c))
        .collect()
}

/// Slow sine wave around 100 so a trend filter enters and exits repeatedly.
pub fn wave_closes(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 100.0 + 10.0 * (i as f64 / 6.0).sin())
        .collect()
}

pub fn write_temp(content: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

pub fn bars_csv(bars: &[Bar]) -> String {
    let mut out = String::from("date,open,high,low,close,volume\n");
    for b in bars {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.date, b.open, b.high, b.low, b.close, b.volume
        ));
    }
    out
}

/// Broker that resolves each working order with the next scripted status
/// (Completed once the script runs out). Fills at the bar's open, size 1.
pub struct ScriptedBroker {
    pub outcomes: VecDeque<OrderStatus>,
    pub working: Option<OrderDirection>,
    pub entry: Option<f64>,
    pub cash: f64,
}

impl ScriptedBroker {
    pub fn new(outcomes: &[OrderStatus]) -> Self {
        Self {
            outcomes: outcomes.iter().copied().collect(),
            working: None,
            entry: None,
            cash: 1_000.0,
        }
    }
}

impl ExecutionPort for ScriptedBroker {
    fn submit(&mut self, request: &OrderRequest, _bar: &Bar) -> Vec<BrokerNotification> {
        self.working = Some(request.direction);
        vec![
            BrokerNotification::Order(OrderNotification::new(
                request.direction,
                OrderStatus::Submitted,
            )),
            BrokerNotification::Order(OrderNotification::new(
                request.direction,
                OrderStatus::Accepted,
            )),
        ]
    }

    fn on_bar(&mut self, bar: &Bar) -> Vec<BrokerNotification> {
        let Some(direction) = self.working.take() else {
            return Vec::new();
        };
        let status = self.outcomes.pop_front().unwrap_or(OrderStatus::Completed);
        if status != OrderStatus::Completed {
            return vec![BrokerNotification::Order(OrderNotification::new(
                direction, status,
            ))];
        }
        let price = bar.open;
        let trade = match direction {
            OrderDirection::Buy => {
                self.entry = Some(price);
                self.cash -= price;
                TradeNotification::opened(bar.date, price)
            }
            OrderDirection::Sell => {
                let entry = self.entry.take().unwrap();
                self.cash += price;
                TradeNotification::closed(bar.date, entry, price - entry, price - entry)
            }
        };
        vec![
            BrokerNotification::Order(OrderNotification::completed(direction, price, 0.0)),
            BrokerNotification::Trade(trade),
        ]
    }

    fn snapshot(&self, mark: f64) -> PortfolioSnapshot {
        let size = if self.entry.is_some() { 1.0 } else { 0.0 };
        PortfolioSnapshot {
            position_size: size,
            cash: self.cash,
            value: self.cash + size * mark,
        }
    }
}
