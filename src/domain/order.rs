//! Order requests, statuses and broker notifications.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderDirection {
    Buy,
    Sell,
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderDirection::Buy => write!(f, "BUY"),
            OrderDirection::Sell => write!(f, "SELL"),
        }
    }
}

/// Broker-side order status. The last four are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Submitted,
    Accepted,
    Completed,
    Canceled,
    Margin,
    Rejected,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Submitted,
        OrderStatus::Accepted,
        OrderStatus::Completed,
        OrderStatus::Canceled,
        OrderStatus::Margin,
        OrderStatus::Rejected,
    ];

    pub fn is_terminal(self) -> bool {
        !matches!(self, OrderStatus::Submitted | OrderStatus::Accepted)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderStatus::Submitted => "Submitted",
            OrderStatus::Accepted => "Accepted",
            OrderStatus::Completed => "Completed",
            OrderStatus::Canceled => "Canceled",
            OrderStatus::Margin => "Margin",
            OrderStatus::Rejected => "Rejected",
        };
        f.write_str(name)
    }
}

/// Market order handed to the execution collaborator. Sizing and price are
/// the broker's business.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderRequest {
    pub direction: OrderDirection,
    pub bar_index: usize,
}

/// The single outstanding order of a tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingOrder {
    pub direction: OrderDirection,
    pub submitted_bar: usize,
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Execution {
    pub price: f64,
    pub commission: f64,
}

/// Status change reported by the execution collaborator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderNotification {
    pub direction: OrderDirection,
    pub status: OrderStatus,
    pub execution: Option<Execution>,
}

impl OrderNotification {
    pub fn new(direction: OrderDirection, status: OrderStatus) -> Self {
        OrderNotification {
            direction,
            status,
            execution: None,
        }
    }

    pub fn completed(direction: OrderDirection, price: f64, commission: f64) -> Self {
        OrderNotification {
            direction,
            status: OrderStatus::Completed,
            execution: Some(Execution { price, commission }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses() {
        assert!(!OrderStatus::Submitted.is_terminal());
        assert!(!OrderStatus::Accepted.is_terminal());
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Canceled.is_terminal());
        assert!(OrderStatus::Margin.is_terminal());
        assert!(OrderStatus::Rejected.is_terminal());
    }

    #[test]
    fn completed_carries_execution() {
        let n = OrderNotification::completed(OrderDirection::Buy, 101.5, 1.25);
        assert_eq!(n.status, OrderStatus::Completed);
        assert_eq!(
            n.execution,
            Some(Execution {
                price: 101.5,
                commission: 1.25
            })
        );
        assert!(OrderNotification::new(OrderDirection::Sell, OrderStatus::Accepted)
            .execution
            .is_none());
    }

    #[test]
    fn display_names() {
        assert_eq!(OrderDirection::Buy.to_string(), "BUY");
        assert_eq!(OrderStatus::Margin.to_string(), "Margin");
    }
}
