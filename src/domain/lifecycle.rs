//! Order lifecycle state machine.
//!
//! One slot, two states:
//!
//! - `Idle --submit--> Pending`
//! - `Pending --Submitted|Accepted--> Pending`
//! - `Pending --Completed--> Idle` (records the execution bar)
//! - `Pending --Canceled|Margin|Rejected--> Idle`
//!
//! A second submission while `Pending` is an [`EngineError::OrderConflict`].

use crate::domain::error::EngineError;
use crate::domain::order::{
    Execution, OrderDirection, OrderNotification, OrderRequest, OrderStatus, PendingOrder,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    Idle,
    Pending,
}

/// What a notification did to the tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrderTransition {
    /// Broker acknowledged the order; still pending.
    Acknowledged {
        direction: OrderDirection,
        status: OrderStatus,
    },
    /// Order filled; tracker is idle again.
    Executed {
        direction: OrderDirection,
        execution: Option<Execution>,
    },
    /// Order canceled, rejected or refused for margin; tracker is idle again.
    Failed {
        direction: OrderDirection,
        status: OrderStatus,
    },
}

#[derive(Debug, Clone, Default)]
pub struct OrderLifecycleTracker {
    pending: Option<PendingOrder>,
    last_executed_bar: Option<usize>,
}

impl OrderLifecycleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TrackerState {
        if self.pending.is_some() {
            TrackerState::Pending
        } else {
            TrackerState::Idle
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<&PendingOrder> {
        self.pending.as_ref()
    }

    /// Bar index of the most recent completed order.
    pub fn last_executed_bar(&self) -> Option<usize> {
        self.last_executed_bar
    }

    pub fn submit(
        &mut self,
        direction: OrderDirection,
        bar_index: usize,
    ) -> Result<OrderRequest, EngineError> {
        if let Some(pending) = &self.pending {
            return Err(EngineError::OrderConflict {
                requested: direction,
                pending: pending.direction,
                pending_bar: pending.submitted_bar,
                bar: bar_index,
            });
        }

        self.pending = Some(PendingOrder {
            direction,
            submitted_bar: bar_index,
            status: OrderStatus::Submitted,
        });

        Ok(OrderRequest {
            direction,
            bar_index,
        })
    }

    pub fn on_notification(
        &mut self,
        notification: &OrderNotification,
        bar_index: usize,
    ) -> Result<OrderTransition, EngineError> {
        let pending = match self.pending.as_mut() {
            Some(p) => p,
            None => {
                return Err(EngineError::UnexpectedNotification {
                    status: notification.status,
                    direction: notification.direction,
                    reason: "no order is pending".into(),
                });
            }
        };

        if pending.direction != notification.direction {
            return Err(EngineError::UnexpectedNotification {
                status: notification.status,
                direction: notification.direction,
                reason: format!("pending order is {}", pending.direction),
            });
        }

        let direction = pending.direction;
        match notification.status {
            OrderStatus::Submitted | OrderStatus::Accepted => {
                pending.status = notification.status;
                Ok(OrderTransition::Acknowledged {
                    direction,
                    status: notification.status,
                })
            }
            OrderStatus::Completed => {
                self.pending = None;
                self.last_executed_bar = Some(bar_index);
                Ok(OrderTransition::Executed {
                    direction,
                    execution: notification.execution,
                })
            }
            OrderStatus::Canceled | OrderStatus::Margin | OrderStatus::Rejected => {
                self.pending = None;
                Ok(OrderTransition::Failed {
                    direction,
                    status: notification.status,
                })
            }
        }
    }
}
