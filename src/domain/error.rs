//! Domain error types.

use crate::domain::order::{OrderDirection, OrderStatus};

/// Top-level error type for bartrader.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("configuration error: {reason}")]
    Configuration { reason: String },

    #[error(
        "order conflict at bar {bar}: cannot submit {requested} while {pending} order from bar {pending_bar} is pending"
    )]
    OrderConflict {
        requested: OrderDirection,
        pending: OrderDirection,
        pending_bar: usize,
        bar: usize,
    },

    #[error("unexpected {status} notification for {direction} order: {reason}")]
    UnexpectedNotification {
        status: OrderStatus,
        direction: OrderDirection,
        reason: String,
    },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub fn configuration(reason: impl Into<String>) -> Self {
        EngineError::Configuration {
            reason: reason.into(),
        }
    }

    /// Process exit status: 1 io, 2 config, 3 data, 4 order state.
    pub fn exit_code(&self) -> u8 {
        match self {
            EngineError::Io(_) => 1,
            EngineError::Configuration { .. }
            | EngineError::ConfigParse { .. }
            | EngineError::ConfigMissing { .. }
            | EngineError::ConfigInvalid { .. } => 2,
            EngineError::Data { .. } => 3,
            EngineError::OrderConflict { .. } | EngineError::UnexpectedNotification { .. } => 4,
        }
    }

    pub fn data(reason: impl Into<String>) -> Self {
        EngineError::Data {
            reason: reason.into(),
        }
    }
}

impl From<&EngineError> for std::process::ExitCode {
    fn from(err: &EngineError) -> Self {
        std::process::ExitCode::from(err.exit_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_conflict_message_names_both_orders() {
        let err = EngineError::OrderConflict {
            requested: OrderDirection::Sell,
            pending: OrderDirection::Buy,
            pending_bar: 3,
            bar: 4,
        };
        assert_eq!(
            err.to_string(),
            "order conflict at bar 4: cannot submit SELL while BUY order from bar 3 is pending"
        );
    }

    #[test]
    fn configuration_helper() {
        let err = EngineError::configuration("period must be positive");
        assert_eq!(
            err.to_string(),
            "configuration error: period must be positive"
        );
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: EngineError = io.into();
        assert!(matches!(err, EngineError::Io(_)));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn exit_codes_by_class() {
        assert_eq!(EngineError::configuration("x").exit_code(), 2);
        assert_eq!(EngineError::data("x").exit_code(), 3);
        let conflict = EngineError::OrderConflict {
            requested: OrderDirection::Buy,
            pending: OrderDirection::Buy,
            pending_bar: 0,
            bar: 1,
        };
        assert_eq!(conflict.exit_code(), 4);
    }
}
