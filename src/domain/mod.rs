//! Core domain types and logic.

pub mod ohlcv;
pub mod error;
pub mod indicator;
pub mod signal;
pub mod gate;
pub mod order;
pub mod lifecycle;
pub mod ledger;
pub mod events;
pub mod config;
pub mod engine;
pub mod backtest;
