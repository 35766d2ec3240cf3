//! Port traits the engine's collaborators implement.

pub mod config_port;
pub mod data_port;
pub mod execution_port;
pub mod report_port;
