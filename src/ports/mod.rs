//! Port traits separating the engine from data, configuration and reporting.

pub mod config_port;
pub mod data_port;
pub mod report_port;
