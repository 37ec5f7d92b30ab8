//! Core domain types and logic.

pub mod bar;
pub mod config_validation;
pub mod error;
pub mod indicator;
pub mod ranking;
pub mod scoring;
pub mod series;
pub mod snapshot;
pub mod universe;
