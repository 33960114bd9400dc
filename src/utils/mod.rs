//! Configuration, error types and report output.

pub mod config;
pub mod error;
pub mod export;
