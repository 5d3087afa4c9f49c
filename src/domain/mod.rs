//! Core domain types and analyses over an in-memory price series.

pub mod ohlcv;
pub mod indicator;
pub mod indicator_frame;
pub mod stats;
pub mod trend;
pub mod performance;
pub mod levels;
pub mod signal;
pub mod backtest;
pub mod metrics;
pub mod temporal;
pub mod report;
pub mod config_validation;
pub mod error;
