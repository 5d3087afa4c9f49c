//! Technical indicator implementations.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorValue`: Enum for different indicator output shapes
//! - `IndicatorType`: Enum for indicator identity + parameters (serves as HashMap key)
//! - `IndicatorSeries`: A time series of indicator values
//!
//! Every `calculate_*` function expects bars in ascending date order and
//! marks warm-up points `valid = false`.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod momentum;
pub mod rsi;
pub mod sma;
pub mod stddev;
pub mod volume_ratio;

pub use bollinger::calculate_bollinger;
pub use ema::{calculate_ema, ema_values};
pub use macd::calculate_macd;
pub use momentum::calculate_momentum;
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;
pub use volume_ratio::calculate_volume_ratio;

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: IndicatorValue,
}

#[derive(Debug, Clone)]
pub enum IndicatorValue {
    Simple(f64),
    Macd {
        line: f64,
        signal: f64,
        histogram: f64,
    },
    Bollinger {
        upper: f64,
        middle: f64,
        lower: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Momentum(usize),
    VolumeRatio(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
}

impl IndicatorType {
    /// Number of leading bars that cannot carry a defined value.
    pub fn warmup(&self) -> usize {
        match self {
            IndicatorType::Sma(n)
            | IndicatorType::VolumeRatio(n)
            | IndicatorType::Bollinger { period: n, .. } => n.saturating_sub(1),
            IndicatorType::Rsi(n) | IndicatorType::Momentum(n) => *n,
            IndicatorType::Ema(_) | IndicatorType::Macd { .. } => 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Single-valued points as options, `None` where the point is invalid.
    pub fn simple_values(&self) -> Vec<Option<f64>> {
        self.project(|v| match v {
            IndicatorValue::Simple(x) => Some(*x),
            _ => None,
        })
    }

    /// Project each valid point through `f`; invalid points map to `None`.
    pub fn project<F>(&self, f: F) -> Vec<Option<f64>>
    where
        F: Fn(&IndicatorValue) -> Option<f64>,
    {
        self.values
            .iter()
            .map(|p| if p.valid { f(&p.value) } else { None })
            .collect()
    }

    /// The value at the most recent point, if it is defined.
    pub fn latest_simple(&self) -> Option<f64> {
        self.simple_values().last().copied().flatten()
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Momentum(period) => write!(f, "MOMENTUM({})", period),
            IndicatorType::VolumeRatio(period) => write!(f, "VOLUME_RATIO({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER({},{})", period, mult)
            }
        }
    }
}
