//! Price series extended with the derived indicator columns the trend
//! analyzer and signal generator read.
//!
//! Undefined warm-up values are filled forward then backward. A column with
//! no defined value at all (history shorter than its window) stays NaN.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::indicator::{
    bollinger, calculate_bollinger, calculate_ema, calculate_macd, calculate_momentum,
    calculate_rsi, calculate_sma, calculate_volume_ratio, macd, momentum, rsi, volume_ratio,
    IndicatorSeries, IndicatorType, IndicatorValue,
};
use crate::domain::ohlcv::{fill_forward_backward, PriceSeries};

pub const SMA_SHORT: usize = 20;
pub const SMA_LONG: usize = 50;
pub const EMA_FAST: usize = 9;
pub const EMA_SLOW: usize = 21;

pub const COLUMN_NAMES: [&str; 16] = [
    "date",
    "close",
    "volume",
    "sma_20",
    "sma_50",
    "ema_9",
    "ema_21",
    "rsi",
    "macd",
    "macd_signal",
    "macd_hist",
    "bb_upper",
    "bb_middle",
    "bb_lower",
    "momentum",
    "volume_ratio",
];

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorFrame {
    pub dates: Vec<NaiveDate>,
    pub close: Vec<f64>,
    pub volume: Vec<f64>,
    pub sma_20: Vec<f64>,
    pub sma_50: Vec<f64>,
    pub ema_9: Vec<f64>,
    pub ema_21: Vec<f64>,
    pub rsi: Vec<f64>,
    pub macd: Vec<f64>,
    pub macd_signal: Vec<f64>,
    pub macd_hist: Vec<f64>,
    pub bb_upper: Vec<f64>,
    pub bb_middle: Vec<f64>,
    pub bb_lower: Vec<f64>,
    pub momentum: Vec<f64>,
    pub volume_ratio: Vec<f64>,
    pub warmup: usize,
}

/// One bar of an [`IndicatorFrame`], as exported. Field order matches
/// [`COLUMN_NAMES`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorRow {
    pub date: NaiveDate,
    pub close: f64,
    pub volume: f64,
    pub sma_20: f64,
    pub sma_50: f64,
    pub ema_9: f64,
    pub ema_21: f64,
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_hist: f64,
    pub bb_upper: f64,
    pub bb_middle: f64,
    pub bb_lower: f64,
    pub momentum: f64,
    pub volume_ratio: f64,
}

impl IndicatorFrame {
    pub fn compute(series: &PriceSeries) -> Self {
        let bars = series.bars();
        let _span = tracing::debug_span!("indicators", bars = bars.len()).entered();

        let macd_series = calculate_macd(
            bars,
            macd::DEFAULT_FAST,
            macd::DEFAULT_SLOW,
            macd::DEFAULT_SIGNAL,
        );
        let bollinger_series = calculate_bollinger(
            bars,
            bollinger::DEFAULT_PERIOD,
            bollinger::DEFAULT_STDDEV_MULT_X100,
        );
        let volume_ratio_series = calculate_volume_ratio(bars, volume_ratio::DEFAULT_PERIOD);

        let warmup = [
            IndicatorType::Sma(SMA_LONG),
            IndicatorType::Rsi(rsi::DEFAULT_PERIOD),
            bollinger_series.indicator_type.clone(),
            IndicatorType::Momentum(momentum::DEFAULT_PERIOD),
            volume_ratio_series.indicator_type.clone(),
        ]
        .iter()
        .map(IndicatorType::warmup)
        .max()
        .unwrap_or(0);

        Self {
            dates: series.dates(),
            close: series.closes(),
            volume: series.volumes(),
            sma_20: filled(&calculate_sma(bars, SMA_SHORT)),
            sma_50: filled(&calculate_sma(bars, SMA_LONG)),
            ema_9: filled(&calculate_ema(bars, EMA_FAST)),
            ema_21: filled(&calculate_ema(bars, EMA_SLOW)),
            rsi: filled(&calculate_rsi(bars, rsi::DEFAULT_PERIOD)),
            macd: filled_part(&macd_series, |v| match v {
                IndicatorValue::Macd { line, .. } => Some(*line),
                _ => None,
            }),
            macd_signal: filled_part(&macd_series, |v| match v {
                IndicatorValue::Macd { signal, .. } => Some(*signal),
                _ => None,
            }),
            macd_hist: filled_part(&macd_series, |v| match v {
                IndicatorValue::Macd { histogram, .. } => Some(*histogram),
                _ => None,
            }),
            bb_upper: filled_part(&bollinger_series, |v| match v {
                IndicatorValue::Bollinger { upper, .. } => Some(*upper),
                _ => None,
            }),
            bb_middle: filled_part(&bollinger_series, |v| match v {
                IndicatorValue::Bollinger { middle, .. } => Some(*middle),
                _ => None,
            }),
            bb_lower: filled_part(&bollinger_series, |v| match v {
                IndicatorValue::Bollinger { lower, .. } => Some(*lower),
                _ => None,
            }),
            momentum: filled(&calculate_momentum(bars, momentum::DEFAULT_PERIOD)),
            volume_ratio: filled(&volume_ratio_series),
            warmup,
        }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// True when the series is long enough for every column to be defined
    /// from real history at the last bar.
    pub fn fully_warmed(&self) -> bool {
        self.len() > self.warmup
    }

    pub fn row(&self, i: usize) -> Option<IndicatorRow> {
        if i >= self.len() {
            return None;
        }
        Some(IndicatorRow {
            date: self.dates[i],
            close: self.close[i],
            volume: self.volume[i],
            sma_20: self.sma_20[i],
            sma_50: self.sma_50[i],
            ema_9: self.ema_9[i],
            ema_21: self.ema_21[i],
            rsi: self.rsi[i],
            macd: self.macd[i],
            macd_signal: self.macd_signal[i],
            macd_hist: self.macd_hist[i],
            bb_upper: self.bb_upper[i],
            bb_middle: self.bb_middle[i],
            bb_lower: self.bb_lower[i],
            momentum: self.momentum[i],
            volume_ratio: self.volume_ratio[i],
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = IndicatorRow> + '_ {
        (0..self.len()).filter_map(|i| self.row(i))
    }
}

fn filled(series: &IndicatorSeries) -> Vec<f64> {
    fill_column(&series.indicator_type, series.simple_values())
}

fn filled_part<F>(series: &IndicatorSeries, part: F) -> Vec<f64>
where
    F: Fn(&IndicatorValue) -> Option<f64>,
{
    fill_column(&series.indicator_type, series.project(part))
}

fn fill_column(indicator: &IndicatorType, values: Vec<Option<f64>>) -> Vec<f64> {
    match fill_forward_backward(&values) {
        Some(column) => column,
        None => {
            if !values.is_empty() {
                tracing::debug!(
                    indicator = %indicator,
                    bars = values.len(),
                    "insufficient history, column left undefined"
                );
            }
            vec![f64::NAN; values.len()]
        }
    }
}
