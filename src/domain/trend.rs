//! Trend classification and the combined trend analysis.
//!
//! Three independent votes at the most recent bar:
//! - price vs SMA(20) vs SMA(50) ordering
//! - RSI above 60 / below 40
//! - price change over the lookback window above +5% / below -5%
//!
//! The majority of up/down votes wins; a tie (including no votes) is
//! sideways. An indicator that is undefined at the most recent bar casts no
//! vote.

use std::fmt;

use serde::Serialize;

use crate::domain::error::TickwiseError;
use crate::domain::indicator::{calculate_sma, rsi::rsi_values};
use crate::domain::indicator_frame::{SMA_LONG, SMA_SHORT};
use crate::domain::levels::{support_resistance_levels, SupportResistance};
use crate::domain::ohlcv::PriceSeries;
use crate::domain::performance::{best_performing_periods, PerformanceSummary};
use crate::domain::stats::pct_change;

pub const DEFAULT_LOOKBACK: usize = 14;
pub const DEFAULT_LEVELS: usize = 3;

const RSI_UP: f64 = 60.0;
const RSI_DOWN: f64 = 40.0;
const CHANGE_PCT: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Uptrend,
    Downtrend,
    Sideways,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Uptrend => write!(f, "uptrend"),
            Trend::Downtrend => write!(f, "downtrend"),
            Trend::Sideways => write!(f, "sideways"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendConfig {
    /// Window for the RSI vote and the price-change vote.
    pub lookback: usize,
    pub levels: usize,
}

impl Default for TrendConfig {
    fn default() -> Self {
        TrendConfig {
            lookback: DEFAULT_LOOKBACK,
            levels: DEFAULT_LEVELS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendAnalysis {
    pub trend: Trend,
    pub performance: PerformanceSummary,
    pub support_resistance: SupportResistance,
}

pub fn analyze_trend(
    series: &PriceSeries,
    config: &TrendConfig,
) -> Result<TrendAnalysis, TickwiseError> {
    let _span = tracing::info_span!("trend", bars = series.len()).entered();

    let trend = determine_trend(series, config.lookback)?;
    let performance = best_performing_periods(series)?;
    let support_resistance = support_resistance_levels(series, config.levels);

    tracing::info!(%trend, "trend analysis complete");
    Ok(TrendAnalysis {
        trend,
        performance,
        support_resistance,
    })
}

pub fn determine_trend(series: &PriceSeries, lookback: usize) -> Result<Trend, TickwiseError> {
    let Some(latest) = series.last() else {
        return Err(TickwiseError::insufficient("trend", 0, 1));
    };
    let price = latest.close;
    let bars = series.bars();
    let closes = series.closes();

    let sma_20 = calculate_sma(bars, SMA_SHORT).latest_simple();
    let sma_50 = calculate_sma(bars, SMA_LONG).latest_simple();
    let rsi = rsi_values(&closes, lookback).last().copied().flatten();

    let window = lookback.min(closes.len());
    let change = if window >= 2 {
        pct_change(closes[closes.len() - window], price)
    } else {
        None
    };

    let votes = [
        ma_vote(price, sma_20, sma_50),
        rsi.and_then(|r| threshold_vote(r, RSI_UP, RSI_DOWN)),
        change.and_then(|c| threshold_vote(c, CHANGE_PCT, -CHANGE_PCT)),
    ];

    let up = votes.iter().filter(|v| **v == Some(Trend::Uptrend)).count();
    let down = votes.iter().filter(|v| **v == Some(Trend::Downtrend)).count();

    tracing::debug!(
        ?sma_20,
        ?sma_50,
        ?rsi,
        ?change,
        up,
        down,
        "trend votes"
    );

    Ok(if up > down {
        Trend::Uptrend
    } else if down > up {
        Trend::Downtrend
    } else {
        Trend::Sideways
    })
}

fn ma_vote(price: f64, sma_short: Option<f64>, sma_long: Option<f64>) -> Option<Trend> {
    let (short, long) = (sma_short?, sma_long?);
    if price > short && short > long {
        Some(Trend::Uptrend)
    } else if price < short && short < long {
        Some(Trend::Downtrend)
    } else {
        None
    }
}

fn threshold_vote(value: f64, up_above: f64, down_below: f64) -> Option<Trend> {
    if value > up_above {
        Some(Trend::Uptrend)
    } else if value < down_below {
        Some(Trend::Downtrend)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::make_bars;

    fn series(prices: &[f64]) -> PriceSeries {
        PriceSeries::from_bars(make_bars(prices))
    }

    #[test]
    fn rising_series_is_uptrend() {
        let prices: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        assert_eq!(determine_trend(&series(&prices), 14).unwrap(), Trend::Uptrend);
    }

    #[test]
    fn falling_series_is_downtrend() {
        let prices: Vec<f64> = (0..60).map(|i| 200.0 - i as f64).collect();
        assert_eq!(determine_trend(&series(&prices), 14).unwrap(), Trend::Downtrend);
    }

    #[test]
    fn flat_series_without_ma_vote() {
        // flat: no MA ordering, RSI saturates at 100 (up), change 0 → 1 up vs 0
        let prices = vec![100.0; 60];
        assert_eq!(determine_trend(&series(&prices), 14).unwrap(), Trend::Uptrend);
    }

    #[test]
    fn no_votes_is_sideways() {
        // alternating closes: equal SMAs, RSI 50, change 1%
        let prices: Vec<f64> = (0..60).map(|i| 100.0 + (i % 2) as f64).collect();
        assert_eq!(determine_trend(&series(&prices), 14).unwrap(), Trend::Sideways);
    }

    #[test]
    fn pullback_after_rally_is_downtrend() {
        // price drops below SMA20 while SMA20 stays above SMA50 (no MA vote);
        // RSI falls under 40 and the 14-bar change stays within 5%
        let mut prices: Vec<f64> = (0..50).map(|i| 100.0 + 2.0 * i as f64).collect();
        prices.extend((1..=10).map(|i| 198.0 - 1.5 * i as f64));
        assert_eq!(determine_trend(&series(&prices), 14).unwrap(), Trend::Downtrend);
    }

    #[test]
    fn short_series_casts_fewer_votes() {
        // 10 bars: no SMA vote, no RSI(14) vote, change +9% → uptrend
        let prices: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
        assert_eq!(determine_trend(&series(&prices), 14).unwrap(), Trend::Uptrend);
    }

    #[test]
    fn single_bar_is_sideways() {
        assert_eq!(determine_trend(&series(&[100.0]), 14).unwrap(), Trend::Sideways);
    }

    #[test]
    fn empty_series_is_insufficient_history() {
        let err = determine_trend(&PriceSeries::default(), 14).unwrap_err();
        assert!(matches!(err, TickwiseError::InsufficientHistory { .. }));
    }

    #[test]
    fn determine_trend_is_idempotent() {
        let prices: Vec<f64> = (0..80).map(|i| 100.0 + (i as f64 * 0.3).sin() * 8.0).collect();
        let s = series(&prices);
        assert_eq!(determine_trend(&s, 14).unwrap(), determine_trend(&s, 14).unwrap());
    }

    #[test]
    fn trend_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Trend::Sideways).unwrap(), "\"sideways\"");
        assert_eq!(Trend::Downtrend.to_string(), "downtrend");
    }

    #[test]
    fn analyze_trend_bundles_sections() {
        let prices: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let analysis = analyze_trend(&series(&prices), &TrendConfig::default()).unwrap();
        assert_eq!(analysis.trend, Trend::Uptrend);
        assert!(analysis.support_resistance.support_levels.is_empty());
    }
}
