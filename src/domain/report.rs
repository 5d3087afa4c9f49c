//! Full analysis report: every analysis over one series, assembled into a
//! single serialisable value.

use std::thread;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::backtest::{run_backtest, BacktestConfig, BacktestSummary};
use crate::domain::error::TickwiseError;
use crate::domain::indicator_frame::IndicatorFrame;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::signal::{generate_signals, SignalConfig, TradeSignal};
use crate::domain::temporal::{analyze_temporal_patterns, TemporalPatterns};
use crate::domain::trend::{analyze_trend, TrendAnalysis, TrendConfig};

/// Parameters for every analysis stage.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnalysisConfig {
    pub trend: TrendConfig,
    pub signals: SignalConfig,
    pub backtest: BacktestConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub symbol: String,
    pub bars: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub trend: TrendAnalysis,
    pub signals: Vec<TradeSignal>,
    pub backtest: BacktestSummary,
    pub temporal: TemporalPatterns,
}

/// Signals followed by the backtest that replays them.
pub fn signals_and_backtest(
    series: &PriceSeries,
    config: &AnalysisConfig,
) -> (Vec<TradeSignal>, BacktestSummary) {
    let frame = IndicatorFrame::compute(series);
    let signals = generate_signals(&frame, &config.signals);
    let backtest = run_backtest(&signals, series, &config.backtest);
    (signals, backtest)
}

/// Runs trend, signal/backtest and temporal analysis on scoped threads
/// sharing the read-only series, then joins them in a fixed order.
pub fn build_report(
    symbol: &str,
    series: &PriceSeries,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, TickwiseError> {
    let _span = tracing::info_span!("report", symbol, bars = series.len()).entered();
    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        return Err(TickwiseError::NoData {
            source_name: symbol.to_string(),
        });
    };

    let (trend, trading, temporal) = thread::scope(|s| {
        let trend = s.spawn(|| analyze_trend(series, &config.trend));
        let trading = s.spawn(|| signals_and_backtest(series, config));
        let temporal = s.spawn(|| analyze_temporal_patterns(series));
        (
            join(trend, "trend"),
            join(trading, "signals"),
            join(temporal, "temporal"),
        )
    });
    let (signals, backtest) = trading?;

    Ok(AnalysisReport {
        symbol: symbol.to_string(),
        bars: series.len(),
        first_date: first.date,
        last_date: last.date,
        trend: trend??,
        signals,
        backtest,
        temporal: temporal??,
    })
}

fn join<T>(handle: thread::ScopedJoinHandle<'_, T>, stage: &str) -> Result<T, TickwiseError> {
    handle
        .join()
        .map_err(|_| TickwiseError::computation(stage, "analysis thread panicked"))
}
