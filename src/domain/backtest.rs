//! Long-only backtest replaying trade signals against a cash ledger.
//!
//! The ledger is FLAT (no shares) or LONG (shares > 0). A buy while FLAT
//! commits `allocation` of cash at the signal price; a sell while LONG
//! liquidates everything. Every other transition is a no-op.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::metrics::TradeStats;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::signal::{SignalAction, TradeSignal};

pub const DEFAULT_INITIAL_CAPITAL: f64 = 100_000.0;
pub const DEFAULT_ALLOCATION: f64 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    /// Fraction of cash committed on each buy, in (0, 1].
    pub allocation: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            allocation: DEFAULT_ALLOCATION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    pub date: NaiveDate,
    pub action: SignalAction,
    pub shares: u64,
    pub price: f64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestState {
    pub cash: f64,
    pub position_shares: u64,
    pub trades: Vec<Trade>,
}

impl BacktestState {
    pub fn new(initial_capital: f64) -> Self {
        BacktestState {
            cash: initial_capital,
            position_shares: 0,
            trades: Vec::new(),
        }
    }

    pub fn is_long(&self) -> bool {
        self.position_shares > 0
    }

    /// Apply one signal. Returns `true` when a trade was recorded.
    pub fn apply(&mut self, signal: &TradeSignal, allocation: f64) -> bool {
        match signal.action {
            SignalAction::Buy if !self.is_long() => self.buy(signal, allocation),
            SignalAction::Sell if self.is_long() => {
                self.sell(signal);
                true
            }
            _ => false,
        }
    }

    fn buy(&mut self, signal: &TradeSignal, allocation: f64) -> bool {
        if signal.price.is_nan() || signal.price <= 0.0 {
            return false;
        }
        let budget = (self.cash * allocation).min(self.cash);
        let mut shares = (budget / signal.price).floor();
        // The rounded quotient can overshoot by one share.
        if shares * signal.price > self.cash {
            shares -= 1.0;
        }
        if shares.is_nan() || shares < 1.0 {
            return false;
        }
        let shares = shares as u64;
        let value = shares as f64 * signal.price;
        self.cash -= value;
        self.position_shares = shares;
        self.trades.push(Trade {
            date: signal.date,
            action: SignalAction::Buy,
            shares,
            price: signal.price,
            value,
        });
        true
    }

    fn sell(&mut self, signal: &TradeSignal) {
        let shares = self.position_shares;
        let value = shares as f64 * signal.price;
        self.cash += value;
        self.position_shares = 0;
        self.trades.push(Trade {
            date: signal.date,
            action: SignalAction::Sell,
            shares,
            price: signal.price,
            value,
        });
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.cash + self.position_shares as f64 * price
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestSummary {
    pub initial_capital: f64,
    pub final_value: f64,
    pub return_pct: f64,
    pub trades: Vec<Trade>,
    pub stats: TradeStats,
}

pub fn run_backtest(
    signals: &[TradeSignal],
    series: &PriceSeries,
    config: &BacktestConfig,
) -> BacktestSummary {
    let _span = tracing::info_span!("backtest", signals = signals.len()).entered();

    let mut state = BacktestState::new(config.initial_capital);
    for signal in signals {
        if state.apply(signal, config.allocation) {
            tracing::debug!(
                date = %signal.date,
                action = ?signal.action,
                price = signal.price,
                cash = state.cash,
                shares = state.position_shares,
                "trade"
            );
        } else {
            tracing::trace!(date = %signal.date, action = ?signal.action, "signal skipped");
        }
    }

    let final_value = match series.last() {
        Some(bar) if state.is_long() => state.market_value(bar.close),
        _ => state.cash,
    };
    let return_pct = if config.initial_capital > 0.0 {
        (final_value / config.initial_capital - 1.0) * 100.0
    } else {
        0.0
    };
    let stats = TradeStats::from_trades(&state.trades);

    tracing::info!(
        trades = state.trades.len(),
        final_value,
        return_pct,
        "backtest complete"
    );

    BacktestSummary {
        initial_capital: config.initial_capital,
        final_value,
        return_pct,
        trades: state.trades,
        stats,
    }
}
