#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::HashMap;
use tickwise::domain::error::TickwiseError;
pub use tickwise::domain::ohlcv::{PriceBar, PriceSeries};
use tickwise::ports::data_port::DataPort;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_series(&self, symbol: &str) -> Result<PriceSeries, TickwiseError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(TickwiseError::computation("load", reason.clone()));
        }
        match self.data.get(symbol) {
            Some(bars) if !bars.is_empty() => Ok(PriceSeries::from_bars(bars.clone())),
            _ => Err(TickwiseError::NoData {
                source_name: symbol.to_string(),
            }),
        }
    }

    fn list_symbols(&self) -> Result<Vec<String>, TickwiseError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// One bar per calendar day from 2024-01-01, with a small intraday range.
pub fn make_bars(closes: &[f64]) -> Vec<PriceBar> {
    let start = date(2024, 1, 1);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            date: start + chrono::Duration::days(i as i64),
            open: close,
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume: 10_000.0,
        })
        .collect()
}

pub fn rising(n: usize) -> Vec<f64> {
    (0..n).map(|i| 100.0 + i as f64).collect()
}

/// Oscillating closes with a mild upward drift.
pub fn wave(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 100.0 + (i as f64 * 0.2).sin() * 12.0 + i as f64 * 0.05)
        .collect()
}

/// CSV text in the daily OHLCV layout, with volume written using
/// thousands separators.
pub fn csv_text(closes: &[f64]) -> String {
    let mut out = String::from("Date,Open,High,Low,Close,Volume\n");
    for bar in make_bars(closes) {
        out.push_str(&format!(
            "{},{:.2},{:.2},{:.2},{:.2},\"{}\"\n",
            bar.date, bar.open, bar.high, bar.low, bar.close, "1,250,000"
        ));
    }
    out
}
