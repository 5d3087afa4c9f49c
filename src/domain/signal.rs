//! Signal generation: fuse indicator crossovers and thresholds into
//! weighted buy/sell confidence per bar.
//!
//! Each bar is compared with the bar before it only. Scores accumulate in
//! hundredths so the threshold comparison is exact:
//!
//! | condition                              | buy | sell |
//! |----------------------------------------|-----|------|
//! | EMA(9) crosses above / below EMA(21)   | 30  | 30   |
//! | RSI below oversold / above overbought  | 20  | 20   |
//! | MACD histogram crosses above / below 0 | 20  | 20   |
//! | close below lower / above upper band   | 15  | 15   |
//! | volume ratio surge, side already > 0   | 15  | 15   |
//!
//! Buy is checked first; a bar emits at most one signal.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::indicator_frame::IndicatorFrame;

const EMA_CROSS_X100: u32 = 30;
const RSI_X100: u32 = 20;
const MACD_CROSS_X100: u32 = 20;
const BAND_X100: u32 = 15;
const VOLUME_X100: u32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalAction {
    Buy,
    Sell,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeSignal {
    pub date: NaiveDate,
    pub action: SignalAction,
    pub price: f64,
    pub confidence: f64,
    pub indicators: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalConfig {
    /// Minimum score, in hundredths, for a signal to be emitted.
    pub threshold_x100: u32,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    pub volume_surge: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        SignalConfig {
            threshold_x100: 50,
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            volume_surge: 1.5,
        }
    }
}

pub fn generate_signals(frame: &IndicatorFrame, config: &SignalConfig) -> Vec<TradeSignal> {
    let _span = tracing::info_span!("signals", bars = frame.len()).entered();
    if !frame.fully_warmed() {
        tracing::warn!(
            bars = frame.len(),
            warmup = frame.warmup,
            "series shorter than the longest indicator window"
        );
    }

    // A zero score never qualifies as a signal.
    let threshold = config.threshold_x100.max(1);
    let mut signals = Vec::new();
    for i in 1..frame.len() {
        let (buy, sell) = score_bar(frame, i, config);

        let action = if buy >= threshold {
            Some((SignalAction::Buy, buy))
        } else if sell >= threshold {
            Some((SignalAction::Sell, sell))
        } else {
            None
        };

        if let Some((action, score)) = action {
            signals.push(TradeSignal {
                date: frame.dates[i],
                action,
                price: frame.close[i],
                confidence: score as f64 / 100.0,
                indicators: BTreeMap::from([
                    ("rsi".to_string(), frame.rsi[i]),
                    ("macd".to_string(), frame.macd[i]),
                    ("volume_ratio".to_string(), frame.volume_ratio[i]),
                ]),
            });
        }
    }

    tracing::info!(signals = signals.len(), "signal generation complete");
    signals
}

/// Buy and sell scores, in hundredths, for bar `i` against bar `i - 1`.
/// The first bar has no predecessor and scores nothing.
fn score_bar(frame: &IndicatorFrame, i: usize, config: &SignalConfig) -> (u32, u32) {
    let Some(p) = i.checked_sub(1) else {
        return (0, 0);
    };
    let mut buy = 0;
    let mut sell = 0;

    if frame.ema_9[p] <= frame.ema_21[p] && frame.ema_9[i] > frame.ema_21[i] {
        buy += EMA_CROSS_X100;
    } else if frame.ema_9[p] >= frame.ema_21[p] && frame.ema_9[i] < frame.ema_21[i] {
        sell += EMA_CROSS_X100;
    }

    if frame.rsi[i] < config.rsi_oversold {
        buy += RSI_X100;
    } else if frame.rsi[i] > config.rsi_overbought {
        sell += RSI_X100;
    }

    if frame.macd_hist[p] <= 0.0 && frame.macd_hist[i] > 0.0 {
        buy += MACD_CROSS_X100;
    } else if frame.macd_hist[p] >= 0.0 && frame.macd_hist[i] < 0.0 {
        sell += MACD_CROSS_X100;
    }

    if frame.close[i] < frame.bb_lower[i] {
        buy += BAND_X100;
    } else if frame.close[i] > frame.bb_upper[i] {
        sell += BAND_X100;
    }

    if frame.volume_ratio[i] > config.volume_surge {
        if buy > 0 {
            buy += VOLUME_X100;
        }
        if sell > 0 {
            sell += VOLUME_X100;
        }
    }

    (buy, sell)
}
