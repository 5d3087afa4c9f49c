//! Support and resistance levels from local extrema of the close.

use serde::Serialize;

use crate::domain::ohlcv::PriceSeries;
use crate::domain::stats::round2;

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SupportResistance {
    pub support_levels: Vec<f64>,
    pub resistance_levels: Vec<f64>,
}

/// A close strictly above both neighbours is a resistance candidate, strictly
/// below both a support candidate. Returns the `n` highest distinct
/// resistance and `n` lowest distinct support prices, rounded to cents.
pub fn support_resistance_levels(series: &PriceSeries, n: usize) -> SupportResistance {
    let closes = series.closes();
    let mut resistance = Vec::new();
    let mut support = Vec::new();

    for w in closes.windows(3) {
        let (prev, curr, next) = (w[0], w[1], w[2]);
        if curr > prev && curr > next {
            resistance.push(curr);
        }
        if curr < prev && curr < next {
            support.push(curr);
        }
    }

    resistance.sort_by(|a, b| b.total_cmp(a));
    resistance.dedup();
    support.sort_by(|a, b| a.total_cmp(b));
    support.dedup();

    SupportResistance {
        support_levels: support.into_iter().take(n).map(round2).collect(),
        resistance_levels: resistance.into_iter().take(n).map(round2).collect(),
    }
}
