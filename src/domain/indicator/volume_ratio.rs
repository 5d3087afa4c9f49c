//! Volume ratio: current volume over its trailing mean.
//!
//! VOLUME_RATIO(n)[i] = V[i] / SMA(V, n)[i]
//! Warmup: first (n-1) bars invalid; a zero mean volume is invalid too.

use crate::domain::indicator::sma::rolling_mean;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::PriceBar;

pub const DEFAULT_PERIOD: usize = 20;

pub fn calculate_volume_ratio(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();
    let means = rolling_mean(&volumes, period);

    let values = bars
        .iter()
        .zip(means)
        .map(|(bar, mean)| {
            let ratio = mean.filter(|m| *m > 0.0).map(|m| bar.volume / m);
            IndicatorPoint {
                date: bar.date,
                valid: ratio.is_some(),
                value: IndicatorValue::Simple(ratio.unwrap_or(0.0)),
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::VolumeRatio(period),
        values,
    }
}
