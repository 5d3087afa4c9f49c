//! Momentum indicator: percentage rate of change of close.
//!
//! MOMENTUM(n)[i] = ((C[i] - C[i-n]) / C[i-n]) * 100
//! If C[i-n] == 0 the point is invalid.
//! Warmup: first n bars invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::PriceBar;

pub const DEFAULT_PERIOD: usize = 10;

pub fn calculate_momentum(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());

    for i in 0..bars.len() {
        let date = bars[i].date;

        let change = if period > 0 && i >= period {
            let prev_close = bars[i - period].close;
            let curr_close = bars[i].close;
            if prev_close == 0.0 {
                None
            } else {
                Some(((curr_close - prev_close) / prev_close) * 100.0)
            }
        } else {
            None
        };

        values.push(IndicatorPoint {
            date,
            valid: change.is_some(),
            value: IndicatorValue::Simple(change.unwrap_or(0.0)),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Momentum(period),
        values,
    }
}
