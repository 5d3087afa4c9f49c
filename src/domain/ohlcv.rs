//! OHLCV bar and price series representation.
//!
//! A [`PriceSeries`] always holds its bars in strictly ascending date order,
//! whatever order the caller supplied them in. "Most recent" is the last bar.

use chrono::NaiveDate;
use serde::Serialize;

use super::error::TickwiseError;

pub const OHLCV_COLUMNS: [&str; 5] = ["Open", "High", "Low", "Close", "Volume"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// A bar as read at the ingestion boundary, before missing fields are filled.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

/// Coerce a numeric token to `f64`, accepting thousands separators.
///
/// Empty, non-finite and unparseable tokens yield `None`.
pub fn parse_numeric(token: &str) -> Option<f64> {
    let cleaned: String = token.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Fill gaps forward from the last defined value, then backward from the
/// first defined value. Returns `None` when no value is defined at all.
pub fn fill_forward_backward(values: &[Option<f64>]) -> Option<Vec<f64>> {
    let first = values.iter().flatten().copied().next()?;
    let mut last = first;
    Some(
        values
            .iter()
            .map(|v| {
                if let Some(v) = v {
                    last = *v;
                }
                last
            })
            .collect(),
    )
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a series from bars in any order. Bars are sorted ascending by
    /// date and later duplicates of a date are dropped.
    pub fn from_bars(mut bars: Vec<PriceBar>) -> Self {
        bars.sort_by_key(|b| b.date);
        let before = bars.len();
        bars.dedup_by_key(|b| b.date);
        if bars.len() != before {
            tracing::warn!(
                dropped = before - bars.len(),
                "duplicate dates dropped from price series"
            );
        }
        Self { bars }
    }

    /// Build a series from boundary rows, filling missing numeric fields per
    /// column forward then backward.
    pub fn from_raw(mut rows: Vec<RawBar>) -> Result<Self, TickwiseError> {
        if rows.is_empty() {
            return Ok(Self::default());
        }
        rows.sort_by_key(|r| r.date);

        let column = |pick: fn(&RawBar) -> Option<f64>| {
            let values: Vec<Option<f64>> = rows.iter().map(pick).collect();
            fill_forward_backward(&values)
        };

        // Close drives every analysis; the other columns may stay undefined.
        let close = column(|r| r.close).ok_or_else(|| TickwiseError::InvalidNumeric {
            column: "Close".to_string(),
            rows: rows.len(),
        })?;
        let optional = |name: &str, pick: fn(&RawBar) -> Option<f64>| {
            column(pick).unwrap_or_else(|| {
                tracing::warn!(
                    column = name,
                    rows = rows.len(),
                    "no parseable values, column left undefined"
                );
                vec![f64::NAN; rows.len()]
            })
        };
        let open = optional("Open", |r| r.open);
        let high = optional("High", |r| r.high);
        let low = optional("Low", |r| r.low);
        let volume = optional("Volume", |r| r.volume);

        let bars = rows
            .iter()
            .enumerate()
            .map(|(i, r)| PriceBar {
                date: r.date,
                open: open[i],
                high: high[i],
                low: low[i],
                close: close[i],
                volume: volume[i],
            })
            .collect();

        Ok(Self::from_bars(bars))
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&PriceBar> {
        self.bars.first()
    }

    /// The most recent bar.
    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(day: u32, close: f64) -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000.0,
        }
    }

    fn raw(day: u32, close: Option<f64>, volume: Option<f64>) -> RawBar {
        RawBar {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: Some(1.0),
            high: Some(1.0),
            low: Some(1.0),
            close,
            volume,
        }
    }

    #[test]
    fn parse_numeric_thousands_separator() {
        assert_eq!(parse_numeric("1,234,567"), Some(1_234_567.0));
        assert_eq!(parse_numeric(" 42.5 "), Some(42.5));
    }

    #[test]
    fn parse_numeric_rejects_garbage() {
        assert_eq!(parse_numeric(""), None);
        assert_eq!(parse_numeric("-"), None);
        assert_eq!(parse_numeric("n/a"), None);
        assert_eq!(parse_numeric("inf"), None);
    }

    #[test]
    fn fill_forward_then_backward() {
        let filled = fill_forward_backward(&[None, Some(2.0), None, Some(4.0), None]).unwrap();
        assert_eq!(filled, vec![2.0, 2.0, 2.0, 4.0, 4.0]);
    }

    #[test]
    fn fill_all_missing_is_none() {
        assert!(fill_forward_backward(&[None, None]).is_none());
    }

    #[test]
    fn from_bars_sorts_descending_input() {
        let series = PriceSeries::from_bars(vec![bar(3, 30.0), bar(2, 20.0), bar(1, 10.0)]);
        assert_eq!(series.closes(), vec![10.0, 20.0, 30.0]);
        assert_eq!(series.last().unwrap().close, 30.0);
    }

    #[test]
    fn from_bars_drops_duplicate_dates() {
        let series = PriceSeries::from_bars(vec![bar(1, 10.0), bar(1, 11.0), bar(2, 20.0)]);
        assert_eq!(series.len(), 2);
        assert_eq!(series.closes(), vec![10.0, 20.0]);
    }

    #[test]
    fn from_raw_fills_isolated_gaps() {
        let series = PriceSeries::from_raw(vec![
            raw(1, None, Some(100.0)),
            raw(2, Some(10.0), None),
            raw(3, None, Some(300.0)),
        ])
        .unwrap();
        assert_eq!(series.closes(), vec![10.0, 10.0, 10.0]);
        assert_eq!(series.volumes(), vec![100.0, 100.0, 300.0]);
    }

    #[test]
    fn from_raw_column_without_values_fails() {
        let err = PriceSeries::from_raw(vec![raw(1, None, Some(1.0))]).unwrap_err();
        assert!(matches!(err, TickwiseError::InvalidNumeric { ref column, .. } if column == "Close"));
    }

    #[test]
    fn from_raw_volume_without_values_is_undefined() {
        let series =
            PriceSeries::from_raw(vec![raw(1, Some(10.0), None), raw(2, Some(11.0), None)]).unwrap();
        assert_eq!(series.closes(), vec![10.0, 11.0]);
        assert!(series.volumes().iter().all(|v| v.is_nan()));
    }

    #[test]
    fn from_raw_empty_is_empty_series() {
        assert!(PriceSeries::from_raw(vec![]).unwrap().is_empty());
    }
}
