//! Calendar aggregation of closing prices: weekday, ISO week and month.

use std::collections::BTreeMap;

use chrono::{Datelike, Weekday};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::domain::error::TickwiseError;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::stats::{mean_max_min, round2};

const MONTH_ABBREVS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct GroupStats {
    pub mean: f64,
    pub max: f64,
    pub min: f64,
}

/// Labelled groups in natural calendar order. Serialises as a JSON object
/// whose keys keep that order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Groups(pub Vec<(String, GroupStats)>);

impl Groups {
    pub fn get(&self, label: &str) -> Option<&GroupStats> {
        self.0.iter().find(|(l, _)| l == label).map(|(_, s)| s)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.0.iter().map(|(l, _)| l.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Groups {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, stats) in &self.0 {
            map.serialize_entry(label, stats)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TemporalPatterns {
    pub daily: Groups,
    pub weekly: Groups,
    pub monthly: Groups,
}

pub fn analyze_temporal_patterns(series: &PriceSeries) -> Result<TemporalPatterns, TickwiseError> {
    let _span = tracing::info_span!("temporal", bars = series.len()).entered();
    if series.is_empty() {
        return Err(TickwiseError::insufficient("temporal", 0, 1));
    }

    let mut daily: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    let mut weekly: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    let mut monthly: BTreeMap<u32, Vec<f64>> = BTreeMap::new();

    for bar in series.bars() {
        let weekday = bar.date.weekday().num_days_from_monday();
        if weekday < 5 {
            daily.entry(weekday).or_default().push(bar.close);
        }
        weekly
            .entry(bar.date.iso_week().week())
            .or_default()
            .push(bar.close);
        monthly.entry(bar.date.month0()).or_default().push(bar.close);
    }

    let patterns = TemporalPatterns {
        daily: aggregate(daily, |d| weekday_name(d).to_string()),
        weekly: aggregate(weekly, |w| w.to_string()),
        monthly: aggregate(monthly, |m| MONTH_ABBREVS[m as usize].to_string()),
    };

    tracing::info!(
        daily = ?patterns.daily.labels(),
        weeks = patterns.weekly.len(),
        monthly = ?patterns.monthly.labels(),
        "temporal analysis complete"
    );
    Ok(patterns)
}

fn aggregate(groups: BTreeMap<u32, Vec<f64>>, label: impl Fn(u32) -> String) -> Groups {
    Groups(
        groups
            .into_iter()
            .filter_map(|(key, closes)| {
                let (mean, max, min) = mean_max_min(&closes)?;
                Some((
                    label(key),
                    GroupStats {
                        mean: round2(mean),
                        max: round2(max),
                        min: round2(min),
                    },
                ))
            })
            .collect(),
    )
}

fn weekday_name(days_from_monday: u32) -> &'static str {
    match Weekday::try_from(days_from_monday as u8) {
        Ok(Weekday::Mon) => "Monday",
        Ok(Weekday::Tue) => "Tuesday",
        Ok(Weekday::Wed) => "Wednesday",
        Ok(Weekday::Thu) => "Thursday",
        Ok(Weekday::Fri) => "Friday",
        Ok(Weekday::Sat) => "Saturday",
        Ok(Weekday::Sun) | Err(_) => "Sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::PriceBar;
    use chrono::NaiveDate;

    fn bar(y: i32, m: u32, d: u32, close: f64) -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1.0,
        }
    }

    #[test]
    fn groups_by_weekday_week_and_month() {
        // 2024-01-01 is a Monday (ISO week 1)
        let series = PriceSeries::from_bars(vec![
            bar(2024, 1, 1, 10.0),
            bar(2024, 1, 2, 20.0),
            bar(2024, 1, 8, 30.0),
            bar(2024, 2, 5, 40.0),
        ]);
        let p = analyze_temporal_patterns(&series).unwrap();

        assert_eq!(p.daily.labels(), vec!["Monday", "Tuesday"]);
        let monday = p.daily.get("Monday").unwrap();
        assert_eq!((monday.mean, monday.max, monday.min), (26.67, 40.0, 10.0));

        assert_eq!(p.weekly.labels(), vec!["1", "2", "6"]);
        assert_eq!(p.weekly.get("1").unwrap().mean, 15.0);

        assert_eq!(p.monthly.labels(), vec!["Jan", "Feb"]);
        assert_eq!(p.monthly.get("Jan").unwrap().mean, 20.0);
    }

    #[test]
    fn weekends_excluded_from_daily_only() {
        // 2024-01-06 is a Saturday
        let series = PriceSeries::from_bars(vec![bar(2024, 1, 5, 10.0), bar(2024, 1, 6, 50.0)]);
        let p = analyze_temporal_patterns(&series).unwrap();
        assert_eq!(p.daily.labels(), vec!["Friday"]);
        assert_eq!(p.monthly.get("Jan").unwrap().max, 50.0);
    }

    #[test]
    fn missing_weekday_keeps_true_labels() {
        // Wednesday and Friday only
        let series = PriceSeries::from_bars(vec![bar(2024, 1, 3, 1.0), bar(2024, 1, 5, 2.0)]);
        let p = analyze_temporal_patterns(&series).unwrap();
        assert_eq!(p.daily.labels(), vec!["Wednesday", "Friday"]);
    }

    #[test]
    fn weeks_in_numeric_order() {
        let series = PriceSeries::from_bars(vec![
            bar(2024, 3, 4, 1.0),
            bar(2024, 1, 8, 1.0),
            bar(2024, 12, 2, 1.0),
        ]);
        let p = analyze_temporal_patterns(&series).unwrap();
        assert_eq!(p.weekly.labels(), vec!["2", "10", "49"]);
    }

    #[test]
    fn empty_series_is_insufficient() {
        assert!(matches!(
            analyze_temporal_patterns(&PriceSeries::default()),
            Err(TickwiseError::InsufficientHistory { .. })
        ));
    }

    #[test]
    fn serializes_as_ordered_object() {
        let series = PriceSeries::from_bars(vec![bar(2024, 1, 2, 20.0), bar(2024, 1, 1, 10.0)]);
        let p = analyze_temporal_patterns(&series).unwrap();
        let json = serde_json::to_string(&p.daily).unwrap();
        assert_eq!(
            json,
            r#"{"Monday":{"mean":10.0,"max":10.0,"min":10.0},"Tuesday":{"mean":20.0,"max":20.0,"min":20.0}}"#
        );
    }
}
