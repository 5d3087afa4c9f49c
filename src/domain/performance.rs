//! Best and worst single-day and calendar-month performance.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::domain::error::TickwiseError;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::stats::{pct_change, round2};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayPerformance {
    pub date: NaiveDate,
    #[serde(rename = "return")]
    pub return_pct: f64,
    pub close: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthPerformance {
    /// `YYYY-MM`
    pub month: String,
    #[serde(rename = "return")]
    pub return_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceSummary {
    pub best_day: DayPerformance,
    pub worst_day: DayPerformance,
    pub best_month: MonthPerformance,
    pub worst_month: MonthPerformance,
}

/// Daily return is the close-to-close percentage change; monthly return is
/// last close of the month over first close of the month. Ties keep the
/// earliest day or month.
pub fn best_performing_periods(series: &PriceSeries) -> Result<PerformanceSummary, TickwiseError> {
    let bars = series.bars();
    if bars.len() < 2 {
        return Err(TickwiseError::insufficient("performance", bars.len(), 2));
    }

    let mut best: Option<DayPerformance> = None;
    let mut worst: Option<DayPerformance> = None;
    for w in bars.windows(2) {
        let Some(ret) = pct_change(w[0].close, w[1].close) else {
            continue;
        };
        let day = DayPerformance {
            date: w[1].date,
            return_pct: ret,
            close: w[1].close,
        };
        if best.as_ref().is_none_or(|b| ret > b.return_pct) {
            best = Some(day.clone());
        }
        if worst.as_ref().is_none_or(|b| ret < b.return_pct) {
            worst = Some(day);
        }
    }

    let (Some(mut best_day), Some(mut worst_day)) = (best, worst) else {
        return Err(TickwiseError::computation(
            "performance",
            "no daily return defined (zero closes)",
        ));
    };
    best_day.return_pct = round2(best_day.return_pct);
    worst_day.return_pct = round2(worst_day.return_pct);

    let months = monthly_returns(series);
    let mut best_month: Option<&(String, f64)> = None;
    let mut worst_month: Option<&(String, f64)> = None;
    for m in &months {
        if best_month.is_none_or(|b| m.1 > b.1) {
            best_month = Some(m);
        }
        if worst_month.is_none_or(|b| m.1 < b.1) {
            worst_month = Some(m);
        }
    }
    let (Some(best_month), Some(worst_month)) = (best_month, worst_month) else {
        return Err(TickwiseError::computation(
            "performance",
            "no monthly return defined (zero closes)",
        ));
    };

    Ok(PerformanceSummary {
        best_day,
        worst_day,
        best_month: MonthPerformance {
            month: best_month.0.clone(),
            return_pct: round2(best_month.1),
        },
        worst_month: MonthPerformance {
            month: worst_month.0.clone(),
            return_pct: round2(worst_month.1),
        },
    })
}

/// Percentage return per calendar month, in chronological order.
pub fn monthly_returns(series: &PriceSeries) -> Vec<(String, f64)> {
    let mut out = Vec::new();
    let bars = series.bars();
    let mut start = 0;
    while start < bars.len() {
        let key = (bars[start].date.year(), bars[start].date.month());
        let mut end = start;
        while end + 1 < bars.len() && (bars[end + 1].date.year(), bars[end + 1].date.month()) == key
        {
            end += 1;
        }
        if let Some(ret) = pct_change(bars[start].close, bars[end].close) {
            out.push((format!("{:04}-{:02}", key.0, key.1), ret));
        }
        start = end + 1;
    }
    out
}
