//! CSV file data adapter.
//!
//! Reads daily OHLCV history with a header row. Header names match
//! case-insensitively and extra columns are ignored. Numeric tokens may carry
//! thousands separators; unparseable tokens become gaps that are filled from
//! neighbouring bars.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::domain::error::TickwiseError;
use crate::domain::indicator_frame::IndicatorFrame;
use crate::domain::ohlcv::{parse_numeric, PriceSeries, RawBar, OHLCV_COLUMNS};
use crate::ports::data_port::DataPort;

const DATE_COLUMN: &str = "Date";
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Serves either a single CSV file or a directory of `<SYMBOL>.csv` files.
pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        if self.path.is_dir() {
            self.path.join(format!("{symbol}.csv"))
        } else {
            self.path.clone()
        }
    }
}

impl DataPort for CsvAdapter {
    fn fetch_series(&self, symbol: &str) -> Result<PriceSeries, TickwiseError> {
        let path = self.csv_path(symbol);
        let _span = tracing::info_span!("load", path = %path.display()).entered();

        let file = File::open(&path)?;
        let series = read_series(file)?;
        if series.is_empty() {
            return Err(TickwiseError::NoData {
                source_name: path.display().to_string(),
            });
        }
        tracing::info!(bars = series.len(), "price series loaded");
        Ok(series)
    }

    fn list_symbols(&self) -> Result<Vec<String>, TickwiseError> {
        if !self.path.is_dir() {
            return Ok(symbol_of(&self.path).into_iter().collect());
        }

        let mut symbols = Vec::new();
        for entry in fs::read_dir(&self.path)? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("csv")) {
                symbols.extend(symbol_of(&path));
            }
        }
        symbols.sort();
        Ok(symbols)
    }
}

fn symbol_of(path: &Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().into_owned())
}

/// Parse CSV content into a [`PriceSeries`].
pub fn read_series<R: Read>(reader: R) -> Result<PriceSeries, TickwiseError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| TickwiseError::MissingColumn {
                column: name.to_string(),
            })
    };
    let date_idx = find(DATE_COLUMN)?;
    let mut value_idx = [0usize; 5];
    for (slot, name) in value_idx.iter_mut().zip(OHLCV_COLUMNS) {
        *slot = find(name)?;
    }

    let mut rows = Vec::new();
    let mut coerced = 0usize;
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        // header is line 1
        let row = i + 2;
        let raw_date = record.get(date_idx).unwrap_or_default();
        let date = parse_date(raw_date).ok_or_else(|| TickwiseError::InvalidDate {
            row,
            value: raw_date.to_string(),
        })?;

        let mut values = [None; 5];
        for ((value, idx), name) in values.iter_mut().zip(value_idx).zip(OHLCV_COLUMNS) {
            let token = record.get(idx).unwrap_or_default();
            *value = parse_numeric(token);
            if value.is_none() {
                coerced += 1;
                tracing::warn!(row, column = name, token, "unparseable value treated as missing");
            }
        }
        let [open, high, low, close, volume] = values;
        rows.push(RawBar {
            date,
            open,
            high,
            low,
            close,
            volume,
        });
    }

    if coerced > 0 {
        tracing::info!(coerced, "missing values filled from neighbouring bars");
    }
    PriceSeries::from_raw(rows)
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

/// Write every bar of `frame` as CSV with a header row.
pub fn write_indicator_csv<W: Write>(frame: &IndicatorFrame, writer: W) -> Result<(), TickwiseError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in frame.rows() {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}
