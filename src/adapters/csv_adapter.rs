//! CSV price series provider.
//!
//! One file per symbol, `<dir>/<SYMBOL>.csv`, with the header
//! `date,open,high,low,close,volume`.

use crate::domain::error::SimError;
use crate::domain::price_bar::PriceBar;
use crate::ports::data_port::DataPort;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::Deserialize;
use std::io;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: i64,
}

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

impl DataPort for CsvAdapter {
    fn fetch_series(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, SimError> {
        let provider_err = |reason: String| SimError::Provider {
            symbol: symbol.to_string(),
            reason,
        };

        let path = self.csv_path(symbol);
        let mut rdr = csv::Reader::from_path(&path)
            .map_err(|e| provider_err(format!("failed to read {}: {}", path.display(), e)))?;

        let mut bars = Vec::new();
        for (line, result) in rdr.deserialize::<CsvRow>().enumerate() {
            // Line 1 is the header.
            let row = result.map_err(|e| provider_err(format!("line {}: {}", line + 2, e)))?;
            let date = NaiveDate::parse_from_str(row.date.trim(), "%Y-%m-%d").map_err(|e| {
                provider_err(format!("line {}: invalid date {:?}: {}", line + 2, row.date, e))
            })?;

            if date < start_date || date > end_date || is_weekend(date) {
                continue;
            }

            bars.push(PriceBar {
                date,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume,
            });
        }

        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);
        Ok(bars)
    }
}

/// Write bars in the format [`CsvAdapter`] reads.
pub fn write_series<W: io::Write>(writer: W, bars: &[PriceBar]) -> Result<(), SimError> {
    let report_err = |e: csv::Error| SimError::Report {
        reason: format!("CSV write error: {}", e),
    };

    let mut wtr = csv::Writer::from_writer(writer);
    for bar in bars {
        wtr.serialize(bar).map_err(report_err)?;
    }
    wtr.flush()?;
    Ok(())
}
