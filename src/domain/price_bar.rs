//! Daily price bar representation.

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl PriceBar {
    /// Percentage change of this bar's close against `prev`'s close.
    pub fn change_pct(&self, prev: &PriceBar) -> f64 {
        (self.close - prev.close) / prev.close * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(close: f64) -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 50_000,
        }
    }

    #[test]
    fn change_pct_up() {
        // (105 - 100) / 100 * 100 = 5
        assert!((bar(105.0).change_pct(&bar(100.0)) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn change_pct_down() {
        assert!((bar(90.0).change_pct(&bar(100.0)) - (-10.0)).abs() < 1e-9);
    }
}
