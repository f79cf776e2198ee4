//! Price series provider port.

use crate::domain::error::SimError;
use crate::domain::price_bar::PriceBar;
use chrono::NaiveDate;

/// Source of daily bars. Implementations return one bar per trading day in
/// `[start_date, end_date]`, ascending by date, weekends excluded.
pub trait DataPort: Send + Sync {
    fn fetch_series(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, SimError>;
}
