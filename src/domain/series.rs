//! Per-symbol price series and the global trading-day index.

use crate::domain::price_bar::PriceBar;
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone)]
pub struct SymbolSeries {
    pub symbol: String,
    pub bars: Vec<PriceBar>,
    pub date_index: HashMap<NaiveDate, usize>,
}

impl SymbolSeries {
    pub fn new(symbol: String, bars: Vec<PriceBar>) -> Self {
        let date_index = bars
            .iter()
            .enumerate()
            .map(|(i, bar)| (bar.date, i))
            .collect();
        Self {
            symbol,
            bars,
            date_index,
        }
    }

    pub fn bar_count(&self) -> usize {
        self.bars.len()
    }

    pub fn get_bar(&self, date: NaiveDate) -> Option<&PriceBar> {
        self.date_index.get(&date).map(|&i| &self.bars[i])
    }

    pub fn last_bar(&self) -> Option<&PriceBar> {
        self.bars.last()
    }
}

/// All series for one run, in configured symbol order.
#[derive(Debug, Clone, Default)]
pub struct MarketData {
    series: Vec<SymbolSeries>,
    by_symbol: HashMap<String, usize>,
}

impl MarketData {
    pub fn new(series: Vec<SymbolSeries>) -> Self {
        let mut by_symbol = HashMap::with_capacity(series.len());
        for (i, s) in series.iter().enumerate() {
            by_symbol.entry(s.symbol.clone()).or_insert(i);
        }
        Self { series, by_symbol }
    }

    pub fn series(&self) -> &[SymbolSeries] {
        &self.series
    }

    pub fn get(&self, symbol: &str) -> Option<&SymbolSeries> {
        self.by_symbol.get(symbol).map(|&i| &self.series[i])
    }

    pub fn bar(&self, symbol: &str, date: NaiveDate) -> Option<&PriceBar> {
        self.get(symbol)?.get_bar(date)
    }

    pub fn trading_days(&self) -> Vec<NaiveDate> {
        build_trading_days(&self.series)
    }
}

/// Union of every series' dates, deduplicated and sorted ascending.
pub fn build_trading_days(series: &[SymbolSeries]) -> Vec<NaiveDate> {
    let unique_dates: BTreeSet<NaiveDate> = series
        .iter()
        .flat_map(|s| s.bars.iter().map(|bar| bar.date))
        .collect();
    unique_dates.into_iter().collect()
}
