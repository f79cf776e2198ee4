#![allow(dead_code)]

use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use stratsim::domain::condition::RuleSet;
use stratsim::domain::condition_parser::parse;
use stratsim::domain::error::SimError;
pub use stratsim::domain::price_bar::PriceBar;
use stratsim::domain::strategy::{SimulationConfig, StrategyConfig};
use stratsim::ports::data_port::DataPort;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
    calls: AtomicUsize,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DataPort for MockDataPort {
    fn fetch_series(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, SimError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = self.errors.get(symbol) {
            return Err(SimError::Provider {
                symbol: symbol.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(symbol)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start_date && b.date <= end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date: &str, close: f64) -> PriceBar {
    PriceBar {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 100_000,
    }
}

/// Weekday bars starting at `start_date` with the given closes.
pub fn bars_from_closes(start_date: &str, closes: &[f64]) -> Vec<PriceBar> {
    let mut day = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    let mut bars = Vec::with_capacity(closes.len());
    for &close in closes {
        while matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            day = day.succ_opt().unwrap();
        }
        bars.push(PriceBar {
            date: day,
            open: close,
            high: close + 1.0,
            low: (close - 1.0).max(0.01),
            close,
            volume: 100_000,
        });
        day = day.succ_opt().unwrap();
    }
    bars
}

/// `count` weekday bars rising by one from `start_price`.
pub fn generate_bars(start_date: &str, count: usize, start_price: f64) -> Vec<PriceBar> {
    let closes: Vec<f64> = (0..count).map(|i| start_price + i as f64).collect();
    bars_from_closes(start_date, &closes)
}

pub fn rules(text: &str) -> RuleSet {
    parse(text).unwrap()
}

pub fn sample_strategy(symbols: &[&str], buy: &str, sell: &str) -> StrategyConfig {
    StrategyConfig {
        name: "Test".into(),
        description: "Test strategy".into(),
        scanner: RuleSet::default(),
        buy: rules(buy),
        sell: rules(sell),
        simulation: SimulationConfig {
            start_date: date(2024, 1, 1),
            end_date: date(2024, 12, 31),
            initial_capital: 10_000.0,
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
            max_positions: 1,
            position_size: 10.0,
            risk_free_rate: 0.0,
        },
    }
}
