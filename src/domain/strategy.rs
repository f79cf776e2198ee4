//! Strategy configuration: the three rule sets plus simulation parameters.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::domain::condition::{RuleSet, RuleSetKind};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_capital: f64,
    pub symbols: Vec<String>,
    pub max_positions: usize,
    /// Percent of initial capital per position, in (0, 100].
    pub position_size: f64,
    /// Annual risk-free rate as a fraction, used only for the Sharpe ratio.
    #[serde(default)]
    pub risk_free_rate: f64,
}

impl SimulationConfig {
    /// Symbols in configured order with later duplicates removed.
    pub fn unique_symbols(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::with_capacity(self.symbols.len());
        for s in &self.symbols {
            if !out.contains(s) {
                out.push(s.clone());
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "scannerConfig")]
    pub scanner: RuleSet,
    #[serde(default, rename = "buyConfig")]
    pub buy: RuleSet,
    #[serde(default, rename = "sellConfig")]
    pub sell: RuleSet,
    #[serde(rename = "simulationConfig")]
    pub simulation: SimulationConfig,
}

fn default_name() -> String {
    "Unnamed".to_string()
}

impl StrategyConfig {
    pub fn rule_set(&self, kind: RuleSetKind) -> &RuleSet {
        match kind {
            RuleSetKind::Scanner => &self.scanner,
            RuleSetKind::Buy => &self.buy,
            RuleSetKind::Sell => &self.sell,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_simulation() -> SimulationConfig {
        SimulationConfig {
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            initial_capital: 100_000.0,
            symbols: vec!["AAPL".into(), "MSFT".into(), "AAPL".into()],
            max_positions: 2,
            position_size: 10.0,
            risk_free_rate: 0.0,
        }
    }

    #[test]
    fn unique_symbols_keeps_first_occurrence() {
        assert_eq!(sample_simulation().unique_symbols(), vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn deserializes_strategy_document() {
        let json = r#"{
            "name": "Momentum",
            "scannerConfig": {"conditions": [{"indicator": "volume", "operator": ">", "value": 1000}]},
            "buyConfig": {"conditions": [{"indicator": "priceChange", "operator": ">", "value": 1.5}]},
            "sellConfig": {"conditions": [{"type": "stopLoss", "value": 5}, {"type": "takeProfit", "value": 10}]},
            "simulationConfig": {
                "startDate": "2024-01-01",
                "endDate": "2024-06-30",
                "initialCapital": 50000,
                "symbols": ["AAPL", "MSFT"],
                "maxPositions": 3,
                "positionSize": 20
            }
        }"#;
        let s: StrategyConfig = serde_json::from_str(json).unwrap();

        assert_eq!(s.name, "Momentum");
        assert_eq!(s.scanner.len(), 1);
        assert_eq!(s.buy.len(), 1);
        assert_eq!(s.sell.len(), 2);
        assert_eq!(s.simulation.max_positions, 3);
        assert!((s.simulation.initial_capital - 50_000.0).abs() < f64::EPSILON);
        assert!((s.simulation.risk_free_rate - 0.0).abs() < f64::EPSILON);
        assert_eq!(s.rule_set(RuleSetKind::Sell).len(), 2);
    }

    #[test]
    fn missing_rule_sets_default_to_empty() {
        let json = r#"{
            "simulationConfig": {
                "startDate": "2024-01-01",
                "endDate": "2024-01-31",
                "initialCapital": 1000,
                "symbols": ["AAPL"],
                "maxPositions": 1,
                "positionSize": 50
            }
        }"#;
        let s: StrategyConfig = serde_json::from_str(json).unwrap();
        assert_eq!(s.name, "Unnamed");
        assert!(s.scanner.is_empty());
        assert!(s.buy.is_empty());
        assert!(s.sell.is_empty());
    }
}
