//! Configuration validation.
//!
//! Raw INI configuration is checked before anything is built from it, and a
//! built [`StrategyConfig`] is checked again before a run starts so that JSON
//! documents and programmatic callers get the same guarantees.

use crate::domain::error::SimError;
use crate::domain::strategy::{SimulationConfig, StrategyConfig};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

const SECTION: &str = "simulation";

pub fn validate_simulation_config(config: &dyn ConfigPort) -> Result<(), SimError> {
    validate_initial_capital(config.get_double(SECTION, "initial_capital", 100_000.0))?;
    validate_position_size(config.get_double(SECTION, "position_size", 10.0))?;
    validate_max_positions(config.get_int(SECTION, "max_positions", 1))?;
    validate_risk_free_rate(config.get_double(SECTION, "risk_free_rate", 0.0))?;

    let start = parse_date(config.get_string(SECTION, "start_date").as_deref(), "start_date")?;
    let end = parse_date(config.get_string(SECTION, "end_date").as_deref(), "end_date")?;
    validate_date_order(start, end)?;

    validate_symbols(&config.get_list(SECTION, "symbols"))
}

pub fn validate_strategy(strategy: &StrategyConfig) -> Result<(), SimError> {
    let sim: &SimulationConfig = &strategy.simulation;
    validate_initial_capital(sim.initial_capital)?;
    validate_position_size(sim.position_size)?;
    validate_max_positions(sim.max_positions as i64)?;
    validate_risk_free_rate(sim.risk_free_rate)?;
    validate_date_order(sim.start_date, sim.end_date)?;
    validate_symbols(&sim.symbols)
}

fn invalid(key: &str, reason: &str) -> SimError {
    SimError::ConfigInvalid {
        section: SECTION.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_initial_capital(value: f64) -> Result<(), SimError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid("initial_capital", "initial_capital must be positive"));
    }
    Ok(())
}

fn validate_position_size(value: f64) -> Result<(), SimError> {
    if !value.is_finite() || value <= 0.0 || value > 100.0 {
        return Err(invalid(
            "position_size",
            "position_size must be greater than 0 and at most 100",
        ));
    }
    Ok(())
}

fn validate_max_positions(value: i64) -> Result<(), SimError> {
    if value < 1 {
        return Err(invalid("max_positions", "max_positions must be at least 1"));
    }
    Ok(())
}

fn validate_risk_free_rate(value: f64) -> Result<(), SimError> {
    if !value.is_finite() || !(0.0..1.0).contains(&value) {
        return Err(invalid("risk_free_rate", "risk_free_rate must be between 0 and 1"));
    }
    Ok(())
}

fn validate_date_order(start: NaiveDate, end: NaiveDate) -> Result<(), SimError> {
    if start > end {
        return Err(invalid("start_date", "start_date must not be after end_date"));
    }
    Ok(())
}

fn validate_symbols(symbols: &[String]) -> Result<(), SimError> {
    if symbols.is_empty() {
        return Err(SimError::ConfigMissing {
            section: SECTION.to_string(),
            key: "symbols".to_string(),
        });
    }
    if symbols.iter().any(|s| s.trim().is_empty()) {
        return Err(invalid("symbols", "symbols must not be blank"));
    }
    Ok(())
}

pub fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, SimError> {
    match value {
        None => Err(SimError::ConfigMissing {
            section: SECTION.to_string(),
            key: field.to_string(),
        }),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            invalid(field, &format!("invalid {} format, expected YYYY-MM-DD", field))
        }),
    }
}
