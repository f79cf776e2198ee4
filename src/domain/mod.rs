//! Core domain types and the simulation engine.

pub mod price_bar;
pub mod condition;
pub mod condition_parser;
pub mod condition_eval;
pub mod rule_set;
pub mod trade;
pub mod portfolio;
pub mod series;
pub mod strategy;
pub mod simulation;
pub mod metrics;
pub mod config_validation;
pub mod error;
