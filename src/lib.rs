//! stratsim: rule-based daily strategy simulator.
//!
//! Hexagonal architecture: the simulation engine lives in [`domain`], port
//! traits in [`ports`], concrete implementations in [`adapters`]. [`job`]
//! runs simulations in the background and [`cli`] wires everything to the
//! command line.

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod job;
pub mod cli;
