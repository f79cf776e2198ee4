//! Simulation results as a JSON document.

use crate::domain::error::SimError;
use crate::domain::metrics::SimulationResults;
use crate::domain::strategy::StrategyConfig;
use crate::ports::report_port::ReportPort;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportDocument<'a> {
    strategy: &'a str,
    description: &'a str,
    scanner: String,
    buy: String,
    sell: String,
    symbols: Vec<String>,
    results: &'a SimulationResults,
}

pub struct JsonReportAdapter {
    pretty: bool,
}

impl JsonReportAdapter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    pub fn to_writer<W: Write>(
        &self,
        writer: W,
        results: &SimulationResults,
        strategy: &StrategyConfig,
    ) -> Result<(), SimError> {
        let doc = ReportDocument {
            strategy: &strategy.name,
            description: &strategy.description,
            scanner: strategy.scanner.to_string(),
            buy: strategy.buy.to_string(),
            sell: strategy.sell.to_string(),
            symbols: strategy.simulation.unique_symbols(),
            results,
        };

        let outcome = if self.pretty {
            serde_json::to_writer_pretty(writer, &doc)
        } else {
            serde_json::to_writer(writer, &doc)
        };
        outcome.map_err(|e| SimError::Report {
            reason: e.to_string(),
        })
    }
}

impl Default for JsonReportAdapter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ReportPort for JsonReportAdapter {
    fn write(
        &self,
        results: &SimulationResults,
        strategy: &StrategyConfig,
        output_path: &Path,
    ) -> Result<(), SimError> {
        let file = File::create(output_path).map_err(|e| SimError::Report {
            reason: format!("cannot create {}: {}", output_path.display(), e),
        })?;
        let mut writer = BufWriter::new(file);
        self.to_writer(&mut writer, results, strategy)?;
        writer.flush()?;
        Ok(())
    }
}
