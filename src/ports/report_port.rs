//! Results sink port.

use std::path::Path;

use crate::domain::error::SimError;
use crate::domain::metrics::SimulationResults;
use crate::domain::strategy::StrategyConfig;

pub trait ReportPort {
    fn write(
        &self,
        results: &SimulationResults,
        strategy: &StrategyConfig,
        output_path: &Path,
    ) -> Result<(), SimError>;
}
