//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{ArgGroup, Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::{self, CsvAdapter};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::adapters::json_strategy_adapter;
use crate::adapters::synthetic_adapter::SyntheticAdapter;
use crate::domain::condition::{RuleSet, RuleSetKind};
use crate::domain::condition_parser;
use crate::domain::config_validation::{parse_date, validate_simulation_config, validate_strategy};
use crate::domain::error::SimError;
use crate::domain::metrics::SimulationResults;
use crate::domain::simulation;
use crate::domain::strategy::{SimulationConfig, StrategyConfig};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

const DEFAULT_OUTPUT: &str = "results.json";
const DEFAULT_SEED: i64 = 42;

#[derive(Parser, Debug)]
#[command(name = "stratsim", about = "Rule-based daily strategy simulator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a simulation and write the results as JSON
    Simulate {
        #[arg(short, long)]
        config: PathBuf,
        /// JSON strategy document; replaces the [simulation] and [strategy] sections
        #[arg(short, long)]
        strategy: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration without running it
    #[command(group(ArgGroup::new("source").required(true).multiple(true).args(["config", "strategy"])))]
    Validate {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        strategy: Option<PathBuf>,
    },
    /// Write a synthetic price series as CSV
    Generate {
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        #[arg(long, default_value_t = DEFAULT_SEED as u64)]
        seed: u64,
        /// Defaults to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let outcome = match cli.command {
        Command::Simulate {
            config,
            strategy,
            output,
        } => run_simulate(&config, strategy.as_deref(), output.as_deref()),
        Command::Validate { config, strategy } => {
            run_validate(config.as_deref(), strategy.as_deref())
        }
        Command::Generate {
            symbol,
            start,
            end,
            seed,
            output,
        } => run_generate(&symbol, start, end, seed, output.as_deref()),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, SimError> {
    eprintln!("Loading config from {}", path.display());
    FileConfigAdapter::from_file(path)
}

/// Build the `[simulation]` section. Symbols are upper-cased and
/// de-duplicated, keeping the first occurrence.
pub fn build_simulation_config(config: &dyn ConfigPort) -> Result<SimulationConfig, SimError> {
    validate_simulation_config(config)?;

    let mut symbols: Vec<String> = Vec::new();
    for symbol in config.get_list("simulation", "symbols") {
        let symbol = symbol.to_uppercase();
        if !symbols.contains(&symbol) {
            symbols.push(symbol);
        }
    }

    Ok(SimulationConfig {
        start_date: parse_date(config.get_string("simulation", "start_date").as_deref(), "start_date")?,
        end_date: parse_date(config.get_string("simulation", "end_date").as_deref(), "end_date")?,
        initial_capital: config.get_double("simulation", "initial_capital", 100_000.0),
        symbols,
        max_positions: config.get_int("simulation", "max_positions", 1) as usize,
        position_size: config.get_double("simulation", "position_size", 10.0),
        risk_free_rate: config.get_double("simulation", "risk_free_rate", 0.0),
    })
}

fn parse_rule_set(config: &dyn ConfigPort, kind: RuleSetKind) -> Result<RuleSet, SimError> {
    let text = config
        .get_string("strategy", &kind.to_string())
        .unwrap_or_default();

    condition_parser::parse(&text).map_err(|source| {
        eprintln!(
            "error: failed to parse {} rules:\n{}",
            kind,
            source.display_with_context(&text)
        );
        SimError::ConditionParse {
            rule_set: kind.to_string(),
            source,
        }
    })
}

/// Build a full strategy from the `[simulation]` and `[strategy]` sections.
pub fn build_strategy(config: &dyn ConfigPort) -> Result<StrategyConfig, SimError> {
    let simulation = build_simulation_config(config)?;

    Ok(StrategyConfig {
        name: config
            .get_string("strategy", "name")
            .unwrap_or_else(|| "Unnamed".to_string()),
        description: config
            .get_string("strategy", "description")
            .unwrap_or_default(),
        scanner: parse_rule_set(config, RuleSetKind::Scanner)?,
        buy: parse_rule_set(config, RuleSetKind::Buy)?,
        sell: parse_rule_set(config, RuleSetKind::Sell)?,
        simulation,
    })
}

/// Pick the price provider named in `[data]`.
pub fn resolve_provider(config: &dyn ConfigPort) -> Result<Box<dyn DataPort>, SimError> {
    let provider = config
        .get_string("data", "provider")
        .unwrap_or_else(|| "synthetic".to_string())
        .to_lowercase();

    match provider.as_str() {
        "synthetic" => {
            let seed = config.get_int("data", "seed", DEFAULT_SEED);
            let seed = u64::try_from(seed).map_err(|_| SimError::ConfigInvalid {
                section: "data".into(),
                key: "seed".into(),
                reason: "seed must not be negative".into(),
            })?;
            Ok(Box::new(SyntheticAdapter::new(seed)))
        }
        "csv" => {
            let dir = config
                .get_string("data", "csv_dir")
                .ok_or_else(|| SimError::ConfigMissing {
                    section: "data".into(),
                    key: "csv_dir".into(),
                })?;
            Ok(Box::new(CsvAdapter::new(PathBuf::from(dir))))
        }
        other => Err(SimError::ConfigInvalid {
            section: "data".into(),
            key: "provider".into(),
            reason: format!("unknown provider '{}' (expected synthetic or csv)", other),
        }),
    }
}

fn resolve_strategy(
    config: &dyn ConfigPort,
    strategy_path: Option<&Path>,
) -> Result<StrategyConfig, SimError> {
    match strategy_path {
        Some(path) => {
            eprintln!("Loading strategy from {}", path.display());
            let strategy = json_strategy_adapter::load_strategy(path)?;
            validate_strategy(&strategy)?;
            Ok(strategy)
        }
        None => build_strategy(config),
    }
}

pub fn run_simulate(
    config_path: &Path,
    strategy_path: Option<&Path>,
    output_path: Option<&Path>,
) -> Result<(), SimError> {
    let config = load_config(config_path)?;
    let strategy = resolve_strategy(&config, strategy_path)?;
    let provider = resolve_provider(&config)?;

    let sim = &strategy.simulation;
    eprintln!("Simulating strategy: {}", strategy.name);
    eprintln!(
        "  {} symbols, {} to {}",
        sim.symbols.len(),
        sim.start_date,
        sim.end_date
    );

    let results = simulation::run(&strategy, provider.as_ref())?;
    print_summary(&results);

    let output = output_path
        .map(Path::to_path_buf)
        .or_else(|| config.get_string("output", "path").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
    let reporter = JsonReportAdapter::new(config.get_bool("output", "pretty", true));
    reporter.write(&results, &strategy, &output)?;

    eprintln!("\nResults written to: {}", output.display());
    Ok(())
}

pub fn print_summary(results: &SimulationResults) {
    let m = &results.metrics;
    eprintln!("\n=== Results ===");
    eprintln!("Initial Capital:  {:.2}", results.initial_capital);
    eprintln!("Final Equity:     {:.2}", results.final_equity);
    eprintln!(
        "Total P&L:        {:.2} ({:.2}%)",
        results.total_pnl, results.total_pnl_percentage
    );
    eprintln!("Max Drawdown:     {:.2}%", m.max_drawdown);
    eprintln!("Total Trades:     {}", m.total_trades);
    eprintln!(
        "Win Rate:         {:.1}% ({} won, {} lost)",
        results.win_rate, m.winning_trades, m.losing_trades
    );
    eprintln!("Average Trade:    {:.2}%", m.average_trade);
    if m.profit_factor.is_infinite() {
        eprintln!("Profit Factor:    inf");
    } else {
        eprintln!("Profit Factor:    {:.2}", m.profit_factor);
    }
    if let Some(sharpe) = m.sharpe_ratio {
        eprintln!("Sharpe Ratio:     {:.2}", sharpe);
    }

    if !results.symbol_results.is_empty() {
        eprintln!("\n=== Per-Symbol Summary ===");
        for sr in &results.symbol_results {
            let pnl_sign = if sr.total_pnl >= 0.0 { "+" } else { "" };
            eprintln!(
                "  {}:  {} trades, {:.1}% win rate, {}{:.2}",
                sr.symbol, sr.total_trades, sr.win_rate, pnl_sign, sr.total_pnl,
            );
        }
    }
}

fn print_strategy(strategy: &StrategyConfig) {
    eprintln!("\nStrategy: {}", strategy.name);
    if !strategy.description.is_empty() {
        eprintln!("  {}", strategy.description);
    }
    for kind in [RuleSetKind::Scanner, RuleSetKind::Buy, RuleSetKind::Sell] {
        let rules = strategy.rule_set(kind);
        eprintln!("  {:<8} {}", format!("{}:", kind), rules);
        for c in rules.unrecognized() {
            eprintln!("  warning: {} condition never matches: {}", kind, c);
        }
    }

    let sim = &strategy.simulation;
    eprintln!("\nSimulation:");
    eprintln!("  range:          {} to {}", sim.start_date, sim.end_date);
    eprintln!("  symbols:        {}", sim.symbols.join(", "));
    eprintln!("  capital:        {:.2}", sim.initial_capital);
    eprintln!("  max positions:  {}", sim.max_positions);
    eprintln!("  position size:  {}%", sim.position_size);
}

pub fn run_validate(config_path: Option<&Path>, strategy_path: Option<&Path>) -> Result<(), SimError> {
    let strategy = match config_path {
        Some(path) => {
            let config = load_config(path)?;
            // Surface a bad [data] section too, without touching any data.
            resolve_provider(&config)?;
            resolve_strategy(&config, strategy_path)?
        }
        None => {
            // clap guarantees at least one source.
            let path = strategy_path.ok_or_else(|| SimError::ConfigMissing {
                section: "cli".into(),
                key: "strategy".into(),
            })?;
            eprintln!("Loading strategy from {}", path.display());
            let strategy = json_strategy_adapter::load_strategy(path)?;
            validate_strategy(&strategy)?;
            strategy
        }
    };

    print_strategy(&strategy);
    eprintln!("\nConfiguration is valid.");
    Ok(())
}

pub fn run_generate(
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
    seed: u64,
    output: Option<&Path>,
) -> Result<(), SimError> {
    if start > end {
        return Err(SimError::ConfigInvalid {
            section: "cli".into(),
            key: "start".into(),
            reason: "start must not be after end".into(),
        });
    }

    let symbol = symbol.trim().to_uppercase();
    let bars = SyntheticAdapter::new(seed).generate(&symbol, start, end);

    match output {
        Some(path) => {
            let file = File::create(path)?;
            csv_adapter::write_series(BufWriter::new(file), &bars)?;
            eprintln!("Wrote {} bars for {} to {}", bars.len(), symbol, path.display());
        }
        None => csv_adapter::write_series(io::stdout().lock(), &bars)?,
    }
    Ok(())
}
