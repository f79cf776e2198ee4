//! Simulation driver.
//!
//! A run fetches every symbol's series once, builds the sorted union of their
//! dates, then walks that calendar one day at a time: sells, buys, equity
//! snapshot. Positions still open after the last day are force-closed at the
//! last bar of their own series before metrics are derived.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;

use chrono::NaiveDate;

use crate::domain::config_validation::validate_strategy;
use crate::domain::error::SimError;
use crate::domain::metrics::SimulationResults;
use crate::domain::portfolio::{EntryParams, Portfolio};
use crate::domain::price_bar::PriceBar;
use crate::domain::series::{MarketData, SymbolSeries};
use crate::domain::strategy::StrategyConfig;
use crate::ports::data_port::DataPort;

/// Validate, fetch and simulate. Validation failures are reported before the
/// provider is called; the first provider failure aborts the run.
pub fn run(strategy: &StrategyConfig, provider: &dyn DataPort) -> Result<SimulationResults, SimError> {
    run_cancellable(strategy, provider, &|| false)
}

/// Like [`run`], polling `should_cancel` between stages. The day loop itself
/// is never interrupted; a cancel seen after fetching skips the simulation.
pub fn run_cancellable(
    strategy: &StrategyConfig,
    provider: &dyn DataPort,
    should_cancel: &dyn Fn() -> bool,
) -> Result<SimulationResults, SimError> {
    validate_strategy(strategy)?;
    if should_cancel() {
        return Err(SimError::Cancelled);
    }

    let sim = &strategy.simulation;
    let series = fetch_all(provider, &sim.unique_symbols(), sim.start_date, sim.end_date)?;
    if should_cancel() {
        tracing::info!(strategy = %strategy.name, "simulation cancelled after fetch");
        return Err(SimError::Cancelled);
    }
    let market = MarketData::new(series);

    Ok(simulate(strategy, &market))
}

/// Fetch every symbol's series on a pool sized to the available cores.
pub fn fetch_all(
    provider: &dyn DataPort,
    symbols: &[String],
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Vec<SymbolSeries>, SimError> {
    let parallelism = std::thread::available_parallelism().map_or(1, |n| n.get());
    fetch_all_with(provider, symbols, start_date, end_date, parallelism)
}

/// Fetch with at most `parallelism` worker threads pulling symbols off a
/// shared index. Results come back in the order of `symbols`; when several
/// fetches fail, the error of the earliest symbol wins.
pub fn fetch_all_with(
    provider: &dyn DataPort,
    symbols: &[String],
    start_date: NaiveDate,
    end_date: NaiveDate,
    parallelism: usize,
) -> Result<Vec<SymbolSeries>, SimError> {
    let worker_count = parallelism.max(1).min(symbols.len());
    let next_index = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<(usize, Result<Vec<PriceBar>, SimError>)>();

    std::thread::scope(|scope| {
        let workers: Vec<_> = (0..worker_count)
            .map(|_| {
                let tx = tx.clone();
                let next_index = &next_index;
                scope.spawn(move || loop {
                    let idx = next_index.fetch_add(1, Ordering::Relaxed);
                    let Some(symbol) = symbols.get(idx) else {
                        break;
                    };
                    let bars = provider.fetch_series(symbol, start_date, end_date);
                    if tx.send((idx, bars)).is_err() {
                        break;
                    }
                })
            })
            .collect();

        // Symbols a panicking worker never reported keep an empty slot.
        for worker in workers {
            let _ = worker.join();
        }
    });
    drop(tx);

    let mut slots: Vec<Option<Result<Vec<PriceBar>, SimError>>> =
        symbols.iter().map(|_| None).collect();
    for (idx, bars) in rx {
        slots[idx] = Some(bars);
    }

    let mut series = Vec::with_capacity(symbols.len());
    for (symbol, slot) in symbols.iter().zip(slots) {
        let bars = slot.unwrap_or_else(|| {
            Err(SimError::Provider {
                symbol: symbol.clone(),
                reason: "provider thread panicked".to_string(),
            })
        })?;
        tracing::debug!(%symbol, bars = bars.len(), "series fetched");
        series.push(SymbolSeries::new(symbol.clone(), bars));
    }
    Ok(series)
}

/// Run the day-by-day loop over already fetched market data.
pub fn simulate(strategy: &StrategyConfig, market: &MarketData) -> SimulationResults {
    simulate_with_observer(strategy, market, |_, _| {})
}

/// Like [`simulate`], calling `observer` with the portfolio state after each
/// day's equity snapshot.
pub fn simulate_with_observer<F>(
    strategy: &StrategyConfig,
    market: &MarketData,
    mut observer: F,
) -> SimulationResults
where
    F: FnMut(NaiveDate, &Portfolio),
{
    let sim = &strategy.simulation;
    let trading_days = market.trading_days();

    let span = tracing::info_span!(
        "simulation",
        strategy = %strategy.name,
        symbols = market.series().len(),
        days = trading_days.len()
    );
    let _guard = span.enter();

    let params = EntryParams {
        position_size_pct: sim.position_size,
        max_positions: sim.max_positions,
    };
    let mut portfolio = Portfolio::new(sim.initial_capital);
    let mut previous_day: Option<NaiveDate> = None;

    for &date in &trading_days {
        portfolio.apply_sells(&strategy.sell, market, date, previous_day);
        portfolio.apply_buys(
            &strategy.scanner,
            &strategy.buy,
            &params,
            market,
            date,
            previous_day,
        );

        let equity = portfolio.mark_to_market(market, date);
        portfolio.record_equity(date, equity);
        observer(date, &portfolio);

        previous_day = Some(date);
    }

    let forced = portfolio.finalize(market);
    let results = SimulationResults::compute(portfolio, sim.risk_free_rate);

    tracing::info!(
        trades = results.metrics.total_trades,
        forced_closes = forced,
        final_equity = results.final_equity,
        total_pnl = results.total_pnl,
        max_drawdown = results.metrics.max_drawdown,
        "simulation complete"
    );

    results
}
