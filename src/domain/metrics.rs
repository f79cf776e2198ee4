//! Performance metrics and the final results payload.
//!
//! Percentages are expressed in percent units (`12.5` means 12.5%).

use serde::Serialize;

use super::portfolio::{EquityPoint, Portfolio};
use super::trade::Trade;
use chrono::NaiveDate;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawdownPoint {
    pub date: NaiveDate,
    pub drawdown: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub max_drawdown: f64,
    pub average_trade: f64,
    /// `f64::INFINITY` when there are winners and no losers.
    pub profit_factor: f64,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sharpe_ratio: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolResult {
    pub symbol: String,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub win_rate: f64,
    pub total_pnl: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResults {
    pub initial_capital: f64,
    pub final_equity: f64,
    pub total_pnl: f64,
    pub total_pnl_percentage: f64,
    pub win_rate: f64,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    pub drawdown: Vec<DrawdownPoint>,
    pub metrics: Metrics,
    pub symbol_results: Vec<SymbolResult>,
}

impl SimulationResults {
    /// Derive results from a finished run. Every trade in the ledger is
    /// expected to be closed.
    pub fn compute(portfolio: Portfolio, risk_free_rate: f64) -> Self {
        let initial_capital = portfolio.initial_capital;
        let final_equity = portfolio
            .equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(initial_capital);

        let total_pnl = final_equity - initial_capital;
        let total_pnl_percentage = total_pnl / initial_capital * 100.0;

        let drawdown = compute_drawdown(&portfolio.equity_curve, initial_capital);
        let max_drawdown = drawdown.iter().fold(0.0_f64, |m, p| m.max(p.drawdown));

        let stats = TradeStats::from_trades(&portfolio.trade_ledger);
        let win_rate = percentage(stats.winning, stats.total);

        let metrics = Metrics {
            max_drawdown,
            average_trade: stats.average_pnl_pct,
            profit_factor: stats.profit_factor(),
            total_trades: stats.total,
            winning_trades: stats.winning,
            losing_trades: stats.losing,
            sharpe_ratio: compute_sharpe(
                &portfolio.equity_curve,
                risk_free_rate / TRADING_DAYS_PER_YEAR,
            ),
        };

        let symbol_results = compute_per_symbol(&portfolio.trade_ledger);

        SimulationResults {
            initial_capital,
            final_equity,
            total_pnl,
            total_pnl_percentage,
            win_rate,
            trades: portfolio.trade_ledger,
            equity_curve: portfolio.equity_curve,
            drawdown,
            metrics,
            symbol_results,
        }
    }

    /// Sum of realized pnl across the ledger.
    pub fn ledger_pnl(&self) -> f64 {
        self.trades.iter().map(Trade::realized_pnl).sum()
    }
}

struct TradeStats {
    total: usize,
    winning: usize,
    losing: usize,
    gross_profit: f64,
    gross_loss: f64,
    average_pnl_pct: f64,
}

impl TradeStats {
    fn from_trades(trades: &[Trade]) -> Self {
        let mut winning = 0usize;
        let mut losing = 0usize;
        let mut gross_profit = 0.0_f64;
        let mut gross_loss = 0.0_f64;
        let mut pnl_pct_sum = 0.0_f64;

        for trade in trades {
            let pnl = trade.realized_pnl();
            if pnl > 0.0 {
                winning += 1;
                gross_profit += pnl;
            } else if pnl < 0.0 {
                losing += 1;
                gross_loss += pnl.abs();
            }
            pnl_pct_sum += trade.realized_pnl_pct();
        }

        let total = trades.len();
        let average_pnl_pct = if total > 0 {
            pnl_pct_sum / total as f64
        } else {
            0.0
        };

        TradeStats {
            total,
            winning,
            losing,
            gross_profit,
            gross_loss,
            average_pnl_pct,
        }
    }

    fn profit_factor(&self) -> f64 {
        if self.gross_loss > 0.0 {
            self.gross_profit / self.gross_loss
        } else if self.gross_profit > 0.0 {
            f64::INFINITY
        } else {
            0.0
        }
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole > 0 {
        part as f64 / whole as f64 * 100.0
    } else {
        0.0
    }
}

/// Retracement from the running peak, which starts at the initial capital.
pub fn compute_drawdown(equity_curve: &[EquityPoint], initial_capital: f64) -> Vec<DrawdownPoint> {
    let mut peak = initial_capital;
    equity_curve
        .iter()
        .map(|point| {
            if point.equity > peak {
                peak = point.equity;
            }
            let drawdown = if peak > 0.0 {
                (peak - point.equity) / peak * 100.0
            } else {
                0.0
            };
            DrawdownPoint {
                date: point.date,
                drawdown,
            }
        })
        .collect()
}

/// Annualized Sharpe ratio of daily equity returns; `None` for fewer than two
/// points or a flat curve.
fn compute_sharpe(equity_curve: &[EquityPoint], daily_rf: f64) -> Option<f64> {
    if equity_curve.len() < 2 {
        return None;
    }

    let returns: Vec<f64> = equity_curve
        .windows(2)
        .map(|w| {
            let prev = w[0].equity;
            let curr = w[1].equity;
            if prev > 0.0 { (curr - prev) / prev } else { 0.0 }
        })
        .collect();

    let n = returns.len() as f64;
    let mean: f64 = returns.iter().sum::<f64>() / n;
    let variance: f64 = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    if stddev > 0.0 {
        Some((mean - daily_rf) / stddev * TRADING_DAYS_PER_YEAR.sqrt())
    } else {
        None
    }
}

fn compute_per_symbol(trades: &[Trade]) -> Vec<SymbolResult> {
    let mut results: Vec<SymbolResult> = Vec::new();

    for trade in trades {
        let idx = match results.iter().position(|r| r.symbol == trade.symbol) {
            Some(i) => i,
            None => {
                results.push(SymbolResult {
                    symbol: trade.symbol.clone(),
                    total_trades: 0,
                    winning_trades: 0,
                    win_rate: 0.0,
                    total_pnl: 0.0,
                });
                results.len() - 1
            }
        };
        let entry = &mut results[idx];
        entry.total_trades += 1;
        if trade.realized_pnl() > 0.0 {
            entry.winning_trades += 1;
        }
        entry.total_pnl += trade.realized_pnl();
    }

    for r in &mut results {
        r.win_rate = percentage(r.winning_trades, r.total_trades);
    }
    results
}
