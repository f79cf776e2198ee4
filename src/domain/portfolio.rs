//! Portfolio state and the daily close/open transitions.
//!
//! Each simulated day runs [`Portfolio::apply_sells`] before
//! [`Portfolio::apply_buys`], so a same-day re-entry is funded only by cash
//! that was already settled when the open pass starts.

use chrono::NaiveDate;
use serde::Serialize;

use super::condition::RuleSet;
use super::rule_set::{passes_scanner, should_buy, should_sell};
use super::series::MarketData;
use super::trade::Trade;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

/// Entry sizing and slot limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntryParams {
    /// Percent of initial capital allocated to each new position.
    pub position_size_pct: f64,
    pub max_positions: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub cash: f64,
    pub initial_capital: f64,
    pub open_positions: Vec<Trade>,
    pub trade_ledger: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Portfolio {
            cash: initial_capital,
            initial_capital,
            open_positions: Vec::new(),
            trade_ledger: Vec::new(),
            equity_curve: Vec::new(),
        }
    }

    pub fn position_count(&self) -> usize {
        self.open_positions.len()
    }

    /// Fixed allocation per trade, sized off initial capital rather than current equity.
    pub fn allocation(&self, params: &EntryParams) -> f64 {
        params.position_size_pct / 100.0 * self.initial_capital
    }

    /// Close every open position whose symbol trades on `date` and whose sell
    /// rules fire. Returns the number of positions closed.
    pub fn apply_sells(
        &mut self,
        sell: &RuleSet,
        market: &MarketData,
        date: NaiveDate,
        previous_day: Option<NaiveDate>,
    ) -> usize {
        let mut still_open = Vec::with_capacity(self.open_positions.len());
        let mut closed = 0;

        for mut trade in std::mem::take(&mut self.open_positions) {
            let Some(bar) = market.bar(&trade.symbol, date) else {
                still_open.push(trade);
                continue;
            };
            let prev = previous_day.and_then(|d| market.bar(&trade.symbol, d));

            if should_sell(sell, bar, prev, Some(&trade)) {
                self.cash += trade.close(date, bar.close);
                tracing::debug!(
                    symbol = %trade.symbol,
                    %date,
                    price = bar.close,
                    quantity = trade.quantity,
                    pnl = trade.realized_pnl(),
                    "position closed"
                );
                self.trade_ledger.push(trade);
                closed += 1;
            } else {
                still_open.push(trade);
            }
        }

        self.open_positions = still_open;
        closed
    }

    /// Walk the symbols in configured order and open positions where the
    /// scanner and buy rules agree and capital allows. Returns the number of
    /// positions opened.
    pub fn apply_buys(
        &mut self,
        scanner: &RuleSet,
        buy: &RuleSet,
        params: &EntryParams,
        market: &MarketData,
        date: NaiveDate,
        previous_day: Option<NaiveDate>,
    ) -> usize {
        let mut opened = 0;
        let position_value = self.allocation(params);

        for series in market.series() {
            if self.open_positions.len() >= params.max_positions {
                break;
            }
            let Some(bar) = series.get_bar(date) else {
                continue;
            };
            let prev = previous_day.and_then(|d| series.get_bar(d));

            if !passes_scanner(scanner, bar, prev) || !should_buy(buy, bar, prev) {
                continue;
            }
            if position_value > self.cash {
                tracing::debug!(
                    symbol = %series.symbol,
                    %date,
                    cash = self.cash,
                    position_value,
                    "buy skipped: insufficient cash"
                );
                continue;
            }
            if !bar.close.is_finite() || bar.close <= 0.0 {
                continue;
            }
            let quantity = (position_value / bar.close).floor();
            if quantity < 1.0 {
                continue;
            }

            let trade = Trade::open(&series.symbol, date, bar.close, quantity as u64);
            self.cash -= trade.cost();
            tracing::debug!(
                symbol = %trade.symbol,
                %date,
                price = trade.entry_price,
                quantity = trade.quantity,
                "position opened"
            );
            self.open_positions.push(trade);
            opened += 1;
        }

        opened
    }

    /// Cash plus open positions marked at `date`'s close. A position whose
    /// symbol has no bar on `date` contributes nothing.
    pub fn mark_to_market(&self, market: &MarketData, date: NaiveDate) -> f64 {
        let position_value: f64 = self
            .open_positions
            .iter()
            .filter_map(|pos| {
                market
                    .bar(&pos.symbol, date)
                    .map(|bar| pos.market_value(bar.close))
            })
            .sum();
        self.cash + position_value
    }

    pub fn record_equity(&mut self, date: NaiveDate, equity: f64) {
        self.equity_curve.push(EquityPoint { date, equity });
    }

    /// Force-close every remaining position at the last bar of its own
    /// series. Returns the number of positions closed.
    pub fn finalize(&mut self, market: &MarketData) -> usize {
        let remaining = std::mem::take(&mut self.open_positions);
        let count = remaining.len();

        for mut trade in remaining {
            let (exit_date, exit_price) = market
                .get(&trade.symbol)
                .and_then(|s| s.last_bar())
                .map(|bar| (bar.date, bar.close))
                .unwrap_or((trade.entry_date, trade.entry_price));

            self.cash += trade.close(exit_date, exit_price);
            tracing::debug!(
                symbol = %trade.symbol,
                date = %exit_date,
                price = exit_price,
                quantity = trade.quantity,
                pnl = trade.realized_pnl(),
                "position force-closed at end of series"
            );
            self.trade_ledger.push(trade);
        }

        count
    }
}
