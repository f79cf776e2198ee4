//! Trade lifecycle: opened on a buy signal, closed on a sell signal or at the
//! end of the run.

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub symbol: String,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub quantity: u64,
    pub exit_date: Option<NaiveDate>,
    pub exit_price: Option<f64>,
    pub pnl: Option<f64>,
    pub pnl_percentage: Option<f64>,
    pub status: TradeStatus,
}

impl Trade {
    pub fn open(symbol: &str, entry_date: NaiveDate, entry_price: f64, quantity: u64) -> Self {
        Trade {
            symbol: symbol.to_string(),
            entry_date,
            entry_price,
            quantity,
            exit_date: None,
            exit_price: None,
            pnl: None,
            pnl_percentage: None,
            status: TradeStatus::Open,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == TradeStatus::Open
    }

    pub fn cost(&self) -> f64 {
        self.entry_price * self.quantity as f64
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.quantity as f64 * price
    }

    /// Unrealized return at `price`, in percent of the entry price.
    pub fn return_pct(&self, price: f64) -> f64 {
        (price - self.entry_price) / self.entry_price * 100.0
    }

    /// Close at `exit_price`, returning the sale proceeds.
    pub fn close(&mut self, exit_date: NaiveDate, exit_price: f64) -> f64 {
        let pnl = (exit_price - self.entry_price) * self.quantity as f64;
        self.exit_date = Some(exit_date);
        self.exit_price = Some(exit_price);
        self.pnl = Some(pnl);
        self.pnl_percentage = Some(self.return_pct(exit_price));
        self.status = TradeStatus::Closed;
        self.market_value(exit_price)
    }

    /// Realized pnl; zero while the trade is still open.
    pub fn realized_pnl(&self) -> f64 {
        self.pnl.unwrap_or(0.0)
    }

    pub fn realized_pnl_pct(&self) -> f64 {
        self.pnl_percentage.unwrap_or(0.0)
    }
}
