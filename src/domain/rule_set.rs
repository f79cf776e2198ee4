//! Rule-set matching.
//!
//! Scanner and buy rule sets require every condition to hold. The sell rule
//! set fires when any one condition holds. An empty scanner passes
//! everything; an empty buy or sell rule set never fires.

use crate::domain::condition::{Condition, ExitKind, RuleSet};
use crate::domain::condition_eval::evaluate;
use crate::domain::price_bar::PriceBar;
use crate::domain::trade::Trade;

pub fn passes_scanner(scanner: &RuleSet, bar: &PriceBar, prev: Option<&PriceBar>) -> bool {
    all_match(scanner, bar, prev)
}

pub fn should_buy(buy: &RuleSet, bar: &PriceBar, prev: Option<&PriceBar>) -> bool {
    if buy.is_empty() {
        return false;
    }
    all_match(buy, bar, prev)
}

pub fn should_sell(
    sell: &RuleSet,
    bar: &PriceBar,
    prev: Option<&PriceBar>,
    position: Option<&Trade>,
) -> bool {
    if sell.is_empty() {
        return false;
    }
    let position = match position {
        Some(p) if p.is_open() => p,
        _ => return false,
    };

    sell.conditions.iter().any(|condition| match condition {
        Condition::Exit { kind, value } => {
            let change = position.return_pct(bar.close);
            match kind {
                ExitKind::StopLoss => change <= -value,
                ExitKind::TakeProfit => change >= *value,
            }
        }
        other => evaluate(other, bar, prev),
    })
}

fn all_match(rules: &RuleSet, bar: &PriceBar, prev: Option<&PriceBar>) -> bool {
    rules.conditions.iter().all(|c| evaluate(c, bar, prev))
}
