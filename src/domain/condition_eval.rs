//! Condition evaluation against a single price bar.
//!
//! - `price` resolves to the bar's close, `volume` to its volume
//! - `priceChange` is the close-to-close percentage change and needs the
//!   previous bar; without one the condition is not satisfied
//! - Exit rules and unrecognized conditions never match here: exit rules are
//!   only meaningful against an open position (see [`crate::domain::rule_set`])

use crate::domain::condition::{Condition, Indicator};
use crate::domain::price_bar::PriceBar;

pub fn evaluate(condition: &Condition, current: &PriceBar, previous: Option<&PriceBar>) -> bool {
    match condition {
        Condition::Indicator {
            indicator,
            operator,
            value,
        } => match resolve_indicator(*indicator, current, previous) {
            Some(actual) => operator.apply(actual, *value),
            None => false,
        },
        Condition::Exit { .. } | Condition::Unrecognized { .. } => false,
    }
}

fn resolve_indicator(
    indicator: Indicator,
    current: &PriceBar,
    previous: Option<&PriceBar>,
) -> Option<f64> {
    match indicator {
        Indicator::Price => Some(current.close),
        Indicator::Volume => Some(current.volume as f64),
        Indicator::PriceChange => previous.map(|prev| current.change_pct(prev)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::condition::{ExitKind, Operator};
    use chrono::NaiveDate;

    fn make_bar(day: u32, close: f64, volume: i64) -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume,
        }
    }

    fn rule(indicator: Indicator, operator: Operator, value: f64) -> Condition {
        Condition::Indicator {
            indicator,
            operator,
            value,
        }
    }

    #[test]
    fn price_uses_close() {
        let bar = make_bar(2, 105.0, 1000);
        assert!(evaluate(&rule(Indicator::Price, Operator::Gt, 100.0), &bar, None));
        assert!(!evaluate(&rule(Indicator::Price, Operator::Lt, 100.0), &bar, None));
        assert!(evaluate(&rule(Indicator::Price, Operator::Eq, 105.0), &bar, None));
    }

    #[test]
    fn volume_comparison() {
        let bar = make_bar(2, 105.0, 5000);
        assert!(evaluate(&rule(Indicator::Volume, Operator::Ge, 5000.0), &bar, None));
        assert!(!evaluate(&rule(Indicator::Volume, Operator::Gt, 5000.0), &bar, None));
    }

    #[test]
    fn price_change_with_previous() {
        let prev = make_bar(2, 100.0, 1000);
        let bar = make_bar(3, 103.0, 1000);
        // (103 - 100) / 100 * 100 = 3
        assert!(evaluate(
            &rule(Indicator::PriceChange, Operator::Gt, 2.0),
            &bar,
            Some(&prev)
        ));
        assert!(!evaluate(
            &rule(Indicator::PriceChange, Operator::Gt, 3.5),
            &bar,
            Some(&prev)
        ));
    }

    #[test]
    fn price_change_negative() {
        let prev = make_bar(2, 100.0, 1000);
        let bar = make_bar(3, 95.0, 1000);
        assert!(evaluate(
            &rule(Indicator::PriceChange, Operator::Le, -5.0),
            &bar,
            Some(&prev)
        ));
    }

    #[test]
    fn price_change_without_previous_is_false() {
        let bar = make_bar(2, 100.0, 1000);
        // Even a condition that any value would satisfy fails without history.
        assert!(!evaluate(
            &rule(Indicator::PriceChange, Operator::Gt, f64::MIN),
            &bar,
            None
        ));
    }

    #[test]
    fn exit_rule_never_matches_without_position() {
        let bar = make_bar(2, 100.0, 1000);
        let c = Condition::Exit {
            kind: ExitKind::TakeProfit,
            value: 0.0,
        };
        assert!(!evaluate(&c, &bar, None));
    }

    #[test]
    fn unrecognized_is_false() {
        let bar = make_bar(2, 100.0, 1000);
        let c = Condition::Unrecognized {
            raw: "rsi > 0".into(),
        };
        assert!(!evaluate(&c, &bar, None));
    }
}
