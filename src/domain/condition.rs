//! Condition data structures.
//!
//! A strategy is made of three rule sets (scanner, buy, sell), each an ordered
//! list of conditions. A condition is one of:
//! - an indicator rule comparing a bar-derived value against a constant
//! - an exit rule (stop-loss / take-profit) measured against an open position
//! - an unrecognized record, kept so that it can be reported, never matched

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Indicator {
    Price,
    Volume,
    PriceChange,
}

impl Indicator {
    /// Case-insensitive lookup; accepts `priceChange`, `pricechange` and `price_change`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "price" => Some(Indicator::Price),
            "volume" => Some(Indicator::Volume),
            "pricechange" | "price_change" => Some(Indicator::PriceChange),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Indicator::Price => "price",
            Indicator::Volume => "volume",
            Indicator::PriceChange => "priceChange",
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Operator {
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = "==")]
    Eq,
}

impl Operator {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            ">" => Some(Operator::Gt),
            "<" => Some(Operator::Lt),
            ">=" => Some(Operator::Ge),
            "<=" => Some(Operator::Le),
            "==" => Some(Operator::Eq),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Ge => ">=",
            Operator::Le => "<=",
            Operator::Eq => "==",
        }
    }

    pub fn apply(&self, actual: f64, expected: f64) -> bool {
        match self {
            Operator::Gt => actual > expected,
            Operator::Lt => actual < expected,
            Operator::Ge => actual >= expected,
            Operator::Le => actual <= expected,
            Operator::Eq => actual == expected,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ExitKind {
    StopLoss,
    TakeProfit,
}

impl ExitKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "stoploss" | "stop_loss" => Some(ExitKind::StopLoss),
            "takeprofit" | "take_profit" => Some(ExitKind::TakeProfit),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExitKind::StopLoss => "stopLoss",
            ExitKind::TakeProfit => "takeProfit",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum Condition {
    Indicator {
        indicator: Indicator,
        operator: Operator,
        value: f64,
    },
    Exit {
        kind: ExitKind,
        /// Percentage magnitude, e.g. `5.0` for a 5% stop.
        value: f64,
    },
    Unrecognized {
        raw: String,
    },
}

impl Condition {
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Condition::Unrecognized { .. })
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Indicator {
                indicator,
                operator,
                value,
            } => write!(f, "{} {} {}", indicator, operator, value),
            Condition::Exit { kind, value } => write!(f, "{} {}", kind.name(), value),
            Condition::Unrecognized { raw } => write!(f, "<unrecognized: {}>", raw),
        }
    }
}

/// Condition records in strategy documents are loosely typed. Anything that
/// is not an object with the expected fields is kept verbatim as
/// [`Condition::Unrecognized`] instead of failing the whole document.
impl From<Value> for Condition {
    fn from(record: Value) -> Self {
        Condition::from_record(&record).unwrap_or_else(|| Condition::Unrecognized {
            raw: record.to_string(),
        })
    }
}

impl Condition {
    fn from_record(record: &Value) -> Option<Self> {
        let fields = record.as_object()?;
        let value = numeric(fields.get("value")?)?;

        match fields.get("type").filter(|kind| !kind.is_null()) {
            Some(kind) => Some(Condition::Exit {
                kind: ExitKind::from_name(kind.as_str()?)?,
                value,
            }),
            None => Some(Condition::Indicator {
                indicator: Indicator::from_name(fields.get("indicator")?.as_str()?)?,
                operator: Operator::from_symbol(fields.get("operator")?.as_str()?)?,
                value,
            }),
        }
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Which of the three strategy rule sets a [`RuleSet`] plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSetKind {
    Scanner,
    Buy,
    Sell,
}

impl fmt::Display for RuleSetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleSetKind::Scanner => f.write_str("scanner"),
            RuleSetKind::Buy => f.write_str("buy"),
            RuleSetKind::Sell => f.write_str("sell"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl RuleSet {
    pub fn new(conditions: Vec<Condition>) -> Self {
        Self { conditions }
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn unrecognized(&self) -> impl Iterator<Item = &Condition> {
        self.conditions.iter().filter(|c| !c.is_recognized())
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.conditions.is_empty() {
            return f.write_str("(none)");
        }
        let parts: Vec<String> = self.conditions.iter().map(|c| c.to_string()).collect();
        f.write_str(&parts.join("; "))
    }
}
