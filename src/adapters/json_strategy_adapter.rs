//! JSON strategy documents.

use crate::domain::error::SimError;
use crate::domain::strategy::StrategyConfig;
use std::fs;
use std::path::Path;

pub fn load_strategy<P: AsRef<Path>>(path: P) -> Result<StrategyConfig, SimError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| SimError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })?;
    parse_strategy(&content, &path.display().to_string())
}

/// Parse a strategy document. Unknown condition shapes are kept as
/// unrecognized conditions and reported once per rule set.
pub fn parse_strategy(content: &str, source: &str) -> Result<StrategyConfig, SimError> {
    let strategy: StrategyConfig =
        serde_json::from_str(content).map_err(|e| SimError::ConfigParse {
            file: source.to_string(),
            reason: e.to_string(),
        })?;

    for (label, rules) in [
        ("scanner", &strategy.scanner),
        ("buy", &strategy.buy),
        ("sell", &strategy.sell),
    ] {
        let skipped = rules.unrecognized().count();
        if skipped > 0 {
            tracing::warn!(rule_set = label, skipped, "unrecognized conditions will never match");
        }
    }

    Ok(strategy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::condition::{Condition, ExitKind};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const DOC: &str = r#"{
        "name": "Dip buyer",
        "buyConfig": {"conditions": [
            {"indicator": "priceChange", "operator": "<", "value": "-2"},
            {"indicator": "rsi", "operator": ">", "value": 30}
        ]},
        "sellConfig": {"conditions": [{"type": "takeProfit", "value": 4}]},
        "simulationConfig": {
            "startDate": "2024-02-01",
            "endDate": "2024-02-29",
            "initialCapital": 20000,
            "symbols": ["AAPL"],
            "maxPositions": 1,
            "positionSize": 25
        }
    }"#;

    #[test]
    fn parses_document_with_loose_conditions() {
        let s = parse_strategy(DOC, "inline").unwrap();
        assert_eq!(s.name, "Dip buyer");
        assert_eq!(s.buy.len(), 2);
        assert!(s.buy.conditions[0].is_recognized());
        assert!(matches!(s.buy.conditions[1], Condition::Unrecognized { .. }));
        assert_eq!(s.sell.len(), 1);
    }

    #[test]
    fn loads_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", DOC).unwrap();
        let s = load_strategy(file.path()).unwrap();
        assert_eq!(s.simulation.symbols, vec!["AAPL"]);
    }

    fn with_buy_conditions(conditions: &str) -> String {
        DOC.replace(
            r#"{"indicator": "priceChange", "operator": "<", "value": "-2"},
            {"indicator": "rsi", "operator": ">", "value": 30}"#,
            conditions,
        )
    }

    #[test]
    fn odd_condition_shapes_do_not_reject_the_document() {
        let doc = with_buy_conditions(
            r#""price > 100", null, {"indicator": 5, "operator": ">", "value": 1},
            {"indicator": "price", "operator": ">", "value": 10}"#,
        );

        let s = parse_strategy(&doc, "inline").unwrap();

        assert_eq!(s.buy.len(), 4);
        assert_eq!(s.buy.unrecognized().count(), 3);
        assert_eq!(
            s.buy.conditions[0],
            Condition::Unrecognized {
                raw: r#""price > 100""#.into()
            }
        );
        assert_eq!(s.buy.conditions[1], Condition::Unrecognized { raw: "null".into() });
        assert!(s.buy.conditions[3].is_recognized());
        assert_eq!(s.sell.len(), 1);
        assert!(s.sell.conditions[0].is_recognized());
    }

    #[test]
    fn null_entry_keeps_sibling_exit_rule() {
        let doc = DOC.replace(
            r#"[{"type": "takeProfit", "value": 4}]"#,
            r#"[null, {"type": "stopLoss", "value": 5}]"#,
        );

        let s = parse_strategy(&doc, "inline").unwrap();

        assert_eq!(s.sell.len(), 2);
        assert!(!s.sell.conditions[0].is_recognized());
        assert_eq!(
            s.sell.conditions[1],
            Condition::Exit {
                kind: ExitKind::StopLoss,
                value: 5.0,
            }
        );
    }

    #[test]
    fn malformed_json_is_config_parse_error() {
        match parse_strategy("{\"name\": ", "broken.json") {
            Err(SimError::ConfigParse { file, .. }) => assert_eq!(file, "broken.json"),
            other => panic!("expected ConfigParse, got {:?}", other),
        }
    }

    #[test]
    fn missing_simulation_block_is_rejected() {
        assert!(parse_strategy("{\"name\": \"x\"}", "x.json").is_err());
    }
}
