//! Condition text parser.
//!
//! Grammar:
//!
//! ```text
//! rule_set  := condition? (';' condition?)*
//! condition := NAME OPERATOR NUMBER      indicator rule, e.g. `price > 100`
//!            | NAME NUMBER               exit rule, e.g. `stopLoss 5`
//! ```
//!
//! Unknown indicator names and operator tokens are not syntax errors: they
//! produce [`Condition::Unrecognized`], which never matches.

use crate::domain::condition::{Condition, ExitKind, Indicator, Operator, RuleSet};
use crate::domain::error::ParseError;

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn at_end(&mut self) -> bool {
        self.skip_whitespace();
        self.peek().is_none()
    }

    fn found(&self) -> String {
        self.peek()
            .map(|c| format!("'{}'", c))
            .unwrap_or_else(|| "end of input".to_string())
    }

    fn take_while<F: Fn(char) -> bool>(&mut self, pred: F) -> &'a str {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if pred(ch) {
                self.advance();
            } else {
                break;
            }
        }
        &self.input[start..self.pos]
    }

    fn parse_name(&mut self) -> Result<&'a str, ParseError> {
        self.skip_whitespace();
        match self.peek() {
            Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => {
                Ok(self.take_while(|c| c.is_ascii_alphanumeric() || c == '_'))
            }
            _ => Err(ParseError {
                message: format!("expected indicator or exit rule name, found {}", self.found()),
                position: self.pos,
            }),
        }
    }

    fn peek_number_start(&mut self) -> bool {
        self.skip_whitespace();
        matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == '-' || c == '+' || c == '.')
    }

    fn parse_number(&mut self) -> Result<f64, ParseError> {
        self.skip_whitespace();
        let start = self.pos;

        if matches!(self.peek(), Some('-') | Some('+')) {
            self.advance();
        }

        let mut digits = 0;
        let mut has_dot = false;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                digits += 1;
                self.advance();
            } else if ch == '.' && !has_dot {
                has_dot = true;
                self.advance();
            } else {
                break;
            }
        }

        if digits == 0 {
            return Err(ParseError {
                message: format!("expected number, found {}", self.found()),
                position: start,
            });
        }

        let num_str = &self.input[start..self.pos];
        num_str.parse::<f64>().map_err(|_| ParseError {
            message: format!("invalid number: {}", num_str),
            position: start,
        })
    }

    fn parse_condition(&mut self) -> Result<Condition, ParseError> {
        self.skip_whitespace();
        let start = self.pos;
        let name = self.parse_name()?;

        if self.peek_number_start() {
            let value = self.parse_number()?;
            return Ok(match ExitKind::from_name(name) {
                Some(kind) => Condition::Exit { kind, value },
                None => self.unrecognized(start),
            });
        }

        self.skip_whitespace();
        let op_pos = self.pos;
        let op_token = self.take_while(|c| matches!(c, '<' | '>' | '=' | '!'));
        if op_token.is_empty() {
            return Err(ParseError {
                message: format!("expected operator or value after '{}', found {}", name, self.found()),
                position: op_pos,
            });
        }
        let value = self.parse_number()?;

        let indicator = Indicator::from_name(name);
        let operator = Operator::from_symbol(op_token);
        Ok(match (indicator, operator) {
            (Some(indicator), Some(operator)) => Condition::Indicator {
                indicator,
                operator,
                value,
            },
            _ => self.unrecognized(start),
        })
    }

    fn unrecognized(&self, start: usize) -> Condition {
        let raw = self.input[start..self.pos].trim().to_string();
        tracing::warn!(condition = %raw, "unrecognized condition will never match");
        Condition::Unrecognized { raw }
    }

    fn parse_rule_set(&mut self) -> Result<RuleSet, ParseError> {
        let mut conditions = Vec::new();

        loop {
            if self.at_end() {
                break;
            }
            if self.peek() == Some(';') {
                self.advance();
                continue;
            }

            conditions.push(self.parse_condition()?);

            self.skip_whitespace();
            match self.peek() {
                None => break,
                Some(';') => {
                    self.advance();
                }
                Some(_) => {
                    return Err(ParseError {
                        message: format!("expected ';' or end of input, found {}", self.found()),
                        position: self.pos,
                    });
                }
            }
        }

        Ok(RuleSet::new(conditions))
    }
}

/// Parse a `;`-separated rule set. Blank input yields an empty rule set.
pub fn parse(input: &str) -> Result<RuleSet, ParseError> {
    Parser::new(input).parse_rule_set()
}

/// Parse exactly one condition.
pub fn parse_condition(input: &str) -> Result<Condition, ParseError> {
    let mut parser = Parser::new(input);
    let condition = parser.parse_condition()?;
    if !parser.at_end() {
        return Err(ParseError {
            message: format!("unexpected trailing input: {}", parser.found()),
            position: parser.pos,
        });
    }
    Ok(condition)
}
