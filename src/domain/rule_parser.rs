//! Rule text parser.
//!
//! Two single-pass matchers tried in fixed order, each its own scanner over
//! the input:
//!
//! - threshold form: `ACTION if pct_change Wh >= X% then P%` (or `<=`)
//! - range form:     `ACTION if pct_change Wh in [A%, B%] then P%`
//!
//! Keywords are case-insensitive and whitespace between tokens is free.
//! A window or range that fails validation after a syntax match is a distinct
//! error from unrecognized text; the other matcher is not retried.

use crate::domain::error::{ParseError, RuleError};
use crate::domain::rule::{Action, NormalizedRule, RuleKind, ALLOWED_WINDOWS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ThresholdOp {
    Gte,
    Lte,
}

struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
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

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            position: self.pos,
        }
    }

    fn expect_char(&mut self, expected: char) -> Result<(), ParseError> {
        self.skip_whitespace();
        match self.peek() {
            Some(ch) if ch == expected => {
                self.advance();
                Ok(())
            }
            Some(ch) => Err(self.error(format!("expected '{}', found '{}'", expected, ch))),
            None => Err(self.error(format!("expected '{}', found end of input", expected))),
        }
    }

    /// Consumes a case-insensitive keyword ending at a word boundary.
    fn consume_keyword(&mut self, keyword: &str) -> bool {
        self.skip_whitespace();
        let remaining = self.remaining();
        let Some(head) = remaining.get(..keyword.len()) else {
            return false;
        };
        if !head.eq_ignore_ascii_case(keyword) {
            return false;
        }
        let at_boundary = remaining[keyword.len()..]
            .chars()
            .next()
            .map(|c| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(true);
        if at_boundary {
            self.pos += keyword.len();
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<(), ParseError> {
        if self.consume_keyword(keyword) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{}'", keyword)))
        }
    }

    fn parse_action(&mut self) -> Result<Action, ParseError> {
        if self.consume_keyword("buy") {
            return Ok(Action::Buy);
        }
        if self.consume_keyword("sell") {
            return Ok(Action::Sell);
        }
        if self.consume_keyword("hold") {
            return Ok(Action::Hold);
        }
        Err(self.error("expected action (BUY, SELL, HOLD)"))
    }

    /// Number with optional leading minus and optional decimal fraction.
    /// Digits are required before the dot, and after it when present.
    fn parse_number(&mut self) -> Result<f64, ParseError> {
        self.skip_whitespace();
        let start = self.pos;

        if self.peek() == Some('-') {
            self.advance();
        }
        self.parse_digits()?;
        if self.peek() == Some('.') {
            self.advance();
            self.parse_digits()?;
        }

        let num_str = &self.input[start..self.pos];
        num_str
            .parse::<f64>()
            .map_err(|_| self.error(format!("invalid number: {}", num_str)))
    }

    /// Number without a sign; used for the trailing position percent.
    fn parse_unsigned_number(&mut self) -> Result<f64, ParseError> {
        self.skip_whitespace();
        if self.peek() == Some('-') {
            return Err(self.error("expected non-negative number"));
        }
        self.parse_number()
    }

    fn parse_digits(&mut self) -> Result<(), ParseError> {
        let mut digits = 0;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                digits += 1;
                self.advance();
            } else {
                break;
            }
        }
        if digits == 0 {
            Err(self.error("expected digits"))
        } else {
            Ok(())
        }
    }

    fn parse_integer(&mut self) -> Result<u32, ParseError> {
        self.skip_whitespace();
        let start = self.pos;
        self.parse_digits()?;
        let num_str = &self.input[start..self.pos];
        num_str
            .parse::<u32>()
            .map_err(|_| self.error(format!("invalid integer: {}", num_str)))
    }

    fn parse_window(&mut self) -> Result<u32, ParseError> {
        let window = self.parse_integer()?;
        if !self.consume_keyword("h") {
            return Err(self.error("expected 'h' after window"));
        }
        Ok(window)
    }

    fn parse_threshold_op(&mut self) -> Result<ThresholdOp, ParseError> {
        self.skip_whitespace();
        if self.remaining().starts_with(">=") {
            self.pos += 2;
            return Ok(ThresholdOp::Gte);
        }
        if self.remaining().starts_with("<=") {
            self.pos += 2;
            return Ok(ThresholdOp::Lte);
        }
        Err(self.error("expected '>=' or '<='"))
    }

    fn expect_end(&mut self) -> Result<(), ParseError> {
        self.skip_whitespace();
        if self.pos < self.input.len() {
            return Err(self.error(format!(
                "unexpected input after rule: '{}'",
                self.remaining()
            )));
        }
        Ok(())
    }

    /// Shared prefix of both forms: `ACTION if pct_change Wh`.
    fn match_prefix(&mut self) -> Result<(Action, u32), ParseError> {
        let action = self.parse_action()?;
        self.expect_keyword("if")?;
        self.expect_keyword("pct_change")?;
        let window = self.parse_window()?;
        Ok((action, window))
    }

    fn match_threshold(mut self) -> Result<(Action, u32, ThresholdOp, f64, f64), ParseError> {
        let (action, window) = self.match_prefix()?;
        let op = self.parse_threshold_op()?;
        let value = self.parse_number()?;
        self.expect_char('%')?;
        self.expect_keyword("then")?;
        let percent = self.parse_unsigned_number()?;
        self.expect_char('%')?;
        self.expect_end()?;
        Ok((action, window, op, value, percent))
    }

    fn match_range(mut self) -> Result<(Action, u32, f64, f64, f64), ParseError> {
        let (action, window) = self.match_prefix()?;
        self.expect_keyword("in")?;
        self.expect_char('[')?;
        let low = self.parse_number()?;
        self.expect_char('%')?;
        self.expect_char(',')?;
        let high = self.parse_number()?;
        self.expect_char('%')?;
        self.expect_char(']')?;
        self.expect_keyword("then")?;
        let percent = self.parse_unsigned_number()?;
        self.expect_char('%')?;
        self.expect_end()?;
        Ok((action, window, low, high, percent))
    }
}

fn validate_window(window: u32) -> Result<(), RuleError> {
    if ALLOWED_WINDOWS.contains(&window) {
        Ok(())
    } else {
        Err(RuleError::UnsupportedWindow { window })
    }
}

pub fn parse(input: &str) -> Result<NormalizedRule, RuleError> {
    if let Ok((action, window, op, value, percent)) = Scanner::new(input).match_threshold() {
        validate_window(window)?;
        let (lower_bound, upper_bound) = match op {
            ThresholdOp::Gte => (Some(value), None),
            ThresholdOp::Lte => (None, Some(value)),
        };
        return Ok(NormalizedRule {
            action,
            window_hours: window,
            kind: RuleKind::Threshold,
            lower_bound,
            upper_bound,
            position_percent: percent,
        });
    }

    if let Ok((action, window, low, high, percent)) = Scanner::new(input).match_range() {
        validate_window(window)?;
        if low > high {
            return Err(RuleError::InvalidRange { low, high });
        }
        return Ok(NormalizedRule {
            action,
            window_hours: window,
            kind: RuleKind::Range,
            lower_bound: Some(low),
            upper_bound: Some(high),
            position_percent: percent,
        });
    }

    Err(RuleError::Syntax {
        text: input.trim().to_string(),
    })
}
