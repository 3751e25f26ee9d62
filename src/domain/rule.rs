//! Normalized rule data structures.
//!
//! A parsed rule carries its action, indicator window, and inclusive bounds
//! on the percent-change indicator:
//! - `Threshold` rules set exactly one of `lower_bound` / `upper_bound`
//! - `Range` rules set both, with `lower_bound <= upper_bound`

use serde::Serialize;

/// Windows the grammar admits, in hourly steps back from the latest sample.
pub const ALLOWED_WINDOWS: [u32; 6] = [1, 2, 4, 6, 12, 24];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Action::Buy => "BUY",
            Action::Sell => "SELL",
            Action::Hold => "HOLD",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Threshold,
    Range,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRule {
    pub action: Action,
    pub window_hours: u32,
    pub kind: RuleKind,
    pub lower_bound: Option<f64>,
    pub upper_bound: Option<f64>,
    pub position_percent: f64,
}

impl NormalizedRule {
    /// Short name used in explanation traces and the matched-rule field.
    pub fn display_name(&self) -> String {
        format!("{} if pct_change {}h", self.action, self.window_hours)
    }
}

impl std::fmt::Display for NormalizedRule {
    /// Canonical rule text; parses back to an equal rule.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} if pct_change {}h ", self.action, self.window_hours)?;
        match (self.lower_bound, self.upper_bound) {
            (Some(low), Some(high)) => write!(f, "in [{}%, {}%]", low, high)?,
            (Some(low), None) => write!(f, ">= {}%", low)?,
            (None, Some(high)) => write!(f, "<= {}%", high)?,
            (None, None) => write!(f, ">= 0%")?,
        }
        write!(f, " then {}%", self.position_percent)
    }
}
