//! Rule evaluation engine.
//!
//! # Evaluation Semantics
//!
//! - Rules are scanned in input order; the first rule whose bounds test
//!   passes decides the outcome and stops the scan
//! - A rule whose indicator is undefined (short series, zero reference) is
//!   skipped with a trace entry and cannot fire
//! - The winning percent is clamped to `[0, max_position_percent]`; skipped
//!   rules are never clamped
//! - No match at all yields the HOLD default with percent 0

use crate::domain::indicator::pct_change;
use crate::domain::price::PriceSample;
use crate::domain::rule::{Action, NormalizedRule};

/// Outcome of one evaluation pass. Immutable once returned.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub action: Action,
    pub percent: f64,
    pub matched_rule: Option<String>,
    pub indicator_value_pct: Option<f64>,
    pub explanations: Vec<String>,
}

fn clamp_percent(percent: f64, max_position_percent: f64) -> f64 {
    percent.min(max_position_percent).max(0.0)
}

fn format_bound(bound: Option<f64>) -> String {
    match bound {
        Some(v) => v.to_string(),
        None => "-".to_string(),
    }
}

pub fn evaluate(
    prices: &[PriceSample],
    rules: &[NormalizedRule],
    max_position_percent: f64,
) -> Decision {
    let mut explanations = Vec::new();

    for rule in rules {
        let name = rule.display_name();

        let Some(value) = pct_change(prices, rule.window_hours) else {
            explanations.push(format!(
                "[{}] skipped: not enough data for {}h window.",
                name, rule.window_hours
            ));
            continue;
        };

        let lower_ok = rule.lower_bound.map(|b| value >= b).unwrap_or(true);
        let upper_ok = rule.upper_bound.map(|b| value <= b).unwrap_or(true);
        let pass = lower_ok && upper_ok;

        explanations.push(format!(
            "[{}] => {:.4}% vs gte={}, lte={} -> pass={}",
            name,
            value,
            format_bound(rule.lower_bound),
            format_bound(rule.upper_bound),
            pass
        ));

        if pass {
            return Decision {
                action: rule.action,
                percent: clamp_percent(rule.position_percent, max_position_percent),
                matched_rule: Some(name),
                indicator_value_pct: Some(value),
                explanations,
            };
        }
    }

    explanations.push("No rule matched -> default HOLD 0%.".to_string());
    Decision {
        action: Action::Hold,
        percent: 0.0,
        matched_rule: None,
        indicator_value_pct: None,
        explanations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rule::RuleKind;
    use crate::domain::rule_parser::parse;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn series(prices: &[f64]) -> Vec<PriceSample> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &p)| PriceSample::new(i as i64 * 3_600_000, p))
            .collect()
    }

    fn threshold_gte(action: Action, window: u32, bound: f64, percent: f64) -> NormalizedRule {
        NormalizedRule {
            action,
            window_hours: window,
            kind: RuleKind::Threshold,
            lower_bound: Some(bound),
            upper_bound: None,
            position_percent: percent,
        }
    }

    #[test]
    fn matching_threshold_fires() {
        // 100 -> 110 over the 2h window is +10%.
        let prices = series(&[100.0, 100.0, 110.0]);
        let rules = vec![parse("BUY if pct_change 2h >= 5% then 10%").unwrap()];

        let decision = evaluate(&prices, &rules, 50.0);

        assert_eq!(decision.action, Action::Buy);
        assert_relative_eq!(decision.percent, 10.0);
        assert_eq!(
            decision.matched_rule.as_deref(),
            Some("BUY if pct_change 2h")
        );
        assert_relative_eq!(decision.indicator_value_pct.unwrap(), 10.0);
        assert_eq!(decision.explanations.len(), 1);
    }

    #[test]
    fn failing_bound_falls_through_to_hold() {
        let prices = series(&[100.0, 100.0, 110.0]);
        let rules = vec![parse("SELL if pct_change 2h <= -5% then 20%").unwrap()];

        let decision = evaluate(&prices, &rules, 50.0);

        assert_eq!(decision.action, Action::Hold);
        assert_eq!(decision.percent, 0.0);
        assert!(decision.matched_rule.is_none());
        assert!(decision.indicator_value_pct.is_none());
        assert_eq!(decision.explanations.len(), 2);
        assert!(decision.explanations[0].contains("pass=false"));
        assert!(decision.explanations[1].contains("default HOLD"));
    }

    #[test]
    fn short_series_skips_rule() {
        let prices = series(&[100.0, 102.0, 103.0]);
        let rules = vec![parse("BUY if pct_change 6h >= 1% then 10%").unwrap()];

        let decision = evaluate(&prices, &rules, 50.0);

        assert_eq!(decision.action, Action::Hold);
        assert_eq!(decision.percent, 0.0);
        assert!(decision.explanations[0].contains("skipped"));
        assert!(decision.explanations[0].contains("6h window"));
    }

    #[test]
    fn empty_series_never_panics() {
        let rules = vec![
            parse("BUY if pct_change 1h >= 1% then 10%").unwrap(),
            parse("SELL if pct_change 24h <= -1% then 10%").unwrap(),
        ];

        let decision = evaluate(&[], &rules, 50.0);

        assert_eq!(decision.action, Action::Hold);
        assert_eq!(decision.explanations.len(), 3);
    }

    #[test]
    fn winning_percent_clamped_to_max() {
        let prices = series(&[100.0, 100.0, 110.0]);
        let rules = vec![parse("BUY if pct_change 2h >= 5% then 80%").unwrap()];

        let decision = evaluate(&prices, &rules, 50.0);

        assert_relative_eq!(decision.percent, 50.0);
        assert_eq!(decision.action, Action::Buy);
    }

    #[test]
    fn first_match_wins_over_later_rule() {
        let prices = series(&[100.0, 100.0, 110.0]);
        let rules = vec![
            parse("SELL if pct_change 2h >= 5% then 15%").unwrap(),
            parse("BUY if pct_change 2h >= 5% then 30%").unwrap(),
        ];

        let decision = evaluate(&prices, &rules, 50.0);

        assert_eq!(decision.action, Action::Sell);
        assert_relative_eq!(decision.percent, 15.0);
        // The scan stopped at the first rule.
        assert_eq!(decision.explanations.len(), 1);
    }

    #[test]
    fn skipped_rule_does_not_block_later_match() {
        let prices = series(&[100.0, 100.0, 110.0]);
        let rules = vec![
            parse("SELL if pct_change 24h <= -1% then 20%").unwrap(),
            parse("BUY if pct_change 2h >= 5% then 10%").unwrap(),
        ];

        let decision = evaluate(&prices, &rules, 50.0);

        assert_eq!(decision.action, Action::Buy);
        assert_eq!(decision.explanations.len(), 2);
        assert!(decision.explanations[0].contains("skipped"));
        assert!(decision.explanations[1].contains("pass=true"));
    }

    #[test]
    fn zero_reference_price_skips_rule() {
        let prices = series(&[0.0, 100.0, 110.0]);
        let rules = vec![parse("BUY if pct_change 2h >= 1% then 10%").unwrap()];

        let decision = evaluate(&prices, &rules, 50.0);

        assert_eq!(decision.action, Action::Hold);
        assert!(decision.explanations[0].contains("skipped"));
    }

    #[test]
    fn range_rule_inclusive_bounds() {
        // 100 -> 105 over 1h is exactly +5%.
        let prices = series(&[100.0, 105.0]);
        let rules = vec![parse("BUY if pct_change 1h in [5%, 10%] then 10%").unwrap()];

        let decision = evaluate(&prices, &rules, 50.0);
        assert_eq!(decision.action, Action::Buy);

        let rules = vec![parse("BUY if pct_change 1h in [-10%, 5%] then 10%").unwrap()];
        let decision = evaluate(&prices, &rules, 50.0);
        assert_eq!(decision.action, Action::Buy);
    }

    #[test]
    fn threshold_boundary_is_inclusive() {
        let prices = series(&[100.0, 105.0]);
        let rules = vec![parse("BUY if pct_change 1h >= 5% then 10%").unwrap()];
        assert_eq!(evaluate(&prices, &rules, 50.0).action, Action::Buy);

        let rules = vec![parse("SELL if pct_change 1h <= 5% then 10%").unwrap()];
        assert_eq!(evaluate(&prices, &rules, 50.0).action, Action::Sell);
    }

    #[test]
    fn explanation_shows_unset_bound_as_dash() {
        let prices = series(&[100.0, 100.0, 110.0]);
        let rules = vec![parse("BUY if pct_change 2h >= 5% then 10%").unwrap()];

        let decision = evaluate(&prices, &rules, 50.0);
        assert!(decision.explanations[0].contains("gte=5"));
        assert!(decision.explanations[0].contains("lte=-"));
    }

    #[test]
    fn explanation_formats_indicator_to_four_decimals() {
        let prices = series(&[90.0, 100.0]);
        let rules = vec![threshold_gte(Action::Buy, 1, 50.0, 10.0)];

        let decision = evaluate(&prices, &rules, 50.0);
        // 100/90 - 1 = 11.1111...%
        assert!(decision.explanations[0].contains("11.1111%"));
    }

    #[test]
    fn hold_rule_can_match() {
        let prices = series(&[100.0, 100.0]);
        let rules = vec![parse("HOLD if pct_change 1h in [-1%, 1%] then 0%").unwrap()];

        let decision = evaluate(&prices, &rules, 50.0);
        assert_eq!(decision.action, Action::Hold);
        assert_eq!(
            decision.matched_rule.as_deref(),
            Some("HOLD if pct_change 1h")
        );
        assert!(decision.indicator_value_pct.is_some());
    }

    #[test]
    fn no_rules_gives_default_hold() {
        let prices = series(&[100.0, 105.0]);
        let decision = evaluate(&prices, &[], 50.0);

        assert_eq!(decision.action, Action::Hold);
        assert_eq!(decision.percent, 0.0);
        assert_eq!(decision.explanations.len(), 1);
        assert!(decision.explanations[0].contains("No rule matched"));
    }

    #[test]
    fn negative_percent_request_clamps_to_zero() {
        // Not reachable through the grammar, but the clamp still holds.
        let prices = series(&[100.0, 110.0]);
        let rules = vec![threshold_gte(Action::Buy, 1, 1.0, -5.0)];

        let decision = evaluate(&prices, &rules, 50.0);
        assert_eq!(decision.percent, 0.0);
    }

    proptest! {
        #[test]
        fn percent_always_within_limits(
            requested in -50.0f64..200.0,
            max in 0.0f64..100.0,
            last in 50.0f64..150.0,
        ) {
            let prices = series(&[100.0, last]);
            let rules = vec![NormalizedRule {
                action: Action::Buy,
                window_hours: 1,
                kind: RuleKind::Threshold,
                lower_bound: Some(-1000.0),
                upper_bound: None,
                position_percent: requested,
            }];

            let decision = evaluate(&prices, &rules, max);
            prop_assert!(decision.percent >= 0.0);
            prop_assert!(decision.percent <= max);
        }

        #[test]
        fn earlier_passing_rule_always_wins(
            first_percent in 0.0f64..40.0,
            second_percent in 0.0f64..40.0,
        ) {
            let prices = series(&[100.0, 110.0]);
            let rules = vec![
                threshold_gte(Action::Sell, 1, 0.0, first_percent),
                threshold_gte(Action::Buy, 1, 0.0, second_percent),
            ];

            let decision = evaluate(&prices, &rules, 50.0);
            prop_assert_eq!(decision.action, Action::Sell);
            assert_relative_eq!(decision.percent, first_percent, epsilon = 1e-9);
        }
    }
}
