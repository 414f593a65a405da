//! Admin alert engine.
//!
//! Evaluates the configured rule table against the message text: a rule
//! fires when its number of DISTINCT matched keywords reaches its
//! threshold. Independently of the table, a high deception score always
//! raises a synthetic `manipulation_detected` alert. Multiple rules may
//! fire for one message; there is no upper bound on alert count.

use crate::config::AlertRule;
use crate::domain::{AdminAlert, AlertPriority, DeceptionFlag};

/// Deception score at which the synthetic manipulation alert fires.
const MANIPULATION_ALERT_THRESHOLD: i32 = 4;

pub fn evaluate_alerts(
    text_lower: &str,
    rules: &[AlertRule],
    deception_flags: &[DeceptionFlag],
    deception_score: i32,
) -> Vec<AdminAlert> {
    let mut alerts = Vec::new();

    for rule in rules {
        let triggers: Vec<String> = rule
            .keywords
            .iter()
            .filter(|k| text_lower.contains(k.as_str()))
            .cloned()
            .collect();
        if triggers.len() >= rule.threshold {
            alerts.push(AdminAlert {
                kind: rule.name.clone(),
                priority: rule.priority,
                message: rule.message.clone(),
                triggers,
            });
        }
    }

    if deception_score >= MANIPULATION_ALERT_THRESHOLD {
        let tactics: Vec<String> = deception_flags
            .iter()
            .map(|f| f.tactic.clone())
            .collect();
        alerts.push(AdminAlert {
            kind: "manipulation_detected".to_string(),
            priority: AlertPriority::High,
            message: format!(
                "Manipulative language detected (score {deception_score}): {}",
                tactics.join(", ")
            ),
            triggers: tactics,
        });
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str, threshold: usize, keywords: &[&str]) -> AlertRule {
        AlertRule {
            name: name.to_string(),
            priority: AlertPriority::High,
            threshold,
            message: format!("{name} fired"),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    #[test]
    fn threshold_one_fires_on_single_keyword() {
        let rules = vec![rule("single", 1, &["statute of limitations", "respond by"])];
        let alerts = evaluate_alerts("the statute of limitations applies", &rules, &[], 0);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].triggers, vec!["statute of limitations"]);
    }

    #[test]
    fn threshold_two_needs_two_distinct_keywords() {
        let rules = vec![rule("double", 2, &["unacceptable", "report you", "incompetent"])];

        // One keyword, repeated, does not fire: matches are distinct keywords.
        let alerts = evaluate_alerts("unacceptable. truly unacceptable.", &rules, &[], 0);
        assert!(alerts.is_empty());

        let alerts = evaluate_alerts("unacceptable, i will report you", &rules, &[], 0);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].triggers.len(), 2);
    }

    #[test]
    fn multiple_rules_can_fire_for_one_message() {
        let rules = vec![
            rule("a", 1, &["deadline"]),
            rule("b", 1, &["wire transfer"]),
        ];
        let alerts = evaluate_alerts("deadline for the wire transfer", &rules, &[], 0);
        assert_eq!(alerts.len(), 2);
    }

    #[test]
    fn manipulation_alert_is_independent_of_rules() {
        let flags = vec![DeceptionFlag {
            tactic: "pressure_tactics".to_string(),
            indicators: vec!["act now".to_string()],
            count: 4,
        }];
        let alerts = evaluate_alerts("innocuous text", &[], &flags, 4);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, "manipulation_detected");
        assert_eq!(alerts[0].priority, AlertPriority::High);
        assert_eq!(alerts[0].triggers, vec!["pressure_tactics"]);
    }

    #[test]
    fn manipulation_alert_needs_score_four() {
        let alerts = evaluate_alerts("innocuous text", &[], &[], 3);
        assert!(alerts.is_empty());
    }
}
