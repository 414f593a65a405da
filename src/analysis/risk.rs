//! Risk aggregator: folds deception, urgency, sentiment and the presence
//! of money amounts into one ordinal risk level.

use crate::domain::RiskLevel;

const DECEPTION_WEIGHT: i32 = 2;
const HOSTILE_BONUS: i32 = 4;
const UPSET_BONUS: i32 = 2;
const MONEY_BONUS: i32 = 1;

/// riskScore = 2*deception + urgency, +4 hostile/angry, +2 upset, +1 money.
/// >=10 critical, >=6 high, >=3 medium, else low.
pub fn aggregate_risk(
    deception_score: i32,
    urgency_score: i32,
    sentiment: &str,
    has_money: bool,
) -> RiskLevel {
    let mut score = DECEPTION_WEIGHT * deception_score + urgency_score;
    score += match sentiment {
        "hostile" | "angry" => HOSTILE_BONUS,
        "upset" => UPSET_BONUS,
        _ => 0,
    };
    if has_money {
        score += MONEY_BONUS;
    }

    match score {
        s if s >= 10 => RiskLevel::Critical,
        s if s >= 6 => RiskLevel::High,
        s if s >= 3 => RiskLevel::Medium,
        _ => RiskLevel::Low,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_message_is_low() {
        assert_eq!(aggregate_risk(0, 0, "formal_neutral", false), RiskLevel::Low);
    }

    #[test]
    fn hostile_sentiment_alone_is_medium() {
        assert_eq!(aggregate_risk(0, 0, "hostile", false), RiskLevel::Medium);
    }

    #[test]
    fn deception_dominates() {
        // 2*5 = 10 on deception alone.
        assert_eq!(aggregate_risk(5, 0, "formal_neutral", false), RiskLevel::Critical);
    }

    #[test]
    fn money_nudges_boundary_cases() {
        assert_eq!(aggregate_risk(1, 0, "formal_neutral", false), RiskLevel::Low);
        assert_eq!(aggregate_risk(1, 0, "formal_neutral", true), RiskLevel::Medium);
    }

    #[test]
    fn monotonic_in_deception_and_urgency() {
        for base_d in 0..=9 {
            for base_u in 0..=9 {
                let level = aggregate_risk(base_d, base_u, "upset", true);
                assert!(aggregate_risk(base_d + 1, base_u, "upset", true) >= level);
                assert!(aggregate_risk(base_d, base_u + 1, "upset", true) >= level);
            }
        }
    }
}
