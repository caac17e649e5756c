use serde::{Deserialize, Serialize};

use super::super::allocation::RiskBucket;
use super::rules::CapacityBreakdown;

/// Sub-score recorded for the most fragile answer to emergency fund, horizon, and EMI load.
const WEAKEST_ANSWER_SCORE: u8 = 2;
const SHORT_HORIZON_MAX_EQUITY: u8 = 40;

/// Buckets by half-open bands; anything below 1.0 lands in the top bucket with >= 8.0.
pub fn classify_risk_bucket(final_score: f64) -> RiskBucket {
    if (1.0..3.5).contains(&final_score) {
        RiskBucket::RiskAverse
    } else if (3.5..6.0).contains(&final_score) {
        RiskBucket::Average
    } else if (6.0..8.0).contains(&final_score) {
        RiskBucket::AboveAverage
    } else {
        RiskBucket::HighRiskAppetite
    }
}

/// Post-classification adjustments, listed in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideRule {
    EmergencyFundShortfall,
    ShortHorizonEquityCap,
    HighEmiBurden,
}

impl OverrideRule {
    pub fn message(self) -> &'static str {
        match self {
            OverrideRule::EmergencyFundShortfall => {
                "Emergency fund insufficient - downgraded to Average risk"
            }
            OverrideRule::ShortHorizonEquityCap => {
                "Short investment horizon - maximum equity capped at 40%"
            }
            OverrideRule::HighEmiBurden => "High EMI burden - risk bucket downgraded by one level",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideOutcome {
    pub adjusted_bucket: RiskBucket,
    pub max_equity: Option<u8>,
    pub applied: Vec<OverrideRule>,
}

impl OverrideOutcome {
    pub fn messages(&self) -> Vec<String> {
        self.applied
            .iter()
            .map(|rule| rule.message().to_string())
            .collect()
    }
}

/// Single pass over the three rules; each sees the bucket as left by the previous one.
pub fn apply_overrides(bucket: RiskBucket, capacity: &CapacityBreakdown) -> OverrideOutcome {
    let mut adjusted_bucket = bucket;
    let mut max_equity = None;
    let mut applied = Vec::new();

    if capacity.emergency_fund_score == WEAKEST_ANSWER_SCORE
        && matches!(
            adjusted_bucket,
            RiskBucket::HighRiskAppetite | RiskBucket::AboveAverage
        )
    {
        adjusted_bucket = RiskBucket::Average;
        applied.push(OverrideRule::EmergencyFundShortfall);
    }

    if capacity.investment_duration_score == WEAKEST_ANSWER_SCORE {
        max_equity = Some(SHORT_HORIZON_MAX_EQUITY);
        applied.push(OverrideRule::ShortHorizonEquityCap);
    }

    if capacity.emi_ratio_score == WEAKEST_ANSWER_SCORE {
        if let Some(lower) = adjusted_bucket.step_down() {
            adjusted_bucket = lower;
            applied.push(OverrideRule::HighEmiBurden);
        }
    }

    OverrideOutcome {
        adjusted_bucket,
        max_equity,
        applied,
    }
}
