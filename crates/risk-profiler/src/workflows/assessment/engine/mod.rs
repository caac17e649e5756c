mod policy;
mod rules;

pub use policy::{apply_overrides, classify_risk_bucket, OverrideOutcome, OverrideRule};
pub use rules::CapacityBreakdown;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::allocation::{Allocation, RiskBucket};
use super::answers::AnswerSet;
use super::schema::{Question, SchemaVersion};
use rules::round2;

/// Stateless scorer for one questionnaire edition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RiskAssessmentEngine {
    schema: SchemaVersion,
}

impl RiskAssessmentEngine {
    pub fn new(schema: SchemaVersion) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> SchemaVersion {
        self.schema
    }

    pub fn calculate_risk_capacity(&self, answers: &AnswerSet) -> CapacityBreakdown {
        rules::risk_capacity(answers)
    }

    pub fn calculate_risk_behaviour(&self, answers: &AnswerSet) -> f64 {
        rules::risk_behaviour(answers)
    }

    pub fn calculate_financial_info_score(&self, answers: &AnswerSet) -> f64 {
        rules::financial_info(answers)
    }

    pub fn calculate_investment_experience_score(&self, answers: &AnswerSet) -> f64 {
        rules::investment_experience(answers)
    }

    /// Score, classify, and apply overrides. Never fails: unusable answers score 0 and are
    /// reported in `unscored_questions`.
    pub fn calculate(&self, answers: &AnswerSet) -> AssessmentResult {
        let capacity = self.calculate_risk_capacity(answers);
        let risk_behaviour = self.calculate_risk_behaviour(answers);
        let final_score = round2(capacity.risk_capacity.min(risk_behaviour));

        let classified = classify_risk_bucket(final_score);
        let outcome = apply_overrides(classified, &capacity);

        let mut allocation = outcome.adjusted_bucket.allocation();
        if let Some(max_equity) = outcome.max_equity {
            allocation = allocation.cap_equity(max_equity);
        }

        let (financial_info_score, investment_experience_score) = match self.schema {
            SchemaVersion::V1 => (None, None),
            SchemaVersion::V2 => (
                Some(self.calculate_financial_info_score(answers)),
                Some(self.calculate_investment_experience_score(answers)),
            ),
        };

        let unscored_questions = self.unscored(answers);
        if !unscored_questions.is_empty() {
            debug!(
                schema = %self.schema,
                unscored = ?unscored_questions,
                "questions scored as 0"
            );
        }

        AssessmentResult {
            schema: self.schema,
            financial_info_score,
            investment_experience_score,
            risk_capacity: capacity.risk_capacity,
            risk_behaviour,
            final_score,
            risk_bucket: outcome.adjusted_bucket,
            allocation,
            overrides: outcome.messages(),
            unscored_questions,
        }
    }

    fn unscored(&self, answers: &AnswerSet) -> Vec<Question> {
        self.schema
            .questions()
            .iter()
            .copied()
            .filter(|question| {
                answers
                    .selected(*question)
                    .and_then(|option| question.score(&option))
                    .is_none()
            })
            .collect()
    }
}

/// Engine output as returned to the form and recorded by the persistence sinks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResult {
    pub schema: SchemaVersion,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financial_info_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investment_experience_score: Option<f64>,
    pub risk_capacity: f64,
    pub risk_behaviour: f64,
    pub final_score: f64,
    pub risk_bucket: RiskBucket,
    pub allocation: Allocation,
    pub overrides: Vec<String>,
    #[serde(default)]
    pub unscored_questions: Vec<Question>,
}

impl AssessmentResult {
    pub fn is_fully_scored(&self) -> bool {
        self.unscored_questions.is_empty()
    }
}
