//! Investor risk assessment: questionnaire editions, the scoring engine, the form
//! controller, and the sinks that record each completed assessment.

pub mod allocation;
pub mod answers;
pub mod engine;
pub mod intake;
pub mod repository;
pub mod router;
pub mod schema;
pub mod service;
pub mod store;
pub mod webhook;

#[cfg(test)]
mod tests;

pub use allocation::{asset_allocation_for, Allocation, PercentRange, RiskBucket};
pub use answers::{AnswerSet, AnswerValue};
pub use engine::{
    apply_overrides, classify_risk_bucket, AssessmentResult, CapacityBreakdown, OverrideOutcome,
    OverrideRule, RiskAssessmentEngine,
};
pub use intake::{DiscoveryForm, FormEvent, FormSession, FormState, IntakeError, PersonalInfo};
pub use repository::{
    AssessmentId, AssessmentLog, AssessmentLogEntry, AssessmentNotifier, ClientId, ClientRecord,
    ClientRepository, NotifyError, RepositoryError, WebhookPayload,
};
pub use router::{assessment_router, question_catalogue, QuestionView};
pub use schema::{Question, QuestionSection, SchemaVersion, UnknownSchema};
pub use service::{
    AssessmentRequest, AssessmentService, AssessmentServiceError, ClientAssessment,
    LoggedAssessment,
};
pub use store::SqliteAssessmentStore;
pub use webhook::{ConfiguredNotifier, DisabledNotifier, WebhookNotifier};
