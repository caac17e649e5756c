use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::allocation::{PercentRange, RiskBucket};
use super::answers::AnswerSet;
use super::engine::AssessmentResult;
use super::intake::{DiscoveryForm, PersonalInfo};

/// Row identifier in the `clients` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(pub i64);

/// Row identifier in the append-only `assessments` log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssessmentId(pub i64);

/// Stored client, created by the discovery form and enriched by later assessments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: ClientId,
    pub name: String,
    pub age: Option<u16>,
    pub phone: String,
    pub email: String,
    pub service: Option<String>,
    pub risk_capacity: Option<f64>,
    pub risk_behaviour: Option<f64>,
    pub final_score: Option<f64>,
    pub risk_bucket: Option<String>,
    pub equity_allocation: Option<String>,
    pub debt_allocation: Option<String>,
    pub alternatives_allocation: Option<String>,
    pub overrides: Option<Vec<String>>,
    pub assessment_answers: Option<serde_json::Value>,
    pub created_at: String,
    pub updated_at: String,
}

/// Legacy assessment row; always inserted, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentLogEntry {
    pub id: AssessmentId,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub created_at: String,
    pub risk_capacity: f64,
    pub risk_behaviour: f64,
    pub final_score: f64,
    pub risk_bucket: String,
    pub equity_allocation: String,
    pub debt_allocation: String,
    pub alternatives_allocation: String,
    pub overrides: Vec<String>,
    pub raw_inputs: serde_json::Value,
}

/// Client storage keyed by e-mail address.
pub trait ClientRepository: Send + Sync {
    fn insert_discovery(&self, form: &DiscoveryForm) -> Result<ClientId, RepositoryError>;
    fn find_by_email(&self, email: &str) -> Result<Option<ClientRecord>, RepositoryError>;
    /// Updates the risk fields of the client with this e-mail, inserting a new client if none exists.
    fn upsert_assessment(
        &self,
        identity: &PersonalInfo,
        result: &AssessmentResult,
        answers: &AnswerSet,
    ) -> Result<ClientId, RepositoryError>;
    fn list_clients(&self) -> Result<Vec<ClientRecord>, RepositoryError>;
}

/// Append-only assessment history kept for older reporting consumers.
pub trait AssessmentLog: Send + Sync {
    fn append(
        &self,
        identity: &PersonalInfo,
        result: &AssessmentResult,
        answers: &AnswerSet,
    ) -> Result<AssessmentId, RepositoryError>;
    fn list_assessments(&self) -> Result<Vec<AssessmentLogEntry>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    #[error("could not encode record: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Outbound hook for completed assessments (the spreadsheet webhook in production).
pub trait AssessmentNotifier: Send + Sync {
    fn publish(&self, payload: WebhookPayload) -> Result<(), NotifyError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("no async runtime available to deliver the webhook")]
    NoRuntime,
    #[error("webhook transport unavailable: {0}")]
    Transport(String),
}

fn prefer_stored(stored: Option<&str>, entered: &str) -> String {
    match stored {
        Some(value) if !value.trim().is_empty() => value.to_string(),
        _ => entered.to_string(),
    }
}

pub const WEBHOOK_RECORD_TYPE: &str = "assessment";

/// Body posted to the spreadsheet webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    pub name: String,
    pub age: Option<u16>,
    pub email: String,
    pub phone: String,
    pub service: String,
    pub risk_capacity: f64,
    pub risk_behaviour: f64,
    pub risk_score: f64,
    pub risk_bucket: RiskBucket,
    pub equity_allocation: PercentRange,
    pub debt_allocation: PercentRange,
    pub alternatives_allocation: PercentRange,
    pub send_copy: bool,
    pub answers: AnswerSet,
    #[serde(rename = "type")]
    pub record_type: String,
    pub timestamp: String,
}

impl WebhookPayload {
    /// Identity comes from the discovery record when one exists, else from the assessment form.
    pub fn new(
        identity: &PersonalInfo,
        discovery: Option<&ClientRecord>,
        result: &AssessmentResult,
        answers: &AnswerSet,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            name: prefer_stored(
                discovery.map(|client| client.name.as_str()),
                &identity.name,
            ),
            age: discovery.and_then(|client| client.age),
            email: prefer_stored(
                discovery.map(|client| client.email.as_str()),
                &identity.email,
            ),
            phone: prefer_stored(
                discovery.map(|client| client.phone.as_str()),
                &identity.phone,
            ),
            service: discovery
                .and_then(|client| client.service.clone())
                .unwrap_or_default(),
            risk_capacity: result.risk_capacity,
            risk_behaviour: result.risk_behaviour,
            risk_score: result.final_score,
            risk_bucket: result.risk_bucket,
            equity_allocation: result.allocation.equity,
            debt_allocation: result.allocation.debt,
            alternatives_allocation: result.allocation.alternatives,
            send_copy: identity.send_copy,
            answers: answers.clone(),
            record_type: WEBHOOK_RECORD_TYPE.to_string(),
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}
