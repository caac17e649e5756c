use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::answers::AnswerSet;
use super::engine::{AssessmentResult, RiskAssessmentEngine};
use super::intake::{
    validate_answers, validate_discovery, validate_personal_info, DiscoveryForm, IntakeError,
    PersonalInfo,
};
use super::repository::{
    AssessmentId, AssessmentLog, AssessmentLogEntry, AssessmentNotifier, ClientId, ClientRecord,
    ClientRepository, RepositoryError, WebhookPayload,
};
use super::schema::SchemaVersion;

/// Body accepted by the assessment endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssessmentRequest {
    pub personal_info: PersonalInfo,
    pub answers: AnswerSet,
    /// Edition to score against; the service default applies when absent.
    pub schema: Option<SchemaVersion>,
}

/// Result returned after the client record has been upserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientAssessment {
    #[serde(flatten)]
    pub result: AssessmentResult,
    pub client_id: ClientId,
}

/// Result returned after a legacy log row has been appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedAssessment {
    #[serde(flatten)]
    pub result: AssessmentResult,
    pub assessment_id: AssessmentId,
}

/// Service composing validation, the scoring engine, and both persistence sinks.
pub struct AssessmentService<C, L, N> {
    clients: Arc<C>,
    log: Arc<L>,
    notifier: Arc<N>,
    schema: SchemaVersion,
}

impl<C, L, N> AssessmentService<C, L, N>
where
    C: ClientRepository + 'static,
    L: AssessmentLog + 'static,
    N: AssessmentNotifier + 'static,
{
    pub fn new(clients: Arc<C>, log: Arc<L>, notifier: Arc<N>, schema: SchemaVersion) -> Self {
        Self {
            clients,
            log,
            notifier,
            schema,
        }
    }

    pub fn default_schema(&self) -> SchemaVersion {
        self.schema
    }

    /// Record a discovery form submission as a new client row.
    pub fn record_discovery(
        &self,
        form: DiscoveryForm,
    ) -> Result<ClientId, AssessmentServiceError> {
        validate_discovery(&form)?;
        let id = self.clients.insert_discovery(&form)?;
        info!(client_id = id.0, service = %form.service, "discovery form recorded");
        Ok(id)
    }

    /// Score an assessment, forward it to the webhook, and upsert the client by e-mail.
    pub fn assess(
        &self,
        request: AssessmentRequest,
    ) -> Result<ClientAssessment, AssessmentServiceError> {
        let result = self.evaluate(&request)?;
        self.notify(&request.personal_info, &result, &request.answers);

        let client_id =
            self.clients
                .upsert_assessment(&request.personal_info, &result, &request.answers)?;
        info!(
            client_id = client_id.0,
            bucket = %result.risk_bucket,
            final_score = result.final_score,
            "assessment stored on client"
        );

        Ok(ClientAssessment { result, client_id })
    }

    /// Score an assessment and append it to the legacy log.
    pub fn assess_legacy(
        &self,
        request: AssessmentRequest,
    ) -> Result<LoggedAssessment, AssessmentServiceError> {
        let result = self.evaluate(&request)?;
        let assessment_id =
            self.log
                .append(&request.personal_info, &result, &request.answers)?;
        info!(
            assessment_id = assessment_id.0,
            bucket = %result.risk_bucket,
            "assessment appended to log"
        );

        Ok(LoggedAssessment {
            result,
            assessment_id,
        })
    }

    pub fn clients(&self) -> Result<Vec<ClientRecord>, AssessmentServiceError> {
        Ok(self.clients.list_clients()?)
    }

    pub fn assessments(&self) -> Result<Vec<AssessmentLogEntry>, AssessmentServiceError> {
        Ok(self.log.list_assessments()?)
    }

    fn evaluate(&self, request: &AssessmentRequest) -> Result<AssessmentResult, IntakeError> {
        validate_personal_info(&request.personal_info)?;
        let schema = request.schema.unwrap_or(self.schema);
        validate_answers(schema, &request.answers)?;

        let result = RiskAssessmentEngine::new(schema).calculate(&request.answers);
        if !result.is_fully_scored() {
            warn!(
                email = %request.personal_info.email,
                unscored = ?result.unscored_questions,
                "assessment contains answers outside the scoring tables"
            );
        }
        Ok(result)
    }

    /// Remote delivery is best effort; failures never reach the caller.
    fn notify(&self, identity: &PersonalInfo, result: &AssessmentResult, answers: &AnswerSet) {
        let discovery = match self.clients.find_by_email(&identity.email) {
            Ok(record) => record,
            Err(err) => {
                warn!(error = %err, "could not load discovery record for webhook payload");
                None
            }
        };

        let payload =
            WebhookPayload::new(identity, discovery.as_ref(), result, answers, Utc::now());
        if let Err(err) = self.notifier.publish(payload) {
            warn!(error = %err, "assessment not forwarded to webhook");
        }
    }
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("assessment worker stopped: {0}")]
    Worker(#[from] tokio::task::JoinError),
}
