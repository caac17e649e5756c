use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::workflows::assessment::answers::AnswerSet;
use crate::workflows::assessment::engine::AssessmentResult;
use crate::workflows::assessment::intake::{DiscoveryForm, PersonalInfo};
use crate::workflows::assessment::repository::{
    AssessmentId, AssessmentLog, AssessmentLogEntry, AssessmentNotifier, ClientId, ClientRecord,
    ClientRepository, NotifyError, RepositoryError, WebhookPayload,
};
use crate::workflows::assessment::schema::{Question, SchemaVersion};
use crate::workflows::assessment::service::{AssessmentRequest, AssessmentService};

const STAMP: &str = "2025-06-01 09:30:00";

/// Top-scoring option for every v1 question.
pub(super) fn strongest_answers() -> AnswerSet {
    AnswerSet::new()
        .with(Question::IncomeStability, "government_psu")
        .with(Question::SavingsRate, "more_35")
        .with(Question::EmergencyFund, "more_12")
        .with(Question::Dependents, "0")
        .with(Question::EmiIncomeRatio, "less_10")
        .with(Question::JobReplaceability, "less_2_months")
        .with(Question::InvestmentDuration, "more_10")
        .with(Question::GoalFlexibility, "fully_flexible")
        .with(Question::BudgetTracking, "strict")
        .with(Question::InvestmentConsistency, "consistent")
        .with(Question::MarketReaction, "added")
        .with(Question::PortfolioMonitoring, "periodic")
}

/// The 25-question edition with middling financial and experience answers.
pub(super) fn extended_answers() -> AnswerSet {
    strongest_answers()
        .with(Question::AnnualIncome, "10l_25l")
        .with(Question::MonthlyExpenses, "30_50")
        .with(Question::NumDependents, "1")
        .with(Question::DependentsAgeGroup, "children")
        .with(Question::NetWorth, "50l_1cr")
        .with(Question::LiquidAssetsRatio, "10_25")
        .with(Question::InvestmentRatio, "25_50")
        .with(Question::RealEstateRatio, "25_50")
        .with(Question::DebtToNetWorth, "10_25")
        .with(Question::FinancialStability, "stable")
        .with(Question::InvestmentExperienceYears, "2_5")
        .with(
            Question::InvestmentTypes,
            vec!["mutual_funds".to_string(), "direct_equity".to_string()],
        )
        .with(Question::KnowledgeLevel, "intermediate")
}

pub(super) fn personal_info() -> PersonalInfo {
    PersonalInfo {
        name: "Asha Menon".to_string(),
        phone: "9845012345".to_string(),
        email: "asha@example.com".to_string(),
        send_copy: true,
    }
}

pub(super) fn discovery_form() -> DiscoveryForm {
    DiscoveryForm {
        name: "Asha R. Menon".to_string(),
        age: Some(34),
        phone: "9845012345".to_string(),
        email: "asha@example.com".to_string(),
        service: "Retirement planning".to_string(),
    }
}

pub(super) fn request(answers: AnswerSet) -> AssessmentRequest {
    AssessmentRequest {
        personal_info: personal_info(),
        answers,
        schema: None,
    }
}

pub(super) type MemoryService = AssessmentService<MemoryClients, MemoryLog, MemoryNotifier>;

pub(super) fn build_service() -> (
    MemoryService,
    Arc<MemoryClients>,
    Arc<MemoryLog>,
    Arc<MemoryNotifier>,
) {
    let clients = Arc::new(MemoryClients::default());
    let log = Arc::new(MemoryLog::default());
    let notifier = Arc::new(MemoryNotifier::default());
    let service = AssessmentService::new(
        clients.clone(),
        log.clone(),
        notifier.clone(),
        SchemaVersion::V1,
    );
    (service, clients, log, notifier)
}

#[derive(Default)]
pub(super) struct MemoryClients {
    records: Mutex<Vec<ClientRecord>>,
}

impl MemoryClients {
    pub(super) fn records(&self) -> Vec<ClientRecord> {
        self.records.lock().expect("clients mutex poisoned").clone()
    }

    fn next_id(records: &[ClientRecord]) -> ClientId {
        ClientId(records.len() as i64 + 1)
    }
}

fn blank_record(id: ClientId, name: &str, phone: &str, email: &str) -> ClientRecord {
    ClientRecord {
        id,
        name: name.to_string(),
        age: None,
        phone: phone.to_string(),
        email: email.to_string(),
        service: None,
        risk_capacity: None,
        risk_behaviour: None,
        final_score: None,
        risk_bucket: None,
        equity_allocation: None,
        debt_allocation: None,
        alternatives_allocation: None,
        overrides: None,
        assessment_answers: None,
        created_at: STAMP.to_string(),
        updated_at: STAMP.to_string(),
    }
}

impl ClientRepository for MemoryClients {
    fn insert_discovery(&self, form: &DiscoveryForm) -> Result<ClientId, RepositoryError> {
        let mut guard = self.records.lock().expect("clients mutex poisoned");
        let id = Self::next_id(&guard);
        let mut record = blank_record(id, &form.name, &form.phone, &form.email);
        record.age = form.age;
        record.service = Some(form.service.clone());
        guard.push(record);
        Ok(id)
    }

    fn find_by_email(&self, email: &str) -> Result<Option<ClientRecord>, RepositoryError> {
        let guard = self.records.lock().expect("clients mutex poisoned");
        Ok(guard.iter().find(|record| record.email == email).cloned())
    }

    fn upsert_assessment(
        &self,
        identity: &PersonalInfo,
        result: &AssessmentResult,
        answers: &AnswerSet,
    ) -> Result<ClientId, RepositoryError> {
        let mut guard = self.records.lock().expect("clients mutex poisoned");
        let position = guard
            .iter()
            .position(|record| record.email == identity.email);
        let index = match position {
            Some(index) => index,
            None => {
                let id = Self::next_id(&guard);
                guard.push(blank_record(
                    id,
                    &identity.name,
                    &identity.phone,
                    &identity.email,
                ));
                guard.len() - 1
            }
        };

        let record = &mut guard[index];
        record.risk_capacity = Some(result.risk_capacity);
        record.risk_behaviour = Some(result.risk_behaviour);
        record.final_score = Some(result.final_score);
        record.risk_bucket = Some(result.risk_bucket.label().to_string());
        record.equity_allocation = Some(result.allocation.equity.to_string());
        record.debt_allocation = Some(result.allocation.debt.to_string());
        record.alternatives_allocation = Some(result.allocation.alternatives.to_string());
        record.overrides = Some(result.overrides.clone());
        record.assessment_answers = Some(serde_json::to_value(answers)?);
        Ok(record.id)
    }

    fn list_clients(&self) -> Result<Vec<ClientRecord>, RepositoryError> {
        let mut records = self.records();
        records.reverse();
        Ok(records)
    }
}

#[derive(Default)]
pub(super) struct MemoryLog {
    entries: Mutex<Vec<AssessmentLogEntry>>,
}

impl MemoryLog {
    pub(super) fn entries(&self) -> Vec<AssessmentLogEntry> {
        self.entries.lock().expect("log mutex poisoned").clone()
    }
}

impl AssessmentLog for MemoryLog {
    fn append(
        &self,
        identity: &PersonalInfo,
        result: &AssessmentResult,
        answers: &AnswerSet,
    ) -> Result<AssessmentId, RepositoryError> {
        let mut guard = self.entries.lock().expect("log mutex poisoned");
        let id = AssessmentId(guard.len() as i64 + 1);
        guard.push(AssessmentLogEntry {
            id,
            name: identity.name.clone(),
            phone: identity.phone.clone(),
            email: identity.email.clone(),
            created_at: STAMP.to_string(),
            risk_capacity: result.risk_capacity,
            risk_behaviour: result.risk_behaviour,
            final_score: result.final_score,
            risk_bucket: result.risk_bucket.label().to_string(),
            equity_allocation: result.allocation.equity.to_string(),
            debt_allocation: result.allocation.debt.to_string(),
            alternatives_allocation: result.allocation.alternatives.to_string(),
            overrides: result.overrides.clone(),
            raw_inputs: serde_json::json!({
                "personalInfo": identity,
                "answers": answers,
            }),
        });
        Ok(id)
    }

    fn list_assessments(&self) -> Result<Vec<AssessmentLogEntry>, RepositoryError> {
        let mut entries = self.entries();
        entries.reverse();
        Ok(entries)
    }
}

#[derive(Default)]
pub(super) struct MemoryNotifier {
    payloads: Mutex<Vec<WebhookPayload>>,
}

impl MemoryNotifier {
    pub(super) fn payloads(&self) -> Vec<WebhookPayload> {
        self.payloads.lock().expect("notifier mutex poisoned").clone()
    }
}

impl AssessmentNotifier for MemoryNotifier {
    fn publish(&self, payload: WebhookPayload) -> Result<(), NotifyError> {
        self.payloads
            .lock()
            .expect("notifier mutex poisoned")
            .push(payload);
        Ok(())
    }
}

pub(super) struct FailingNotifier;

impl AssessmentNotifier for FailingNotifier {
    fn publish(&self, _payload: WebhookPayload) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("connection refused".to_string()))
    }
}

pub(super) struct UnavailableRepository;

impl ClientRepository for UnavailableRepository {
    fn insert_discovery(&self, _form: &DiscoveryForm) -> Result<ClientId, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_by_email(&self, _email: &str) -> Result<Option<ClientRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn upsert_assessment(
        &self,
        _identity: &PersonalInfo,
        _result: &AssessmentResult,
        _answers: &AnswerSet,
    ) -> Result<ClientId, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list_clients(&self) -> Result<Vec<ClientRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

impl AssessmentLog for UnavailableRepository {
    fn append(
        &self,
        _identity: &PersonalInfo,
        _result: &AssessmentResult,
        _answers: &AnswerSet,
    ) -> Result<AssessmentId, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list_assessments(&self) -> Result<Vec<AssessmentLogEntry>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Local HTTP endpoint that forwards every JSON body posted to `/hook` and answers `status`.
pub(super) async fn capture_server(
    status: StatusCode,
) -> (String, mpsc::UnboundedReceiver<Value>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    let app = Router::new().route(
        "/hook",
        post(move |Json(body): Json<Value>| {
            let sender = sender.clone();
            async move {
                let _ = sender.send(body);
                status
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind capture listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("capture server");
    });
    (format!("http://{addr}/hook"), receiver)
}
