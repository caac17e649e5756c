use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use super::intake::DiscoveryForm;
use super::repository::{AssessmentLog, AssessmentNotifier, ClientRepository};
use super::schema::{Question, QuestionSection, SchemaVersion};
use super::service::{AssessmentRequest, AssessmentService, AssessmentServiceError};

/// Router builder exposing discovery, assessment, and review endpoints.
pub fn assessment_router<C, L, N>(service: Arc<AssessmentService<C, L, N>>) -> Router
where
    C: ClientRepository + 'static,
    L: AssessmentLog + 'static,
    N: AssessmentNotifier + 'static,
{
    Router::new()
        .route("/api/discovery", post(discovery_handler::<C, L, N>))
        .route("/api/assess", post(assess_handler::<C, L, N>))
        .route(
            "/api/assessments",
            get(assessments_handler::<C, L, N>).post(legacy_assess_handler::<C, L, N>),
        )
        .route("/api/clients", get(clients_handler::<C, L, N>))
        .route("/api/questions", get(questions_handler::<C, L, N>))
        .with_state(service)
}

fn error_response(err: AssessmentServiceError, context: &'static str) -> Response {
    match err {
        AssessmentServiceError::Intake(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::BAD_REQUEST, Json(payload)).into_response()
        }
        AssessmentServiceError::Repository(error) => {
            error!(error = %error, "{context}");
            let payload = json!({ "error": context });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
        AssessmentServiceError::Worker(error) => {
            error!(error = %error, "{context}");
            let payload = json!({ "error": context });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

/// Unreadable bodies get the same JSON error shape as validation failures.
fn rejection_response(rejection: JsonRejection) -> Response {
    let payload = json!({ "error": rejection.body_text() });
    (StatusCode::BAD_REQUEST, Json(payload)).into_response()
}

/// Store calls block on SQLite, so they run off the async workers.
async fn run_blocking<T, F>(task: F) -> Result<T, AssessmentServiceError>
where
    F: FnOnce() -> Result<T, AssessmentServiceError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task).await?
}

pub(crate) async fn discovery_handler<C, L, N>(
    State(service): State<Arc<AssessmentService<C, L, N>>>,
    payload: Result<Json<DiscoveryForm>, JsonRejection>,
) -> Response
where
    C: ClientRepository + 'static,
    L: AssessmentLog + 'static,
    N: AssessmentNotifier + 'static,
{
    let form = match payload {
        Ok(Json(form)) => form,
        Err(rejection) => return rejection_response(rejection),
    };
    match run_blocking(move || service.record_discovery(form)).await {
        Ok(client_id) => {
            let payload = json!({ "success": true, "clientId": client_id });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => error_response(err, "Failed to save discovery form"),
    }
}

pub(crate) async fn assess_handler<C, L, N>(
    State(service): State<Arc<AssessmentService<C, L, N>>>,
    payload: Result<Json<AssessmentRequest>, JsonRejection>,
) -> Response
where
    C: ClientRepository + 'static,
    L: AssessmentLog + 'static,
    N: AssessmentNotifier + 'static,
{
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(rejection),
    };
    match run_blocking(move || service.assess(request)).await {
        Ok(assessed) => (StatusCode::OK, Json(assessed)).into_response(),
        Err(err) => error_response(err, "Failed to save client"),
    }
}

pub(crate) async fn legacy_assess_handler<C, L, N>(
    State(service): State<Arc<AssessmentService<C, L, N>>>,
    payload: Result<Json<AssessmentRequest>, JsonRejection>,
) -> Response
where
    C: ClientRepository + 'static,
    L: AssessmentLog + 'static,
    N: AssessmentNotifier + 'static,
{
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(rejection),
    };
    match run_blocking(move || service.assess_legacy(request)).await {
        Ok(logged) => (StatusCode::OK, Json(logged)).into_response(),
        Err(err) => error_response(err, "Failed to save assessment"),
    }
}

pub(crate) async fn clients_handler<C, L, N>(
    State(service): State<Arc<AssessmentService<C, L, N>>>,
) -> Response
where
    C: ClientRepository + 'static,
    L: AssessmentLog + 'static,
    N: AssessmentNotifier + 'static,
{
    match run_blocking(move || service.clients()).await {
        Ok(clients) => (StatusCode::OK, Json(clients)).into_response(),
        Err(err) => error_response(err, "Failed to fetch clients"),
    }
}

pub(crate) async fn assessments_handler<C, L, N>(
    State(service): State<Arc<AssessmentService<C, L, N>>>,
) -> Response
where
    C: ClientRepository + 'static,
    L: AssessmentLog + 'static,
    N: AssessmentNotifier + 'static,
{
    match run_blocking(move || service.assessments()).await {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(err) => error_response(err, "Failed to fetch assessments"),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuestionsQuery {
    #[serde(default)]
    pub(crate) schema: Option<String>,
}

/// Catalogue entry describing one question and its scored options.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub key: &'static str,
    pub prompt: &'static str,
    pub section: QuestionSection,
    pub multi_select: bool,
    pub options: Vec<OptionView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptionView {
    pub key: &'static str,
    pub score: u8,
}

impl From<Question> for QuestionView {
    fn from(question: Question) -> Self {
        Self {
            key: question.key(),
            prompt: question.prompt(),
            section: question.section(),
            multi_select: question.is_multi_select(),
            options: question
                .table()
                .iter()
                .map(|&(key, score)| OptionView { key, score })
                .collect(),
        }
    }
}

pub fn question_catalogue(schema: SchemaVersion) -> Vec<QuestionView> {
    schema
        .questions()
        .iter()
        .copied()
        .map(QuestionView::from)
        .collect()
}

pub(crate) async fn questions_handler<C, L, N>(
    State(service): State<Arc<AssessmentService<C, L, N>>>,
    Query(query): Query<QuestionsQuery>,
) -> Response
where
    C: ClientRepository + 'static,
    L: AssessmentLog + 'static,
    N: AssessmentNotifier + 'static,
{
    let schema = match query.schema.as_deref() {
        None => service.default_schema(),
        Some(raw) => match raw.parse::<SchemaVersion>() {
            Ok(schema) => schema,
            Err(err) => {
                let payload = json!({ "error": err.to_string() });
                return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
            }
        },
    };

    let payload = json!({
        "schema": schema,
        "questions": question_catalogue(schema),
    });
    (StatusCode::OK, Json(payload)).into_response()
}
