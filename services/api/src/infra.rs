use metrics_exporter_prometheus::PrometheusHandle;
use risk_profiler::config::AssessmentConfig;
use risk_profiler::error::AppError;
use risk_profiler::workflows::assessment::{
    AssessmentService, ConfiguredNotifier, SqliteAssessmentStore,
};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type ProductionService =
    AssessmentService<SqliteAssessmentStore, SqliteAssessmentStore, ConfiguredNotifier>;

/// Opens the SQLite store and selects the webhook notifier from configuration.
pub(crate) fn build_assessment_service(
    config: &AssessmentConfig,
) -> Result<ProductionService, AppError> {
    let store = Arc::new(SqliteAssessmentStore::open(&config.database_path)?);
    let notifier = ConfiguredNotifier::from_url(config.webhook_url.as_deref())?;

    if notifier.is_enabled() {
        info!("assessments will be forwarded to the configured webhook");
    } else {
        warn!("PROFILER_WEBHOOK_URL not set; remote spreadsheet sync disabled");
    }

    Ok(AssessmentService::new(
        store.clone(),
        store,
        Arc::new(notifier),
        config.schema,
    ))
}
