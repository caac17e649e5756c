use std::time::Duration;

use tracing::{debug, warn};

use super::repository::{AssessmentNotifier, NotifyError, WebhookPayload};

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Posts each completed assessment to the spreadsheet webhook without waiting for the reply.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()
            .map_err(|err| NotifyError::Transport(err.to_string()))?;
        Ok(Self::with_client(client, url))
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

impl AssessmentNotifier for WebhookNotifier {
    fn publish(&self, payload: WebhookPayload) -> Result<(), NotifyError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| NotifyError::NoRuntime)?;
        let request = self.client.post(&self.url).json(&payload);
        let email = payload.email;

        runtime.spawn(async move {
            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    debug!(%email, status = %response.status(), "assessment sent to webhook");
                }
                Ok(response) => {
                    warn!(%email, status = %response.status(), "webhook rejected assessment");
                }
                Err(err) => {
                    warn!(%email, error = %err, "failed to send assessment to webhook");
                }
            }
        });

        Ok(())
    }
}

/// Stand-in used when no webhook URL is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledNotifier;

impl AssessmentNotifier for DisabledNotifier {
    fn publish(&self, payload: WebhookPayload) -> Result<(), NotifyError> {
        debug!(email = %payload.email, "webhook not configured; skipping remote save");
        Ok(())
    }
}

/// Notifier selected from configuration at startup.
#[derive(Debug, Clone)]
pub enum ConfiguredNotifier {
    Webhook(WebhookNotifier),
    Disabled(DisabledNotifier),
}

impl ConfiguredNotifier {
    pub fn from_url(url: Option<&str>) -> Result<Self, NotifyError> {
        match url {
            Some(url) => Ok(Self::Webhook(WebhookNotifier::new(url)?)),
            None => Ok(Self::Disabled(DisabledNotifier)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Webhook(_))
    }
}

impl AssessmentNotifier for ConfiguredNotifier {
    fn publish(&self, payload: WebhookPayload) -> Result<(), NotifyError> {
        match self {
            Self::Webhook(notifier) => notifier.publish(payload),
            Self::Disabled(notifier) => notifier.publish(payload),
        }
    }
}
