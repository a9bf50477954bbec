//! Webhook channel

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;

use crate::model::AlertRecord;

use super::channel::{Channel, DeliveryError};

/// Fixed pause between delivery attempts
const RETRY_PAUSE: Duration = Duration::from_secs(1);

/// Channel that POSTs the whole alert batch as one JSON body
pub struct WebhookChannel {
    name: String,
    endpoint: String,
    headers: HashMap<String, String>,
    retries: u32,
    pause: Duration,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct NotifyBody<'a> {
    alerts: &'a [AlertRecord],
}

/// One failed attempt; every variant is logged and retried identically
#[derive(Debug, thiserror::Error)]
enum AttemptError {
    #[error("failed to serialize alert batch: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("endpoint returned status {0}")]
    Status(StatusCode),
}

impl WebhookChannel {
    pub fn new(
        name: String,
        endpoint: String,
        headers: HashMap<String, String>,
        retries: u32,
    ) -> Self {
        Self {
            name,
            endpoint,
            headers,
            retries,
            pause: RETRY_PAUSE,
            client: reqwest::Client::new(),
        }
    }

    /// Shrink the inter-attempt pause so retry tests don't wall-clock sleep
    #[cfg(test)]
    pub(crate) fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    async fn attempt(&self, alerts: &[AlertRecord]) -> Result<(), AttemptError> {
        let body = serde_json::to_vec(&NotifyBody { alerts })?;

        let mut request = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);

        for (key, value) in &self.headers {
            request = request.header(key, value);
        }

        let response = request.send().await?;

        if response.status() != StatusCode::OK {
            return Err(AttemptError::Status(response.status()));
        }

        Ok(())
    }
}

#[async_trait]
impl Channel for WebhookChannel {
    fn kind(&self) -> &'static str {
        "webhook"
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn notify(&self, alerts: &[AlertRecord]) -> Result<(), DeliveryError> {
        for attempt in 1..=self.retries {
            match self.attempt(alerts).await {
                Ok(()) => {
                    tracing::debug!(
                        channel = %self.name,
                        alerts = alerts.len(),
                        "Webhook batch delivered"
                    );
                    return Ok(());
                }
                Err(e) => {
                    tracing::error!(
                        channel = %self.name,
                        endpoint = %self.endpoint,
                        attempt,
                        error = %e,
                        "Webhook delivery attempt failed"
                    );
                }
            }

            if attempt < self.retries {
                tokio::time::sleep(self.pause).await;
            }
        }

        Err(DeliveryError {
            name: self.name.clone(),
            endpoint: self.endpoint.clone(),
        })
    }
}
