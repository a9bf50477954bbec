//! Channel abstraction and construction from configuration

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ChannelConfig;
use crate::model::AlertRecord;

use super::webhook::WebhookChannel;

/// Delivery failure after every attempt was exhausted
#[derive(Debug, thiserror::Error)]
#[error("channel {name} failed to deliver to {endpoint}")]
pub struct DeliveryError {
    pub name: String,
    pub endpoint: String,
}

/// A notification channel able to deliver one batch of alerts.
///
/// A batch is all-or-nothing: either the whole batch goes out in one
/// attempt or the whole batch is retried as a unit.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Channel type label used in metrics ("webhook")
    fn kind(&self) -> &'static str;

    /// Configured channel name used in metrics and logs
    fn name(&self) -> &str;

    /// Deliver the batch, or fail after exhausting retries
    async fn notify(&self, alerts: &[AlertRecord]) -> Result<(), DeliveryError>;
}

/// Build one channel per configured entry
pub fn build_channels(configs: &[ChannelConfig]) -> Vec<Arc<dyn Channel>> {
    configs
        .iter()
        .map(|config| match config {
            ChannelConfig::Webhook {
                name,
                endpoint,
                retries,
                headers,
            } => Arc::new(WebhookChannel::new(
                name.clone(),
                endpoint.clone(),
                headers.clone(),
                *retries,
            )) as Arc<dyn Channel>,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_build_webhook_channel() {
        let configs = vec![ChannelConfig::Webhook {
            name: "ops".to_string(),
            endpoint: "http://localhost:9/hook".to_string(),
            retries: 2,
            headers: HashMap::new(),
        }];

        let channels = build_channels(&configs);
        assert_eq!(channels.len(), 1);
        assert_eq!(channels[0].kind(), "webhook");
        assert_eq!(channels[0].name(), "ops");
    }
}
