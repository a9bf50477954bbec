//! Concurrent channel fan-out

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::metrics::NotifyMetrics;
use crate::model::AlertRecord;

use super::channel::Channel;

/// Fans one alert batch out to every configured channel.
///
/// Delivery is fire-and-forget: `dispatch` returns once every channel task
/// is spawned, so the cycle's delete step is not gated on delivery. The
/// only completion signal is the per-channel failure gauge.
pub struct Dispatcher {
    channels: Vec<Arc<dyn Channel>>,
    metrics: Arc<NotifyMetrics>,
}

impl Dispatcher {
    pub fn new(channels: Vec<Arc<dyn Channel>>, metrics: Arc<NotifyMetrics>) -> Self {
        Self { channels, metrics }
    }

    /// Deliver `alerts` to every channel concurrently.
    ///
    /// The returned handles are for tests and shutdown diagnostics; the
    /// cycle driver drops them.
    pub fn dispatch(&self, alerts: Vec<AlertRecord>) -> Vec<JoinHandle<()>> {
        let alerts = Arc::new(alerts);

        self.channels
            .iter()
            .map(|channel| {
                let channel = Arc::clone(channel);
                let metrics = Arc::clone(&self.metrics);
                let alerts = Arc::clone(&alerts);

                tokio::spawn(async move {
                    let result = channel.notify(&alerts).await;
                    if let Err(e) = &result {
                        tracing::error!(
                            channel = %channel.name(),
                            error = %e,
                            "Channel delivery failed"
                        );
                    }
                    metrics.record_outcome(channel.kind(), channel.name(), result.is_ok());
                })
            })
            .collect()
    }
}
