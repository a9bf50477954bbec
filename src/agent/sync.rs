//! Cycle driver: fetch → reconcile → dispatch → delete

use std::sync::Arc;
use std::time::Duration;

use tokio::time;

use crate::notify::Dispatcher;
use crate::reconcile::reconcile;
use crate::store::{AlertStore, StoreError};

/// Drives the periodic reconciliation passes.
///
/// Passes are strictly sequential; a failed pass is logged and the next
/// tick starts a fresh one. Deletion is issued after dispatch has been
/// initiated for all channels, not after it completed, so a failed or slow
/// channel never holds up record retirement (and a failed delete means the
/// same alerts are re-delivered on a later pass).
pub struct SyncAgent {
    store: Arc<dyn AlertStore>,
    dispatcher: Dispatcher,
    interval: Duration,
}

impl SyncAgent {
    pub fn new(store: Arc<dyn AlertStore>, dispatcher: Dispatcher, interval: Duration) -> Self {
        Self {
            store,
            dispatcher,
            interval,
        }
    }

    /// Run forever
    pub async fn run(&self) {
        let mut ticker = time::interval(self.interval);
        // consume the immediate first tick so the first pass starts one
        // interval after startup
        ticker.tick().await;

        loop {
            ticker.tick().await;
            tracing::info!("Starting reconciliation pass");

            if let Err(e) = self.run_once().await {
                tracing::error!(error = %e, "Reconciliation pass failed");
            }
        }
    }

    /// One fetch → reconcile → dispatch → delete pass
    pub async fn run_once(&self) -> Result<(), StoreError> {
        let records = self.store.fetch().await?;
        let outcome = reconcile(records);

        tracing::debug!(
            to_notify = outcome.to_notify.len(),
            to_delete = outcome.to_delete.len(),
            "Reconciled batch"
        );

        if !outcome.to_notify.is_empty() {
            let _ = self.dispatcher.dispatch(outcome.to_notify);
        }

        if !outcome.to_delete.is_empty() {
            self.store.delete(&outcome.to_delete).await?;
        }

        Ok(())
    }
}
