//! Delivery scheduler
//!
//! The scheduler periodically scans the store for due capsules and drives
//! each through the delivery attempt engine, one at a time. A pass can
//! also be triggered on demand through the HTTP surface; the store's claim
//! step keeps a capsule from being delivered twice when a manual trigger
//! races the timer.

use crate::config::SchedulerConfig;
use crate::notify::Notifier;
use crate::store::CapsuleStore;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub mod delivery;

pub use delivery::{Attempt, AttemptOutcome, DeliveryEngine};

/// Aggregate result of one scheduler pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PassSummary {
    /// Number of due capsules selected for this pass
    pub checked: usize,
    /// Successful deliveries
    pub sent: usize,
    /// Failed attempts (retryable and permanent alike)
    pub failed: usize,
    /// One entry per failed attempt; `null` when there were none
    pub errors: Option<Vec<AttemptError>>,
}

/// A failed attempt within a pass
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptError {
    /// Capsule the attempt belonged to
    pub capsule_id: String,
    /// Recipient address
    pub destination: String,
    /// Failure description
    pub error: String,
}

/// Delivery scheduler - runs passes over due capsules
pub struct DeliveryScheduler {
    store: Arc<dyn CapsuleStore>,
    engine: DeliveryEngine,
    config: SchedulerConfig,
    shutdown: Arc<AtomicBool>,
}

impl DeliveryScheduler {
    /// Create a new scheduler
    pub fn new(
        store: Arc<dyn CapsuleStore>,
        notifier: Arc<dyn Notifier>,
        config: SchedulerConfig,
    ) -> Self {
        let engine = DeliveryEngine::new(store.clone(), notifier, config.failure_limit);
        Self {
            store,
            engine,
            config,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get a handle to the shutdown flag
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        self.shutdown.clone()
    }

    /// Request the loop to stop after the current pass
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Run the scheduler loop.
    ///
    /// Invokes [`run_once`](Self::run_once) on a fixed interval until
    /// shutdown is requested. A failed pass is logged and does not stop
    /// future passes.
    pub async fn run(&self) {
        let mut timer = tokio::time::interval(self.config.interval);
        timer.tick().await; // Skip first immediate tick

        tracing::info!(
            "Delivery scheduler started (interval: {:?}, batch limit: {})",
            self.config.interval,
            self.config.batch_limit
        );

        while !self.shutdown.load(Ordering::Relaxed) {
            timer.tick().await;

            if self.shutdown.load(Ordering::Relaxed) {
                break;
            }

            match self.run_once(Utc::now()).await {
                Ok(summary) => {
                    if summary.checked > 0 {
                        tracing::info!(
                            "Pass complete: sent {}/{}, failed {}",
                            summary.sent,
                            summary.checked,
                            summary.failed
                        );
                    }
                }
                Err(e) => {
                    tracing::error!("Scheduler pass failed: {}", e);
                }
            }
        }

        tracing::info!("Delivery scheduler stopped");
    }

    /// Execute one pass over the capsules due at `now`.
    ///
    /// Fetches a bounded batch and attempts each capsule sequentially.
    /// Per-capsule failures are absorbed into the summary; only a failure
    /// to fetch the batch itself aborts the pass.
    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<PassSummary> {
        let due = self
            .store
            .find_due_batch(now, self.config.batch_limit)
            .await?;

        if due.is_empty() {
            return Ok(PassSummary::default());
        }

        tracing::info!("Processing {} due capsule(s)", due.len());

        let mut summary = PassSummary {
            checked: due.len(),
            ..PassSummary::default()
        };
        let mut errors = Vec::new();

        for capsule in due {
            let capsule_id = capsule.id.clone();
            let destination = capsule.receiver_email.clone();

            match self.engine.attempt(capsule, now).await {
                Ok(attempt) => match attempt.outcome {
                    AttemptOutcome::Sent => summary.sent += 1,
                    AttemptOutcome::Retrying | AttemptOutcome::Exhausted => {
                        summary.failed += 1;
                        errors.push(AttemptError {
                            capsule_id,
                            destination,
                            error: attempt.error.unwrap_or_default(),
                        });
                    }
                    AttemptOutcome::Skipped => {}
                },
                Err(e) => {
                    // Store-level failure for this capsule; its state for
                    // this pass is lost and it stays eligible next pass
                    tracing::error!("Capsule {} attempt not persisted: {}", capsule_id, e);
                    summary.failed += 1;
                    errors.push(AttemptError {
                        capsule_id,
                        destination,
                        error: e.to_string(),
                    });
                }
            }
        }

        if !errors.is_empty() {
            summary.errors = Some(errors);
        }
        Ok(summary)
    }
}
