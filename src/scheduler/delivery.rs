//! Delivery attempt engine
//!
//! Drives one due capsule through a single delivery attempt and computes
//! the resulting state transition:
//!
//! - success: `pending -> sent`
//! - failure below the limit: `pending -> pending` (retried on a later pass)
//! - failure at the limit: `pending -> failed` (terminal)
//!
//! Exactly one `save` persists the outcome. The cumulative failure counter
//! is never reset, including on eventual success.

use crate::capsule::{Capsule, CapsuleStatus};
use crate::notify::Notifier;
use crate::store::CapsuleStore;
use crate::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// What a single delivery attempt did to a capsule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Delivered; the capsule is terminally `sent`
    Sent,
    /// Delivery failed; the capsule stays `pending` for a later pass
    Retrying,
    /// Delivery failed at the failure limit; the capsule is terminally `failed`
    Exhausted,
    /// Another pass claimed the capsule first; nothing was attempted
    Skipped,
}

/// Result of one attempt
#[derive(Debug, Clone)]
pub struct Attempt {
    /// What happened
    pub outcome: AttemptOutcome,
    /// Failure description when the outcome is a failure
    pub error: Option<String>,
}

/// Delivery attempt engine
pub struct DeliveryEngine {
    store: Arc<dyn CapsuleStore>,
    notifier: Arc<dyn Notifier>,
    failure_limit: u32,
}

impl DeliveryEngine {
    /// Create a new engine
    pub fn new(
        store: Arc<dyn CapsuleStore>,
        notifier: Arc<dyn Notifier>,
        failure_limit: u32,
    ) -> Self {
        Self {
            store,
            notifier,
            failure_limit,
        }
    }

    /// Attempt delivery of one due capsule.
    ///
    /// The capsule is claimed before the notifier is invoked, so at most
    /// one concurrent pass attempts delivery per capsule. Errors from the
    /// store (claim or save) propagate to the caller; the capsule's state
    /// for this pass is then considered lost and it stays eligible for the
    /// next pass.
    pub async fn attempt(&self, mut capsule: Capsule, now: DateTime<Utc>) -> Result<Attempt> {
        if !self.store.claim(&capsule).await? {
            tracing::debug!("Capsule {} already claimed, skipping", capsule.id);
            return Ok(Attempt {
                outcome: AttemptOutcome::Skipped,
                error: None,
            });
        }

        let attempt = match self.notifier.send(&capsule).await {
            Ok(()) => {
                capsule.status = CapsuleStatus::Sent;
                capsule.sent_at = Some(now);
                capsule.last_error = None;
                // failure_count stays: lifetime counter
                Attempt {
                    outcome: AttemptOutcome::Sent,
                    error: None,
                }
            }
            Err(e) => {
                let description = e.to_string();
                tracing::warn!("Capsule {} delivery failed: {}", capsule.id, description);

                capsule.last_error = Some(description.clone());
                capsule.last_error_at = Some(now);
                capsule.failure_count += 1;

                let outcome = if capsule.can_retry(self.failure_limit) {
                    AttemptOutcome::Retrying
                } else {
                    capsule.status = CapsuleStatus::Failed;
                    tracing::error!(
                        "Capsule {} permanently failed after {} attempts",
                        capsule.id,
                        capsule.failure_count
                    );
                    AttemptOutcome::Exhausted
                };
                Attempt {
                    outcome,
                    error: Some(description),
                }
            }
        };

        if let Err(save_err) = self.store.save(&capsule).await {
            tracing::error!(
                "Failed to persist capsule {} after attempt: {}",
                capsule.id,
                save_err
            );
            // Put the claim back so the next pass re-attempts it
            if let Err(release_err) = self.store.release(&capsule).await {
                tracing::error!("Failed to release capsule {}: {}", capsule.id, release_err);
            }
            return Err(save_err);
        }

        Ok(attempt)
    }
}
