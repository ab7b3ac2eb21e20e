//! Capsule type definitions
//!
//! A capsule is a single scheduled message: one recipient, one unlock time,
//! and the delivery state the scheduler maintains for it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod builder;
pub mod credential;

pub use builder::CapsuleBuilder;

/// Capsule delivery status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapsuleStatus {
    /// Waiting for its unlock time, or retrying after a failed attempt
    Pending,
    /// Delivered successfully
    Sent,
    /// Permanently failed after exhausting the failure limit
    Failed,
}

impl Default for CapsuleStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl std::fmt::Display for CapsuleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CapsuleStatus::Pending => write!(f, "pending"),
            CapsuleStatus::Sent => write!(f, "sent"),
            CapsuleStatus::Failed => write!(f, "failed"),
        }
    }
}

impl CapsuleStatus {
    /// Whether no further transition can leave this status
    pub fn is_terminal(&self) -> bool {
        matches!(self, CapsuleStatus::Sent | CapsuleStatus::Failed)
    }
}

/// Capsule record
///
/// Content fields (`sender_name`, `receiver_email`, `message`, `unlock_at`,
/// `category`, `credential_digest`) are fixed at creation. The remaining
/// fields are mutated exclusively by the delivery attempt engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capsule {
    /// Capsule ID (UUID), assigned at creation
    pub id: String,
    /// Display name of the author
    pub sender_name: String,
    /// Recipient mailbox address
    pub receiver_email: String,
    /// Message body
    pub message: String,
    /// Earliest instant delivery may occur
    pub unlock_at: DateTime<Utc>,
    /// Optional classification tag
    pub category: Option<String>,
    /// Salted digest of the optional access password, never the password
    pub credential_digest: Option<String>,
    /// Delivery status
    pub status: CapsuleStatus,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Time of successful delivery, fixed once set
    pub sent_at: Option<DateTime<Utc>>,
    /// Last failure description, cleared on success
    pub last_error: Option<String>,
    /// Time of the last failed attempt
    pub last_error_at: Option<DateTime<Utc>>,
    /// Failed delivery attempts since creation; cumulative, never reset
    pub failure_count: u32,
}

impl Capsule {
    /// Create a new capsule builder
    #[must_use]
    pub fn builder() -> CapsuleBuilder {
        CapsuleBuilder::new()
    }

    /// Whether the capsule is eligible for a delivery attempt at `now`
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == CapsuleStatus::Pending && self.unlock_at <= now
    }

    /// Whether another delivery attempt is allowed under `failure_limit`
    pub fn can_retry(&self, failure_limit: u32) -> bool {
        self.failure_count < failure_limit
    }

    /// Get capsule description for logging
    pub fn description(&self) -> String {
        format!(
            "Capsule[id={}, to={}, unlock_at={}, status={}]",
            self.id, self.receiver_email, self.unlock_at, self.status
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn capsule_at(unlock_at: DateTime<Utc>) -> Capsule {
        Capsule::builder()
            .sender_name("Past Me")
            .receiver_email("future@example.com")
            .message("hello from the past")
            .unlock_at(unlock_at)
            .build()
            .unwrap()
    }

    #[test]
    fn test_status_display() {
        assert_eq!(CapsuleStatus::Pending.to_string(), "pending");
        assert_eq!(CapsuleStatus::Sent.to_string(), "sent");
        assert_eq!(CapsuleStatus::Failed.to_string(), "failed");
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!CapsuleStatus::Pending.is_terminal());
        assert!(CapsuleStatus::Sent.is_terminal());
        assert!(CapsuleStatus::Failed.is_terminal());
    }

    #[test]
    fn test_due_only_when_unlocked_and_pending() {
        let now = Utc::now();

        let locked = capsule_at(now + Duration::days(1));
        assert!(!locked.is_due(now));

        let mut due = capsule_at(now - Duration::days(1));
        assert!(due.is_due(now));

        due.status = CapsuleStatus::Sent;
        assert!(!due.is_due(now));
    }

    #[test]
    fn test_can_retry_below_limit() {
        let mut capsule = capsule_at(Utc::now());
        assert!(capsule.can_retry(5));

        capsule.failure_count = 4;
        assert!(capsule.can_retry(5));

        capsule.failure_count = 5;
        assert!(!capsule.can_retry(5));
    }

    #[test]
    fn test_wire_field_names() {
        let capsule = capsule_at(Utc::now());
        let value = serde_json::to_value(&capsule).unwrap();

        assert!(value.get("senderName").is_some());
        assert!(value.get("receiverEmail").is_some());
        assert!(value.get("unlockAt").is_some());
        assert!(value.get("failureCount").is_some());
        assert_eq!(value["status"], "pending");
    }
}
