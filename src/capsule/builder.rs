//! Capsule builder
//!
//! Provides fluent API for building capsules with creation-time validation.

use super::{credential, Capsule, CapsuleStatus};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Capsule builder
///
/// # Examples
///
/// ```rust
/// use postdate::capsule::Capsule;
/// use chrono::{Duration, Utc};
///
/// # fn example() -> postdate::Result<()> {
/// let capsule = Capsule::builder()
///     .sender_name("Past Me")
///     .receiver_email("Future@Example.com")
///     .message("Open on your birthday.")
///     .unlock_at(Utc::now() + Duration::days(365))
///     .category("birthday")
///     .password("hunter2")
///     .build()?;
///
/// assert_eq!(capsule.receiver_email, "future@example.com");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct CapsuleBuilder {
    sender_name: String,
    receiver_email: String,
    message: String,
    unlock_at: Option<DateTime<Utc>>,
    category: Option<String>,
    password: Option<String>,
}

impl CapsuleBuilder {
    /// Create a new capsule builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sender's display name
    #[must_use]
    pub fn sender_name(mut self, name: impl Into<String>) -> Self {
        self.sender_name = name.into();
        self
    }

    /// Set the recipient address
    #[must_use]
    pub fn receiver_email(mut self, email: impl Into<String>) -> Self {
        self.receiver_email = email.into();
        self
    }

    /// Set the message body
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Set the unlock time
    #[must_use]
    pub fn unlock_at(mut self, unlock_at: DateTime<Utc>) -> Self {
        self.unlock_at = Some(unlock_at);
        self
    }

    /// Set the optional classification tag
    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the optional access password.
    ///
    /// The password is digested at build time; the capsule only ever
    /// carries the salted digest.
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Validate the inputs and build the capsule
    pub fn build(self) -> Result<Capsule> {
        let sender_name = self.sender_name.trim().to_string();
        if sender_name.is_empty() {
            return Err(Error::Validation("sender name cannot be empty".into()));
        }

        // Addresses are stored lowercase; the notifier checks the shape.
        let receiver_email = self.receiver_email.trim().to_lowercase();
        if receiver_email.is_empty() {
            return Err(Error::Validation("receiver email cannot be empty".into()));
        }

        if self.message.is_empty() {
            return Err(Error::Validation("message cannot be empty".into()));
        }

        let unlock_at = self
            .unlock_at
            .ok_or_else(|| Error::Validation("unlock time is required".into()))?;

        let credential_digest = self
            .password
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(credential::digest);

        Ok(Capsule {
            id: Uuid::new_v4().to_string(),
            sender_name,
            receiver_email,
            message: self.message,
            unlock_at,
            category: self.category,
            credential_digest,
            status: CapsuleStatus::Pending,
            created_at: Utc::now(),
            sent_at: None,
            last_error: None,
            last_error_at: None,
            failure_count: 0,
        })
    }
}
