//! Console mail backend
//!
//! Logs the delivery intent instead of contacting a transport. The default
//! backend in development and tests; it still enforces the address gate so
//! both backends fail the same way on malformed recipients.

use super::{render_subject, validate_address, Notifier};
use crate::capsule::Capsule;
use crate::Result;
use async_trait::async_trait;

/// Log-only mail backend
#[derive(Debug, Default, Clone)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    /// Create a new console backend
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn send(&self, capsule: &Capsule) -> Result<()> {
        validate_address(&capsule.receiver_email)?;
        tracing::info!(
            "[console] email to {}: {}",
            capsule.receiver_email,
            render_subject(capsule)
        );
        Ok(())
    }
}
