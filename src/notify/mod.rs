//! Mail delivery backends
//!
//! A [`Notifier`] transmits one capsule to its recipient. Two backends
//! exist: a console backend that only logs the delivery intent, and an
//! SMTP backend. The choice is made once at startup from configuration and
//! carries no state the scheduler depends on.
//!
//! Every backend validates the recipient address shape before contacting
//! any transport; a malformed address fails immediately.

use crate::capsule::Capsule;
use crate::config::{MailConfig, MailDriver};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::Arc;

pub mod console;
pub mod smtp;

pub use console::ConsoleNotifier;
pub use smtp::SmtpNotifier;

/// Message transmitter
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one capsule to its recipient.
    ///
    /// Failures come back as [`Error::InvalidAddress`] or
    /// [`Error::Transport`]; the attempt engine recovers both.
    async fn send(&self, capsule: &Capsule) -> Result<()>;
}

/// Construct the configured mail backend
pub fn build_notifier(config: &MailConfig) -> Result<Arc<dyn Notifier>> {
    match config.driver {
        MailDriver::Console => {
            tracing::info!("Using console mail backend");
            Ok(Arc::new(ConsoleNotifier::new()))
        }
        MailDriver::Smtp => {
            let notifier = SmtpNotifier::new(config)?;
            tracing::info!("SMTP mail backend initialized (relay: {})", config.smtp_host);
            Ok(Arc::new(notifier))
        }
    }
}

/// Check the basic `local@domain.tld` shape of a recipient address.
///
/// This is a pre-flight gate, not full RFC validation: one `@`, a
/// non-empty local part, a dotted domain, no whitespace.
pub fn validate_address(address: &str) -> Result<()> {
    let malformed = || Error::InvalidAddress(address.to_string());

    if address.chars().any(char::is_whitespace) {
        return Err(malformed());
    }
    let (local, domain) = address.split_once('@').ok_or_else(malformed)?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(malformed());
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(malformed());
    }
    Ok(())
}

/// Subject line for a capsule delivery
pub(crate) fn render_subject(capsule: &Capsule) -> String {
    format!("Time capsule message from {}", capsule.sender_name)
}

/// Plain-text body for a capsule delivery
pub(crate) fn render_body(capsule: &Capsule) -> String {
    format!(
        "Hello!\n\n\
         You have received a time capsule message from {sender}.\n\n\
         Written on: {written}\n\
         Delivered on: {delivered}\n\n\
         --- MESSAGE ---\n\n\
         {message}\n\n\
         --- END ---\n\n\
         This message was scheduled to be delivered on {delivered}.\n\n\
         Best regards,\nPostdate",
        sender = capsule.sender_name,
        written = capsule.created_at.format("%a %b %e %Y"),
        delivered = capsule.unlock_at.format("%a %b %e %Y"),
        message = capsule.message,
    )
}
