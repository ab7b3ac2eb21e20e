//! SMTP mail backend
//!
//! Delivers capsules through an SMTP relay using `lettre`. The transport
//! is built once from configuration at startup and injected wherever a
//! [`Notifier`] is needed.

use super::{render_body, render_subject, validate_address, Notifier};
use crate::capsule::Capsule;
use crate::config::MailConfig;
use crate::{Error, Result};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// SMTP mail backend
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    /// Build the transport from configuration.
    ///
    /// Uses STARTTLS against the configured relay, with credentials when
    /// both username and password are present.
    pub fn new(config: &MailConfig) -> Result<Self> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| Error::Config(format!("invalid from mailbox '{}': {e}", config.from)))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| Error::Config(format!("smtp relay {}: {e}", config.smtp_host)))?
            .port(config.smtp_port);

        if let (Some(user), Some(pass)) = (&config.smtp_user, &config.smtp_pass) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, capsule: &Capsule) -> Result<()> {
        validate_address(&capsule.receiver_email)?;

        let to: Mailbox = capsule
            .receiver_email
            .parse()
            .map_err(|_| Error::InvalidAddress(capsule.receiver_email.clone()))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(render_subject(capsule))
            .header(ContentType::TEXT_PLAIN)
            .body(render_body(capsule))
            .map_err(|e| Error::Transport(format!("message build: {e}")))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        tracing::debug!("Email sent to {}", capsule.receiver_email);
        Ok(())
    }
}
