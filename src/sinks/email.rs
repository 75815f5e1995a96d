use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::templates;
use super::{Sink, SinkError};
use crate::config::SmtpConfig;
use crate::submission::record::Envelope;

/// Emails the operator mailbox about each submission.
///
/// The SMTP transport is pooled and shared by every request.
pub struct EmailSink {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
    timeout: Duration,
}

impl EmailSink {
    pub fn new(config: &SmtpConfig, notify_to: &str, timeout: Duration) -> Result<Self, String> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| format!("Invalid SMTP from address: {e}"))?;
        let to: Mailbox = notify_to
            .parse()
            .map_err(|e| format!("Invalid notification address: {e}"))?;

        Ok(Self {
            transport: build_smtp_transport(config, timeout)?,
            from,
            to,
            timeout,
        })
    }

    /// Operator notification for one record, replying to the submitter.
    fn build_message(&self, envelope: &Envelope) -> Result<Message, SinkError> {
        let notification = templates::render(&envelope.record)
            .map_err(|e| SinkError::Build(format!("failed to render email: {e}")))?;

        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(notification.subject);

        match envelope.record.email().parse::<Mailbox>() {
            Ok(reply_to) => builder = builder.reply_to(reply_to),
            Err(e) => tracing::debug!(
                id = %envelope.record.id(),
                "Submitter address not usable as reply-to: {e}"
            ),
        }

        builder
            .header(ContentType::TEXT_HTML)
            .body(notification.html)
            .map_err(|e| SinkError::Build(format!("failed to build email: {e}")))
    }
}

#[async_trait]
impl Sink for EmailSink {
    fn name(&self) -> &str {
        "email"
    }

    async fn deliver(&self, envelope: &Envelope) -> Result<String, SinkError> {
        let message = self.build_message(envelope)?;

        match tokio::time::timeout(self.timeout, self.transport.send(message)).await {
            Ok(Ok(resp)) => Ok(format!("sent (SMTP {})", resp.code())),
            Ok(Err(e)) => Err(SinkError::Transport(format!("failed to send email: {e}"))),
            Err(_) => Err(SinkError::Timeout(format!(
                "no SMTP answer within {}s",
                self.timeout.as_secs()
            ))),
        }
    }
}

pub fn build_smtp_transport(
    config: &SmtpConfig,
    timeout: Duration,
) -> Result<AsyncSmtpTransport<Tokio1Executor>, String> {
    let creds = Credentials::new(config.user.clone(), config.pass.clone());

    let builder = if config.secure {
        AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(|e| format!("SMTP relay error: {e}"))?
    } else {
        AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| format!("SMTP starttls error: {e}"))?
    };

    Ok(builder
        .port(config.port)
        .credentials(creds)
        .timeout(Some(timeout))
        .build())
}
