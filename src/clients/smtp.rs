use std::time::Duration;

use async_trait::async_trait;
use lettre::{
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Attachment as MailAttachment, Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials as SmtpCredentials},
};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    error::{TransportError, TransportErrorKind},
    models::{
        credentials::Credentials,
        template::{RenderedMessage, Sender},
    },
};

#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(
        &self,
        credentials: &Credentials,
        sender: &Sender,
        recipient: &str,
        message: &RenderedMessage,
    ) -> Result<(), TransportError>;

    async fn verify(&self, credentials: &Credentials) -> Result<(), TransportError>;
}

#[derive(Debug, Clone)]
pub struct SmtpMailer {
    host: String,
    port: u16,
    timeout: Duration,
}

impl SmtpMailer {
    pub fn new(config: &Config) -> Self {
        info!(host = %config.smtp_host, port = config.smtp_port, "SMTP mailer initialized");

        Self {
            host: config.smtp_host.clone(),
            port: config.smtp_port,
            timeout: Duration::from_secs(config.smtp_timeout_seconds),
        }
    }

    fn session(
        &self,
        credentials: &Credentials,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>, TransportError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)
            .map_err(classify_smtp_error)?
            .port(self.port)
            .credentials(SmtpCredentials::new(
                credentials.account().to_string(),
                credentials.secret().to_string(),
            ))
            .timeout(Some(self.timeout))
            .build();

        Ok(transport)
    }

    pub fn build_message(
        credentials: &Credentials,
        sender: &Sender,
        recipient: &str,
        rendered: &RenderedMessage,
    ) -> Result<Message, TransportError> {
        let address: Address = credentials.account().parse().map_err(|e| {
            TransportError::new(
                TransportErrorKind::AuthFailed,
                format!("invalid sender address: {}", e),
            )
        })?;
        let display_name = Some(sender.name.clone()).filter(|name| !name.trim().is_empty());
        let from = Mailbox::new(display_name, address);

        let to: Mailbox = recipient.parse().map_err(|e| {
            TransportError::new(
                TransportErrorKind::Rejected,
                format!("invalid recipient address: {}", e),
            )
        })?;

        let mut multipart = MultiPart::mixed().singlepart(SinglePart::plain(rendered.body.clone()));

        if let Some(attachment) = &rendered.attachment {
            let content_type = ContentType::parse(&attachment.content_type)
                .or_else(|_| ContentType::parse("application/octet-stream"))
                .map_err(|e| TransportError::new(TransportErrorKind::Unknown, e.to_string()))?;

            multipart = multipart.singlepart(
                MailAttachment::new(attachment.filename.clone())
                    .body(attachment.data.to_vec(), content_type),
            );
        }

        Message::builder()
            .from(from)
            .to(to)
            .subject(rendered.subject.as_str())
            .multipart(multipart)
            .map_err(|e| TransportError::new(TransportErrorKind::Unknown, e.to_string()))
    }

    fn timed_out(&self) -> TransportError {
        TransportError::new(
            TransportErrorKind::ConnectionFailed,
            format!("timed out after {}s", self.timeout.as_secs()),
        )
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(
        &self,
        credentials: &Credentials,
        sender: &Sender,
        recipient: &str,
        rendered: &RenderedMessage,
    ) -> Result<(), TransportError> {
        let message = Self::build_message(credentials, sender, recipient, rendered)?;
        let mailer = self.session(credentials)?;

        debug!(
            recipient,
            has_attachment = rendered.attachment.is_some(),
            "Submitting message"
        );

        match timeout(self.timeout, mailer.send(message)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => {
                let error = classify_smtp_error(e);
                warn!(recipient, kind = %error.kind, error = %error.message, "SMTP send failed");
                Err(error)
            }
            Err(_) => Err(self.timed_out()),
        }
    }

    async fn verify(&self, credentials: &Credentials) -> Result<(), TransportError> {
        let mailer = self.session(credentials)?;

        match timeout(self.timeout, mailer.test_connection()).await {
            Ok(Ok(true)) => Ok(()),
            Ok(Ok(false)) => Err(TransportError::new(
                TransportErrorKind::ConnectionFailed,
                "server did not accept the session",
            )),
            Ok(Err(e)) => Err(classify_smtp_error(e)),
            Err(_) => Err(self.timed_out()),
        }
    }
}

pub fn classify_smtp_error(error: SmtpError) -> TransportError {
    let message = error.to_string();

    if error.is_timeout() {
        return TransportError::new(TransportErrorKind::ConnectionFailed, message);
    }

    let code = error
        .status()
        .and_then(|code| code.to_string().parse::<u16>().ok());

    TransportError::new(TransportErrorKind::classify(code, &message), message)
}
