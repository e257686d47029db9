use std::collections::HashMap;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::AsyncSmtpTransport;
use lettre::AsyncTransport;
use lettre::Message;
use lettre::Tokio1Executor;

use super::template::TemplateRenderer;
use crate::account::errors::EmailSendError;
use crate::account::ports::EmailSender;
use crate::config::SmtpConfig;

/// Email sender delivering rendered HTML over SMTP.
pub struct SmtpEmailSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    renderer: TemplateRenderer,
}

impl SmtpEmailSender {
    pub fn new(config: &SmtpConfig) -> Result<Self, EmailSendError> {
        let from: Mailbox = config
            .from_address
            .parse()
            .map_err(|e| EmailSendError::InvalidAddress(format!("{}: {}", config.from_address, e)))?;

        let builder = if config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| EmailSendError::Transport(e.to_string()))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };

        let mut builder = builder.port(config.port);
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        tracing::info!(
            host = %config.host,
            port = config.port,
            starttls = config.starttls,
            "SMTP transport configured"
        );

        Ok(Self {
            transport: builder.build(),
            from,
            renderer: TemplateRenderer::new(),
        })
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send(
        &self,
        to: &str,
        template_name: &str,
        subject: &str,
        variables: &HashMap<String, String>,
    ) -> Result<(), EmailSendError> {
        let recipient: Mailbox = to
            .parse()
            .map_err(|e| EmailSendError::InvalidAddress(format!("{}: {}", to, e)))?;
        let html = self.renderer.render(template_name, variables)?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(recipient)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html)
            .map_err(|e| EmailSendError::MessageBuild(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| EmailSendError::Transport(e.to_string()))?;

        tracing::info!(to = %to, subject = %subject, "Email sent");
        Ok(())
    }
}
