//! SMTP email sender via `lettre` with TLS support.
//!
//! Delivers escalation emails directly through an SMTP server. Supports
//! STARTTLS and implicit TLS connections. The body is rendered through the
//! minijinja [`TemplateRenderer`].

use lettre::{
    message::Mailbox, transport::smtp::authentication::Credentials, AsyncSmtpTransport,
    AsyncTransport, Message, Tokio1Executor,
};

use crate::templating::{TemplateRenderer, DEFAULT_BODY_TEMPLATE};
use crate::traits::{EmailRequest, EmailSender, NotifyError};

/// Sends escalation emails via SMTP.
#[derive(Debug)]
pub struct SmtpEmailSender {
    /// Async SMTP transport for sending emails.
    transport: AsyncSmtpTransport<Tokio1Executor>,
    /// Sender mailbox.
    from: Mailbox,
    /// Body template rendered per email.
    body_template: String,
    renderer: TemplateRenderer,
}

impl SmtpEmailSender {
    /// Build an `SmtpEmailSender` from SMTP configuration.
    ///
    /// - `smtp_host`: SMTP server hostname.
    /// - `smtp_port`: Optional port (defaults to 587).
    /// - `tls`: Whether to use STARTTLS; port 465 always uses implicit TLS.
    /// - `from`: Sender address (e.g. `"Alerts <alerts@example.com>"`).
    /// - `body_template`: Optional minijinja body override; validated here.
    ///
    /// SMTP credentials are resolved from the `SMTP_USERNAME` and
    /// `SMTP_PASSWORD` environment variables. If both are set they are
    /// passed to the transport; otherwise the connection is unauthenticated.
    pub fn from_config(
        smtp_host: &str,
        smtp_port: Option<u16>,
        tls: Option<bool>,
        from: &str,
        body_template: Option<String>,
    ) -> Result<Self, NotifyError> {
        let from_mailbox: Mailbox = from
            .parse()
            .map_err(|e: lettre::address::AddressError| NotifyError::Config(e.to_string()))?;

        let port = smtp_port.unwrap_or(587);
        let use_tls = tls.unwrap_or(true);

        // Port 465 uses implicit TLS; everything else uses STARTTLS when TLS is enabled.
        let mut builder = if port == 465 || use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(smtp_host)
                .map_err(|e| NotifyError::Config(e.to_string()))?
                .port(port)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(smtp_host).port(port)
        };

        if let (Ok(username), Ok(password)) =
            (std::env::var("SMTP_USERNAME"), std::env::var("SMTP_PASSWORD"))
        {
            builder = builder.credentials(Credentials::new(username, password));
        }

        let renderer = TemplateRenderer::new();
        let body_template = match body_template {
            Some(tmpl) => {
                renderer
                    .validate(&tmpl)
                    .map_err(|e| NotifyError::Config(format!("invalid body template: {e}")))?;
                tmpl
            }
            None => DEFAULT_BODY_TEMPLATE.to_string(),
        };

        Ok(Self {
            transport: builder.build(),
            from: from_mailbox,
            body_template,
            renderer,
        })
    }
}

#[async_trait::async_trait]
impl EmailSender for SmtpEmailSender {
    /// Send one escalation email to the recipient in the request.
    async fn send(&self, request: &EmailRequest) -> Result<(), NotifyError> {
        let address = request
            .email_data
            .recipient_email
            .parse()
            .map_err(|e: lettre::address::AddressError| NotifyError::Smtp(e.to_string()))?;
        let to = Mailbox::new(Some(request.email_data.recipient_name.clone()), address);

        let body = self.renderer.render(&self.body_template, request)?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&request.title)
            .body(body)
            .map_err(|e| NotifyError::Smtp(e.to_string()))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| NotifyError::Smtp(e.to_string()))?;

        tracing::info!(
            channel = "smtp",
            recipient = %request.email_data.recipient_email,
            subject = %request.title,
            "escalation email delivered"
        );

        Ok(())
    }

    fn channel_name(&self) -> &str {
        "smtp"
    }
}
