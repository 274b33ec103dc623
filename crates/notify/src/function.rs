//! HTTP email function invoker.
//!
//! Delivers escalation emails by POSTing the [`EmailRequest`] payload as
//! JSON to a hosted email-sending function (serverless endpoint). The
//! function owns the actual SMTP/provider plumbing; this side only cares
//! about a 2xx response.

use crate::traits::{EmailRequest, EmailSender, NotifyError};

/// Invokes a hosted email function over HTTP.
#[derive(Debug)]
pub struct FunctionEmailSender {
    /// Function endpoint URL.
    url: String,
    /// Optional bearer token attached as `Authorization`.
    api_key: Option<String>,
    /// Shared HTTP client (connection pooling).
    client: reqwest::Client,
}

impl FunctionEmailSender {
    /// Create a new function invoker.
    ///
    /// Fails if `url` is empty; the key is optional (functions behind a
    /// gateway may not need one).
    pub fn new(url: String, api_key: Option<String>) -> Result<Self, NotifyError> {
        if url.trim().is_empty() {
            return Err(NotifyError::Config(
                "email function URL must not be empty".to_string(),
            ));
        }
        Ok(Self {
            url,
            api_key,
            client: reqwest::Client::new(),
        })
    }
}

#[async_trait::async_trait]
impl EmailSender for FunctionEmailSender {
    /// POST the email payload to the configured function URL.
    async fn send(&self, request: &EmailRequest) -> Result<(), NotifyError> {
        let mut req = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(request);

        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(
                url = %self.url,
                %status,
                body = %body_text,
                "email function returned non-2xx status"
            );
            return Err(NotifyError::Config(format!(
                "email function returned {status}: {body_text}"
            )));
        }

        tracing::debug!(
            url = %self.url,
            recipient = %request.email_data.recipient_email,
            "escalation email handed to function"
        );

        Ok(())
    }

    fn channel_name(&self) -> &str {
        "function"
    }
}
