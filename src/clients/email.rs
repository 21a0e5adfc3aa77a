use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    config::Config,
    errors::SendError,
    models::{
        message::{EmailMessage, MessageContext},
        retry::RetryConfig,
    },
    traits::EmailSender,
    utils::retry_with_backoff_if,
};

#[derive(Serialize)]
struct EmailEnvelope<'a> {
    message: &'a EmailMessage,
    context: &'a MessageContext,
}

/// Hands email messages to the messages service over HTTP.
pub struct HttpEmailSender {
    http_client: Client,
    endpoint: String,
    retry_config: RetryConfig,
}

impl HttpEmailSender {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_seconds))
            .build()
            .map_err(|_| anyhow!("Failed to create HTTP client"))?;

        info!(base_url = %config.messages_service_url, "Email sender initialized");

        Ok(Self::with_client(
            http_client,
            &config.messages_service_url,
            config.retry_config(),
        ))
    }

    pub fn with_client(http_client: Client, base_url: &str, retry_config: RetryConfig) -> Self {
        Self {
            http_client,
            endpoint: format!("{}/api/v1/messages/email", base_url.trim_end_matches('/')),
            retry_config,
        }
    }
}

#[async_trait]
impl EmailSender for HttpEmailSender {
    async fn send(
        &self,
        message: &EmailMessage,
        context: &MessageContext,
    ) -> Result<(), SendError> {
        debug!(
            to = %message.to,
            event = %context.event,
            client_id = context.client_id,
            "Sending email message"
        );

        let envelope = EmailEnvelope { message, context };
        let envelope = &envelope;
        let endpoint = self.endpoint.as_str();

        retry_with_backoff_if(&self.retry_config, SendError::is_retryable, || {
            let client = self.http_client.clone();

            async move {
                let response = client
                    .post(endpoint)
                    .json(envelope)
                    .send()
                    .await
                    .map_err(|e| SendError::Transport(e.to_string()))?;

                let status = response.status();
                if status.is_success() {
                    Ok(())
                } else {
                    let body = response.text().await.unwrap_or_default();
                    Err(SendError::Rejected {
                        status: status.as_u16(),
                        body,
                    })
                }
            }
        })
        .await
    }
}
