use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use crate::{
    config::Config,
    errors::SendError,
    models::{
        message::{SmsDelivery, SmsRequest},
        retry::RetryConfig,
    },
    traits::SmsSender,
    utils::retry_with_backoff_if,
};

pub struct HttpSmsSender {
    http_client: Client,
    endpoint: String,
    retry_config: RetryConfig,
}

impl HttpSmsSender {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_seconds))
            .build()
            .map_err(|_| anyhow!("Failed to create HTTP client"))?;

        info!(base_url = %config.messages_service_url, "SMS sender initialized");

        Ok(Self::with_client(
            http_client,
            &config.messages_service_url,
            config.retry_config(),
        ))
    }

    pub fn with_client(http_client: Client, base_url: &str, retry_config: RetryConfig) -> Self {
        Self {
            http_client,
            endpoint: format!("{}/api/v1/messages/sms", base_url.trim_end_matches('/')),
            retry_config,
        }
    }
}

#[async_trait]
impl SmsSender for HttpSmsSender {
    async fn send(&self, request: &SmsRequest) -> Result<SmsDelivery, SendError> {
        debug!(
            client_id = request.client_id,
            status_code = request.status_code,
            event = %request.event,
            "Sending SMS notification"
        );

        let endpoint = self.endpoint.as_str();

        retry_with_backoff_if(&self.retry_config, SendError::is_retryable, || {
            let client = self.http_client.clone();

            async move {
                let response = client
                    .post(endpoint)
                    .json(request)
                    .send()
                    .await
                    .map_err(|e| SendError::Transport(e.to_string()))?;

                let status = response.status();
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(SendError::Rejected {
                        status: status.as_u16(),
                        body,
                    });
                }

                response
                    .json::<SmsDelivery>()
                    .await
                    .map_err(|e| SendError::InvalidResponse(e.to_string()))
            }
        })
        .await
    }
}
