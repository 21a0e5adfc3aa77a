use std::sync::Arc;

use anyhow::{Error, Result};
use tokio::time::{Duration, sleep};
use tracing::{debug, info, warn};

use crate::{
    clients::{
        directory::{ConfiguredRecipients, InMemoryContractors, StaticStatusCatalog},
        email::HttpEmailSender,
        sms::HttpSmsSender,
        template::CatalogRenderer,
    },
    config::Config,
    models::retry::RetryConfig,
    orchestrator::Collaborators,
};

/// Wires the production collaborators from configuration.
pub async fn build_collaborators(config: &Config) -> Result<Collaborators, Error> {
    let contractors = match config.contractors_file.as_deref() {
        Some(path) => InMemoryContractors::from_file(path).await?,
        None => {
            warn!("No contractors file configured, contractor directory is empty");
            InMemoryContractors::default()
        }
    };

    Ok(Collaborators {
        contractors: Arc::new(contractors),
        statuses: Arc::new(StaticStatusCatalog::default()),
        renderer: Arc::new(CatalogRenderer::default()),
        recipients: Arc::new(ConfiguredRecipients::from_config(config)),
        email: Arc::new(HttpEmailSender::new(config)?),
        sms: Arc::new(HttpSmsSender::new(config)?),
    })
}

pub async fn retry_with_backoff<F, Fut, T, E>(config: &RetryConfig, operation: F) -> Result<T, E>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    retry_with_backoff_if(config, |_| true, operation).await
}

/// Like `retry_with_backoff`, but gives up at once on errors `should_retry` rejects.
pub async fn retry_with_backoff_if<F, Fut, T, E, P>(
    config: &RetryConfig,
    should_retry: P,
    operation: F,
) -> Result<T, E>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let mut attempt = 0;
    let mut delay_ms = config.initial_delay_ms;

    loop {
        attempt += 1;

        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    info!(
                        attempt,
                        max_attempts = config.max_attempts,
                        "Retry succeeded"
                    );
                }
                return Ok(result);
            }
            Err(e) => {
                if !should_retry(&e) {
                    warn!(attempt, error = %e, "Permanent failure, not retrying");
                    return Err(e);
                }

                if attempt >= config.max_attempts {
                    warn!(
                        max_attempts = config.max_attempts,
                        error = %e,
                        "Retry failed after exhausting all attempts"
                    );
                    return Err(e);
                }

                debug!(
                    attempt,
                    max_attempts = config.max_attempts,
                    delay_ms,
                    error = %e,
                    "Retry attempt failed, backing off"
                );

                let jitter: f64 = rand::random_range(-0.1..=0.1);

                let jittered_delay = (delay_ms as f64 * (1.0 + jitter)) as u64;

                sleep(Duration::from_millis(jittered_delay)).await;

                delay_ms = std::cmp::min(delay_ms * config.backoff_multiplier, config.max_delay_ms);
            }
        }
    }
}
