//! # Notification Service
//!
//! Sends alert messages to a Slack-style incoming webhook. Delivery is
//! best-effort: transient transport errors are retried by the middleware
//! client, and callers are expected to log-and-discard any terminal failure
//! rather than let it fail the probe pipeline.

pub mod error;

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, Jitter, RetryTransientMiddleware};
use serde_json::json;
use url::Url;

use crate::config::{HttpRetryConfig, JitterSetting};
use error::NotificationError;

/// Builds the webhook client with retry middleware for transient failures.
fn retryable_client(config: &HttpRetryConfig) -> ClientWithMiddleware {
    let policy_builder = match config.jitter {
        JitterSetting::None => ExponentialBackoff::builder().jitter(Jitter::None),
        JitterSetting::Full => ExponentialBackoff::builder().jitter(Jitter::Full),
    };

    let retry_policy = policy_builder
        .base(config.base_for_backoff)
        .retry_bounds(config.initial_backoff_ms, config.max_backoff_secs)
        .build_with_max_retries(config.max_retries);

    ClientBuilder::new(reqwest::Client::new())
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build()
}

/// Dispatches alert messages to the configured webhook.
pub struct NotificationService {
    /// Destination webhook. `None` disables outbound notifications entirely.
    webhook_url: Option<Url>,
    /// HTTP client with retry middleware for webhook delivery.
    client: ClientWithMiddleware,
}

impl NotificationService {
    /// Creates a new `NotificationService`.
    ///
    /// When `webhook_url` is `None` every `notify` call is a logged no-op, so
    /// the rest of the pipeline does not need to special-case an unconfigured
    /// notifier.
    pub fn new(webhook_url: Option<Url>, retry_policy: &HttpRetryConfig) -> Self {
        Self { webhook_url, client: retryable_client(retry_policy) }
    }

    /// Whether a webhook destination is configured.
    pub fn is_configured(&self) -> bool {
        self.webhook_url.is_some()
    }

    /// Sends one alert message.
    pub async fn notify(&self, message: &str) -> Result<(), NotificationError> {
        let Some(url) = &self.webhook_url else {
            tracing::info!(message, "No alert webhook configured, skipping notification.");
            return Ok(());
        };

        let response =
            self.client.post(url.clone()).json(&json!({ "text": message })).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotificationError::NotifyFailed(status.to_string()));
        }

        tracing::info!(message, "Alert notification sent.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service_for(url: Option<Url>) -> NotificationService {
        NotificationService::new(url, &HttpRetryConfig { max_retries: 0, ..Default::default() })
    }

    #[tokio::test]
    async fn notify_skips_when_no_webhook_configured() {
        let service = service_for(None);
        assert!(!service.is_configured());
        service.notify("test message").await.unwrap();
    }

    #[tokio::test]
    async fn notify_posts_text_payload() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/hook")
            .match_body(mockito::Matcher::Json(json!({ "text": "Service api alert" })))
            .with_status(200)
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/hook", server.url())).unwrap();
        let service = service_for(Some(url));
        service.notify("Service api alert").await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn notify_surfaces_rejections() {
        let mut server = mockito::Server::new_async().await;
        server.mock("POST", "/hook").with_status(403).create_async().await;

        let url = Url::parse(&format!("{}/hook", server.url())).unwrap();
        let service = service_for(Some(url));
        let result = service.notify("rejected").await;

        assert!(matches!(result, Err(NotificationError::NotifyFailed(_))));
    }
}
