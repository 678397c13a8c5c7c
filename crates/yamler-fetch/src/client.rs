use std::time::Duration;

use tracing::{debug, info};
use yamler_core::{FetchConfig, YamlerError};

use crate::url::{validate, UrlNormalizer};

/// HTTP client that downloads YAML documents as text.
///
/// # Examples
///
/// ```no_run
/// use yamler_core::FetchConfig;
/// use yamler_fetch::FetchClient;
///
/// # async fn example() -> Result<(), yamler_core::YamlerError> {
/// let client = FetchClient::new(&FetchConfig::default())?;
/// let text = client
///     .fetch_text("https://github.com/cert-manager/cert-manager/blob/master/deploy/charts/cert-manager/values.yaml")
///     .await?;
/// println!("{} bytes", text.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FetchClient {
    http: reqwest::Client,
    normalizer: UrlNormalizer,
}

impl FetchClient {
    /// Build a client from the `[fetch]` settings.
    ///
    /// # Errors
    ///
    /// Returns [`YamlerError::Fetch`] if the HTTP client cannot be built.
    pub fn new(config: &FetchConfig) -> Result<Self, YamlerError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.as_str());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| YamlerError::Fetch(format!("could not create HTTP client: {e}")))?;

        Ok(Self {
            http,
            normalizer: UrlNormalizer::from_config(config),
        })
    }

    /// Validate and normalize `url`, then GET it and return the body.
    ///
    /// Nothing is sent over the network when validation fails.
    ///
    /// # Errors
    ///
    /// Returns [`YamlerError::Input`] for an empty or scheme-less URL, and
    /// [`YamlerError::Fetch`] on network failure or a non-success status.
    pub async fn fetch_text(&self, url: &str) -> Result<String, YamlerError> {
        let url = validate(url)?;
        let target = self.normalizer.normalize(url);
        if target != url {
            debug!(from = url, to = %target, "rewrote repository URL to raw content");
        }

        let response = self
            .http
            .get(&target)
            .send()
            .await
            .map_err(|e| YamlerError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body = body.trim();
            return Err(YamlerError::Fetch(if body.is_empty() {
                format!("HTTP {status}")
            } else {
                format!("HTTP {status}: {body}")
            }));
        }

        let text = response
            .text()
            .await
            .map_err(|e| YamlerError::Fetch(format!("could not read response body: {e}")))?;
        info!(url = %target, bytes = text.len(), "fetched document");
        Ok(text)
    }
}
