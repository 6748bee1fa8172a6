use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::{AppError, RequestContext};

/// Thin wrapper over `reqwest` carrying the Riot API key, base URL and timeout.
pub struct RiotClient {
    http: reqwest::Client,
    base_url: String,
    /// Riot API Key
    key: String,
}

impl RiotClient {
    pub fn new(
        base_url: impl Into<String>,
        key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            key: key.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::new(
            config.riot_api_url.clone(),
            config.riot_api_key.clone(),
            config.request_timeout,
        )
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Shared GET logic: key header, status check, then a single typed parse of the body.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        context: RequestContext,
    ) -> Result<T, AppError> {
        tracing::trace!("[RIOT::CLIENT] GET {} ({})", url, context);

        let res = self
            .http
            .get(url)
            .header("X-Riot-Token", &self.key)
            .send()
            .await
            .map_err(|source| AppError::Transport {
                context: context.clone(),
                source,
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|source| AppError::Transport {
            context: context.clone(),
            source,
        })?;

        if status != StatusCode::OK {
            return Err(AppError::Api {
                context,
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| AppError::MalformedResponse {
            context,
            reason: e.to_string(),
        })
    }
}
