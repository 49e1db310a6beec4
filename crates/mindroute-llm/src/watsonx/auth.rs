// IBM Cloud IAM: exchanges an API key for a short-lived bearer token

use crate::error::{LlmError, Result};
use serde::Deserialize;
use std::fmt;
use tokio::sync::Mutex;

const IAM_GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";

/// Tokens are refreshed this many seconds before they expire
const REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: i64,
}

impl CachedToken {
    fn is_fresh(&self, now: i64) -> bool {
        self.expires_at - REFRESH_MARGIN_SECS > now
    }
}

#[derive(Debug, Deserialize)]
struct IamTokenResponse {
    access_token: String,
    /// Unix timestamp (seconds)
    expiration: i64,
}

/// Caches one IAM token and refreshes it on demand.
///
/// Concurrent callers serialize on the refresh, so only one token request is
/// in flight at a time.
pub struct IamTokenProvider {
    http_client: reqwest::Client,
    iam_url: String,
    api_key: String,
    cached: Mutex<Option<CachedToken>>,
}

impl IamTokenProvider {
    pub fn new(
        http_client: reqwest::Client,
        iam_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            iam_url: iam_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            cached: Mutex::new(None),
        }
    }

    /// Current bearer token, requesting a new one if the cache is empty or stale
    pub async fn token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        let now = chrono::Utc::now().timestamp();

        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(now)) {
            return Ok(token.access_token.clone());
        }

        tracing::debug!("Requesting IAM token from {}", self.iam_url);
        let fresh = self.request_token().await?;
        let access_token = fresh.access_token.clone();
        *cached = Some(fresh);

        Ok(access_token)
    }

    async fn request_token(&self) -> Result<CachedToken> {
        let response = self
            .http_client
            .post(format!("{}/identity/token", self.iam_url))
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[("grant_type", IAM_GRANT_TYPE), ("apikey", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::Auth(format!(
                "IAM token request failed ({}): {}",
                status, error_text
            )));
        }

        let body = response.text().await?;
        let token: IamTokenResponse = serde_json::from_str(&body)?;

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at: token.expiration,
        })
    }
}

impl fmt::Debug for IamTokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IamTokenProvider")
            .field("iam_url", &self.iam_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_freshness_margin() {
        let token = CachedToken {
            access_token: "t".to_string(),
            expires_at: 1_000,
        };
        assert!(token.is_fresh(900));
        assert!(!token.is_fresh(940));
        assert!(!token.is_fresh(1_001));
    }
}
