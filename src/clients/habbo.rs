use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Every failure mode of the lookup collapses into this one error: transport
/// problems, timeouts, non-JSON bodies, and profiles without a motto all read
/// as "unavailable" to the caller. Retry policy belongs to the user, not here.
#[derive(Debug, Error)]
#[error("profile service unavailable: {reason}")]
pub struct ProfileUnavailable {
    pub reason: String,
}

impl ProfileUnavailable {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PublicProfile {
    motto: Option<String>,
}

/// Client for the public Habbo profile API. One bounded-timeout GET per
/// lookup, no internal retries.
#[derive(Clone)]
pub struct HabboClient {
    client: Client,
    base_url: String,
}

impl HabboClient {
    pub fn new(base_url: &str, timeout_seconds: u64) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent("Reino Verification Bot/1.0")
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetches the free-text motto for a profile name.
    pub async fn lookup_motto(&self, handle: &str) -> Result<String, ProfileUnavailable> {
        let url = format!(
            "{}/api/public/users?name={}",
            self.base_url,
            urlencoding::encode(handle)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProfileUnavailable::new(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ProfileUnavailable::new(format!(
                "unexpected status {}",
                response.status()
            )));
        }

        let profile: PublicProfile = response
            .json()
            .await
            .map_err(|e| ProfileUnavailable::new(format!("undecodable profile body: {e}")))?;

        profile
            .motto
            .ok_or_else(|| ProfileUnavailable::new("profile has no motto field"))
    }
}
