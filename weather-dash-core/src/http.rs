use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::FetchError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = concat!("weather-dash/", env!("CARGO_PKG_VERSION"));

pub(crate) fn client() -> Client {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!("Failed to build HTTP client ({e}), using defaults");
            Client::new()
        })
}

/// GET `url` with `query`, require a 2xx status, and decode the body as JSON.
pub(crate) async fn get_json<T: DeserializeOwned>(
    http: &Client,
    endpoint: &'static str,
    url: &str,
    query: &[(&str, &str)],
) -> Result<T, FetchError> {
    let res = http
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|source| FetchError::Transport { endpoint, source })?;

    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|source| FetchError::Transport { endpoint, source })?;

    if !status.is_success() {
        return Err(FetchError::Status {
            endpoint,
            status,
            body: truncate_body(&body),
        });
    }

    serde_json::from_str(&body).map_err(|e| FetchError::payload(endpoint, e.to_string()))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        let head: String = body.chars().take(MAX).collect();
        format!("{head}...")
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_bodies() {
        assert_eq!(truncate_body("nope"), "nope");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let body = "é".repeat(300);
        let out = truncate_body(&body);
        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), 203);
    }
}
