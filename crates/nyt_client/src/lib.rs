//! NYT poll feed client.
//!
//! Fetches the published presidential poll feed and decodes it into the
//! shared `PollRecord` format.

use async_trait::async_trait;
use common::{Error, PollRecord, PollSource, PollsResponse};
use tracing::debug;

/// HTTP client for the NYT poll feed.
#[derive(Debug, Clone)]
pub struct NytPollsClient {
    client: reqwest::Client,
    feed_url: String,
}

impl NytPollsClient {
    pub fn new(feed_url: String, request_timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("polls-server/0.1 (poll aggregator; contact@example.com)")
            .pool_max_idle_per_host(4)
            .timeout(std::time::Duration::from_secs(request_timeout_secs))
            .build()
            .expect("failed to build NYT polls HTTP client");

        Self { client, feed_url }
    }

    /// Fetch the current feed and decode all poll records.
    pub async fn fetch_polls(&self) -> Result<Vec<PollRecord>, Error> {
        debug!("Fetching poll feed: {}", self.feed_url);

        let resp = self
            .client
            .get(&self.feed_url)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("HTTP error for poll feed: {e}")))?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body = resp.text().await.unwrap_or_default();
            // Truncate on characters; a byte slice can land inside a
            // multi-byte character and panic.
            let snippet: String = body.chars().take(500).collect();
            return Err(Error::Upstream(format!(
                "Poll feed returned {status}: {snippet}"
            )));
        }

        let raw = resp
            .text()
            .await
            .map_err(|e| Error::Upstream(format!("Failed to read poll feed body: {e}")))?;

        let polls = decode_polls_body(&raw)?;
        debug!("Decoded {} poll records", polls.len());
        Ok(polls)
    }
}

/// Decode a raw feed body into poll records.
///
/// Any record missing a required field fails the whole batch; a partial
/// aggregate would silently misreport regions.
pub fn decode_polls_body(raw: &str) -> Result<Vec<PollRecord>, Error> {
    let payload: PollsResponse = serde_json::from_str(raw)
        .map_err(|e| Error::Malformed(format!("JSON parse error for poll feed: {e}")))?;
    Ok(payload.polls)
}

#[async_trait]
impl PollSource for NytPollsClient {
    async fn fetch_polls(&self) -> common::Result<Vec<PollRecord>> {
        NytPollsClient::fetch_polls(self).await
    }
}
