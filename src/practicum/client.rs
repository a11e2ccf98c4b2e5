//! Practicum HTTP client — one authenticated GET per cycle.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::HomeworkSource;
use crate::error::PollError;

pub struct PracticumClient {
    client: reqwest::Client,
    endpoint: String,
    token: String,
}

impl PracticumClient {
    /// Build a client with an explicit request timeout.
    pub fn new(endpoint: &str, token: &str, timeout: Duration) -> Result<Self, PollError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(PollError::Transport)?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            token: token.to_string(),
        })
    }
}

impl Drop for PracticumClient {
    fn drop(&mut self) {
        zeroize::Zeroize::zeroize(&mut self.token);
    }
}

#[async_trait]
impl HomeworkSource for PracticumClient {
    async fn get_api_answer(&self, from_date: i64) -> Result<Value, PollError> {
        debug!(endpoint = %self.endpoint, from_date, "Requesting homework statuses");

        let resp = self
            .client
            .get(&self.endpoint)
            .header(reqwest::header::AUTHORIZATION, format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .send()
            .await
            .map_err(PollError::Transport)?;

        let status = resp.status();
        let body = resp.text().await.map_err(PollError::Transport)?;
        decode_reply(status, &body)
    }
}

/// Turn a finished HTTP exchange into the decoded body.
///
/// Anything but 200 is a protocol error regardless of the body. A 200 whose
/// body is not JSON is a protocol error too; its shape is not checked here.
pub fn decode_reply(status: StatusCode, body: &str) -> Result<Value, PollError> {
    if status != StatusCode::OK {
        return Err(PollError::http_status(status.as_u16(), body));
    }
    serde_json::from_str(body).map_err(PollError::Decode)
}
