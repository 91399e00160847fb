//! HTTP client for the mood backend.
//!
//! Wraps the analysis, save, history, and delete endpoints. Response
//! decoding is kept in free functions so it can be exercised without a
//! running server.

use crate::client::error::ClientError;
use crate::frames::Frame;
use crate::models::{HistoryEntry, SampleResult, SaveRecord};
use crate::session::scan_loop::Analyzer;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use futures::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

/// Configuration for the backend client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    /// Bearer token forwarded on every request.
    pub token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_seconds: 30,
            token: None,
        }
    }
}

/// Filters for the history endpoint.
#[derive(Debug, Clone, Default)]
pub struct HistoryQuery {
    pub limit: usize,
    pub date: Option<NaiveDate>,
}

/// Acknowledgement from the save endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedEntry {
    pub id: Option<i64>,
}

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    image: &'a str,
}

#[derive(Debug, Serialize)]
struct DeleteRequest {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    #[serde(default)]
    dominant_emotion: Option<String>,
    #[serde(default)]
    emotions: Option<BTreeMap<String, f64>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    id: Option<i64>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    history: Vec<HistoryEntry>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for the mood backend's HTTP API.
pub struct MoodApiClient {
    config: ClientConfig,
    http_client: reqwest::Client,
}

impl MoodApiClient {
    /// Create a new client.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Submit one frame for emotion analysis.
    pub async fn analyze_frame(&self, frame: &Frame) -> Result<SampleResult, ClientError> {
        debug!("Submitting frame {} for analysis", frame.label);

        let request = self
            .http_client
            .post(self.endpoint("/analyze"))
            .json(&AnalyzeRequest {
                image: &frame.data_url,
            });

        let (status, body) = self.send(request).await?;
        decode_analyze_response(status, &body)
    }

    /// Persist a scan summary.
    pub async fn save_result(&self, record: &SaveRecord) -> Result<SavedEntry, ClientError> {
        let request = self
            .http_client
            .post(self.endpoint("/save_result"))
            .json(record);

        let (status, body) = self.send(request).await?;
        decode_save_response(status, &body)
    }

    /// Fetch previously saved summaries, most recent first.
    pub async fn history(&self, query: &HistoryQuery) -> Result<Vec<HistoryEntry>, ClientError> {
        let mut params = vec![("limit", query.limit.to_string())];
        if let Some(date) = query.date {
            params.push(("date", date.format("%Y-%m-%d").to_string()));
        }

        let request = self
            .http_client
            .get(self.endpoint("/api/history"))
            .query(&params);

        let (status, body) = self.send(request).await?;
        decode_history_response(status, &body)
    }

    /// Delete one saved summary by id.
    pub async fn delete_entry(&self, id: i64) -> Result<(), ClientError> {
        let request = self
            .http_client
            .post(self.endpoint("/api/delete_entry"))
            .json(&DeleteRequest { id });

        let (status, body) = self.send(request).await?;
        decode_status_response(status, &body).map(|_| ())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<(u16, String), ClientError> {
        let request = match self.config.token {
            Some(ref token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await.map_err(|e| self.map_send_error(e))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| self.map_send_error(e))?;

        Ok((status, body))
    }

    fn map_send_error(&self, e: reqwest::Error) -> ClientError {
        if e.is_timeout() {
            ClientError::Timeout(self.config.timeout_seconds)
        } else if e.is_connect() {
            ClientError::Connect(self.config.base_url.clone())
        } else {
            ClientError::Transport(e)
        }
    }
}

impl Analyzer for MoodApiClient {
    fn analyze<'a>(&'a self, frame: &'a Frame) -> BoxFuture<'a, Result<SampleResult, ClientError>> {
        self.analyze_frame(frame).boxed()
    }
}

fn check_status(status: u16, body: &str) -> Result<(), ClientError> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(ClientError::Status {
            status,
            body: body.trim().to_string(),
        })
    }
}

/// Decode a response from the analysis endpoint.
///
/// A body without a dominant emotion decodes to a sample that takes no part
/// in aggregation.
pub fn decode_analyze_response(status: u16, body: &str) -> Result<SampleResult, ClientError> {
    check_status(status, body)?;

    let response: AnalyzeResponse =
        serde_json::from_str(body).map_err(|e| ClientError::Malformed(e.to_string()))?;

    if let Some(error) = response.error {
        return Err(ClientError::Server(error));
    }

    if response.dominant_emotion.is_none() && response.emotions.is_none() {
        return Err(ClientError::Malformed(
            "response has neither a dominant emotion nor scores".to_string(),
        ));
    }

    Ok(SampleResult::new(
        response.dominant_emotion,
        response.emotions.unwrap_or_default(),
    ))
}

/// Decode a `{"status": "ok", ...}` acknowledgement.
pub fn decode_status_response(status: u16, body: &str) -> Result<SavedEntry, ClientError> {
    check_status(status, body)?;

    let response: StatusResponse =
        serde_json::from_str(body).map_err(|e| ClientError::Malformed(e.to_string()))?;

    if let Some(error) = response.error {
        return Err(ClientError::Server(error));
    }

    match response.status.as_deref() {
        Some("ok") => Ok(SavedEntry { id: response.id }),
        other => Err(ClientError::Malformed(format!(
            "unexpected status {:?}",
            other.unwrap_or("<missing>")
        ))),
    }
}

/// Decode a response from the save endpoint.
pub fn decode_save_response(status: u16, body: &str) -> Result<SavedEntry, ClientError> {
    decode_status_response(status, body)
}

/// Decode a response from the history endpoint.
pub fn decode_history_response(status: u16, body: &str) -> Result<Vec<HistoryEntry>, ClientError> {
    check_status(status, body)?;

    let response: HistoryResponse =
        serde_json::from_str(body).map_err(|e| ClientError::Malformed(e.to_string()))?;

    if let Some(error) = response.error {
        return Err(ClientError::Server(error));
    }

    Ok(response.history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    const ANALYZE_OK: &str = include_str!("../../fixtures/analyze_ok.json");
    const ANALYZE_NO_FACE: &str = include_str!("../../fixtures/analyze_no_face.json");
    const HISTORY: &str = include_str!("../../fixtures/history.json");

    #[test]
    fn test_decode_analyze_ok() {
        let sample = assert_ok!(decode_analyze_response(200, ANALYZE_OK));

        assert_eq!(sample.dominant_emotion.as_deref(), Some("happy"));
        assert_eq!(sample.emotions.len(), 7);
        assert_eq!(sample.emotions.get("happy"), Some(&82.45));
    }

    #[test]
    fn test_decode_analyze_server_error() {
        let err = assert_err!(decode_analyze_response(500, ANALYZE_NO_FACE));
        assert!(matches!(err, ClientError::Status { status: 500, .. }));

        let err = assert_err!(decode_analyze_response(200, ANALYZE_NO_FACE));
        assert!(matches!(err, ClientError::Server(ref msg) if msg.contains("Face could not be detected")));
    }

    #[test]
    fn test_decode_analyze_malformed() {
        let err = assert_err!(decode_analyze_response(200, "<html>oops</html>"));
        assert!(matches!(err, ClientError::Malformed(_)));

        let err = assert_err!(decode_analyze_response(
            200,
            r#"{"dominant_emotion": "sad", "emotions": {"sad": "very"}}"#
        ));
        assert!(matches!(err, ClientError::Malformed(_)));
    }

    #[test]
    fn test_decode_analyze_empty_body_is_malformed() {
        let err = assert_err!(decode_analyze_response(200, "{}"));
        assert!(matches!(err, ClientError::Malformed(_)));

        let err = assert_err!(decode_analyze_response(200, r#"{"status": "ok"}"#));
        assert!(matches!(err, ClientError::Malformed(_)));
    }

    #[test]
    fn test_decode_analyze_without_dominant() {
        let sample = assert_ok!(decode_analyze_response(
            200,
            r#"{"dominant_emotion": null, "emotions": {"sad": 12.0}}"#
        ));
        assert!(!sample.is_valid());
        assert!(sample.emotions.is_empty());
    }

    #[test]
    fn test_decode_save_response() {
        let saved = assert_ok!(decode_save_response(200, r#"{"status": "ok", "id": 17}"#));
        assert_eq!(saved.id, Some(17));

        let err = assert_err!(decode_save_response(400, r#"{"error": "Missing fields"}"#));
        assert!(matches!(err, ClientError::Status { status: 400, .. }));

        let err = assert_err!(decode_save_response(200, r#"{"status": "pending"}"#));
        assert!(matches!(err, ClientError::Malformed(_)));
    }

    #[test]
    fn test_decode_history_response() {
        let entries = assert_ok!(decode_history_response(200, HISTORY));

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].id, 12);
        assert_eq!(entries[0].note.as_deref(), Some("after lunch"));
        assert_eq!(entries[2].username, "Anonymous");
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let client = MoodApiClient::new(ClientConfig {
            base_url: "http://localhost:5000/".to_string(),
            ..ClientConfig::default()
        })
        .unwrap();

        assert_eq!(client.endpoint("/analyze"), "http://localhost:5000/analyze");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = MoodApiClient::new(ClientConfig {
            base_url: format!("http://127.0.0.1:{}", port),
            timeout_seconds: 5,
            token: None,
        })
        .unwrap();

        let frame = Frame::from_bytes("f.png", "image/png", b"frame");
        let err = assert_err!(client.analyze_frame(&frame).await);
        assert!(err.is_transport());
    }
}
