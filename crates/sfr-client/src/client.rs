//! HTTP client for `POST /predict`

use crate::error::ClientError;
use reqwest::StatusCode;
use sfr_features::{ErrorBody, InputRecord, PredictionResult};
use std::time::Duration;

/// Default prediction endpoint
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/predict";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Posts records to the prediction service
#[derive(Debug, Clone)]
pub struct PredictionClient {
    http: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl PredictionClient {
    /// Create a client for `url` with a per-request timeout
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            url: url.into(),
            timeout,
        })
    }

    /// Request a recommendation for one record
    ///
    /// # Errors
    /// - [`ClientError::Connection`] if the service cannot be reached
    /// - [`ClientError::Timeout`] if it does not answer within the timeout
    /// - [`ClientError::Http`] for any non-200 status
    /// - [`ClientError::Decode`] if a 200 body is not a prediction
    pub async fn predict(&self, record: &InputRecord) -> Result<PredictionResult, ClientError> {
        tracing::debug!(url = %self.url, "Posting prediction request");

        let response = self
            .http
            .post(&self.url)
            .json(record)
            .send()
            .await
            .map_err(|e| self.classify(e))?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.classify(e))?;

        if status != StatusCode::OK {
            return Err(ClientError::Http {
                status: status.as_u16(),
                detail: error_detail(&body),
            });
        }
        serde_json::from_slice(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    fn classify(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout {
                url: self.url.clone(),
                timeout: self.timeout,
                source: err,
            }
        } else if err.is_connect() {
            ClientError::Connection {
                url: self.url.clone(),
                source: err,
            }
        } else {
            ClientError::Request(err)
        }
    }
}

/// `detail` field of an error body, if the body has one
#[must_use]
pub fn error_detail(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ErrorBody>(body).ok().map(|b| b.detail)
}
