//! Client-side errors

use std::time::Duration;

/// Failure of a prediction request
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Service unreachable
    #[error("Could not connect to the prediction service at {url}. Please make sure it is running. ({source})")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Service reachable but no complete answer within the timeout
    #[error("The prediction service at {url} did not respond within {}s. It may be busy; try again or raise --timeout-secs.", .timeout.as_secs_f64())]
    Timeout {
        url: String,
        timeout: Duration,
        #[source]
        source: reqwest::Error,
    },

    /// Service answered with a non-200 status
    #[error("API error {status}{}", .detail.as_ref().map(|d| format!(": {d}")).unwrap_or_default())]
    Http { status: u16, detail: Option<String> },

    /// Response body was not a prediction
    #[error("unexpected response body: {0}")]
    Decode(String),

    /// Other transport failure, including client construction
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

impl ClientError {
    /// Whether the service could not be reached at all
    #[inline]
    #[must_use]
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn http_display_includes_detail_when_present() {
        let err = ClientError::Http {
            status: 500,
            detail: Some("Model artifacts not loaded: classifier".into()),
        };
        assert_eq!(err.to_string(), "API error 500: Model artifacts not loaded: classifier");

        let err = ClientError::Http {
            status: 404,
            detail: None,
        };
        assert_eq!(err.to_string(), "API error 404");
        assert!(!err.is_connection());
    }
}
