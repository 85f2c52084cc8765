//! Backend errors

use std::time::Duration;

use thiserror::Error;

/// Shown when a failure carries no description of its own
pub const GENERIC_FAILURE_MESSAGE: &str = "An error occurred while processing your query.";

/// Errors from the analysis service
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The service could not be reached
    #[error("could not reach analysis service: {0}")]
    Network(String),

    /// The request did not finish in time
    #[error("analysis service did not answer within {0:?}")]
    Timeout(Duration),

    /// The service answered with a failure status
    #[error("analysis service returned {status}: {}", .message.as_deref().unwrap_or("no details"))]
    Status {
        /// HTTP status code
        status: u16,
        /// Description reported by the service, if any
        message: Option<String>,
    },

    /// The service answered with something we could not read
    #[error("unexpected response from analysis service: {0}")]
    Decode(String),

    /// The request task died before reporting
    #[error("query task failed: {0}")]
    Task(String),
}

impl BackendError {
    /// Text recorded in the transcript when a query fails.
    ///
    /// The service's own description wins. A blank description falls back
    /// to the generic failure text.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => "Could not reach the analysis service".to_string(),
            Self::Timeout(timeout) => format!(
                "The analysis service did not answer within {}s",
                timeout.as_secs()
            ),
            Self::Decode(_) => {
                "The analysis service sent a response that could not be read".to_string()
            }
            Self::Status {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.trim().to_string(),
            Self::Status {
                message: Some(_), ..
            }
            | Self::Task(_) => GENERIC_FAILURE_MESSAGE.to_string(),
            Self::Status {
                status,
                message: None,
            } => format!("Request failed with status code {status}"),
        }
    }

    /// Classify a reqwest failure
    pub(crate) fn from_reqwest(err: &reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout)
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}
