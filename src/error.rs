// src/error.rs
use thiserror::Error;

/// Everything a single fetch attempt can fail with.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewerError {
    /// Bad input shape; the caller fixes the input and tries again.
    #[error("ValidationError: {0}")]
    Validation(String),

    /// Missing credential, or one the API rejected (HTTP 401/403).
    #[error("AuthError: {message}")]
    Auth {
        status: Option<u16>,
        message: String,
    },

    /// Network failure, timeout, non-success status or an undecodable body.
    #[error("FetchError: {}", fetch_message(*status, body))]
    Fetch {
        status: Option<u16>,
        body: String,
    },
}

fn fetch_message(status: Option<u16>, body: &str) -> String {
    match status {
        Some(code) => format!("HTTP {}: {}", code, body),
        None => body.to_string(),
    }
}

impl ViewerError {
    /// Short machine-readable kind, used by the web layer.
    pub fn kind(&self) -> &'static str {
        match self {
            ViewerError::Validation(_) => "validation",
            ViewerError::Auth { .. } => "auth",
            ViewerError::Fetch { .. } => "fetch",
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ViewerError::Validation(_) => None,
            ViewerError::Auth { status, .. } | ViewerError::Fetch { status, .. } => *status,
        }
    }
}

impl From<reqwest::Error> for ViewerError {
    fn from(err: reqwest::Error) -> Self {
        // strip the url: it carries the api-key query parameter
        let status = err.status().map(|s| s.as_u16());
        let body = if err.is_timeout() {
            "request timed out".to_string()
        } else if err.is_connect() {
            "connection failed".to_string()
        } else {
            err.without_url().to_string()
        };
        ViewerError::Fetch { status, body }
    }
}

pub type Result<T> = std::result::Result<T, ViewerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_error_message_carries_status_and_body() {
        let err = ViewerError::Fetch {
            status: Some(429),
            body: "rate limited".into(),
        };
        assert_eq!(err.to_string(), "FetchError: HTTP 429: rate limited");
        assert_eq!(err.kind(), "fetch");
        assert_eq!(err.status(), Some(429));
    }

    #[test]
    fn auth_is_distinct_from_fetch() {
        let err = ViewerError::Auth {
            status: Some(401),
            message: "invalid api key".into(),
        };
        assert_eq!(err.kind(), "auth");
        assert_ne!(
            err,
            ViewerError::Fetch {
                status: Some(401),
                body: "invalid api key".into()
            }
        );
    }
}
