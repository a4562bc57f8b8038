use thiserror::Error;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Failure kinds for calls against the screening service.
///
/// The client never swallows a failure: every variant is surfaced in the
/// TUI status line or the REPL error output so the user sees what happened.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport-level failure (connection refused, DNS, timeout).
    #[error("network error: {0}")]
    Network(String),

    /// Non-success HTTP status with whatever detail the server returned.
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// 401/403 - the session token is missing, expired or rejected.
    #[error("not authorized - please login")]
    Unauthorized,

    /// Client-side input rejected before any request was made.
    #[error("invalid input: {0}")]
    Validation(String),

    /// Response body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Analysis polling gave up after the configured attempt cap.
    #[error("analysis for {symbol} still processing after {attempts} attempts")]
    AnalysisTimeout { symbol: String, attempts: u32 },
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl ApiError {
    /// True when the right reaction is to send the user to the login screen.
    pub fn needs_login(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        let err = ApiError::Status {
            status: 404,
            message: "Stock not found".to_string(),
        };
        assert!(err.to_string().contains("404"));
        assert!(err.to_string().contains("Stock not found"));
    }

    #[test]
    fn test_unauthorized_needs_login() {
        assert!(ApiError::Unauthorized.needs_login());
        assert!(!ApiError::Validation("bad symbol".to_string()).needs_login());
    }

    #[test]
    fn test_timeout_display() {
        let err = ApiError::AnalysisTimeout {
            symbol: "AAPL".to_string(),
            attempts: 120,
        };
        assert!(err.to_string().contains("AAPL"));
        assert!(err.to_string().contains("120"));
    }
}
