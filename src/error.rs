use std::fmt;

/// Errors surfaced by the query, transform and render core
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Network failure or timeout while talking to the metrics API
    #[error("Transport error: {0}")]
    Transport(String),
    /// Metrics API answered with a non-2xx status
    #[error("HTTP error ({status}): {message}")]
    Http { status: u16, message: String },
    /// Response body was not valid JSON or carried a non-numeric sample
    #[error("Decode error: {0}")]
    Decode(String),
    /// Bad compact duration string such as `5x` or `1.5h`
    #[error("Invalid duration '{input}': {reason}")]
    DurationParse { input: String, reason: DurationReason },
    /// Drawing or writing the chart failed
    #[error("Render error: {0}")]
    Render(String),
}

/// Why a duration string was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationReason {
    MissingUnit,
    UnknownUnit(char),
    BadMagnitude,
    Overflow,
}

impl fmt::Display for DurationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingUnit => write!(f, "expected a unit suffix (s, m, h, d)"),
            Self::UnknownUnit(c) => write!(f, "unknown unit '{}', expected one of s, m, h, d", c),
            Self::BadMagnitude => write!(f, "magnitude must be a non-negative integer"),
            Self::Overflow => write!(f, "duration is too large"),
        }
    }
}

impl Error {
    /// Short machine-friendly name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Http { .. } => "http",
            Self::Decode(_) => "decode",
            Self::DurationParse { .. } => "duration_parse",
            Self::Render(_) => "render",
        }
    }
}

// reqwest folds timeouts, connect failures and body read errors into one type
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Transport(format!("request timed out: {}", err))
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(format!("invalid JSON body: {}", err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Render(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = Error::Http {
            status: 503,
            message: "Service Unavailable".to_string(),
        };
        assert_eq!(error.to_string(), "HTTP error (503): Service Unavailable");
    }

    #[test]
    fn test_duration_error_display() {
        let error = Error::DurationParse {
            input: "5x".to_string(),
            reason: DurationReason::UnknownUnit('x'),
        };
        assert_eq!(
            error.to_string(),
            "Invalid duration '5x': unknown unit 'x', expected one of s, m, h, d"
        );
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(Error::Decode("x".to_string()).kind(), "decode");
        assert_eq!(Error::Render("x".to_string()).kind(), "render");
        assert_eq!(Error::Transport("x".to_string()).kind(), "transport");
    }

    #[test]
    fn test_from_serde_json_error_is_decode() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        assert!(matches!(Error::from(err), Error::Decode(_)));
    }
}
