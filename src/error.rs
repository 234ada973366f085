//! Error types. Command plumbing uses `anyhow`; the collector returns the
//! tagged `FetchError` so callers can branch on the failure kind.

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// A failure of a single fetch-and-group call. None of these are fatal to the
/// hosting process: every front end surfaces the message verbatim and moves on.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The CSRF meta tags were absent from the handshake page. Usually means
    /// the upstream markup changed.
    #[error("CSRF token not found")]
    TokenMissing,

    /// The data POST returned a non-200 status.
    #[error("Failed to fetch data: {0}")]
    UpstreamStatus(u16),

    /// The data POST returned 200 but the body was not valid JSON.
    #[error("Failed to parse response: {0}")]
    ResponseParse(String),

    /// The response parsed as JSON but was not an array of records.
    #[error("Unexpected data format received from server")]
    UnexpectedFormat,

    #[error("Request timed out. The server is taking too long to respond.")]
    Timeout,

    #[error("Connection error. Unable to connect to the municipal website.")]
    Connection,

    /// Transport failures that are neither a timeout nor a connect error,
    /// e.g. the body stream breaking mid-read.
    #[error("HTTP transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_connect() {
            FetchError::Connection
        } else {
            FetchError::Transport(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_status_message_preserves_code() {
        let e = FetchError::UpstreamStatus(500);
        assert_eq!(e.to_string(), "Failed to fetch data: 500");
    }

    #[test]
    fn token_missing_message() {
        assert_eq!(FetchError::TokenMissing.to_string(), "CSRF token not found");
    }
}
