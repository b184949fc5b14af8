//! Data source error types.

/// Errors from fetching transit data.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// The requested resource does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// The response parsed but did not contain usable data
    #[error("malformed data: {0}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = SourceError::Api {
            status: 400,
            message: "Bad Request".into(),
        };
        assert_eq!(err.to_string(), "API error 400: Bad Request");

        let err = SourceError::NotFound("stop 12".into());
        assert_eq!(err.to_string(), "not found: stop 12");

        let err = SourceError::Malformed("no departures".into());
        assert_eq!(err.to_string(), "malformed data: no departures");
    }
}
