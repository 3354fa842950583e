//! Errors talking to the control API.

/// Failure of a single API request.
///
/// `Transport` and `Parse` degrade a snapshot fetch to the sentinel snapshot;
/// any variant makes an action report failure.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid service URL {0:?}")]
    InvalidUrl(String),
    /// Curl reported an error (timeout, connection, etc.).
    #[error("transport error: {0}")]
    Transport(#[from] curl::Error),
    /// HTTP response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// Body was not the JSON shape we expected.
    #[error("unexpected response: {0}")]
    Parse(#[from] serde_json::Error),
    /// Service answered but reported the call as unsuccessful.
    #[error("rejected by service: {0}")]
    Rejected(String),
}

impl ClientError {
    /// True for connection-level failures and non-2xx HTTP replies.
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport(_) | ClientError::Http(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Transport(e) if e.is_operation_timedout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_counts_as_transport() {
        assert!(ClientError::Http(503).is_transport());
        assert!(!ClientError::Rejected("API Key Incorrect".into()).is_transport());
    }

    #[test]
    fn display_is_readable() {
        assert_eq!(ClientError::Http(404).to_string(), "HTTP 404");
        assert_eq!(
            ClientError::Rejected("nope".into()).to_string(),
            "rejected by service: nope"
        );
    }
}
