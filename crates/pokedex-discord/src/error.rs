//! Error types for the Discord platform layer.

/// Errors produced by the REST client and the interactions server.
#[derive(Debug, thiserror::Error)]
pub enum DiscordError {
    /// Transport-level HTTP failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Discord answered with a non-success status.
    #[error("Discord API error {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, as returned.
        body: String,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The configured application public key is unusable.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Binding or serving the interactions endpoint failed.
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for Discord operations.
pub type DiscordResult<T> = Result<T, DiscordError>;

/// Reasons an inbound request fails signature verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    /// A signature header is absent or not valid UTF-8.
    #[error("missing header {0}")]
    MissingHeader(&'static str),

    /// The signature header is not 64 hex-encoded bytes.
    #[error("malformed signature")]
    MalformedSignature,

    /// The signature does not match the body.
    #[error("signature mismatch")]
    Mismatch,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_carries_status_and_body() {
        let err = DiscordError::Api {
            status: 403,
            body: "{\"message\": \"Missing Access\"}".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("403"));
        assert!(msg.contains("Missing Access"));
    }

    #[test]
    fn verify_error_names_header() {
        let err = VerifyError::MissingHeader("X-Signature-Ed25519");
        assert!(err.to_string().contains("X-Signature-Ed25519"));
    }
}
