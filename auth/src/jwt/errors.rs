use thiserror::Error;

/// Error type for JWT operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token is expired")]
    TokenExpired,

    #[error("Token is invalid: {0}")]
    InvalidToken(String),

    #[error("Missing required claim: {0}")]
    MissingClaim(String),

    #[error("Token lifetime must be positive")]
    InvalidLifetime,

    #[error("Invalid signing key: {0}")]
    InvalidKey(String),

    #[error("Unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),
}

impl JwtError {
    /// Whether the error means a presented token must be rejected, as opposed
    /// to a server-side signing or configuration failure.
    pub fn is_invalid_token(&self) -> bool {
        matches!(
            self,
            JwtError::TokenExpired | JwtError::InvalidToken(_) | JwtError::MissingClaim(_)
        )
    }
}
