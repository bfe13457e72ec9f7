use std::sync::Arc;

use thiserror::Error;

use crate::jwt::JwtHandler;
use crate::store::CredentialStore;
use crate::store::Identity;

/// Why a protected operation was refused.
///
/// Messages are safe to show to clients; details go to the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Denial {
    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Inactive user")]
    InactiveAccount,

    #[error("Authentication temporarily unavailable")]
    Unavailable,
}

/// Gate in front of protected operations.
///
/// Runs extract → decode → resolve → check-active and stops at the first
/// failure. Nothing is retried.
pub struct SessionGuard<S> {
    store: Arc<S>,
    jwt_handler: Arc<JwtHandler>,
}

impl<S: CredentialStore> SessionGuard<S> {
    pub fn new(store: Arc<S>, jwt_handler: Arc<JwtHandler>) -> Self {
        Self { store, jwt_handler }
    }

    /// Resolve the caller's identity from an `Authorization` header value.
    ///
    /// # Errors
    /// * `Unauthenticated` - No bearer token, or its subject no longer exists
    /// * `InvalidToken` - Token failed signature, format or expiry checks
    /// * `InactiveAccount` - Account exists but is disabled
    /// * `Unavailable` - Account lookup failed
    pub async fn authorize(&self, authorization: Option<&str>) -> Result<Identity, Denial> {
        let token = authorization
            .and_then(extract_bearer)
            .ok_or(Denial::Unauthenticated)?;

        self.authorize_token(token).await
    }

    /// Same as [`SessionGuard::authorize`] for an already extracted token.
    pub async fn authorize_token(&self, token: &str) -> Result<Identity, Denial> {
        let claims = self.jwt_handler.decode(token).map_err(|e| {
            tracing::warn!(error = %e, "Token rejected");
            Denial::InvalidToken
        })?;

        let identity = self
            .store
            .find_identity(&claims.sub)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Identity lookup failed");
                Denial::Unavailable
            })?
            .ok_or_else(|| {
                tracing::warn!(subject = %claims.sub, "Token subject no longer exists");
                Denial::Unauthenticated
            })?;

        if !identity.active {
            tracing::info!(subject = %identity.identifier, "Inactive account refused");
            return Err(Denial::InactiveAccount);
        }

        Ok(identity)
    }
}

/// Pull the token out of a `Bearer <token>` header value.
///
/// The scheme is matched case-insensitively. Returns `None` for any other
/// scheme, an empty token or a token containing whitespace.
pub fn extract_bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    if token.is_empty() || token.contains(char::is_whitespace) {
        return None;
    }

    Some(token)
}
