use std::sync::Arc;
use std::sync::OnceLock;

use serde::Serialize;

use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::password::PasswordHasher;
use crate::store::CredentialStore;
use crate::store::Identity;
use crate::store::StoreError;

/// Plaintext hashed once to give unknown accounts a hash to verify against.
const DECOY_PASSWORD: &str = "decoy-password-for-unknown-accounts";

/// Authentication coordinator combining credential lookup, password
/// verification and token issuance.
///
/// Verification runs on the blocking thread pool so slow hashing does not
/// stall the async workers serving other requests.
pub struct Authenticator<S> {
    store: Arc<S>,
    password_hasher: PasswordHasher,
    jwt_handler: Arc<JwtHandler>,
    decoy_hash: Arc<OnceLock<String>>,
}

/// Token handed to a client after a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessToken {
    pub access_token: String,
    /// Always `"bearer"`.
    pub token_type: String,
    /// Seconds until the token expires.
    pub expires_in: i64,
}

/// Authentication operation errors.
///
/// An unknown identifier and a wrong password both map to
/// `InvalidCredentials`; the other variants are server-side failures.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),

    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),

    #[error("Password verification did not complete: {0}")]
    VerificationAborted(String),
}

impl<S: CredentialStore> Authenticator<S> {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `store` - Account lookups
    /// * `password_hasher` - Hasher whose parameters match the stored hashes
    /// * `jwt_handler` - Token signer, shared with the session guard
    pub fn new(
        store: Arc<S>,
        password_hasher: PasswordHasher,
        jwt_handler: Arc<JwtHandler>,
    ) -> Self {
        Self {
            store,
            password_hasher,
            jwt_handler,
            decoy_hash: Arc::new(OnceLock::new()),
        }
    }

    /// Check an identifier/password pair.
    ///
    /// Read-only with respect to the store.
    ///
    /// # Returns
    /// The identity of the matching account
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown identifier or wrong password
    /// * `StoreError` - Account lookup failed
    /// * `VerificationAborted` - The blocking verification task did not finish
    pub async fn authenticate(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<Identity, AuthenticationError> {
        let credential = self.store.find_credential(identifier).await?;

        let is_valid = self
            .verify_password(password, credential.map(|c| c.password_hash))
            .await?;

        if !is_valid {
            tracing::info!(identifier = %identifier, "Authentication rejected");
            return Err(AuthenticationError::InvalidCredentials);
        }

        // The account can disappear between the two lookups.
        self.store
            .find_identity(identifier)
            .await?
            .ok_or(AuthenticationError::InvalidCredentials)
    }

    /// Verify credentials and issue an access token with the default lifetime.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown identifier or wrong password
    /// * `JwtError` - Token signing failed
    /// * `StoreError` - Account lookup failed
    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<AccessToken, AuthenticationError> {
        let identity = self.authenticate(identifier, password).await?;

        let lifetime = self.jwt_handler.default_lifetime();
        let access_token = self.jwt_handler.issue(&identity.identifier, lifetime)?;

        tracing::info!(
            subject = %identity.identifier,
            expires_in = lifetime.num_seconds(),
            "Access token issued"
        );

        Ok(AccessToken {
            access_token,
            token_type: "bearer".to_string(),
            expires_in: lifetime.num_seconds(),
        })
    }

    async fn verify_password(
        &self,
        password: &str,
        stored_hash: Option<String>,
    ) -> Result<bool, AuthenticationError> {
        let hasher = self.password_hasher.clone();
        let decoy_hash = Arc::clone(&self.decoy_hash);
        let password = password.to_string();

        tokio::task::spawn_blocking(move || match stored_hash {
            Some(hash) => hasher.verify(&password, &hash),
            None => {
                // Burn the same work as a real check so timing does not reveal
                // whether the account exists.
                if let Some(decoy) = prepare_decoy(&decoy_hash, &hasher) {
                    let _ = hasher.verify(&password, decoy);
                }
                false
            }
        })
        .await
        .map_err(|e| AuthenticationError::VerificationAborted(e.to_string()))
    }
}

/// Hash verified in place of a missing account's hash, built on first use.
///
/// A failed build is logged and retried on the next unknown-account login.
fn prepare_decoy<'a>(cell: &'a OnceLock<String>, hasher: &PasswordHasher) -> Option<&'a str> {
    if let Some(decoy) = cell.get() {
        return Some(decoy);
    }

    match hasher.hash(DECOY_PASSWORD) {
        Ok(hash) => Some(cell.get_or_init(|| hash)),
        Err(e) => {
            tracing::error!(
                error = %e,
                "Failed to prepare decoy hash, unknown accounts are answered without hashing"
            );
            None
        }
    }
}
