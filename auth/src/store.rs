use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;

/// Stored login secret for one account.
///
/// Deliberately not serializable; `Debug` omits the hash.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub identifier: String,
    pub password_hash: String,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("identifier", &self.identifier)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

/// Public projection of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub identifier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub active: bool,
}

impl Identity {
    /// An active identity with no contact fields.
    pub fn new(identifier: impl ToString) -> Self {
        Self {
            identifier: identifier.to_string(),
            email: None,
            full_name: None,
            active: true,
        }
    }

    pub fn with_email(mut self, email: impl ToString) -> Self {
        self.email = Some(email.to_string());
        self
    }
}

/// Infrastructure failure while reading account data.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Credential store unavailable: {0}")]
pub struct StoreError(pub String);

/// Account lookups the credential core needs from storage.
///
/// An unknown identifier is `Ok(None)`; `Err` is reserved for the store
/// itself failing.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Retrieve the stored credential for an identifier.
    ///
    /// # Errors
    /// * `StoreError` - Storage could not be read
    async fn find_credential(&self, identifier: &str) -> Result<Option<Credential>, StoreError>;

    /// Retrieve the public identity for an identifier.
    ///
    /// # Errors
    /// * `StoreError` - Storage could not be read
    async fn find_identity(&self, identifier: &str) -> Result<Option<Identity>, StoreError>;
}

#[derive(Debug, Clone)]
struct Account {
    identity: Identity,
    password_hash: String,
}

/// Map-backed store for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    accounts: Arc<RwLock<HashMap<String, Account>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the account for `identity.identifier`.
    pub async fn insert(&self, identity: Identity, password_hash: String) {
        self.accounts.write().await.insert(
            identity.identifier.clone(),
            Account {
                identity,
                password_hash,
            },
        );
    }

    /// Flip the active flag. Returns false when the account does not exist.
    pub async fn set_active(&self, identifier: &str, active: bool) -> bool {
        match self.accounts.write().await.get_mut(identifier) {
            Some(account) => {
                account.identity.active = active;
                true
            }
            None => false,
        }
    }

    /// Remove an account. Returns false when the account does not exist.
    pub async fn remove(&self, identifier: &str) -> bool {
        self.accounts.write().await.remove(identifier).is_some()
    }
}

#[async_trait]
impl CredentialStore for InMemoryStore {
    async fn find_credential(&self, identifier: &str) -> Result<Option<Credential>, StoreError> {
        Ok(self
            .accounts
            .read()
            .await
            .get(identifier)
            .map(|account| Credential {
                identifier: identifier.to_string(),
                password_hash: account.password_hash.clone(),
            }))
    }

    async fn find_identity(&self, identifier: &str) -> Result<Option<Identity>, StoreError> {
        Ok(self
            .accounts
            .read()
            .await
            .get(identifier)
            .map(|account| account.identity.clone()))
    }
}
