//! Credential core
//!
//! Issues and validates short-lived bearer tokens for username/password
//! authenticated APIs:
//! - Password hashing (Argon2id, legacy bcrypt verification)
//! - JWT issuance and validation
//! - Login against a pluggable credential store
//! - Session guard for protected operations
//!
//! Services implement [`CredentialStore`] over their own persistence and wire
//! the pieces together at startup from an [`AuthConfig`].
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! assert!(!hasher.verify("not_my_password", &hash));
//! ```
//!
//! ## JWT Tokens
//! ```
//! use auth::JwtHandler;
//! use chrono::Duration;
//!
//! let handler = JwtHandler::new(b"secret_key_at_least_32_bytes_long!");
//! let token = handler.issue("alice", Duration::minutes(30)).unwrap();
//! let claims = handler.decode(&token).unwrap();
//! assert_eq!(claims.sub, "alice");
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use std::sync::Arc;
//!
//! use auth::{Authenticator, Identity, InMemoryStore, JwtHandler, PasswordHasher, SessionGuard};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let hasher = PasswordHasher::new();
//! let store = Arc::new(InMemoryStore::new());
//! let jwt_handler = Arc::new(JwtHandler::new(b"secret_key_at_least_32_bytes_long!"));
//!
//! // Register: hash password
//! store.insert(Identity::new("alice"), hasher.hash("wonderland").unwrap()).await;
//!
//! // Login: verify and generate token
//! let authenticator = Authenticator::new(Arc::clone(&store), hasher, Arc::clone(&jwt_handler));
//! let token = authenticator.login("alice", "wonderland").await.unwrap();
//!
//! // Protected call: validate token and resolve the caller
//! let guard = SessionGuard::new(store, jwt_handler);
//! let header = format!("Bearer {}", token.access_token);
//! let identity = guard.authorize(Some(&header)).await.unwrap();
//! assert_eq!(identity.identifier, "alice");
//! # });
//! ```

pub mod authenticator;
pub mod config;
pub mod guard;
pub mod jwt;
pub mod password;
pub mod store;

// Re-export commonly used items
pub use authenticator::AccessToken;
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use config::AuthConfig;
pub use config::HashingConfig;
pub use config::TokenConfig;
pub use guard::extract_bearer;
pub use guard::Denial;
pub use guard::SessionGuard;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use store::Credential;
pub use store::CredentialStore;
pub use store::Identity;
pub use store::InMemoryStore;
pub use store::StoreError;
