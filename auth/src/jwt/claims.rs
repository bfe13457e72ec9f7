use std::collections::HashMap;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use super::errors::JwtError;

/// Claims carried by an access token.
///
/// `sub`, `iat` and `exp` are always present on issued tokens. They default
/// when absent from a payload so that the decoder can report the missing claim
/// by name. Application claims go in `extra` and are flattened into the payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject (account identifier)
    #[serde(default)]
    pub sub: String,

    /// Issued at (Unix timestamp)
    #[serde(default)]
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    #[serde(default)]
    pub exp: i64,

    /// Issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// JWT ID (unique token identifier)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    /// Additional custom fields (flattened into token)
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Claims {
    /// Create claims for `subject` issued now and valid for `lifetime`.
    ///
    /// # Errors
    /// * `InvalidLifetime` - Expiry falls outside the representable time range
    pub fn new(subject: impl ToString, lifetime: Duration) -> Result<Self, JwtError> {
        Self::issued_at(subject, Utc::now(), lifetime)
    }

    /// Create claims for `subject` issued at a given instant.
    ///
    /// Each set of claims gets a random `jti`.
    pub fn issued_at(
        subject: impl ToString,
        issued_at: DateTime<Utc>,
        lifetime: Duration,
    ) -> Result<Self, JwtError> {
        let expiration = issued_at
            .checked_add_signed(lifetime)
            .ok_or(JwtError::InvalidLifetime)?;

        Ok(Self {
            sub: subject.to_string(),
            iat: issued_at.timestamp(),
            exp: expiration.timestamp(),
            iss: None,
            jti: Some(Uuid::new_v4().to_string()),
            extra: HashMap::new(),
        })
    }

    /// Set issuer.
    pub fn with_issuer(mut self, iss: impl ToString) -> Self {
        self.iss = Some(iss.to_string());
        self
    }

    /// Add a custom field.
    pub fn with_extra(mut self, key: impl ToString, value: impl Serialize) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.extra.insert(key.to_string(), json_value);
        }
        self
    }

    /// Time between issuance and expiry, saturating for out-of-range payloads.
    pub fn lifetime(&self) -> Duration {
        Duration::try_seconds(self.exp.saturating_sub(self.iat)).unwrap_or(Duration::MAX)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}
