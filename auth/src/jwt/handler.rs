use std::str::FromStr;

use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use secrecy::ExposeSecret;
use serde::Serialize;

use super::claims::Claims;
use super::errors::JwtError;
use crate::config::TokenConfig;

/// JWT token handler for issuing and decoding access tokens.
///
/// Signs with a shared HMAC secret. Only the configured algorithm is accepted
/// on decode, so a token whose header names another algorithm is rejected.
#[derive(Clone)]
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    default_lifetime: Duration,
    issuer: Option<String>,
}

impl JwtHandler {
    /// Minimum secret length accepted from configuration (256 bits).
    pub const MIN_SECRET_LENGTH: usize = 32;

    pub const DEFAULT_LIFETIME_MINUTES: i64 = 30;

    /// Create a new JWT handler with a secret key.
    ///
    /// Uses HS256 and a 30 minute default lifetime. Prefer
    /// [`JwtHandler::from_config`] outside of tests, which also checks the
    /// key length.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            default_lifetime: Duration::minutes(Self::DEFAULT_LIFETIME_MINUTES),
            issuer: None,
        }
    }

    /// Create a handler from token configuration.
    ///
    /// # Errors
    /// * `InvalidKey` - Secret shorter than 32 bytes
    /// * `UnsupportedAlgorithm` - Algorithm is not HS256, HS384 or HS512
    /// * `InvalidLifetime` - Configured lifetime is not positive or too large
    pub fn from_config(config: &TokenConfig) -> Result<Self, JwtError> {
        let secret = config.secret.expose_secret().as_bytes();
        if secret.len() < Self::MIN_SECRET_LENGTH {
            return Err(JwtError::InvalidKey(format!(
                "secret must be at least {} bytes",
                Self::MIN_SECRET_LENGTH
            )));
        }

        if config.expire_minutes <= 0 {
            return Err(JwtError::InvalidLifetime);
        }

        // Reject lifetimes that would push `exp` past the representable range.
        let default_lifetime = Duration::try_minutes(config.expire_minutes)
            .filter(|lifetime| Utc::now().checked_add_signed(*lifetime).is_some())
            .ok_or(JwtError::InvalidLifetime)?;

        let algorithm = hmac_algorithm(&config.algorithm)?;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm,
            default_lifetime,
            issuer: config.issuer.clone(),
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn default_lifetime(&self) -> Duration {
        self.default_lifetime
    }

    /// Issue a token for `subject` valid for `lifetime` from now.
    ///
    /// # Errors
    /// * `InvalidLifetime` - Lifetime is zero, negative or past the representable range
    /// * `MissingClaim` - Subject is empty
    /// * `EncodingFailed` - Signing failed
    pub fn issue(&self, subject: &str, lifetime: Duration) -> Result<String, JwtError> {
        self.issue_claims(Claims::new(subject, lifetime)?)
    }

    /// Issue a token for `subject` with the configured default lifetime.
    pub fn issue_default(&self, subject: &str) -> Result<String, JwtError> {
        self.issue(subject, self.default_lifetime)
    }

    /// Sign caller-built claims, e.g. ones carrying application claims.
    ///
    /// The configured issuer is stamped on claims that carry none.
    pub fn issue_claims(&self, mut claims: Claims) -> Result<String, JwtError> {
        if claims.sub.is_empty() {
            return Err(JwtError::MissingClaim("sub".to_string()));
        }

        if claims.exp <= claims.iat {
            return Err(JwtError::InvalidLifetime);
        }

        if claims.iss.is_none() {
            claims.iss = self.issuer.clone();
        }

        self.sign(&claims)
    }

    fn sign<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Decode and validate a token.
    ///
    /// Checks the signature, that `sub` and `exp` are present, that the token
    /// has not expired (no leeway) and, when configured, the issuer.
    ///
    /// # Errors
    /// * `TokenExpired` - `exp` is in the past
    /// * `MissingClaim` - `sub` or `exp` absent, or `sub` empty
    /// * `InvalidToken` - Bad signature, wrong algorithm, wrong issuer or malformed token
    pub fn decode(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                    ErrorKind::MissingRequiredClaim(claim) => JwtError::MissingClaim(claim.clone()),
                    _ => JwtError::InvalidToken(e.to_string()),
                }
            })?;

        if token_data.claims.sub.is_empty() {
            return Err(JwtError::MissingClaim("sub".to_string()));
        }

        Ok(token_data.claims)
    }
}

fn hmac_algorithm(name: &str) -> Result<Algorithm, JwtError> {
    match Algorithm::from_str(name) {
        Ok(algorithm @ (Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)) => Ok(algorithm),
        _ => Err(JwtError::UnsupportedAlgorithm(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;
    use serde::Deserialize;

    use super::*;

    const SECRET: &[u8] = b"my_secret_key_at_least_32_bytes_long!";

    fn token_config(algorithm: &str, issuer: Option<&str>) -> TokenConfig {
        TokenConfig {
            secret: SecretString::new("my_secret_key_at_least_32_bytes_long!".into()),
            algorithm: algorithm.to_string(),
            expire_minutes: 30,
            issuer: issuer.map(str::to_string),
        }
    }

    #[test]
    fn test_issue_and_decode() {
        let handler = JwtHandler::new(SECRET);

        let token = handler
            .issue("alice", Duration::minutes(15))
            .expect("Failed to issue token");
        assert_eq!(token.split('.').count(), 3);

        let claims = handler.decode(&token).expect("Failed to decode token");
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.exp - claims.iat, 15 * 60);
        assert!(claims.iat <= Utc::now().timestamp());
    }

    #[test]
    fn test_issue_default_uses_configured_lifetime() {
        let handler = JwtHandler::from_config(&TokenConfig {
            expire_minutes: 45,
            ..token_config("HS256", None)
        })
        .expect("Failed to build handler");

        let token = handler.issue_default("alice").expect("Failed to issue token");
        let claims = handler.decode(&token).expect("Failed to decode token");

        assert_eq!(claims.lifetime(), Duration::minutes(45));
    }

    #[test]
    fn test_issue_rejects_non_positive_lifetime() {
        let handler = JwtHandler::new(SECRET);

        assert_eq!(
            handler.issue("alice", Duration::zero()),
            Err(JwtError::InvalidLifetime)
        );
        assert_eq!(
            handler.issue("alice", Duration::minutes(-5)),
            Err(JwtError::InvalidLifetime)
        );
    }

    #[test]
    fn test_issue_rejects_empty_subject() {
        let handler = JwtHandler::new(SECRET);

        assert_eq!(
            handler.issue("", Duration::minutes(5)),
            Err(JwtError::MissingClaim("sub".to_string()))
        );
    }

    #[test]
    fn test_issue_rejects_unrepresentable_lifetime() {
        let handler = JwtHandler::new(SECRET);

        assert_eq!(
            handler.issue("alice", Duration::days(200_000_000)),
            Err(JwtError::InvalidLifetime)
        );
    }

    #[test]
    fn test_decode_expired_token() {
        let handler = JwtHandler::new(SECRET);

        let issued = Utc::now() - Duration::hours(2);
        let claims = Claims::issued_at("alice", issued, Duration::hours(1)).unwrap();
        let token = handler.sign(&claims).expect("Failed to encode token");

        let result = handler.decode(&token);
        assert_eq!(result, Err(JwtError::TokenExpired));
        assert!(result.unwrap_err().is_invalid_token());
    }

    #[test]
    fn test_decode_invalid_token() {
        let handler = JwtHandler::new(SECRET);

        let result = handler.decode("invalid.token.here");
        assert!(matches!(result, Err(JwtError::InvalidToken(_))));

        let result = handler.decode("");
        assert!(matches!(result, Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn test_decode_with_wrong_secret() {
        let handler1 = JwtHandler::new(b"secret1_at_least_32_bytes_long_key!");
        let handler2 = JwtHandler::new(b"secret2_at_least_32_bytes_long_key!");

        let token = handler1
            .issue("alice", Duration::minutes(5))
            .expect("Failed to issue token");

        let result = handler2.decode(&token);
        assert!(matches!(result, Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn test_decode_tampered_payload() {
        let handler = JwtHandler::new(SECRET);
        let token = handler
            .issue("alice", Duration::minutes(5))
            .expect("Failed to issue token");
        let forged = handler
            .issue("mallory", Duration::minutes(5))
            .expect("Failed to issue token");

        let parts: Vec<&str> = token.split('.').collect();
        let forged_parts: Vec<&str> = forged.split('.').collect();
        let spliced = format!("{}.{}.{}", parts[0], forged_parts[1], parts[2]);

        assert!(matches!(
            handler.decode(&spliced),
            Err(JwtError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_decode_rejects_other_algorithm() {
        let hs512 = JwtHandler::from_config(&token_config("HS512", None))
            .expect("Failed to build handler");
        let hs256 = JwtHandler::new(SECRET);

        let token = hs512
            .issue("alice", Duration::minutes(5))
            .expect("Failed to issue token");

        assert!(hs512.decode(&token).is_ok());
        assert!(matches!(
            hs256.decode(&token),
            Err(JwtError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_decode_missing_subject() {
        #[derive(Serialize, Deserialize)]
        struct NoSubject {
            iat: i64,
            exp: i64,
        }

        let handler = JwtHandler::new(SECRET);
        let now = Utc::now().timestamp();
        let token = handler
            .sign(&NoSubject {
                iat: now,
                exp: now + 600,
            })
            .expect("Failed to encode token");

        let result = handler.decode(&token);
        assert_eq!(result, Err(JwtError::MissingClaim("sub".to_string())));
    }

    #[test]
    fn test_decode_missing_expiration() {
        #[derive(Serialize, Deserialize)]
        struct NoExpiry {
            sub: String,
            iat: i64,
        }

        let handler = JwtHandler::new(SECRET);
        let token = handler
            .sign(&NoExpiry {
                sub: "alice".to_string(),
                iat: Utc::now().timestamp(),
            })
            .expect("Failed to encode token");

        let result = handler.decode(&token);
        assert_eq!(result, Err(JwtError::MissingClaim("exp".to_string())));
    }

    #[test]
    fn test_decode_empty_subject() {
        let handler = JwtHandler::new(SECRET);
        let mut claims = Claims::new("alice", Duration::minutes(5)).unwrap();
        claims.sub = String::new();
        let token = handler.sign(&claims).expect("Failed to encode token");

        assert_eq!(
            handler.decode(&token),
            Err(JwtError::MissingClaim("sub".to_string()))
        );
    }

    #[test]
    fn test_issuer_is_stamped_and_checked() {
        let ours = JwtHandler::from_config(&token_config("HS256", Some("user-service")))
            .expect("Failed to build handler");
        let theirs = JwtHandler::from_config(&token_config("HS256", Some("other-service")))
            .expect("Failed to build handler");

        let token = ours
            .issue("alice", Duration::minutes(5))
            .expect("Failed to issue token");

        let claims = ours.decode(&token).expect("Failed to decode token");
        assert_eq!(claims.iss, Some("user-service".to_string()));
        assert!(matches!(
            theirs.decode(&token),
            Err(JwtError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_extra_claims_round_trip() {
        let handler = JwtHandler::new(SECRET);
        let claims = Claims::new("alice", Duration::minutes(5))
            .unwrap()
            .with_extra("scope", "items");

        let token = handler
            .issue_claims(claims.clone())
            .expect("Failed to issue token");
        let decoded = handler.decode(&token).expect("Failed to decode token");

        assert_eq!(decoded, claims);
    }

    #[test]
    fn test_from_config_validation() {
        let short = TokenConfig {
            secret: SecretString::new("too-short".into()),
            ..token_config("HS256", None)
        };
        assert!(matches!(
            JwtHandler::from_config(&short),
            Err(JwtError::InvalidKey(_))
        ));

        assert_eq!(
            JwtHandler::from_config(&token_config("RS256", None)).err(),
            Some(JwtError::UnsupportedAlgorithm("RS256".to_string()))
        );
        assert_eq!(
            JwtHandler::from_config(&token_config("none", None)).err(),
            Some(JwtError::UnsupportedAlgorithm("none".to_string()))
        );

        let zero_lifetime = TokenConfig {
            expire_minutes: 0,
            ..token_config("HS256", None)
        };
        assert_eq!(
            JwtHandler::from_config(&zero_lifetime).err(),
            Some(JwtError::InvalidLifetime)
        );

        for expire_minutes in [1_000_000_000_000, i64::MAX] {
            let huge_lifetime = TokenConfig {
                expire_minutes,
                ..token_config("HS256", None)
            };
            assert_eq!(
                JwtHandler::from_config(&huge_lifetime).err(),
                Some(JwtError::InvalidLifetime)
            );
        }

        let hs384 = JwtHandler::from_config(&token_config("HS384", None))
            .expect("Failed to build handler");
        assert_eq!(hs384.algorithm(), Algorithm::HS384);
    }
}
