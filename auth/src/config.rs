use secrecy::SecretString;
use serde::Deserialize;

/// Process-wide settings for the credential core.
///
/// Loaded once at startup and handed to the hasher and token handler
/// constructors; nothing in this crate reads configuration on its own.
#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub token: TokenConfig,
    #[serde(default)]
    pub hashing: HashingConfig,
}

/// Token signing settings.
#[derive(Debug, Deserialize, Clone)]
pub struct TokenConfig {
    /// HMAC signing secret. Redacted in `Debug` output.
    pub secret: SecretString,
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    #[serde(default = "default_expire_minutes")]
    pub expire_minutes: i64,
    /// Optional `iss` claim stamped on issued tokens and required on decode.
    #[serde(default)]
    pub issuer: Option<String>,
}

/// Argon2id cost parameters.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct HashingConfig {
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

fn default_algorithm() -> String {
    "HS256".to_string()
}

fn default_expire_minutes() -> i64 {
    30
}

fn default_memory_kib() -> u32 {
    argon2::Params::DEFAULT_M_COST
}

fn default_iterations() -> u32 {
    argon2::Params::DEFAULT_T_COST
}

fn default_parallelism() -> u32 {
    argon2::Params::DEFAULT_P_COST
}
