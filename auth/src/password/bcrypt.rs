/// Modular-crypt prefixes produced by bcrypt implementations.
const PREFIXES: [&str; 3] = ["$2a$", "$2b$", "$2y$"];

/// Whether `hash` is a bcrypt modular-crypt string.
pub fn is_bcrypt_hash(hash: &str) -> bool {
    PREFIXES.iter().any(|prefix| hash.starts_with(prefix))
}

/// Verify a plaintext against a bcrypt hash.
///
/// Unreadable hashes count as a mismatch.
pub fn verify(password: &str, hash: &str) -> bool {
    match ::bcrypt::verify(password, hash) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::debug!(error = %e, "Unreadable bcrypt hash");
            false
        }
    }
}
