//! One-way password hashing.
//!
//! New hashes are always Argon2id. Hashes written by the previous bcrypt-based
//! deployment are still accepted on verification.

pub mod argon2;
pub mod bcrypt;
pub mod errors;

pub use argon2::PasswordHasher;
pub use errors::PasswordError;
