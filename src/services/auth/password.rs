use tracing::error;

use crate::services::auth::AuthError;

/// Canonical byte form used on both sides of the comparison: surrounding
/// whitespace is an artifact of transport, never part of the secret.
fn normalize(secret: &str) -> &str {
    secret.trim()
}

/// Hash a plaintext password for storage. bcrypt's default cost; the salt is
/// embedded in the digest.
pub fn hash(plaintext: &str) -> Result<String, AuthError> {
    bcrypt::hash(normalize(plaintext), bcrypt::DEFAULT_COST).map_err(|e| {
        error!(error = %e, "failed to hash password");
        AuthError::PasswordHash
    })
}

/// Compare a plaintext candidate against a stored digest.
///
/// Returns plain `false` on any failure — a wrong password and a corrupt
/// digest are indistinguishable to the caller, so the login boundary leaks
/// nothing about which check rejected.
pub fn verify(digest: &str, plaintext: &str) -> bool {
    bcrypt::verify(normalize(plaintext), normalize(digest)).unwrap_or(false)
}
