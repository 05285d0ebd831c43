pub mod claims;
pub mod password;
pub mod roles;
pub mod session;
pub mod token_issuer;
pub mod token_parser;
pub mod token_service;

use thiserror::Error;

/// Failures inside the auth core, before they are mapped onto HTTP statuses
/// by `crate::error::AppError`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Role string not present in the credential registry. Fails closed;
    /// there is no default capability set.
    #[error("role '{0}' does not exist")]
    UnknownRole(String),

    /// Token fails structural verification: wrong segment shape, undecodable
    /// claims, a missing capability flag, a non-UUID subject.
    #[error("token is malformed")]
    Malformed,

    /// Token decodes but the MAC does not verify.
    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("failed to sign token")]
    Signing,

    #[error("no entropy available for token issuance")]
    Entropy,

    #[error("failed to hash password")]
    PasswordHash,
}
