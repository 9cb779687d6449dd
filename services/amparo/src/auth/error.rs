//! Error taxonomy for the auth core.

use serde::Serialize;
use thiserror::Error;

use super::validate::FieldError;

/// Which identity field collided during registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityField {
    Username,
    Email,
}

impl core::fmt::Display for IdentityField {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            IdentityField::Username => write!(f, "username"),
            IdentityField::Email => write!(f, "email"),
        }
    }
}

/// Collaborator I/O failure, surfaced as a retryable infrastructure error.
#[derive(Debug, Error)]
#[error("store unavailable")]
pub struct StoreError(#[from] pub anyhow::Error);

/// Auth domain errors.
///
/// Login failures are deliberately undifferentiated: unknown username,
/// disabled account, and wrong password all surface as
/// [`AuthError::AuthenticationFailed`] to avoid username enumeration.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    #[error("{0} already exists")]
    Duplicate(IdentityField),
    #[error("invalid credentials")]
    AuthenticationFailed,
    #[error("invalid token")]
    TokenInvalid,
    #[error("token expired")]
    TokenExpired,
    #[error("insufficient role")]
    Forbidden,
    #[error("user not found: {0}")]
    UnknownUser(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl From<session_token::Error> for AuthError {
    fn from(err: session_token::Error) -> Self {
        match err {
            session_token::Error::Expired => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid,
        }
    }
}
