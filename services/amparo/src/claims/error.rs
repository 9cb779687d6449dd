//! Error taxonomy for claim operations.

use thiserror::Error;

use crate::auth::{AuthError, FieldError, StoreError};

use super::model::ClaimStatus;

/// Claim domain errors.
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    #[error("cannot transition claim from {from} to {to}")]
    IllegalTransition { from: ClaimStatus, to: ClaimStatus },
    #[error("claim not found")]
    NotFound,
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
