//! Role-derived access decisions.
//!
//! This is the single choke point every claim-mutating operation passes
//! through: validate the bearer token, then check the caller's role against
//! the requirement.

use std::sync::Arc;

use super::error::AuthError;
use super::tokens::{Principal, TokenIssuer};
use super::user::Role;

/// Derives the caller's identity from a bearer token and decides whether an
/// operation is permitted.
pub struct AuthorizationGate {
    tokens: Arc<TokenIssuer>,
}

impl AuthorizationGate {
    #[must_use]
    pub fn new(tokens: Arc<TokenIssuer>) -> Self {
        Self { tokens }
    }

    /// Validate the token and require at least `required_role`.
    ///
    /// # Errors
    /// [`AuthError::TokenInvalid`] / [`AuthError::TokenExpired`] from token
    /// validation, [`AuthError::Forbidden`] when the role is insufficient.
    pub fn authorize(&self, bearer: &str, required_role: Role) -> Result<Principal, AuthError> {
        let principal = self.tokens.verify(bearer)?;
        if !principal.role.satisfies(required_role) {
            return Err(AuthError::Forbidden);
        }
        Ok(principal)
    }
}
