//! Login and registration orchestration.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, warn};
use utoipa::ToSchema;

use super::error::{AuthError, IdentityField};
use super::password::CredentialHasher;
use super::store::{NewUser, SaveOutcome, UserStore};
use super::tokens::TokenIssuer;
use super::user::{Role, UserProfile};
use super::validate::{normalize_email, validate_registration};

/// Registration input. Role is never part of this request: self-registration
/// always yields `USER`, and elevation is a separate admin-gated operation.
/// Unknown fields (a requested role included) fail deserialization.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// A successful login or registration: bearer token plus public profile.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub profile: UserProfile,
}

/// Orchestrates credential verification and registration.
pub struct AuthService {
    users: Arc<dyn UserStore>,
    hasher: Arc<CredentialHasher>,
    tokens: Arc<TokenIssuer>,
}

impl AuthService {
    #[must_use]
    pub fn new(
        users: Arc<dyn UserStore>,
        hasher: Arc<CredentialHasher>,
        tokens: Arc<TokenIssuer>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    /// Verify credentials and issue a session token.
    ///
    /// # Errors
    /// [`AuthError::AuthenticationFailed`] for unknown usernames, disabled
    /// accounts, and wrong passwords alike; store failures propagate.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthSession, AuthError> {
        let Some(user) = self.users.find_by_username(username).await? else {
            debug!(username, "login rejected: unknown username");
            return Err(AuthError::AuthenticationFailed);
        };

        if !user.enabled {
            warn!(username, "login rejected: account disabled");
            return Err(AuthError::AuthenticationFailed);
        }

        if !self.hasher.verify(password, &user.password_hash) {
            debug!(username, "login rejected: password mismatch");
            return Err(AuthError::AuthenticationFailed);
        }

        let issued = self.tokens.issue(&user.username, user.role)?;
        debug!(username, role = %user.role, "login succeeded");
        Ok(AuthSession {
            token: issued.token,
            expires_at: issued.expires_at,
            profile: user.profile(),
        })
    }

    /// Validate, persist, and log in a new user.
    ///
    /// Exactly one store mutation happens on success; none on failure. The
    /// existence pre-checks narrow the duplicate race window, and a
    /// save-time unique violation is still reported as a duplicate.
    ///
    /// # Errors
    /// [`AuthError::Validation`] with every failing field,
    /// [`AuthError::Duplicate`] naming the colliding field.
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthSession, AuthError> {
        let errors = validate_registration(&request);
        if !errors.is_empty() {
            return Err(AuthError::Validation(errors));
        }

        let email = normalize_email(&request.email);
        if self.users.exists_by_username(&request.username).await? {
            return Err(AuthError::Duplicate(IdentityField::Username));
        }
        if self.users.exists_by_email(&email).await? {
            return Err(AuthError::Duplicate(IdentityField::Email));
        }

        let password_hash = self.hasher.hash(&request.password)?;
        let outcome = self
            .users
            .save(NewUser {
                username: request.username,
                password_hash,
                full_name: request.full_name.trim().to_string(),
                email,
                phone: request.phone,
                role: Role::User,
                enabled: true,
            })
            .await?;

        let user = match outcome {
            SaveOutcome::Created(user) => user,
            SaveOutcome::Duplicate(field) => return Err(AuthError::Duplicate(field)),
        };

        let issued = self.tokens.issue(&user.username, user.role)?;
        debug!(username = %user.username, "registration succeeded");
        Ok(AuthSession {
            token: issued.token,
            expires_at: issued.expires_at,
            profile: user.profile(),
        })
    }
}
