//! Session-token issuance and validation.
//!
//! Wraps the `session_token` crate with the process-wide signing secret and
//! TTL. The secret is constructed once at startup and never rotated
//! mid-process; rotation is a deployment concern.

use chrono::{DateTime, TimeZone, Utc};
use secrecy::{ExposeSecret, SecretString};
use session_token::{SessionTokenClaims, TOKEN_VERSION, sign_hs256, verify_hs256};

use super::error::AuthError;
use super::user::Role;

pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 24 * 60 * 60;

/// Token issuance configuration: signing secret plus TTL.
#[derive(Clone, Debug)]
pub struct TokenConfig {
    secret: SecretString,
    ttl_seconds: i64,
}

impl TokenConfig {
    #[must_use]
    pub fn new(secret: SecretString) -> Self {
        Self {
            secret,
            ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_ttl_seconds(mut self, seconds: i64) -> Self {
        self.ttl_seconds = seconds;
        self
    }
}

/// A freshly issued bearer token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Authenticated caller identity recovered from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub subject: String,
    pub role: Role,
}

/// Issues and validates signed session tokens.
pub struct TokenIssuer {
    config: TokenConfig,
}

impl TokenIssuer {
    #[must_use]
    pub fn new(config: TokenConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn ttl_seconds(&self) -> i64 {
        self.config.ttl_seconds
    }

    /// Issue a token for the given subject and role, expiring after the
    /// configured TTL.
    ///
    /// # Errors
    /// Returns an error if signing fails.
    pub fn issue(&self, subject: &str, role: Role) -> Result<IssuedToken, AuthError> {
        let now = Utc::now().timestamp();
        self.issue_at(subject, role, now)
    }

    /// Validate a bearer token and recover its principal.
    ///
    /// # Errors
    /// [`AuthError::TokenExpired`] once past expiry,
    /// [`AuthError::TokenInvalid`] for any malformed or tampered token.
    pub fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    pub(super) fn issue_at(
        &self,
        subject: &str,
        role: Role,
        now_unix_seconds: i64,
    ) -> Result<IssuedToken, AuthError> {
        let expires = now_unix_seconds + self.config.ttl_seconds;
        let claims = SessionTokenClaims {
            v: TOKEN_VERSION,
            sub: subject.to_string(),
            role: role.as_str().to_string(),
            iat: now_unix_seconds,
            exp: expires,
        };
        let token = sign_hs256(self.config.secret.expose_secret().as_bytes(), &claims)?;
        let expires_at = Utc
            .timestamp_opt(expires, 0)
            .single()
            .ok_or(AuthError::TokenInvalid)?;
        Ok(IssuedToken { token, expires_at })
    }

    pub(super) fn verify_at(
        &self,
        token: &str,
        now_unix_seconds: i64,
    ) -> Result<Principal, AuthError> {
        let claims = verify_hs256(
            token,
            self.config.secret.expose_secret().as_bytes(),
            now_unix_seconds,
        )?;
        let role = Role::parse(&claims.role).ok_or(AuthError::TokenInvalid)?;
        Ok(Principal {
            subject: claims.sub,
            role,
        })
    }
}
