//! Authentication and authorization core.
//!
//! This module owns credential registration and verification, session-token
//! issuance and validation, and role-derived access decisions.
//!
//! ## Credentials
//!
//! Passwords are hashed with Argon2id (PHC string, per-call random salt).
//! The stored hash never leaves this module; public profile views carry
//! username, full name, email, and role only.
//!
//! ## Session tokens
//!
//! Tokens are self-contained HS256 strings (`session_token` crate) carrying
//! subject, role, and expiry. Validation is a pure signature + expiry check;
//! no server-side session store is consulted, so there is no revocation
//! before expiry.
//!
//! > **Warning:** rotating the signing secret invalidates every outstanding
//! > session.
//!
//! ## Roles
//!
//! Roles are a closed two-valued enum (`USER`, `ADMIN`). `ADMIN` satisfies
//! any `USER`-level requirement; the reverse never holds. Self-registration
//! always yields `USER`; the only path to `ADMIN` is the admin-gated role
//! elevation in [`admin`].

pub(crate) mod admin;
mod error;
mod gate;
mod password;
mod service;
pub(crate) mod store;
mod tokens;
mod user;
mod validate;

pub use admin::RoleAdmin;
pub use error::{AuthError, IdentityField, StoreError};
pub use gate::AuthorizationGate;
pub use password::{CredentialHasher, HasherConfig};
pub use service::{AuthService, AuthSession, RegisterRequest};
pub use store::{MemoryUserStore, NewUser, PgUserStore, SaveOutcome, UserStore};
pub use tokens::{IssuedToken, Principal, TokenConfig, TokenIssuer};
pub use user::{Role, User, UserProfile};
pub use validate::FieldError;
