//! # Amparo (Claims Intake & Access Management)
//!
//! `amparo` authenticates and authorizes end users of a disaster-relief
//! claims-intake service and tracks the lifecycle of submitted claims.
//!
//! ## Authentication
//!
//! Credentials are verified against Argon2id hashes; a successful login or
//! registration issues a **self-contained HS256 session token** carrying the
//! subject and role. Validation is a pure signature + expiry check with no
//! server-side session store, and therefore no revocation before expiry.
//!
//! ## Authorization
//!
//! Every claim-mutating operation passes through a single gate that
//! validates the bearer token and checks the caller's role. Roles are a
//! closed `USER`/`ADMIN` pair; `ADMIN` satisfies `USER`-level requirements,
//! never the reverse. Self-registration always yields `USER`; role
//! elevation is a distinct, admin-gated operation.
//!
//! ## Claim lifecycle
//!
//! Claims start at `PENDING` and move through a fixed state machine
//! (`UNDER_REVIEW`, then `APPROVED`/`REJECTED`, then `PAID` from
//! `APPROVED`), with reviewer attribution and timestamps set by explicit
//! transition logic rather than persistence hooks.

pub mod api;
pub mod auth;
pub mod claims;
pub mod cli;

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
