//! Administrative role elevation.
//!
//! Self-registration never grants `ADMIN`; this operation is the only path
//! that does, and it requires an `ADMIN` caller itself.

use std::sync::Arc;

use tracing::info;

use super::error::AuthError;
use super::gate::AuthorizationGate;
use super::store::UserStore;
use super::user::{Role, UserProfile};

/// Admin-gated role management.
pub struct RoleAdmin {
    gate: Arc<AuthorizationGate>,
    users: Arc<dyn UserStore>,
}

impl RoleAdmin {
    #[must_use]
    pub fn new(gate: Arc<AuthorizationGate>, users: Arc<dyn UserStore>) -> Self {
        Self { gate, users }
    }

    /// Change `username`'s role. The actor must present an `ADMIN` token.
    ///
    /// # Errors
    /// Gate errors propagate; [`AuthError::UnknownUser`] when the target
    /// does not exist.
    pub async fn set_role(
        &self,
        actor_bearer: &str,
        username: &str,
        role: Role,
    ) -> Result<UserProfile, AuthError> {
        let actor = self.gate.authorize(actor_bearer, Role::Admin)?;

        if !self.users.set_role(username, role).await? {
            return Err(AuthError::UnknownUser(username.to_string()));
        }

        info!(actor = %actor.subject, target = username, role = %role, "role changed");

        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| AuthError::UnknownUser(username.to_string()))?;
        Ok(user.profile())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::{MemoryUserStore, NewUser, UserStore};
    use crate::auth::tokens::{TokenConfig, TokenIssuer};
    use secrecy::SecretString;

    async fn setup() -> (RoleAdmin, Arc<TokenIssuer>) {
        let store = Arc::new(MemoryUserStore::new());
        store
            .save(NewUser {
                username: "alice".to_string(),
                password_hash: "$argon2id$stub".to_string(),
                full_name: "Alice".to_string(),
                email: "a@x.com".to_string(),
                phone: None,
                role: Role::User,
                enabled: true,
            })
            .await
            .expect("seed user");
        let tokens = Arc::new(TokenIssuer::new(TokenConfig::new(SecretString::from(
            "test-secret-key-at-least-32-bytes!!",
        ))));
        let gate = Arc::new(AuthorizationGate::new(tokens.clone()));
        (RoleAdmin::new(gate, store), tokens)
    }

    #[tokio::test]
    async fn admin_can_elevate_a_user() -> Result<(), AuthError> {
        let (admin, tokens) = setup().await;
        let token = tokens.issue("root", Role::Admin)?;

        let profile = admin.set_role(&token.token, "alice", Role::Admin).await?;
        assert_eq!(profile.role, Role::Admin);
        Ok(())
    }

    #[tokio::test]
    async fn non_admin_callers_are_forbidden() -> Result<(), AuthError> {
        let (admin, tokens) = setup().await;
        let token = tokens.issue("alice", Role::User)?;

        let result = admin.set_role(&token.token, "alice", Role::Admin).await;
        assert!(matches!(result, Err(AuthError::Forbidden)));
        Ok(())
    }

    #[tokio::test]
    async fn unknown_target_is_reported() -> Result<(), AuthError> {
        let (admin, tokens) = setup().await;
        let token = tokens.issue("root", Role::Admin)?;

        let result = admin.set_role(&token.token, "ghost", Role::Admin).await;
        assert!(matches!(result, Err(AuthError::UnknownUser(name)) if name == "ghost"));
        Ok(())
    }
}
