//! User identity records and roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Access role attached to a user and carried inside session tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    /// Stable wire string, used in tokens and the database.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }

    /// Parse a wire string back into a role.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "USER" => Some(Role::User),
            "ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }

    /// Role hierarchy check: `Admin` satisfies any requirement, `User`
    /// satisfies only `User`.
    #[must_use]
    pub fn satisfies(self, required: Role) -> bool {
        match required {
            Role::User => true,
            Role::Admin => self == Role::Admin,
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted user record.
///
/// # Invariants
/// - `username` and `email` are each globally unique.
/// - `password_hash` is a PHC string; the raw password is never stored.
/// - Disabled users cannot authenticate.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Public view of the user, safe to return to clients.
    #[must_use]
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            username: self.username.clone(),
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// Public profile view: never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_wire_strings_round_trip() {
        assert_eq!(Role::parse(Role::User.as_str()), Some(Role::User));
        assert_eq!(Role::parse(Role::Admin.as_str()), Some(Role::Admin));
        assert_eq!(Role::parse("reviewer"), None);
        assert_eq!(Role::parse("admin"), None);
    }

    #[test]
    fn admin_satisfies_user_but_not_vice_versa() {
        assert!(Role::Admin.satisfies(Role::User));
        assert!(Role::Admin.satisfies(Role::Admin));
        assert!(Role::User.satisfies(Role::User));
        assert!(!Role::User.satisfies(Role::Admin));
    }

    #[test]
    fn profile_never_carries_the_hash() {
        let user = User {
            id: Uuid::nil(),
            username: "alice".to_string(),
            password_hash: "$argon2id$v=19$...".to_string(),
            full_name: "Alice Smith".to_string(),
            email: "a@x.com".to_string(),
            phone: None,
            role: Role::User,
            enabled: true,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(user.profile()).expect("profile serializes");
        assert_eq!(json["username"], "alice");
        assert_eq!(json["role"], "USER");
        assert!(json.get("password_hash").is_none());
    }
}
