//! Persistence contract for user records, plus its Postgres and in-memory
//! implementations.

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use super::error::{IdentityField, StoreError};
use super::user::{Role, User};

/// Fields needed to persist a new user. The id is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    pub enabled: bool,
}

/// Outcome when attempting to persist a new user.
///
/// A unique violation at save time is an outcome, not a store failure: the
/// existence pre-checks narrow the race window but cannot eliminate it.
#[derive(Debug)]
pub enum SaveOutcome {
    Created(User),
    Duplicate(IdentityField),
}

/// Persistence contract consumed by the auth core.
///
/// Each call is atomic with respect to itself; no cross-call transactional
/// isolation is assumed.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn exists_by_username(&self, username: &str) -> Result<bool, StoreError>;
    async fn exists_by_email(&self, email: &str) -> Result<bool, StoreError>;
    async fn save(&self, user: NewUser) -> Result<SaveOutcome, StoreError>;
    /// Change a user's role. Returns `false` when no such user exists.
    async fn set_role(&self, username: &str, role: Role) -> Result<bool, StoreError>;
}

// ─── Postgres ────────────────────────────────────────────────────────────────

/// Postgres-backed [`UserStore`].
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_where(&self, query: &str, value: &str) -> Result<Option<User>, StoreError> {
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(value)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to look up user")?;

        row.map(user_from_row).transpose()
    }
}

const USER_COLUMNS: &str =
    "id, username, password_hash, full_name, email, phone, role, enabled, created_at";

fn user_from_row(row: sqlx::postgres::PgRow) -> Result<User, StoreError> {
    let role: String = row.get("role");
    let role = Role::parse(&role)
        .ok_or_else(|| anyhow::anyhow!("unknown role in users table: {role}"))?;
    Ok(User {
        id: row.get("id"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        full_name: row.get("full_name"),
        email: row.get("email"),
        phone: row.get("phone"),
        role,
        enabled: row.get("enabled"),
        created_at: row.get("created_at"),
    })
}

fn duplicate_field(err: &sqlx::Error) -> Option<IdentityField> {
    let sqlx::Error::Database(db_err) = err else {
        return None;
    };
    if db_err.code().as_deref() != Some("23505") {
        return None;
    }
    // The constraint name tells us which identity field collided.
    match db_err.constraint() {
        Some(name) if name.contains("email") => Some(IdentityField::Email),
        Some(_) => Some(IdentityField::Username),
        None => Some(IdentityField::Username),
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let query =
            format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        self.find_where(&query, username).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        self.find_where(&query, email).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query.as_str()
        );
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to look up user by id")?;
        row.map(user_from_row).transpose()
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, StoreError> {
        let query = "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1) AS exists";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(username)
            .fetch_one(&self.pool)
            .instrument(span)
            .await
            .context("failed to check username existence")?;
        Ok(row.get("exists"))
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, StoreError> {
        let query = "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1) AS exists";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(email)
            .fetch_one(&self.pool)
            .instrument(span)
            .await
            .context("failed to check email existence")?;
        Ok(row.get("exists"))
    }

    async fn save(&self, user: NewUser) -> Result<SaveOutcome, StoreError> {
        let query = r"
            INSERT INTO users
                (id, username, password_hash, full_name, email, phone, role, enabled, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
            RETURNING created_at
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let id = Uuid::now_v7();
        let result = sqlx::query(query)
            .bind(id)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(&user.full_name)
            .bind(&user.email)
            .bind(&user.phone)
            .bind(user.role.as_str())
            .bind(user.enabled)
            .fetch_one(&self.pool)
            .instrument(span)
            .await;

        match result {
            Ok(row) => Ok(SaveOutcome::Created(User {
                id,
                username: user.username,
                password_hash: user.password_hash,
                full_name: user.full_name,
                email: user.email,
                phone: user.phone,
                role: user.role,
                enabled: user.enabled,
                created_at: row.get("created_at"),
            })),
            Err(err) => match duplicate_field(&err) {
                Some(field) => Ok(SaveOutcome::Duplicate(field)),
                None => Err(StoreError::from(
                    anyhow::Error::from(err).context("failed to insert user"),
                )),
            },
        }
    }

    async fn set_role(&self, username: &str, role: Role) -> Result<bool, StoreError> {
        let query = "UPDATE users SET role = $2 WHERE username = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(username)
            .bind(role.as_str())
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to update user role")?;
        Ok(result.rows_affected() > 0)
    }
}

// ─── In-memory ───────────────────────────────────────────────────────────────

/// In-memory [`UserStore`] used by tests and local development.
#[derive(Default)]
pub struct MemoryUserStore {
    users: tokio::sync::RwLock<Vec<User>>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, StoreError> {
        Ok(self.find_by_username(username).await?.is_some())
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, StoreError> {
        Ok(self.find_by_email(email).await?.is_some())
    }

    async fn save(&self, user: NewUser) -> Result<SaveOutcome, StoreError> {
        // Uniqueness is checked under the write lock, mirroring the database
        // unique constraints.
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.username == user.username) {
            return Ok(SaveOutcome::Duplicate(IdentityField::Username));
        }
        if users.iter().any(|u| u.email == user.email) {
            return Ok(SaveOutcome::Duplicate(IdentityField::Email));
        }
        let persisted = User {
            id: Uuid::now_v7(),
            username: user.username,
            password_hash: user.password_hash,
            full_name: user.full_name,
            email: user.email,
            phone: user.phone,
            role: user.role,
            enabled: user.enabled,
            created_at: Utc::now(),
        };
        users.push(persisted.clone());
        Ok(SaveOutcome::Created(persisted))
    }

    async fn set_role(&self, username: &str, role: Role) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;
        match users.iter_mut().find(|u| u.username == username) {
            Some(user) => {
                user.role = role;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
