//! Persistence contract for claims, plus its Postgres and in-memory
//! implementations.

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use crate::auth::StoreError;

use super::model::{Claim, ClaimStatus};

/// Persistence contract consumed by the claim workflow.
#[async_trait]
pub trait ClaimStore: Send + Sync {
    async fn insert(&self, claim: &Claim) -> Result<(), StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Claim>, StoreError>;
    /// Persist the current state of an existing claim.
    async fn update(&self, claim: &Claim) -> Result<(), StoreError>;
    /// A user's own claims, newest first.
    async fn list_by_owner(&self, owner_user_id: Uuid) -> Result<Vec<Claim>, StoreError>;
    async fn list_by_status(&self, status: ClaimStatus) -> Result<Vec<Claim>, StoreError>;
    async fn list_all(&self) -> Result<Vec<Claim>, StoreError>;
    async fn count_by_status(&self, status: ClaimStatus) -> Result<i64, StoreError>;
}

// ─── Postgres ────────────────────────────────────────────────────────────────

/// Postgres-backed [`ClaimStore`].
#[derive(Clone)]
pub struct PgClaimStore {
    pool: PgPool,
}

impl PgClaimStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const CLAIM_COLUMNS: &str = "id, owner_user_id, disaster_type, description, incident_date, \
     location, request_amount_cents, status, reviewer_id, review_comments, \
     approved_amount_cents, created_at, updated_at, reviewed_at";

fn claim_from_row(row: &sqlx::postgres::PgRow) -> Result<Claim, StoreError> {
    let status: String = row.get("status");
    let status = ClaimStatus::parse(&status)
        .ok_or_else(|| anyhow::anyhow!("unknown status in claims table: {status}"))?;
    Ok(Claim {
        id: row.get("id"),
        owner_user_id: row.get("owner_user_id"),
        disaster_type: row.get("disaster_type"),
        description: row.get("description"),
        incident_date: row.get("incident_date"),
        location: row.get("location"),
        request_amount_cents: row.get("request_amount_cents"),
        status,
        reviewer_id: row.get("reviewer_id"),
        review_comments: row.get("review_comments"),
        approved_amount_cents: row.get("approved_amount_cents"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        reviewed_at: row.get("reviewed_at"),
    })
}

fn select_span(query: &str) -> tracing::Span {
    tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    )
}

#[async_trait]
impl ClaimStore for PgClaimStore {
    async fn insert(&self, claim: &Claim) -> Result<(), StoreError> {
        let query = r"
            INSERT INTO claims
                (id, owner_user_id, disaster_type, description, incident_date, location,
                 request_amount_cents, status, reviewer_id, review_comments,
                 approved_amount_cents, created_at, updated_at, reviewed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        sqlx::query(query)
            .bind(claim.id)
            .bind(claim.owner_user_id)
            .bind(&claim.disaster_type)
            .bind(&claim.description)
            .bind(claim.incident_date)
            .bind(&claim.location)
            .bind(claim.request_amount_cents)
            .bind(claim.status.as_str())
            .bind(claim.reviewer_id)
            .bind(&claim.review_comments)
            .bind(claim.approved_amount_cents)
            .bind(claim.created_at)
            .bind(claim.updated_at)
            .bind(claim.reviewed_at)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to insert claim")?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Claim>, StoreError> {
        let query = format!("SELECT {CLAIM_COLUMNS} FROM claims WHERE id = $1");
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
            .context("failed to look up claim")?;
        row.as_ref().map(claim_from_row).transpose()
    }

    async fn update(&self, claim: &Claim) -> Result<(), StoreError> {
        let query = r"
            UPDATE claims
            SET status = $2,
                reviewer_id = $3,
                review_comments = $4,
                approved_amount_cents = $5,
                updated_at = $6,
                reviewed_at = $7
            WHERE id = $1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        sqlx::query(query)
            .bind(claim.id)
            .bind(claim.status.as_str())
            .bind(claim.reviewer_id)
            .bind(&claim.review_comments)
            .bind(claim.approved_amount_cents)
            .bind(claim.updated_at)
            .bind(claim.reviewed_at)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to update claim")?;
        Ok(())
    }

    async fn list_by_owner(&self, owner_user_id: Uuid) -> Result<Vec<Claim>, StoreError> {
        let query = format!(
            "SELECT {CLAIM_COLUMNS} FROM claims WHERE owner_user_id = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query(&query)
            .bind(owner_user_id)
            .fetch_all(&self.pool)
            .instrument(select_span(&query))
            .await
            .context("failed to list claims by owner")?;
        rows.iter().map(claim_from_row).collect()
    }

    async fn list_by_status(&self, status: ClaimStatus) -> Result<Vec<Claim>, StoreError> {
        let query = format!(
            "SELECT {CLAIM_COLUMNS} FROM claims WHERE status = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query(&query)
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .instrument(select_span(&query))
            .await
            .context("failed to list claims by status")?;
        rows.iter().map(claim_from_row).collect()
    }

    async fn list_all(&self) -> Result<Vec<Claim>, StoreError> {
        let query = format!("SELECT {CLAIM_COLUMNS} FROM claims ORDER BY created_at DESC");
        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .instrument(select_span(&query))
            .await
            .context("failed to list claims")?;
        rows.iter().map(claim_from_row).collect()
    }

    async fn count_by_status(&self, status: ClaimStatus) -> Result<i64, StoreError> {
        let query = "SELECT COUNT(*) AS count FROM claims WHERE status = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .instrument(span)
            .await
            .context("failed to count claims")?;
        Ok(row.get("count"))
    }
}

// ─── In-memory ───────────────────────────────────────────────────────────────

/// In-memory [`ClaimStore`] used by tests and local development.
#[derive(Default)]
pub struct MemoryClaimStore {
    claims: tokio::sync::RwLock<Vec<Claim>>,
}

impl MemoryClaimStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClaimStore for MemoryClaimStore {
    async fn insert(&self, claim: &Claim) -> Result<(), StoreError> {
        self.claims.write().await.push(claim.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Claim>, StoreError> {
        let claims = self.claims.read().await;
        Ok(claims.iter().find(|c| c.id == id).cloned())
    }

    async fn update(&self, claim: &Claim) -> Result<(), StoreError> {
        let mut claims = self.claims.write().await;
        if let Some(existing) = claims.iter_mut().find(|c| c.id == claim.id) {
            *existing = claim.clone();
        }
        Ok(())
    }

    async fn list_by_owner(&self, owner_user_id: Uuid) -> Result<Vec<Claim>, StoreError> {
        let claims = self.claims.read().await;
        let mut owned: Vec<Claim> = claims
            .iter()
            .filter(|c| c.owner_user_id == owner_user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn list_by_status(&self, status: ClaimStatus) -> Result<Vec<Claim>, StoreError> {
        let claims = self.claims.read().await;
        let mut matching: Vec<Claim> = claims
            .iter()
            .filter(|c| c.status == status)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }

    async fn list_all(&self) -> Result<Vec<Claim>, StoreError> {
        let claims = self.claims.read().await;
        let mut all = claims.clone();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn count_by_status(&self, status: ClaimStatus) -> Result<i64, StoreError> {
        let claims = self.claims.read().await;
        Ok(claims.iter().filter(|c| c.status == status).count() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::model::NewClaimRequest;
    use chrono::{TimeZone, Utc};

    fn claim_at(owner: Uuid, hour: u32) -> Claim {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, hour, 0, 0).single().expect("valid timestamp");
        Claim::submit(
            owner,
            NewClaimRequest {
                disaster_type: "Flood".to_string(),
                description: "Basement flooded, water damage throughout".to_string(),
                incident_date: now,
                location: "Albany, NY".to_string(),
                request_amount_cents: 100_000,
            },
            now,
        )
        .expect("valid claim")
    }

    #[tokio::test]
    async fn list_by_owner_is_newest_first() -> Result<(), StoreError> {
        let store = MemoryClaimStore::new();
        let owner = Uuid::now_v7();
        let earlier = claim_at(owner, 8);
        let later = claim_at(owner, 14);
        let other = claim_at(Uuid::now_v7(), 10);
        store.insert(&earlier).await?;
        store.insert(&later).await?;
        store.insert(&other).await?;

        let listed = store.list_by_owner(owner).await?;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, later.id);
        assert_eq!(listed[1].id, earlier.id);
        Ok(())
    }

    #[tokio::test]
    async fn update_replaces_the_stored_claim() -> Result<(), StoreError> {
        let store = MemoryClaimStore::new();
        let owner = Uuid::now_v7();
        let mut claim = claim_at(owner, 8);
        store.insert(&claim).await?;

        claim.status = ClaimStatus::UnderReview;
        store.update(&claim).await?;

        let fetched = store.find_by_id(claim.id).await?.expect("claim exists");
        assert_eq!(fetched.status, ClaimStatus::UnderReview);
        Ok(())
    }

    #[tokio::test]
    async fn count_by_status_tracks_transitions() -> Result<(), StoreError> {
        let store = MemoryClaimStore::new();
        let owner = Uuid::now_v7();
        store.insert(&claim_at(owner, 8)).await?;
        store.insert(&claim_at(owner, 9)).await?;

        assert_eq!(store.count_by_status(ClaimStatus::Pending).await?, 2);
        assert_eq!(store.count_by_status(ClaimStatus::Paid).await?, 0);
        Ok(())
    }
}
