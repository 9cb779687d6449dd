//! Claim workflow orchestration: authorization gate → load → transition →
//! persist.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{AuthError, AuthorizationGate, Role, UserStore};

use super::error::ClaimError;
use super::model::{Claim, ClaimStatus, NewClaimRequest, TransitionRequest};
use super::store::ClaimStore;

/// Per-status claim counts for the review dashboard.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClaimStatistics {
    pub total: i64,
    pub pending: i64,
    pub under_review: i64,
    pub approved: i64,
    pub rejected: i64,
    pub paid: i64,
}

/// Drives the claim state machine behind the authorization gate.
pub struct ClaimWorkflow {
    gate: Arc<AuthorizationGate>,
    users: Arc<dyn UserStore>,
    claims: Arc<dyn ClaimStore>,
}

impl ClaimWorkflow {
    #[must_use]
    pub fn new(
        gate: Arc<AuthorizationGate>,
        users: Arc<dyn UserStore>,
        claims: Arc<dyn ClaimStore>,
    ) -> Self {
        Self {
            gate,
            users,
            claims,
        }
    }

    /// Resolve a token subject to its user id. A valid token whose subject
    /// no longer resolves means the bearer must re-authenticate.
    async fn resolve_user_id(&self, subject: &str) -> Result<Uuid, ClaimError> {
        let user = self
            .users
            .find_by_username(subject)
            .await
            .map_err(AuthError::from)?
            .ok_or(AuthError::AuthenticationFailed)?;
        Ok(user.id)
    }

    /// Create a claim owned by the authenticated caller, at `PENDING`.
    ///
    /// # Errors
    /// Gate errors propagate; [`ClaimError::Validation`] for bad fields.
    pub async fn submit(
        &self,
        bearer: &str,
        request: NewClaimRequest,
    ) -> Result<Claim, ClaimError> {
        let principal = self.gate.authorize(bearer, Role::User)?;
        let owner_id = self.resolve_user_id(&principal.subject).await?;

        let claim = Claim::submit(owner_id, request, Utc::now())?;
        self.claims.insert(&claim).await?;
        info!(claim_id = %claim.id, owner = %principal.subject, "claim submitted");
        Ok(claim)
    }

    /// Apply a status transition. The gate requires `ADMIN` before the state
    /// machine is consulted.
    ///
    /// # Errors
    /// [`AuthError::Forbidden`] (wrapped) for non-admin callers,
    /// [`ClaimError::NotFound`], [`ClaimError::IllegalTransition`], and
    /// side-effect validation failures from the state machine.
    pub async fn transition(
        &self,
        bearer: &str,
        claim_id: Uuid,
        target: ClaimStatus,
        request: &TransitionRequest,
    ) -> Result<Claim, ClaimError> {
        let principal = self.gate.authorize(bearer, Role::Admin)?;
        let reviewer_id = self.resolve_user_id(&principal.subject).await?;

        let mut claim = self
            .claims
            .find_by_id(claim_id)
            .await?
            .ok_or(ClaimError::NotFound)?;

        let from = claim.status;
        claim.apply_transition(target, request, reviewer_id, Utc::now())?;
        self.claims.update(&claim).await?;
        info!(
            claim_id = %claim.id,
            reviewer = %principal.subject,
            %from,
            to = %target,
            "claim transitioned"
        );
        Ok(claim)
    }

    /// The caller's own claims, newest first.
    ///
    /// # Errors
    /// Gate and store errors propagate.
    pub async fn list_mine(&self, bearer: &str) -> Result<Vec<Claim>, ClaimError> {
        let principal = self.gate.authorize(bearer, Role::User)?;
        let owner_id = self.resolve_user_id(&principal.subject).await?;
        Ok(self.claims.list_by_owner(owner_id).await?)
    }

    /// All claims, optionally filtered by status. `ADMIN` only.
    ///
    /// # Errors
    /// Gate and store errors propagate.
    pub async fn list_all(
        &self,
        bearer: &str,
        status: Option<ClaimStatus>,
    ) -> Result<Vec<Claim>, ClaimError> {
        self.gate.authorize(bearer, Role::Admin)?;
        let claims = match status {
            Some(status) => self.claims.list_by_status(status).await?,
            None => self.claims.list_all().await?,
        };
        Ok(claims)
    }

    /// Fetch a single claim. Visible to its owner and to `ADMIN` callers.
    ///
    /// # Errors
    /// [`AuthError::Forbidden`] (wrapped) for other callers.
    pub async fn get(&self, bearer: &str, claim_id: Uuid) -> Result<Claim, ClaimError> {
        let principal = self.gate.authorize(bearer, Role::User)?;
        let claim = self
            .claims
            .find_by_id(claim_id)
            .await?
            .ok_or(ClaimError::NotFound)?;

        if principal.role != Role::Admin {
            let caller_id = self.resolve_user_id(&principal.subject).await?;
            if claim.owner_user_id != caller_id {
                debug!(claim_id = %claim_id, caller = %principal.subject, "claim access denied");
                return Err(ClaimError::Auth(AuthError::Forbidden));
            }
        }
        Ok(claim)
    }

    /// Per-status counts. `ADMIN` only.
    ///
    /// # Errors
    /// Gate and store errors propagate.
    pub async fn statistics(&self, bearer: &str) -> Result<ClaimStatistics, ClaimError> {
        self.gate.authorize(bearer, Role::Admin)?;

        let mut counts = [0i64; ClaimStatus::ALL.len()];
        for (slot, status) in counts.iter_mut().zip(ClaimStatus::ALL) {
            *slot = self.claims.count_by_status(status).await?;
        }
        let [pending, under_review, approved, rejected, paid] = counts;
        Ok(ClaimStatistics {
            total: counts.iter().sum(),
            pending,
            under_review,
            approved,
            rejected,
            paid,
        })
    }
}
