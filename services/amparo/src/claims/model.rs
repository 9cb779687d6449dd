//! Claim records and the status state machine.
//!
//! Timestamps are set by explicit constructor and transition logic, never by
//! persistence hooks, so lifecycle behavior is unit-testable without a
//! database.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::FieldError;

use super::error::ClaimError;

pub const DESCRIPTION_MIN: usize = 20;
pub const DESCRIPTION_MAX: usize = 2000;

/// Claim lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimStatus {
    Pending,
    UnderReview,
    Approved,
    Rejected,
    Paid,
}

impl ClaimStatus {
    /// Every status, in lifecycle order. Used for per-status statistics.
    pub const ALL: [ClaimStatus; 5] = [
        ClaimStatus::Pending,
        ClaimStatus::UnderReview,
        ClaimStatus::Approved,
        ClaimStatus::Rejected,
        ClaimStatus::Paid,
    ];

    /// Stable wire string, used in the API and the database.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ClaimStatus::Pending => "PENDING",
            ClaimStatus::UnderReview => "UNDER_REVIEW",
            ClaimStatus::Approved => "APPROVED",
            ClaimStatus::Rejected => "REJECTED",
            ClaimStatus::Paid => "PAID",
        }
    }

    /// Parse a wire string back into a status.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        ClaimStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
    }
}

impl core::fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input for creating a claim. The owner and initial status are never taken
/// from the request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewClaimRequest {
    pub disaster_type: String,
    pub description: String,
    pub incident_date: DateTime<Utc>,
    pub location: String,
    /// Requested relief amount in cents.
    pub request_amount_cents: i64,
}

/// Fields accompanying a status transition.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRequest {
    #[serde(default)]
    pub review_comments: Option<String>,
    /// Approved relief amount in cents; required when approving.
    #[serde(default)]
    pub approved_amount_cents: Option<i64>,
}

/// A relief request.
///
/// # Invariants
/// - `status` changes only through [`Claim::apply_transition`].
/// - `approved_amount_cents` is set only on the transition into `APPROVED`
///   and never exceeds `request_amount_cents`.
/// - `reviewer_id` and `reviewed_at` are set together, only by reviewer
///   transitions.
/// - `created_at` is immutable; `updated_at` refreshes on every successful
///   transition.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    pub id: Uuid,
    pub owner_user_id: Uuid,
    pub disaster_type: String,
    pub description: String,
    pub incident_date: DateTime<Utc>,
    pub location: String,
    pub request_amount_cents: i64,
    pub status: ClaimStatus,
    pub reviewer_id: Option<Uuid>,
    pub review_comments: Option<String>,
    pub approved_amount_cents: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

fn validate_new_claim(request: &NewClaimRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if request.disaster_type.trim().is_empty() {
        errors.push(FieldError {
            field: "disasterType",
            message: "disaster type is required".to_string(),
        });
    }
    let description_len = request.description.trim().chars().count();
    if !(DESCRIPTION_MIN..=DESCRIPTION_MAX).contains(&description_len) {
        errors.push(FieldError {
            field: "description",
            message: format!(
                "must be between {DESCRIPTION_MIN} and {DESCRIPTION_MAX} characters"
            ),
        });
    }
    if request.location.trim().is_empty() {
        errors.push(FieldError {
            field: "location",
            message: "location is required".to_string(),
        });
    }
    if request.request_amount_cents <= 0 {
        errors.push(FieldError {
            field: "requestAmountCents",
            message: "must be a positive amount".to_string(),
        });
    }
    errors
}

impl Claim {
    /// Create a claim at `PENDING`, regardless of input.
    ///
    /// # Errors
    /// [`ClaimError::Validation`] with every failing field.
    pub fn submit(
        owner_user_id: Uuid,
        request: NewClaimRequest,
        now: DateTime<Utc>,
    ) -> Result<Self, ClaimError> {
        let errors = validate_new_claim(&request);
        if !errors.is_empty() {
            return Err(ClaimError::Validation(errors));
        }

        Ok(Self {
            id: Uuid::now_v7(),
            owner_user_id,
            disaster_type: request.disaster_type.trim().to_string(),
            description: request.description.trim().to_string(),
            incident_date: request.incident_date,
            location: request.location.trim().to_string(),
            request_amount_cents: request.request_amount_cents,
            status: ClaimStatus::Pending,
            reviewer_id: None,
            review_comments: None,
            approved_amount_cents: None,
            created_at: now,
            updated_at: now,
            reviewed_at: None,
        })
    }

    /// Apply a status transition, enforcing the transition table and its
    /// required side-effect fields. On any error the claim is unchanged.
    ///
    /// # Errors
    /// [`ClaimError::IllegalTransition`] for any state/target pair outside
    /// the table, [`ClaimError::Validation`] for missing or out-of-range
    /// side-effect fields.
    pub fn apply_transition(
        &mut self,
        target: ClaimStatus,
        request: &TransitionRequest,
        reviewer_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), ClaimError> {
        match (self.status, target) {
            (ClaimStatus::Pending, ClaimStatus::UnderReview) => {
                self.reviewer_id = Some(reviewer_id);
                self.reviewed_at = Some(now);
            }
            (ClaimStatus::UnderReview, ClaimStatus::Approved) => {
                let Some(amount) = request.approved_amount_cents else {
                    return Err(ClaimError::Validation(vec![FieldError {
                        field: "approvedAmountCents",
                        message: "required when approving".to_string(),
                    }]));
                };
                if amount <= 0 || amount > self.request_amount_cents {
                    return Err(ClaimError::Validation(vec![FieldError {
                        field: "approvedAmountCents",
                        message: "must be positive and at most the requested amount".to_string(),
                    }]));
                }
                self.approved_amount_cents = Some(amount);
                self.review_comments = request.review_comments.clone();
                self.reviewer_id = Some(reviewer_id);
                self.reviewed_at = Some(now);
            }
            (ClaimStatus::UnderReview, ClaimStatus::Rejected) => {
                let comments = request
                    .review_comments
                    .as_deref()
                    .map(str::trim)
                    .filter(|comments| !comments.is_empty());
                let Some(comments) = comments else {
                    return Err(ClaimError::Validation(vec![FieldError {
                        field: "reviewComments",
                        message: "required when rejecting".to_string(),
                    }]));
                };
                self.review_comments = Some(comments.to_string());
                self.reviewer_id = Some(reviewer_id);
                self.reviewed_at = Some(now);
            }
            (ClaimStatus::Approved, ClaimStatus::Paid) => {}
            (from, to) => return Err(ClaimError::IllegalTransition { from, to }),
        }

        self.status = target;
        self.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).single().expect("valid timestamp")
    }

    fn later() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 2, 9, 30, 0).single().expect("valid timestamp")
    }

    fn request() -> NewClaimRequest {
        NewClaimRequest {
            disaster_type: "Flood".to_string(),
            description: "Basement flooded, water damage to walls and flooring".to_string(),
            incident_date: now(),
            location: "Albany, NY".to_string(),
            request_amount_cents: 100_000,
        }
    }

    fn pending_claim() -> Claim {
        Claim::submit(Uuid::now_v7(), request(), now()).expect("valid claim")
    }

    #[test]
    fn submit_forces_pending_and_sets_timestamps() -> Result<(), ClaimError> {
        let claim = Claim::submit(Uuid::now_v7(), request(), now())?;
        assert_eq!(claim.status, ClaimStatus::Pending);
        assert_eq!(claim.created_at, now());
        assert_eq!(claim.updated_at, now());
        assert!(claim.reviewer_id.is_none());
        assert!(claim.reviewed_at.is_none());
        assert!(claim.approved_amount_cents.is_none());
        Ok(())
    }

    #[test]
    fn submit_rejects_invalid_fields_per_field() {
        let bad = NewClaimRequest {
            disaster_type: "  ".to_string(),
            description: "too short".to_string(),
            incident_date: now(),
            location: String::new(),
            request_amount_cents: 0,
        };
        let Err(ClaimError::Validation(errors)) = Claim::submit(Uuid::now_v7(), bad, now()) else {
            panic!("expected validation failure");
        };
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["disasterType", "description", "location", "requestAmountCents"]
        );
    }

    #[test]
    fn review_transition_sets_reviewer_and_timestamps() -> Result<(), ClaimError> {
        let mut claim = pending_claim();
        let reviewer = Uuid::now_v7();

        claim.apply_transition(
            ClaimStatus::UnderReview,
            &TransitionRequest::default(),
            reviewer,
            later(),
        )?;

        assert_eq!(claim.status, ClaimStatus::UnderReview);
        assert_eq!(claim.reviewer_id, Some(reviewer));
        assert_eq!(claim.reviewed_at, Some(later()));
        assert_eq!(claim.updated_at, later());
        assert_eq!(claim.created_at, now());
        Ok(())
    }

    #[test]
    fn approval_requires_amount_within_request() -> Result<(), ClaimError> {
        let mut claim = pending_claim();
        let reviewer = Uuid::now_v7();
        claim.apply_transition(
            ClaimStatus::UnderReview,
            &TransitionRequest::default(),
            reviewer,
            now(),
        )?;

        // Missing amount.
        let result = claim.apply_transition(
            ClaimStatus::Approved,
            &TransitionRequest::default(),
            reviewer,
            later(),
        );
        assert!(matches!(result, Err(ClaimError::Validation(_))));
        assert_eq!(claim.status, ClaimStatus::UnderReview);

        // Amount above the request.
        let result = claim.apply_transition(
            ClaimStatus::Approved,
            &TransitionRequest {
                approved_amount_cents: Some(100_001),
                ..TransitionRequest::default()
            },
            reviewer,
            later(),
        );
        assert!(matches!(result, Err(ClaimError::Validation(_))));
        assert!(claim.approved_amount_cents.is_none());

        // Amount within the request.
        claim.apply_transition(
            ClaimStatus::Approved,
            &TransitionRequest {
                approved_amount_cents: Some(50_000),
                ..TransitionRequest::default()
            },
            reviewer,
            later(),
        )?;
        assert_eq!(claim.status, ClaimStatus::Approved);
        assert_eq!(claim.approved_amount_cents, Some(50_000));
        assert_eq!(claim.reviewed_at, Some(later()));
        Ok(())
    }

    #[test]
    fn rejection_requires_comments() -> Result<(), ClaimError> {
        let mut claim = pending_claim();
        let reviewer = Uuid::now_v7();
        claim.apply_transition(
            ClaimStatus::UnderReview,
            &TransitionRequest::default(),
            reviewer,
            now(),
        )?;

        let result = claim.apply_transition(
            ClaimStatus::Rejected,
            &TransitionRequest {
                review_comments: Some("   ".to_string()),
                ..TransitionRequest::default()
            },
            reviewer,
            later(),
        );
        assert!(matches!(result, Err(ClaimError::Validation(_))));
        assert_eq!(claim.status, ClaimStatus::UnderReview);

        claim.apply_transition(
            ClaimStatus::Rejected,
            &TransitionRequest {
                review_comments: Some("Insufficient documentation".to_string()),
                ..TransitionRequest::default()
            },
            reviewer,
            later(),
        )?;
        assert_eq!(claim.status, ClaimStatus::Rejected);
        assert_eq!(
            claim.review_comments.as_deref(),
            Some("Insufficient documentation")
        );
        Ok(())
    }

    #[test]
    fn paid_follows_approved_only() -> Result<(), ClaimError> {
        let mut claim = pending_claim();
        let reviewer = Uuid::now_v7();
        claim.apply_transition(
            ClaimStatus::UnderReview,
            &TransitionRequest::default(),
            reviewer,
            now(),
        )?;
        claim.apply_transition(
            ClaimStatus::Approved,
            &TransitionRequest {
                approved_amount_cents: Some(50_000),
                ..TransitionRequest::default()
            },
            reviewer,
            now(),
        )?;

        claim.apply_transition(
            ClaimStatus::Paid,
            &TransitionRequest::default(),
            reviewer,
            later(),
        )?;
        assert_eq!(claim.status, ClaimStatus::Paid);
        Ok(())
    }

    #[test]
    fn every_unlisted_pair_is_illegal_and_leaves_the_claim_unchanged() {
        let legal: &[(ClaimStatus, ClaimStatus)] = &[
            (ClaimStatus::Pending, ClaimStatus::UnderReview),
            (ClaimStatus::UnderReview, ClaimStatus::Approved),
            (ClaimStatus::UnderReview, ClaimStatus::Rejected),
            (ClaimStatus::Approved, ClaimStatus::Paid),
        ];
        let reviewer = Uuid::now_v7();

        for from in ClaimStatus::ALL {
            for to in ClaimStatus::ALL {
                if legal.contains(&(from, to)) {
                    continue;
                }
                let mut claim = pending_claim();
                claim.status = from;
                let before = claim.clone();

                let request = TransitionRequest {
                    review_comments: Some("comment".to_string()),
                    approved_amount_cents: Some(1),
                };
                let result = claim.apply_transition(to, &request, reviewer, later());
                assert!(
                    matches!(
                        result,
                        Err(ClaimError::IllegalTransition { from: f, to: t }) if f == from && t == to
                    ),
                    "{from} -> {to} should be illegal"
                );
                assert_eq!(claim.status, before.status);
                assert_eq!(claim.updated_at, before.updated_at);
                assert_eq!(claim.reviewer_id, before.reviewer_id);
            }
        }
    }

    #[test]
    fn status_wire_strings_round_trip() {
        for status in ClaimStatus::ALL {
            assert_eq!(ClaimStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ClaimStatus::parse("IN_REVIEW"), None);
    }
}
