//! End-to-end flows through the public API of the auth and claims cores,
//! backed by the in-memory stores.

use std::sync::Arc;

use amparo::auth::{
    AuthError, AuthService, AuthorizationGate, CredentialHasher, HasherConfig, MemoryUserStore,
    RegisterRequest, Role, RoleAdmin, TokenConfig, TokenIssuer,
};
use amparo::claims::{
    ClaimError, ClaimStatus, ClaimWorkflow, MemoryClaimStore, NewClaimRequest, TransitionRequest,
};
use chrono::{TimeZone, Utc};
use secrecy::SecretString;

struct World {
    auth: AuthService,
    admin: RoleAdmin,
    workflow: ClaimWorkflow,
}

fn world() -> World {
    let users = Arc::new(MemoryUserStore::new());
    let tokens = Arc::new(TokenIssuer::new(TokenConfig::new(SecretString::from(
        "integration-secret-at-least-32-bytes",
    ))));
    let hasher = Arc::new(
        CredentialHasher::new(
            HasherConfig::default()
                .with_memory_kib(1024)
                .with_iterations(1),
        )
        .expect("hasher"),
    );
    let gate = Arc::new(AuthorizationGate::new(tokens.clone()));
    World {
        auth: AuthService::new(users.clone(), hasher, tokens),
        admin: RoleAdmin::new(gate.clone(), users.clone()),
        workflow: ClaimWorkflow::new(gate, users, Arc::new(MemoryClaimStore::new())),
    }
}

fn register(username: &str, email: &str) -> RegisterRequest {
    RegisterRequest {
        username: username.to_string(),
        password: "Str0ng!Pw".to_string(),
        full_name: "Integration Tester".to_string(),
        email: email.to_string(),
        phone: Some("518-555-0100".to_string()),
    }
}

fn claim() -> NewClaimRequest {
    NewClaimRequest {
        disaster_type: "Hurricane".to_string(),
        description: "Roof torn off by hurricane winds, severe water damage".to_string(),
        incident_date: Utc
            .with_ymd_and_hms(2025, 2, 20, 0, 0, 0)
            .single()
            .expect("valid timestamp"),
        location: "Long Beach, NY".to_string(),
        request_amount_cents: 250_000,
    }
}

#[tokio::test]
async fn register_login_duplicate_scenario() {
    let w = world();

    // register alice / Str0ng!Pw / a@x.com → success, returns token
    let session = w.auth.register(register("alice", "a@x.com")).await.expect("register");
    assert!(!session.token.is_empty());

    // immediate second registration with the same username → duplicate
    let result = w.auth.register(register("alice", "other@x.com")).await;
    assert!(matches!(result, Err(AuthError::Duplicate(_))));

    // login alice/wrongpass → failed; login alice/Str0ng!Pw → success
    assert!(matches!(
        w.auth.login("alice", "wrongpass").await,
        Err(AuthError::AuthenticationFailed)
    ));
    let session = w.auth.login("alice", "Str0ng!Pw").await.expect("login");
    assert_eq!(session.profile.username, "alice");
    assert_eq!(session.profile.role, Role::User);
}

#[tokio::test]
async fn claim_review_scenario_end_to_end() {
    let w = world();

    // A registered user submits a claim; a separately elevated admin reviews it.
    let user = w.auth.register(register("alice", "a@x.com")).await.expect("register");
    w.auth.register(register("root", "root@x.com")).await.expect("register");

    // Bootstrap: self-registration yields USER, so elevation needs an admin
    // token. Mint one via the token path the deployment's bootstrap would use.
    let tokens = TokenIssuer::new(TokenConfig::new(SecretString::from(
        "integration-secret-at-least-32-bytes",
    )));
    let bootstrap = tokens.issue("root", Role::Admin).expect("issue");
    let profile = w
        .admin
        .set_role(&bootstrap.token, "root", Role::Admin)
        .await
        .expect("elevate");
    assert_eq!(profile.role, Role::Admin);

    // A re-login picks up the new role inside the token.
    let root = w.auth.login("root", "Str0ng!Pw").await.expect("login");
    assert_eq!(root.profile.role, Role::Admin);

    // claim created at PENDING
    let submitted = w.workflow.submit(&user.token, claim()).await.expect("submit");
    assert_eq!(submitted.status, ClaimStatus::Pending);

    // non-admin attempts PENDING -> UNDER_REVIEW → Forbidden
    let refused = w
        .workflow
        .transition(
            &user.token,
            submitted.id,
            ClaimStatus::UnderReview,
            &TransitionRequest::default(),
        )
        .await;
    assert!(matches!(refused, Err(ClaimError::Auth(AuthError::Forbidden))));

    // admin performs it → UNDER_REVIEW with reviewer set
    let reviewed = w
        .workflow
        .transition(
            &root.token,
            submitted.id,
            ClaimStatus::UnderReview,
            &TransitionRequest::default(),
        )
        .await
        .expect("review");
    assert_eq!(reviewed.status, ClaimStatus::UnderReview);
    assert!(reviewed.reviewer_id.is_some());

    // approve with amount 500 cents (≤ requested)
    let approved = w
        .workflow
        .transition(
            &root.token,
            submitted.id,
            ClaimStatus::Approved,
            &TransitionRequest {
                approved_amount_cents: Some(500),
                ..TransitionRequest::default()
            },
        )
        .await
        .expect("approve");
    assert_eq!(approved.status, ClaimStatus::Approved);
    assert_eq!(approved.approved_amount_cents, Some(500));

    // APPROVED -> PAID → terminal
    let paid = w
        .workflow
        .transition(
            &root.token,
            submitted.id,
            ClaimStatus::Paid,
            &TransitionRequest::default(),
        )
        .await
        .expect("pay");
    assert_eq!(paid.status, ClaimStatus::Paid);

    // further transition attempt → illegal
    let stuck = w
        .workflow
        .transition(
            &root.token,
            submitted.id,
            ClaimStatus::Approved,
            &TransitionRequest {
                approved_amount_cents: Some(500),
                ..TransitionRequest::default()
            },
        )
        .await;
    assert!(matches!(stuck, Err(ClaimError::IllegalTransition { .. })));

    // owner sees the final claim; statistics reflect one paid claim
    let mine = w.workflow.list_mine(&user.token).await.expect("list");
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].status, ClaimStatus::Paid);

    let stats = w.workflow.statistics(&root.token).await.expect("stats");
    assert_eq!(stats.total, 1);
    assert_eq!(stats.paid, 1);
}
