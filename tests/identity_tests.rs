mod common;

use roadmap_api::{
    MemoryRepository,
    auth::{Principal, resolve_principal},
    credentials::{Claims, issue_token},
};
use uuid::Uuid;

const SECRET: &str = "identity-test-secret";

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

#[tokio::test]
async fn test_valid_token_resolves_principal() {
    let repo = MemoryRepository::new();
    let learner = common::seed_learner(&repo, "alice").await;
    let token = issue_token(&Claims::new(learner.id, "alice", false), SECRET).unwrap();

    let principal = resolve_principal(Some(bearer(&token).as_str()), &repo, SECRET).await;

    assert_eq!(
        principal,
        Some(Principal {
            id: learner.id,
            is_admin: false
        })
    );
}

#[tokio::test]
async fn test_admin_flag_comes_from_stored_account() {
    let repo = MemoryRepository::new();
    let admin = common::seed_admin(&repo).await;
    // Token claims say non-admin; the stored account wins.
    let token = issue_token(&Claims::new(admin.id, "admin", false), SECRET).unwrap();

    let principal = resolve_principal(Some(bearer(&token).as_str()), &repo, SECRET)
        .await
        .expect("should resolve");

    assert!(principal.is_admin);
}

#[tokio::test]
async fn test_missing_header_is_anonymous() {
    let repo = MemoryRepository::new();
    assert_eq!(resolve_principal(None, &repo, SECRET).await, None);
}

#[tokio::test]
async fn test_non_bearer_scheme_is_anonymous() {
    let repo = MemoryRepository::new();
    let learner = common::seed_learner(&repo, "alice").await;
    let token = issue_token(&Claims::new(learner.id, "alice", false), SECRET).unwrap();

    let header = format!("Basic {token}");
    assert_eq!(resolve_principal(Some(header.as_str()), &repo, SECRET).await, None);
}

#[tokio::test]
async fn test_garbage_token_is_anonymous() {
    let repo = MemoryRepository::new();
    let header = bearer("definitely.not.ajwt");
    assert_eq!(resolve_principal(Some(header.as_str()), &repo, SECRET).await, None);
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_anonymous() {
    let repo = MemoryRepository::new();
    let learner = common::seed_learner(&repo, "alice").await;
    let token = issue_token(&Claims::new(learner.id, "alice", false), "another-secret").unwrap();

    assert_eq!(resolve_principal(Some(bearer(&token).as_str()), &repo, SECRET).await, None);
}

#[tokio::test]
async fn test_token_for_deleted_account_is_anonymous() {
    let repo = MemoryRepository::new();
    let token = issue_token(&Claims::new(Uuid::new_v4(), "ghost", false), SECRET).unwrap();

    assert_eq!(resolve_principal(Some(bearer(&token).as_str()), &repo, SECRET).await, None);
}
