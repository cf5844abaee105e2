mod common;

use roadmap_api::{
    ApiError, MemoryRepository,
    error::Entity,
    models::CreateUpcomingRequest,
    repository::Repository,
    services::catalog,
};
use uuid::Uuid;

// --- Roadmap Creation ---

#[tokio::test]
async fn test_create_roadmap_defaults_to_draft_with_sections_in_order() {
    let repo = MemoryRepository::new();
    let admin = common::seed_admin(&repo).await;

    let view = catalog::create_roadmap(
        &repo,
        Some(&admin),
        common::roadmap_request("Rust", &["Ownership", "Borrowing", "Lifetimes"]),
    )
    .await
    .unwrap();

    assert!(view.draft);
    let titles: Vec<&str> = view.sections.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Ownership", "Borrowing", "Lifetimes"]);

    let stored = repo.get_roadmap(view.id).await.unwrap().unwrap();
    let section_ids: Vec<Uuid> = view.sections.iter().map(|s| s.id).collect();
    assert_eq!(stored.sections, section_ids);
    assert_eq!(repo.get_sections(&section_ids).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_create_roadmap_honours_explicit_draft_flag() {
    let repo = MemoryRepository::new();
    let admin = common::seed_admin(&repo).await;
    let mut req = common::roadmap_request("Go", &["Goroutines"]);
    req.draft = Some(false);

    let view = catalog::create_roadmap(&repo, Some(&admin), req).await.unwrap();

    assert!(!view.draft);
}

#[tokio::test]
async fn test_create_roadmap_without_sections_persists_nothing() {
    let repo = MemoryRepository::new();
    let admin = common::seed_admin(&repo).await;

    let err = catalog::create_roadmap(&repo, Some(&admin), common::roadmap_request("Empty", &[]))
        .await
        .unwrap_err();

    assert_eq!(err, ApiError::InvalidInput("sections"));
    assert!(repo.list_roadmaps(true).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_roadmap_with_blank_section_title_persists_nothing() {
    let repo = MemoryRepository::new();
    let admin = common::seed_admin(&repo).await;
    let req = common::roadmap_request("Half", &["Fine", "  "]);

    let err = catalog::create_roadmap(&repo, Some(&admin), req).await.unwrap_err();

    assert_eq!(err, ApiError::InvalidInput("section.title"));
    assert!(repo.list_roadmaps(true).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_roadmap_requires_admin() {
    let repo = MemoryRepository::new();
    let learner = common::seed_learner(&repo, "alice").await;

    let forbidden =
        catalog::create_roadmap(&repo, Some(&learner), common::roadmap_request("X", &["A"])).await;
    let anonymous = catalog::create_roadmap(&repo, None, common::roadmap_request("X", &["A"])).await;

    assert_eq!(forbidden.unwrap_err(), ApiError::Forbidden);
    assert_eq!(anonymous.unwrap_err(), ApiError::Unauthenticated);
}

// --- Publishing ---

#[tokio::test]
async fn test_publish_is_one_way_and_only_once() {
    let repo = MemoryRepository::new();
    let admin = common::seed_admin(&repo).await;
    let draft = catalog::create_roadmap(&repo, Some(&admin), common::roadmap_request("Rust", &["A"]))
        .await
        .unwrap();

    let published = catalog::publish_roadmap(&repo, Some(&admin), draft.id).await.unwrap();
    assert!(!published.draft);
    assert_eq!(published.sections.len(), 1);

    let again = catalog::publish_roadmap(&repo, Some(&admin), draft.id).await;
    assert_eq!(again.unwrap_err(), ApiError::AlreadyPublished);
}

#[tokio::test]
async fn test_publish_unknown_roadmap_is_not_found() {
    let repo = MemoryRepository::new();
    let admin = common::seed_admin(&repo).await;

    let err = catalog::publish_roadmap(&repo, Some(&admin), Uuid::new_v4())
        .await
        .unwrap_err();

    assert_eq!(err, ApiError::NotFound(Entity::Roadmap));
}

#[tokio::test]
async fn test_publish_requires_admin() {
    let repo = MemoryRepository::new();
    let admin = common::seed_admin(&repo).await;
    let learner = common::seed_learner(&repo, "alice").await;
    let draft = catalog::create_roadmap(&repo, Some(&admin), common::roadmap_request("Rust", &["A"]))
        .await
        .unwrap();

    let err = catalog::publish_roadmap(&repo, Some(&learner), draft.id)
        .await
        .unwrap_err();

    assert_eq!(err, ApiError::Forbidden);
    assert!(repo.get_roadmap(draft.id).await.unwrap().unwrap().draft);
}

// --- Listing ---

#[tokio::test]
async fn test_list_hides_drafts_unless_requested() {
    let repo = MemoryRepository::new();
    let admin = common::seed_admin(&repo).await;
    let published = common::published_roadmap(&repo, &admin, "Published", &["A"]).await;
    let draft = catalog::create_roadmap(&repo, Some(&admin), common::roadmap_request("Draft", &["B"]))
        .await
        .unwrap();

    let public = catalog::list_roadmaps(&repo, false).await.unwrap();
    assert_eq!(public.len(), 1);
    assert_eq!(public[0].id, published.id);
    assert_eq!(public[0].sections[0].title, "A");

    let everything = catalog::list_roadmaps(&repo, true).await.unwrap();
    let ids: Vec<Uuid> = everything.iter().map(|r| r.id).collect();
    assert_eq!(everything.len(), 2);
    assert!(ids.contains(&draft.id));
}

// --- Upcoming ---

#[tokio::test]
async fn test_create_and_list_upcoming() {
    let repo = MemoryRepository::new();
    let admin = common::seed_admin(&repo).await;
    let req = CreateUpcomingRequest {
        title: "Kotlin".to_string(),
        description: "Coming soon".to_string(),
        image: "kotlin.png".to_string(),
    };

    let created = catalog::create_upcoming(&repo, Some(&admin), req).await.unwrap();
    let listed = catalog::list_upcoming(&repo).await.unwrap();

    assert_eq!(listed, vec![created]);
}

#[tokio::test]
async fn test_create_upcoming_validates_fields_and_role() {
    let repo = MemoryRepository::new();
    let admin = common::seed_admin(&repo).await;
    let learner = common::seed_learner(&repo, "alice").await;
    let blank_image = CreateUpcomingRequest {
        title: "Kotlin".to_string(),
        description: "Coming soon".to_string(),
        image: String::new(),
    };

    let invalid = catalog::create_upcoming(&repo, Some(&admin), blank_image.clone()).await;
    let forbidden = catalog::create_upcoming(&repo, Some(&learner), blank_image).await;

    assert_eq!(invalid.unwrap_err(), ApiError::InvalidInput("image"));
    assert_eq!(forbidden.unwrap_err(), ApiError::Forbidden);
    assert!(catalog::list_upcoming(&repo).await.unwrap().is_empty());
}
