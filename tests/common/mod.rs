#![allow(dead_code)]

use roadmap_api::{
    MemoryRepository,
    auth::Principal,
    models::{Account, CreateRoadmapRequest, Module, RoadmapView, SectionInput},
    repository::Repository,
    services::catalog,
};
use uuid::Uuid;

// --- Seeding Utilities ---

/// Inserts an account straight into the store, skipping the whitelist and hashing.
pub async fn seed_account(repo: &MemoryRepository, username: &str, is_admin: bool) -> Principal {
    let account = repo
        .create_account(Account {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: "not-a-real-hash".to_string(),
            is_admin,
            ..Default::default()
        })
        .await
        .expect("seeding account failed");

    Principal {
        id: account.id,
        is_admin: account.is_admin,
    }
}

pub async fn seed_admin(repo: &MemoryRepository) -> Principal {
    seed_account(repo, "admin", true).await
}

pub async fn seed_learner(repo: &MemoryRepository, username: &str) -> Principal {
    seed_account(repo, username, false).await
}

pub fn section_input(title: &str) -> SectionInput {
    SectionInput {
        title: title.to_string(),
        description: format!("{title} description"),
        learning_objectives: Some("Understand the basics".to_string()),
        modules: vec![Module {
            title: "Intro".to_string(),
            content: "# Hello".to_string(),
        }],
        images: vec![],
    }
}

pub fn roadmap_request(title: &str, sections: &[&str]) -> CreateRoadmapRequest {
    CreateRoadmapRequest {
        title: title.to_string(),
        description: "A guided path".to_string(),
        image: "cover.png".to_string(),
        sections: sections.iter().map(|s| section_input(s)).collect(),
        draft: None,
    }
}

/// Creates a roadmap as `admin` and publishes it.
pub async fn published_roadmap(
    repo: &MemoryRepository,
    admin: &Principal,
    title: &str,
    sections: &[&str],
) -> RoadmapView {
    let draft = catalog::create_roadmap(repo, Some(admin), roadmap_request(title, sections))
        .await
        .expect("roadmap creation failed");
    catalog::publish_roadmap(repo, Some(admin), draft.id)
        .await
        .expect("publishing failed")
}
