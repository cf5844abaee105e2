//! Behaviour that only shows up when the engine's own checks are bypassed: two requests
//! that both read "not yet" before either writes. The store's uniqueness rules must
//! still reject the second write, and the engine must report the specific error.

mod common;

use async_trait::async_trait;
use roadmap_api::{
    ApiError, MemoryRepository,
    models::{
        Account, AddEnrolledRequest, CreateUserRequest, EnrolledEntry, Poll, Roadmap, Section,
        Upcoming,
    },
    repository::{Repository, StoreError, StoreResult},
    services::{accounts, enrollment, whitelist},
};
use std::sync::Mutex;
use uuid::Uuid;

// --- Stale-read Repository ---

#[derive(Default, Clone)]
struct Snapshot {
    accounts: Vec<Account>,
    enrolled: Vec<EnrolledEntry>,
}

/// Serves account and whitelist reads from a frozen snapshot while every write goes to
/// the real store, like a request that read just before a concurrent one committed.
#[derive(Default)]
struct StaleReads {
    inner: MemoryRepository,
    snapshot: Mutex<Option<Snapshot>>,
}

impl StaleReads {
    async fn freeze(&self) {
        let snapshot = Snapshot {
            accounts: self.inner.list_accounts().await.unwrap(),
            enrolled: self.inner.list_enrolled().await.unwrap(),
        };
        *self.snapshot.lock().unwrap() = Some(snapshot);
    }

    fn frozen(&self) -> Option<Snapshot> {
        self.snapshot.lock().unwrap().clone()
    }
}

#[async_trait]
impl Repository for StaleReads {
    async fn get_account(&self, id: Uuid) -> StoreResult<Option<Account>> {
        match self.frozen() {
            Some(s) => Ok(s.accounts.into_iter().find(|a| a.id == id)),
            None => self.inner.get_account(id).await,
        }
    }
    async fn get_account_by_username(&self, username: &str) -> StoreResult<Option<Account>> {
        match self.frozen() {
            Some(s) => Ok(s.accounts.into_iter().find(|a| a.username == username)),
            None => self.inner.get_account_by_username(username).await,
        }
    }
    async fn get_enrolled(&self, name: &str) -> StoreResult<Option<EnrolledEntry>> {
        match self.frozen() {
            Some(s) => Ok(s.enrolled.into_iter().find(|e| e.name == name)),
            None => self.inner.get_enrolled(name).await,
        }
    }

    // Everything else passes straight through.
    async fn list_accounts(&self) -> StoreResult<Vec<Account>> {
        self.inner.list_accounts().await
    }
    async fn create_account(&self, account: Account) -> StoreResult<Account> {
        self.inner.create_account(account).await
    }
    async fn add_progress(&self, account_id: Uuid, roadmap_id: Uuid) -> StoreResult<()> {
        self.inner.add_progress(account_id, roadmap_id).await
    }
    async fn complete_section(
        &self,
        account_id: Uuid,
        roadmap_id: Uuid,
        section_id: Uuid,
        reward: i32,
    ) -> StoreResult<()> {
        self.inner
            .complete_section(account_id, roadmap_id, section_id, reward)
            .await
    }
    async fn create_roadmap(&self, roadmap: Roadmap, sections: Vec<Section>) -> StoreResult<Roadmap> {
        self.inner.create_roadmap(roadmap, sections).await
    }
    async fn get_roadmap(&self, id: Uuid) -> StoreResult<Option<Roadmap>> {
        self.inner.get_roadmap(id).await
    }
    async fn list_roadmaps(&self, include_drafts: bool) -> StoreResult<Vec<Roadmap>> {
        self.inner.list_roadmaps(include_drafts).await
    }
    async fn publish_roadmap(&self, id: Uuid) -> StoreResult<Option<Roadmap>> {
        self.inner.publish_roadmap(id).await
    }
    async fn get_sections(&self, ids: &[Uuid]) -> StoreResult<Vec<Section>> {
        self.inner.get_sections(ids).await
    }
    async fn create_upcoming(&self, upcoming: Upcoming) -> StoreResult<Upcoming> {
        self.inner.create_upcoming(upcoming).await
    }
    async fn list_upcoming(&self) -> StoreResult<Vec<Upcoming>> {
        self.inner.list_upcoming().await
    }
    async fn get_upcoming_many(&self, ids: &[Uuid]) -> StoreResult<Vec<Upcoming>> {
        self.inner.get_upcoming_many(ids).await
    }
    async fn create_poll(&self, poll: Poll) -> StoreResult<Poll> {
        self.inner.create_poll(poll).await
    }
    async fn get_poll(&self, id: Uuid) -> StoreResult<Option<Poll>> {
        self.inner.get_poll(id).await
    }
    async fn list_polls(&self) -> StoreResult<Vec<Poll>> {
        self.inner.list_polls().await
    }
    async fn increment_vote(&self, poll_id: Uuid, option_id: Uuid) -> StoreResult<bool> {
        self.inner.increment_vote(poll_id, option_id).await
    }
    async fn add_enrolled(&self, entry: EnrolledEntry) -> StoreResult<EnrolledEntry> {
        self.inner.add_enrolled(entry).await
    }
    async fn list_enrolled(&self) -> StoreResult<Vec<EnrolledEntry>> {
        self.inner.list_enrolled().await
    }
}

// --- Concurrent Duplicates ---

#[tokio::test]
async fn test_concurrent_enroll_is_already_enrolled() {
    let repo = StaleReads::default();
    let admin = common::seed_admin(&repo.inner).await;
    let alice = common::seed_learner(&repo.inner, "alice").await;
    let roadmap = common::published_roadmap(&repo.inner, &admin, "Rust", &["A"]).await;

    repo.freeze().await;
    enrollment::enroll(&repo, Some(&alice), roadmap.id).await.unwrap();
    let err = enrollment::enroll(&repo, Some(&alice), roadmap.id)
        .await
        .unwrap_err();

    assert_eq!(err, ApiError::AlreadyEnrolled);
    let stored = repo.inner.get_account(alice.id).await.unwrap().unwrap();
    assert_eq!(stored.progress.len(), 1);
}

#[tokio::test]
async fn test_concurrent_completion_awards_points_once() {
    let repo = StaleReads::default();
    let admin = common::seed_admin(&repo.inner).await;
    let alice = common::seed_learner(&repo.inner, "alice").await;
    let roadmap = common::published_roadmap(&repo.inner, &admin, "Rust", &["A"]).await;
    let section = roadmap.sections[0].id;
    enrollment::enroll(&repo.inner, Some(&alice), roadmap.id)
        .await
        .unwrap();

    repo.freeze().await;
    enrollment::complete_section(&repo, Some(&alice), roadmap.id, section)
        .await
        .unwrap();
    let err = enrollment::complete_section(&repo, Some(&alice), roadmap.id, section)
        .await
        .unwrap_err();

    assert_eq!(err, ApiError::AlreadyCompleted);
    let stored = repo.inner.get_account(alice.id).await.unwrap().unwrap();
    assert_eq!(stored.points, enrollment::SECTION_REWARD);
    assert_eq!(stored.progress[0].completed_sections, vec![section]);
}

#[tokio::test]
async fn test_concurrent_registration_is_already_exists() {
    let repo = StaleReads::default();
    whitelist::add_entry(&repo, None, AddEnrolledRequest { name: "alice".into() })
        .await
        .unwrap();
    let signup = || CreateUserRequest {
        username: "alice".into(),
        password: "pw".into(),
        is_admin: false,
    };

    repo.freeze().await;
    accounts::create_user(&repo, signup()).await.unwrap();
    let err = accounts::create_user(&repo, signup()).await.unwrap_err();

    assert_eq!(err, ApiError::AlreadyExists);
    assert_eq!(repo.inner.list_accounts().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_concurrent_whitelist_add_is_already_listed() {
    let repo = StaleReads::default();

    repo.freeze().await;
    whitelist::add_entry(&repo, None, AddEnrolledRequest { name: "alice".into() })
        .await
        .unwrap();
    let err = whitelist::add_entry(&repo, None, AddEnrolledRequest { name: "alice".into() })
        .await
        .unwrap_err();

    assert_eq!(err, ApiError::AlreadyListed);
    assert_eq!(repo.inner.list_enrolled().await.unwrap().len(), 1);
}

// --- Points Arithmetic ---

#[tokio::test]
async fn test_points_overflow_is_a_store_error_and_writes_nothing() {
    let repo = MemoryRepository::new();
    let account = repo
        .create_account(Account {
            id: Uuid::new_v4(),
            username: "maxed".to_string(),
            points: i32::MAX - 5,
            ..Default::default()
        })
        .await
        .unwrap();
    let roadmap_id = Uuid::new_v4();
    repo.add_progress(account.id, roadmap_id).await.unwrap();

    let result = repo
        .complete_section(account.id, roadmap_id, Uuid::new_v4(), 10)
        .await;

    assert!(matches!(result, Err(StoreError::Backend(_))));
    let stored = repo.get_account(account.id).await.unwrap().unwrap();
    assert_eq!(stored.points, i32::MAX - 5);
    assert!(stored.progress[0].completed_sections.is_empty());
}
