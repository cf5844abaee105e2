use crate::models::{Account, EnrolledEntry, Poll, Roadmap, Section, Upcoming};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

mod memory;
mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PostgresRepository;

/// StoreError
///
/// Failures reported by a persistence backend. `Conflict` is produced by the store's
/// uniqueness constraints and is what the engines translate into their specific
/// "already ..." errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    Conflict(String),
    #[error("referenced record does not exist")]
    NotFound,
    #[error("store unavailable: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Repository Trait
///
/// The persistence contract consumed by the engines. Every method is one unit of work
/// against the store; methods that must be atomic (roadmap creation, section
/// completion, vote increments) say so and every backend must honour it.
///
/// **Send + Sync + async_trait** keep `Arc<dyn Repository>` shareable across Axum's
/// task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Accounts ---
    async fn get_account(&self, id: Uuid) -> StoreResult<Option<Account>>;
    async fn get_account_by_username(&self, username: &str) -> StoreResult<Option<Account>>;
    async fn list_accounts(&self) -> StoreResult<Vec<Account>>;
    // Fails with `Conflict` when the username is taken.
    async fn create_account(&self, account: Account) -> StoreResult<Account>;
    // Appends an empty progress record. `Conflict` if the pair already exists.
    async fn add_progress(&self, account_id: Uuid, roadmap_id: Uuid) -> StoreResult<()>;
    /// Records `section_id` as completed and adds `reward` points in one atomic step.
    /// `Conflict` if already completed, `NotFound` if the account is not enrolled.
    async fn complete_section(
        &self,
        account_id: Uuid,
        roadmap_id: Uuid,
        section_id: Uuid,
        reward: i32,
    ) -> StoreResult<()>;

    // --- Catalog ---
    /// Persists the sections and then the roadmap referencing them. All-or-nothing.
    async fn create_roadmap(&self, roadmap: Roadmap, sections: Vec<Section>) -> StoreResult<Roadmap>;
    async fn get_roadmap(&self, id: Uuid) -> StoreResult<Option<Roadmap>>;
    async fn list_roadmaps(&self, include_drafts: bool) -> StoreResult<Vec<Roadmap>>;
    /// Flips `draft` to false only if it is currently true. `None` when the roadmap is
    /// missing or was already published.
    async fn publish_roadmap(&self, id: Uuid) -> StoreResult<Option<Roadmap>>;
    // Returned in the order of `ids`; unknown ids are skipped.
    async fn get_sections(&self, ids: &[Uuid]) -> StoreResult<Vec<Section>>;
    async fn create_upcoming(&self, upcoming: Upcoming) -> StoreResult<Upcoming>;
    async fn list_upcoming(&self) -> StoreResult<Vec<Upcoming>>;
    // Returned in the order of `ids`; unknown ids are skipped.
    async fn get_upcoming_many(&self, ids: &[Uuid]) -> StoreResult<Vec<Upcoming>>;

    // --- Polls ---
    async fn create_poll(&self, poll: Poll) -> StoreResult<Poll>;
    async fn get_poll(&self, id: Uuid) -> StoreResult<Option<Poll>>;
    async fn list_polls(&self) -> StoreResult<Vec<Poll>>;
    /// Atomic increment-or-insert of one vote. Returns false when the poll is missing.
    async fn increment_vote(&self, poll_id: Uuid, option_id: Uuid) -> StoreResult<bool>;

    // --- Enrollment whitelist ---
    // Fails with `Conflict` when the name is already listed.
    async fn add_enrolled(&self, entry: EnrolledEntry) -> StoreResult<EnrolledEntry>;
    async fn get_enrolled(&self, name: &str) -> StoreResult<Option<EnrolledEntry>>;
    async fn list_enrolled(&self) -> StoreResult<Vec<EnrolledEntry>>;
}

/// RepositoryState
///
/// The shared handle to the persistence layer held in `AppState`.
pub type RepositoryState = Arc<dyn Repository>;
