use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Core Records (Persisted) ---

/// Account
///
/// A registered user. Never serialized directly: the password hash must not leave the
/// service, so handlers return an [`AccountView`] instead.
#[derive(Debug, Clone, Default)]
pub struct Account {
    pub id: Uuid,
    // Unique across all accounts (enforced by the store).
    pub username: String,
    pub password_hash: String,
    pub is_admin: bool,
    // Never negative; only grows through section completion.
    pub points: i32,
    // One entry per enrolled roadmap, in enrollment order.
    pub progress: Vec<Progress>,
}

impl Account {
    /// The progress record for `roadmap_id`, if the account is enrolled.
    pub fn progress_for(&self, roadmap_id: Uuid) -> Option<&Progress> {
        self.progress.iter().find(|p| p.roadmap_id == roadmap_id)
    }
}

/// Progress
///
/// An account's completion record for one roadmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct Progress {
    pub roadmap_id: Uuid,
    // Completion order, no duplicates.
    pub completed_sections: Vec<Uuid>,
}

/// Roadmap
///
/// A curriculum. Starts as a draft and can be published exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Roadmap {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub image: String,
    // Stored as a UUID[] column named `section_ids`.
    #[sqlx(rename = "section_ids")]
    pub sections: Vec<Uuid>,
    pub draft: bool,
}

/// Module
///
/// A unit of content embedded in a section. Has no identity of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct Module {
    #[serde(default)]
    pub title: String,
    // Markdown.
    #[serde(default)]
    pub content: String,
}

/// Section
///
/// One step of a roadmap. Created together with its roadmap and never shared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Section {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub learning_objectives: Option<String>,
    // JSONB column.
    #[sqlx(json)]
    pub modules: Vec<Module>,
    pub images: Vec<String>,
}

/// Upcoming
///
/// A teaser for a roadmap that is not written yet. Polls use these as their options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Upcoming {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub image: String,
}

/// VoteCount
///
/// The tally for a single option of a poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct VoteCount {
    pub option_id: Uuid,
    pub count: i64,
}

/// Poll
///
/// A vote over a set of upcoming roadmaps. `votes` keeps first-vote order; options
/// without any entry in `votes` are never produced by this service but are tolerated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Poll {
    pub id: Uuid,
    pub options: Vec<Uuid>,
    pub votes: Vec<VoteCount>,
}

impl Poll {
    /// Current tally for `option_id` (zero when nobody voted for it yet).
    pub fn count_for(&self, option_id: Uuid) -> i64 {
        self.votes
            .iter()
            .find(|v| v.option_id == option_id)
            .map(|v| v.count)
            .unwrap_or(0)
    }
}

/// EnrolledEntry
///
/// A whitelist entry: a username that is allowed to register.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct EnrolledEntry {
    pub id: Uuid,
    pub name: String,
}

// --- Request Payloads (Input Schemas) ---

/// CreateUserRequest
///
/// Input payload for account registration (POST /users). Omitted text fields read as
/// empty, so the engine reports them as `InvalidInput` by name.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// LoginRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Token
///
/// A signed identity token, sent back as `Authorization: Bearer <value>`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct Token {
    pub value: String,
}

/// SectionInput
///
/// A section to be created as part of a new roadmap.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SectionInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_objectives: Option<String>,
    #[serde(default)]
    pub modules: Vec<Module>,
    #[serde(default)]
    pub images: Vec<String>,
}

/// CreateRoadmapRequest
///
/// Input payload for POST /admin/roadmaps. `draft` defaults to true when omitted.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateRoadmapRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub sections: Vec<SectionInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft: Option<bool>,
}

/// CreateUpcomingRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateUpcomingRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
}

/// CreatePollRequest
///
/// Duplicate option ids are collapsed, keeping first-seen order.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreatePollRequest {
    pub options: Vec<Uuid>,
}

/// CastVoteRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CastVoteRequest {
    pub option_id: Uuid,
}

/// AddEnrolledRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AddEnrolledRequest {
    #[serde(default)]
    pub name: String,
}

// --- Read Models (Output Schemas) ---

/// RoadmapView
///
/// A roadmap with its sections resolved, in roadmap order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RoadmapView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub image: String,
    pub sections: Vec<Section>,
    pub draft: bool,
}

/// ProgressView
///
/// `roadmap` is `None` when the roadmap no longer exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ProgressView {
    pub roadmap: Option<RoadmapView>,
    pub completed_sections: Vec<Section>,
}

/// AccountView
///
/// Public shape of an account (GET /me, enrollment responses). Excludes the hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AccountView {
    pub id: Uuid,
    pub username: String,
    pub is_admin: bool,
    pub points: i32,
    pub progress: Vec<ProgressView>,
}

/// PollView
///
/// A poll with its options resolved to upcoming roadmaps. Unknown option ids are
/// left out of `options` but keep their entry in `votes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PollView {
    pub id: Uuid,
    pub options: Vec<Upcoming>,
    pub votes: Vec<VoteCount>,
}
