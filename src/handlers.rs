use crate::{
    AppState,
    auth::Identity,
    error::ApiResult,
    extract::{ApiJson, ApiPath},
    models::{
        AccountView, AddEnrolledRequest, CastVoteRequest, CreatePollRequest, CreateRoadmapRequest,
        CreateUpcomingRequest, CreateUserRequest, EnrolledEntry, LoginRequest, PollView,
        RoadmapView, Token, Upcoming,
    },
    services::{accounts, catalog, enrollment, polls, whitelist},
};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

// --- Filter Structs ---

/// RoadmapFilter
///
/// Query parameters for GET /roadmaps.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct RoadmapFilter {
    /// Include unpublished roadmaps. Not restricted to admins.
    pub include_drafts: Option<bool>,
}

// --- Accounts ---

/// create_user
///
/// [Public Route] Registers an account for a whitelisted username.
#[utoipa::path(
    post,
    path = "/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Created", body = AccountView),
        (status = 403, description = "Username not whitelisted"),
        (status = 409, description = "Username taken")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<AccountView>)> {
    let account = accounts::create_user(state.repo.as_ref(), payload).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

/// login
///
/// [Public Route] Exchanges credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token", body = Token),
        (status = 401, description = "Invalid password"),
        (status = 404, description = "User not found")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<Json<Token>> {
    let token = accounts::login(state.repo.as_ref(), &state.config.jwt_secret, payload).await?;
    Ok(Json(token))
}

/// get_me
///
/// [Authenticated Route] The caller's account with populated progress.
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Profile", body = AccountView),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn get_me(identity: Identity, State(state): State<AppState>) -> ApiResult<Json<AccountView>> {
    let account = accounts::me(state.repo.as_ref(), identity.principal()).await?;
    Ok(Json(account))
}

/// get_users
///
/// [Public Route] Every account with populated progress.
#[utoipa::path(
    get,
    path = "/users",
    responses((status = 200, description = "All accounts", body = [AccountView]))
)]
pub async fn get_users(identity: Identity, State(state): State<AppState>) -> ApiResult<Json<Vec<AccountView>>> {
    let accounts = accounts::list_accounts(state.repo.as_ref(), identity.principal()).await?;
    Ok(Json(accounts))
}

// --- Catalog ---

/// get_roadmaps
///
/// [Public Route] Lists roadmaps with their sections. Drafts only on request.
#[utoipa::path(
    get,
    path = "/roadmaps",
    params(RoadmapFilter),
    responses((status = 200, description = "Roadmaps", body = [RoadmapView]))
)]
pub async fn get_roadmaps(
    State(state): State<AppState>,
    Query(filter): Query<RoadmapFilter>,
) -> ApiResult<Json<Vec<RoadmapView>>> {
    let include_drafts = filter.include_drafts.unwrap_or(false);
    let roadmaps = catalog::list_roadmaps(state.repo.as_ref(), include_drafts).await?;
    Ok(Json(roadmaps))
}

/// create_roadmap
///
/// [Admin Route] Creates a roadmap and all of its sections in one step.
#[utoipa::path(
    post,
    path = "/admin/roadmaps",
    request_body = CreateRoadmapRequest,
    responses(
        (status = 201, description = "Created", body = RoadmapView),
        (status = 400, description = "Missing field or no sections"),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn create_roadmap(
    identity: Identity,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateRoadmapRequest>,
) -> ApiResult<(StatusCode, Json<RoadmapView>)> {
    let roadmap = catalog::create_roadmap(state.repo.as_ref(), identity.principal(), payload).await?;
    Ok((StatusCode::CREATED, Json(roadmap)))
}

/// publish_roadmap
///
/// [Admin Route] One-way transition out of draft.
#[utoipa::path(
    post,
    path = "/admin/roadmaps/{id}/publish",
    params(("id" = Uuid, Path, description = "Roadmap ID")),
    responses(
        (status = 200, description = "Published", body = RoadmapView),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Already published")
    )
)]
pub async fn publish_roadmap(
    identity: Identity,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<RoadmapView>> {
    let roadmap = catalog::publish_roadmap(state.repo.as_ref(), identity.principal(), id).await?;
    Ok(Json(roadmap))
}

/// get_upcoming
///
/// [Public Route] Lists upcoming roadmap teasers.
#[utoipa::path(
    get,
    path = "/upcoming",
    responses((status = 200, description = "Upcoming roadmaps", body = [Upcoming]))
)]
pub async fn get_upcoming(State(state): State<AppState>) -> ApiResult<Json<Vec<Upcoming>>> {
    Ok(Json(catalog::list_upcoming(state.repo.as_ref()).await?))
}

/// create_upcoming
///
/// [Admin Route]
#[utoipa::path(
    post,
    path = "/admin/upcoming",
    request_body = CreateUpcomingRequest,
    responses(
        (status = 201, description = "Created", body = Upcoming),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn create_upcoming(
    identity: Identity,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateUpcomingRequest>,
) -> ApiResult<(StatusCode, Json<Upcoming>)> {
    let upcoming = catalog::create_upcoming(state.repo.as_ref(), identity.principal(), payload).await?;
    Ok((StatusCode::CREATED, Json(upcoming)))
}

// --- Enrollment ---

/// enroll
///
/// [Authenticated Route] Starts tracking progress on a published roadmap.
#[utoipa::path(
    post,
    path = "/roadmaps/{id}/enroll",
    params(("id" = Uuid, Path, description = "Roadmap ID")),
    responses(
        (status = 200, description = "Enrolled", body = AccountView),
        (status = 409, description = "Already enrolled"),
        (status = 422, description = "Roadmap is a draft")
    )
)]
pub async fn enroll(
    identity: Identity,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<AccountView>> {
    let account = enrollment::enroll(state.repo.as_ref(), identity.principal(), id).await?;
    Ok(Json(account))
}

/// complete_section
///
/// [Authenticated Route] Marks a section done and credits the reward points.
#[utoipa::path(
    post,
    path = "/roadmaps/{id}/sections/{section_id}/complete",
    params(
        ("id" = Uuid, Path, description = "Roadmap ID"),
        ("section_id" = Uuid, Path, description = "Section ID")
    ),
    responses(
        (status = 200, description = "Completed", body = AccountView),
        (status = 409, description = "Already completed"),
        (status = 422, description = "Not enrolled or section not in roadmap")
    )
)]
pub async fn complete_section(
    identity: Identity,
    State(state): State<AppState>,
    ApiPath((id, section_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<Json<AccountView>> {
    let account =
        enrollment::complete_section(state.repo.as_ref(), identity.principal(), id, section_id).await?;
    Ok(Json(account))
}

// --- Polls ---

/// get_polls
///
/// [Public Route]
#[utoipa::path(
    get,
    path = "/polls",
    responses((status = 200, description = "Polls", body = [PollView]))
)]
pub async fn get_polls(State(state): State<AppState>) -> ApiResult<Json<Vec<PollView>>> {
    Ok(Json(polls::list_polls(state.repo.as_ref()).await?))
}

/// get_poll
///
/// [Public Route]
#[utoipa::path(
    get,
    path = "/polls/{id}",
    params(("id" = Uuid, Path, description = "Poll ID")),
    responses(
        (status = 200, description = "Poll", body = PollView),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_poll(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<Json<PollView>> {
    Ok(Json(polls::get_poll(state.repo.as_ref(), id).await?))
}

/// create_poll
///
/// [Public Route] Opens a poll over a set of upcoming roadmaps.
#[utoipa::path(
    post,
    path = "/polls",
    request_body = CreatePollRequest,
    responses((status = 201, description = "Created", body = PollView))
)]
pub async fn create_poll(
    identity: Identity,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreatePollRequest>,
) -> ApiResult<(StatusCode, Json<PollView>)> {
    let poll = polls::create_poll(state.repo.as_ref(), identity.principal(), payload).await?;
    Ok((StatusCode::CREATED, Json(poll)))
}

/// cast_vote
///
/// [Authenticated Route] Adds one vote. Repeat votes are counted.
#[utoipa::path(
    post,
    path = "/polls/{id}/votes",
    params(("id" = Uuid, Path, description = "Poll ID")),
    request_body = CastVoteRequest,
    responses(
        (status = 200, description = "Voted", body = PollView),
        (status = 404, description = "Not Found")
    )
)]
pub async fn cast_vote(
    identity: Identity,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<CastVoteRequest>,
) -> ApiResult<Json<PollView>> {
    let poll = polls::cast_vote(state.repo.as_ref(), identity.principal(), id, payload.option_id).await?;
    Ok(Json(poll))
}

// --- Whitelist ---

/// get_whitelist
///
/// [Public Route]
#[utoipa::path(
    get,
    path = "/whitelist",
    responses((status = 200, description = "Whitelisted names", body = [EnrolledEntry]))
)]
pub async fn get_whitelist(State(state): State<AppState>) -> ApiResult<Json<Vec<EnrolledEntry>>> {
    Ok(Json(whitelist::list_entries(state.repo.as_ref()).await?))
}

/// add_to_whitelist
///
/// [Public Route] Pre-approves a username for registration.
#[utoipa::path(
    post,
    path = "/whitelist",
    request_body = AddEnrolledRequest,
    responses(
        (status = 201, description = "Listed", body = EnrolledEntry),
        (status = 400, description = "Missing name"),
        (status = 409, description = "Already listed")
    )
)]
pub async fn add_to_whitelist(
    identity: Identity,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<AddEnrolledRequest>,
) -> ApiResult<(StatusCode, Json<EnrolledEntry>)> {
    let entry = whitelist::add_entry(state.repo.as_ref(), identity.principal(), payload).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}
