use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// Operations that act on behalf of the caller. Anonymous calls reach the handler and
/// are rejected by the engine with `Unauthenticated` (401).
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /me
        // The caller's account, progress and points.
        .route("/me", get(handlers::get_me))
        // POST /roadmaps/{id}/enroll
        // Only published roadmaps accept enrollments.
        .route("/roadmaps/{id}/enroll", post(handlers::enroll))
        // POST /roadmaps/{id}/sections/{section_id}/complete
        // Each section can be completed once per account; worth 10 points.
        .route(
            "/roadmaps/{id}/sections/{section_id}/complete",
            post(handlers::complete_section),
        )
        // POST /polls/{id}/votes
        .route("/polls/{id}/votes", post(handlers::cast_vote))
}
