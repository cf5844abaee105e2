use crate::{AppState, handlers};
use axum::{Router, routing::post};

/// Admin Router Module
///
/// Catalog authoring. Non-admin callers get 403, anonymous callers 401, so clients can
/// tell "log in" apart from "not allowed".
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // POST /admin/roadmaps
        // Creates a roadmap (draft by default) together with all of its sections.
        .route("/roadmaps", post(handlers::create_roadmap))
        // POST /admin/roadmaps/{id}/publish
        // One-way: a published roadmap never returns to draft.
        .route("/roadmaps/{id}/publish", post(handlers::publish_roadmap))
        // POST /admin/upcoming
        .route("/upcoming", post(handlers::create_upcoming))
}
