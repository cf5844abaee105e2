use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints any client may call, logged in or not: registration, login, the
/// published catalog, polls and the registration whitelist.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness check for load balancers.
        .route("/health", get(|| async { "ok" }))
        // GET/POST /users
        // Lists every account (no password hashes); registration needs a whitelisted
        // username.
        .route("/users", get(handlers::get_users).post(handlers::create_user))
        // POST /login
        // Returns a bearer token for valid credentials.
        .route("/login", post(handlers::login))
        // GET /roadmaps?include_drafts=...
        // Published roadmaps with their sections; drafts only when asked for.
        .route("/roadmaps", get(handlers::get_roadmaps))
        // GET /upcoming
        .route("/upcoming", get(handlers::get_upcoming))
        // GET/POST /polls
        // Poll creation is deliberately open; voting is not (see authenticated routes).
        .route("/polls", get(handlers::get_polls).post(handlers::create_poll))
        // GET /polls/{id}
        .route("/polls/{id}", get(handlers::get_poll))
        // GET/POST /whitelist
        .route(
            "/whitelist",
            get(handlers::get_whitelist).post(handlers::add_to_whitelist),
        )
}
