use axum::{Router, http::HeaderName, middleware};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Policy, identity and credentials.
pub mod access;
pub mod auth;
pub mod credentials;

// Domain types, errors and persistence.
pub mod error;
pub mod extract;
pub mod models;
pub mod repository;

// Business engines and their HTTP surface.
pub mod config;
pub mod handlers;
pub mod services;

pub mod routes;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::{ApiError, ApiResult};
pub use repository::{MemoryRepository, PostgresRepository, RepositoryState};

/// ApiDoc
///
/// OpenAPI document for every route, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::create_user, handlers::login, handlers::get_me, handlers::get_users,
        handlers::get_roadmaps, handlers::create_roadmap, handlers::publish_roadmap,
        handlers::get_upcoming, handlers::create_upcoming, handlers::enroll,
        handlers::complete_section, handlers::get_polls, handlers::get_poll,
        handlers::create_poll, handlers::cast_vote, handlers::get_whitelist,
        handlers::add_to_whitelist
    ),
    components(
        schemas(
            models::AccountView, models::ProgressView, models::RoadmapView, models::Section,
            models::Module, models::Upcoming, models::PollView, models::VoteCount,
            models::EnrolledEntry, models::Token, models::CreateUserRequest,
            models::LoginRequest, models::CreateRoadmapRequest, models::SectionInput,
            models::CreateUpcomingRequest, models::CreatePollRequest, models::CastVoteRequest,
            models::AddEnrolledRequest,
        )
    ),
    tags(
        (name = "roadmap-api", description = "Roadmap learning platform API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single immutable container shared by every request: the repository handle and
/// the configuration (including the token signing secret).
#[derive(Clone)]
pub struct AppState {
    pub repo: RepositoryState,
    pub config: AppConfig,
}

/// create_router
///
/// Assembles every route, runs identity resolution once per request, and wraps the
/// whole thing in the request-id, tracing and CORS layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(authenticated::authenticated_routes())
        .nest("/admin", admin::admin_routes())
        // Every route sees an `Identity`, anonymous or not.
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::resolve_identity,
        ))
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Request span carrying the `x-request-id`, so every log line of one request can be
/// correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
