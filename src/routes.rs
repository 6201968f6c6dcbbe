// src/routes.rs

use axum::{
    Extension, Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post, put},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::{question_types, questions},
    question_types::ContentDomain,
    state::AppState,
    utils::jwt::{auth_middleware, editor_middleware},
};

/// Question routes of one wizard, tagged with its domain.
fn question_routes(domain: ContentDomain) -> Router<AppState> {
    Router::new()
        .route("/{id}/questions", post(questions::create_question))
        .route("/{id}/questions/order", put(questions::reorder_questions))
        .route(
            "/{id}/questions/{question_id}",
            put(questions::update_question).delete(questions::delete_question),
        )
        .layer(Extension(domain))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    if allowed.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(allowed)
    }
}

/// Assembles the main application router.
///
/// * Activity and book question routes share handlers; the domain comes from an extension.
/// * Editing requires a valid token (Auth) and an editor role (Editor).
/// * Applies global middleware (Trace, CORS, body limit).
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);
    let body_limit = state.config.body_size_limit_mb * 1024 * 1024;

    let editor_routes = Router::new()
        .nest("/activities", question_routes(ContentDomain::Activity))
        .nest("/books", question_routes(ContentDomain::Book))
        // Double middleware protection: Auth first, then Editor check
        .layer(middleware::from_fn(editor_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let catalog_routes = Router::new()
        .route("/question-types", get(question_types::list_question_types))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/health", get(question_types::health))
        .nest("/api", editor_routes.merge(catalog_routes))
        // Global Middleware (applied from outside in)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
