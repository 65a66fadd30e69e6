// src/routes.rs

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware,
    routing::{delete, get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, auth, interview, questions},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Upper bound for a CSV upload.
const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Assembles the main application router.
///
/// * Nests all sub-routers (auth, questions, interview).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (Database Pool + Config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .merge(
            Router::new()
                .route("/me", get(auth::me))
                .layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        );

    // Reads are public. Writes need a token; the handlers check for admin themselves.
    let require_auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let question_routes = Router::new()
        .route(
            "/",
            get(questions::list_questions)
                .merge(post(questions::create_question).route_layer(require_auth.clone())),
        )
        .route(
            "/{id}",
            get(questions::get_question).merge(
                put(questions::update_question)
                    .delete(questions::delete_question)
                    .route_layer(require_auth.clone()),
            ),
        )
        .route(
            "/bulk_import",
            post(questions::bulk_import)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
                .route_layer(require_auth),
        );

    let admin_routes = Router::new()
        .route("/analytics", get(admin::analytics))
        .route("/candidates", get(admin::list_candidates))
        .route("/candidates/{id}", get(admin::candidate_detail))
        .route("/candidates/{id}/unblock", post(admin::unblock_candidate))
        .route(
            "/candidates/{id}/remove",
            delete(admin::remove_candidate_history),
        )
        .layer(middleware::from_fn(admin_middleware));

    // Double middleware protection on admin routes: Auth first, then Admin check
    let interview_routes = Router::new()
        .route("/sessions", get(interview::list_sessions))
        .route("/sessions/{id}", get(interview::get_session))
        .route("/start", post(interview::start_session))
        .route("/submit", post(interview::submit_answers))
        .route("/summary/{session_id}", get(interview::session_summary))
        .nest("/admin", admin_routes)
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/questions", question_routes)
        .nest("/api/interview", interview_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
