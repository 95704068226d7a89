pub mod audit;
pub mod config;
pub mod db;
pub mod docs;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;
pub mod state;
pub mod types;
pub mod validation;

use axum::{
    http::Method,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use state::AppState;

/// User action and audit log routes, without the shared HTTP layers.
pub fn api_routes() -> Router<AppState> {
    use handlers::{audit_logs, user_actions};

    Router::new()
        .route(
            "/api/cases/{case_id}/user_actions",
            get(user_actions::get_all_user_actions).post(user_actions::create_user_action),
        )
        .route(
            "/api/cases/{case_id}/user_actions/_find",
            get(user_actions::find_user_actions),
        )
        .route(
            "/api/cases/{case_id}/user_actions/_stats",
            get(user_actions::get_user_action_stats),
        )
        .route(
            "/api/cases/{case_id}/user_actions/_users",
            get(user_actions::get_case_users),
        )
        .route(
            "/api/cases/{case_id}/user_actions/_latest",
            get(user_actions::get_latest_user_action),
        )
        .route(
            "/api/cases/{case_id}/user_actions/_connectors",
            get(user_actions::get_unique_connectors),
        )
        .route(
            "/api/cases/{case_id}/user_actions/_connector_fields",
            post(user_actions::get_connector_fields_before_push),
        )
        .route(
            "/api/cases/{case_id}/user_actions/_attachments",
            post(user_actions::bulk_attachments),
        )
        .route(
            "/api/cases/{case_id}/connectors",
            get(user_actions::get_case_connectors),
        )
        .route(
            "/api/cases/user_actions/_bulk_update",
            post(user_actions::bulk_update_cases),
        )
        .route(
            "/api/cases/user_actions",
            axum::routing::delete(user_actions::delete_cases),
        )
        .route("/api/audit_logs", get(audit_logs::list_audit_logs))
        .route(
            "/api/audit_logs/{id}",
            get(audit_logs::get_audit_log_detail),
        )
}

/// Full application: API routes, Swagger UI and the shared layers.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api_routes())
        .layer(axum_middleware::from_fn(middleware::log_error_responses))
        .layer(axum_middleware::from_fn(middleware::request_id))
        .with_state(state)
        .merge(SwaggerUi::new("/api/docs").url("/api-doc/openapi.json", docs::ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods([
                            Method::GET,
                            Method::POST,
                            Method::DELETE,
                            Method::OPTIONS,
                        ])
                        .allow_headers(Any)
                        .max_age(std::time::Duration::from_secs(24 * 60 * 60)),
                ),
        )
}
