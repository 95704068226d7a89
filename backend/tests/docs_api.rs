use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use cases_user_actions::docs;
use tower::ServiceExt;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn swagger_router() -> Router {
    let openapi = docs::ApiDoc::openapi();
    Router::new().merge(SwaggerUi::new("/api/docs").url("/api-doc/openapi.json", openapi))
}

#[test]
fn openapi_includes_user_action_and_audit_log_paths() {
    let openapi = docs::ApiDoc::openapi();
    let json = serde_json::to_value(&openapi).expect("serialize openapi");

    let paths = json
        .get("paths")
        .and_then(|v| v.as_object())
        .expect("paths object");
    for path in [
        "/api/cases/{case_id}/user_actions",
        "/api/cases/{case_id}/user_actions/_find",
        "/api/cases/{case_id}/connectors",
        "/api/cases/user_actions/_bulk_update",
        "/api/audit_logs",
    ] {
        assert!(paths.contains_key(path), "missing path {}", path);
    }

    assert!(json
        .pointer("/components/schemas/CaseUserAction")
        .is_some());
}

#[tokio::test]
async fn swagger_ui_routes_respond() {
    let app = swagger_router();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/docs")
                .body(Body::empty())
                .expect("build docs request"),
        )
        .await
        .expect("call swagger ui");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert_eq!(location, "/api/docs/");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api-doc/openapi.json")
                .body(Body::empty())
                .expect("build openapi request"),
        )
        .await
        .expect("call openapi");
    assert_eq!(response.status(), StatusCode::OK);
}
