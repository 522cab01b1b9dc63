//! HTTP pipeline tests.
//!
//! Routing, middleware and the error envelope exercised through a real
//! actix service. Handlers that need PostgreSQL or S3 behind them are
//! covered by the module tests on their services instead.

use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::{App, HttpResponse, test, web};
use serde_json::Value;

use repotrack_lib::api;
use repotrack_lib::error::{AppError, AppResult};
use repotrack_lib::middleware::RequestLogger;

/// Handler that fails with a requested error variant.
async fn fail(path: web::Path<String>) -> AppResult<HttpResponse> {
    Err(match path.as_str() {
        "schema" => AppError::Schema("no registration number column".to_string()),
        "format" => AppError::UnsupportedFormat("not a delimited text file".to_string()),
        "too-large" => AppError::FileTooLarge { size: 99, limit: 10 },
        "input" => AppError::InvalidInput("bad".to_string()),
        "query" => AppError::InvalidQuery("too short".to_string()),
        "transition" => AppError::InvalidTransition {
            from: "released".to_string(),
            to: "pending".to_string(),
        },
        "conflict" => AppError::Conflict("concurrent update".to_string()),
        "partition" => AppError::PartitionResolution("unknown tenant 42".to_string()),
        "unauthorized" => AppError::Unauthorized("bad key".to_string()),
        "forbidden" => AppError::Forbidden("manager only".to_string()),
        "missing" => AppError::NotFound("Vehicle record 42".to_string()),
        "busy" => AppError::ServiceUnavailable("try later".to_string()),
        "database" => AppError::Database("connection refused on 5432".to_string()),
        _ => AppError::Storage("bucket repotrack-uploads is gone".to_string()),
    })
}

async fn test_app() -> impl actix_web::dev::Service<
    actix_http::Request,
    Response = ServiceResponse,
    Error = actix_web::Error,
> {
    test::init_service(
        App::new().wrap(RequestLogger).service(
            web::scope("/api/v1")
                .service(api::health::health)
                .route("/fail/{kind}", web::get().to(fail)),
        ),
    )
    .await
}

#[actix_rt::test]
async fn test_health_reports_healthy() {
    let app = test_app().await;

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[actix_rt::test]
async fn test_unknown_route_is_404() {
    let app = test_app().await;

    let req = test::TestRequest::get()
        .uri("/api/v1/nothing-here")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_error_envelope_maps_domain_errors() {
    let app = test_app().await;

    let cases = [
        ("schema", StatusCode::UNPROCESSABLE_ENTITY, "SCHEMA_ERROR"),
        (
            "format",
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "UNSUPPORTED_FORMAT",
        ),
        ("too-large", StatusCode::PAYLOAD_TOO_LARGE, "FILE_TOO_LARGE"),
        ("input", StatusCode::BAD_REQUEST, "INVALID_INPUT"),
        ("query", StatusCode::BAD_REQUEST, "INVALID_QUERY"),
        ("transition", StatusCode::CONFLICT, "INVALID_TRANSITION"),
        ("conflict", StatusCode::CONFLICT, "CONFLICT"),
        ("unauthorized", StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
        ("forbidden", StatusCode::FORBIDDEN, "FORBIDDEN"),
        ("missing", StatusCode::NOT_FOUND, "NOT_FOUND"),
        (
            "busy",
            StatusCode::SERVICE_UNAVAILABLE,
            "SERVICE_UNAVAILABLE",
        ),
    ];

    for (kind, status, code) in cases {
        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/fail/{}", kind))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), status, "status for {}", kind);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], code, "error code for {}", kind);
        assert!(body["message"].is_string(), "message missing for {}", kind);
    }
}

#[actix_rt::test]
async fn test_transition_errors_name_both_states() {
    let app = test_app().await;

    let req = test::TestRequest::get()
        .uri("/api/v1/fail/transition")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("released"));
    assert!(message.contains("pending"));
}

#[actix_rt::test]
async fn test_internal_errors_hide_details() {
    let app = test_app().await;

    let req = test::TestRequest::get()
        .uri("/api/v1/fail/database")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "INTERNAL_ERROR");
    assert!(!body["message"].as_str().unwrap().contains("5432"));

    let req = test::TestRequest::get()
        .uri("/api/v1/fail/storage")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "STORAGE_ERROR");
    assert!(!body["message"].as_str().unwrap().contains("repotrack-uploads"));
}

#[actix_rt::test]
async fn test_partition_refusals_mask_tenant_detail() {
    let app = test_app().await;

    let req = test::TestRequest::get()
        .uri("/api/v1/fail/partition")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "PARTITION_DENIED");
    assert_eq!(body["message"], "Tenant data access denied");
}
