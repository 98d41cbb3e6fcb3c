//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//!
//! Middleware stack (outermost → innermost):
//! CORS → Rate limiter → Caller identity → Audit logger

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::endpoints::analysis::MULTIPART_OVERHEAD_BYTES;
use crate::api::middleware;
use crate::api::types::ApiContext;

/// Build the API router.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost layer).
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`).
pub fn api_router(ctx: ApiContext) -> Router {
    let body_limit = ctx
        .config
        .server
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);
    let cors = cors_layer(ctx.config.server.cors_origin.as_deref());

    // Layers are applied from bottom (innermost) to top (outermost).
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let protected = Router::new()
        .route("/assistant/symptoms", post(endpoints::assistant::symptoms))
        .route(
            "/analysis/analyze",
            post(endpoints::analysis::analyze).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/analysis", get(endpoints::analysis::list))
        .route("/analysis/:id", get(endpoints::analysis::detail))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::middleware::from_fn(middleware::identity::require_caller))
        .layer(axum::middleware::from_fn(middleware::rate::limit))
        // Extension must be outermost so middleware can extract ApiContext
        .layer(axum::Extension(ctx.clone()));

    let public = Router::new()
        .route("/health", get(endpoints::health::check))
        .with_state(ctx);

    let api = protected.merge(public).layer(SetResponseHeaderLayer::overriding(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store"),
    ));

    Router::new()
        .route("/", get(endpoints::health::root))
        .nest("/api", api)
        .layer(cors)
}

/// `None` allows any origin.
fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-user-id"),
        ]);

    match origin {
        None => layer.allow_origin(Any),
        Some(origin) => match HeaderValue::from_str(origin) {
            Ok(value) => layer.allow_origin(value),
            Err(e) => {
                tracing::error!(origin, error = %e, "Invalid CORS origin, cross-origin requests disabled");
                layer
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::config::AppConfig;
    use crate::pipeline::gemini::{GeminiError, GenerativeClient, MockGenerativeClient};

    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46];
    const BOUNDARY: &str = "sanjeevani-test-boundary";

    fn test_config(tmp: &tempfile::TempDir) -> AppConfig {
        let db_path = tmp.path().join("sanjeevani.db");
        let db_path = db_path.to_string_lossy().to_string();
        AppConfig::from_lookup(|key| match key {
            "GEMINI_API_KEY" => Some("test-key".into()),
            "SANJEEVANI_DB_PATH" => Some(db_path.clone()),
            "SANJEEVANI_MAX_UPLOAD_MB" => Some("1".into()),
            "SANJEEVANI_RATE_PER_MINUTE" => Some("5".into()),
            _ => None,
        })
        .unwrap()
    }

    fn app_with(client: Arc<dyn GenerativeClient>) -> (Router, ApiContext, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = ApiContext::new(test_config(&tmp), client);
        (api_router(ctx.clone()), ctx, tmp)
    }

    fn app(reply: &str) -> (Router, ApiContext, tempfile::TempDir) {
        app_with(Arc::new(MockGenerativeClient::new(reply)))
    }

    fn get_request(uri: &str, user: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(u) = user {
            builder = builder.header("X-User-Id", u);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn json_request(uri: &str, user: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("X-User-Id", user)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn multipart_request(user: &str, document: Option<&[u8]>, language: Option<&str>) -> Request<Body> {
        let mut body: Vec<u8> = Vec::new();
        if let Some(lang) = language {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"language\"\r\n\r\n{lang}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some(doc) = document {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"document\"; filename=\"scan.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(doc);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/analysis/analyze")
            .header("X-User-Id", user)
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn response_json(response: axum::http::Response<Body>) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    const ANALYSIS_REPLY: &str = r#"```json
{"originalText":"Tab. Azithromycin 500mg OD x 3 days","simplifiedText":"Take one azithromycin tablet daily for three days.","documentType":"prescription"}
```"#;

    #[tokio::test]
    async fn root_banner() {
        let (app, _, _tmp) = app("");
        let response = app.oneshot(get_request("/", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"Sanjeevani API is running...");
    }

    #[tokio::test]
    async fn health_response_shape() {
        let (app, _, _tmp) = app("");
        let response = app.oneshot(get_request("/api/health", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("Cache-Control").unwrap(), "no-store");
        let json = response_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["model"], "mock-model");
        assert!(json["version"].is_string());
    }

    #[tokio::test]
    async fn protected_routes_require_caller() {
        let (app, _, _tmp) = app("");
        let response = app.oneshot(get_request("/api/analysis", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "AUTH_REQUIRED");
    }

    #[tokio::test]
    async fn not_found_for_unknown_route() {
        let (app, _, _tmp) = app("");
        let response = app
            .oneshot(get_request("/api/nonexistent", Some("user-1")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn symptoms_returns_normalized_reply() {
        let (app, _, _tmp) = app(
            r#"Sure! {"responseText":"Rest and drink fluids.","suggestions":["How long has it lasted?"],"highlightArea":"HEAD","riskLevel":"routine","recommendationType":"self-care"}"#,
        );
        let response = app
            .oneshot(json_request(
                "/api/assistant/symptoms",
                "user-1",
                r#"{"message":"I have a mild headache","history":[],"language":"en-IN"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["responseText"], "Rest and drink fluids.");
        assert_eq!(json["highlightArea"], "head");
        assert_eq!(json["riskLevel"], "routine");
    }

    #[tokio::test]
    async fn symptoms_malformed_reply_is_200_fallback() {
        let (app, _, _tmp) = app("I think you should see a doctor.");
        let response = app
            .oneshot(json_request(
                "/api/assistant/symptoms",
                "user-1",
                r#"{"message":"chest pain","history":[],"language":"hi-IN"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        let text = json["responseText"].as_str().unwrap();
        assert!(!text.contains("see a doctor"));
        assert_eq!(json["highlightArea"], "none");
        assert!(json["riskLevel"].is_null());
    }

    #[tokio::test]
    async fn symptoms_upstream_failure_is_200_fallback() {
        let (app, _, _tmp) = app_with(Arc::new(MockGenerativeClient::failing(
            GeminiError::Connection("refused".into()),
        )));
        let response = app
            .oneshot(json_request(
                "/api/assistant/symptoms",
                "user-1",
                r#"{"message":"fever","history":[],"language":"en-IN"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert!(json["suggestions"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn symptoms_missing_fields_is_400() {
        let (app, _, _tmp) = app("");
        let response = app
            .oneshot(json_request(
                "/api/assistant/symptoms",
                "user-1",
                r#"{"message":"fever"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn symptoms_invalid_json_is_400() {
        let (app, _, _tmp) = app("");
        let response = app
            .oneshot(json_request("/api/assistant/symptoms", "user-1", "{not json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn analyze_stores_and_returns_201() {
        let (app, _, _tmp) = app(ANALYSIS_REPLY);
        let response = app
            .clone()
            .oneshot(multipart_request("user-1", Some(JPEG), Some("hi-IN")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = response_json(response).await;
        assert_eq!(created["documentType"], "prescription");
        assert_eq!(created["language"], "hi-IN");
        assert_eq!(created["userId"], "user-1");
        assert_eq!(created["model"], "mock-model");
        let id = created["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(get_request(&format!("/api/analysis/{id}"), Some("user-1")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let fetched = response_json(response).await;
        assert_eq!(fetched["originalText"], created["originalText"]);

        let response = app
            .oneshot(get_request("/api/analysis", Some("user-1")))
            .await
            .unwrap();
        let listed = response_json(response).await;
        assert_eq!(listed["analyses"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn analysis_hidden_from_other_callers() {
        let (app, _, _tmp) = app(ANALYSIS_REPLY);
        let response = app
            .clone()
            .oneshot(multipart_request("user-1", Some(JPEG), None))
            .await
            .unwrap();
        let created = response_json(response).await;
        let id = created["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(get_request(&format!("/api/analysis/{id}"), Some("user-2")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(get_request("/api/analysis", Some("user-2")))
            .await
            .unwrap();
        let listed = response_json(response).await;
        assert!(listed["analyses"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn analysis_detail_malformed_id_is_400() {
        let (app, _, _tmp) = app("");
        let response = app
            .oneshot(get_request("/api/analysis/not-a-uuid", Some("user-1")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn analyze_without_document_is_400() {
        let (app, _, _tmp) = app(ANALYSIS_REPLY);
        let response = app
            .oneshot(multipart_request("user-1", None, Some("en-IN")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn analyze_unsupported_type_is_415() {
        let (app, _, _tmp) = app(ANALYSIS_REPLY);
        let response = app
            .oneshot(multipart_request("user-1", Some(b"GIF89a-not-allowed"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn analyze_oversized_upload_is_413() {
        let (app, _, _tmp) = app(ANALYSIS_REPLY);
        let mut big = JPEG.to_vec();
        big.resize(2 * 1024 * 1024, 0);
        let response = app
            .oneshot(multipart_request("user-1", Some(&big), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn analyze_malformed_reply_is_502_and_not_stored() {
        let (app, _, _tmp) = app("Sorry, I could not read that.");
        let response = app
            .clone()
            .oneshot(multipart_request("user-1", Some(JPEG), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "AI_UNAVAILABLE");

        let response = app
            .oneshot(get_request("/api/analysis", Some("user-1")))
            .await
            .unwrap();
        let listed = response_json(response).await;
        assert!(listed["analyses"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn rate_limit_returns_429_with_retry_after() {
        let (app, _, _tmp) = app("");
        for _ in 0..5 {
            let response = app
                .clone()
                .oneshot(get_request("/api/analysis", Some("user-1")))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
        let response = app
            .clone()
            .oneshot(get_request("/api/analysis", Some("user-1")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get("Retry-After").unwrap(), "60");

        // Other callers are unaffected
        let response = app
            .oneshot(get_request("/api/analysis", Some("user-2")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn cors_preflight_allows_configured_origin() {
        let (app, _, _tmp) = app("");
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/api/analysis")
            .header("Origin", "http://localhost:5173")
            .header("Access-Control-Request-Method", "GET")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .unwrap(),
            "http://localhost:5173"
        );
    }

    #[tokio::test]
    async fn analyze_non_multipart_body_is_400() {
        let (app, _, _tmp) = app(ANALYSIS_REPLY);
        let response = app
            .oneshot(json_request("/api/analysis/analyze", "user-1", r#"{"document":"x"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }
}
