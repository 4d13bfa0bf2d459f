pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::extraction::handlers as extraction;
use crate::state::AppState;
use crate::template::handlers as template;

pub fn build_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Extraction API
        .route("/api/v1/rules/extract", post(extraction::handle_extract))
        .route(
            "/api/v1/examples/guideline",
            get(extraction::handle_sample_guideline),
        )
        // Template API
        .route("/api/v1/templates", post(template::handle_generate))
        .route("/api/v1/templates/render", post(template::handle_render))
        .layer(body_limit)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::extraction::{RuleCache, RuleExtractor};
    use crate::llm_client::testing::ScriptedGenerator;
    use crate::llm_client::RetryPolicy;
    use crate::template::DOCX_CONTENT_TYPE;

    const BOUNDARY: &str = "tatatulis-test-boundary";

    fn app(generator: ScriptedGenerator) -> (Router, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let extractor = RuleExtractor::new(
            Arc::new(generator),
            RuleCache::open(dir.path()).unwrap(),
        )
        .with_retry_policy(RetryPolicy::fixed(1, std::time::Duration::ZERO));
        let config = Config {
            google_api_key: "test-key".to_string(),
            cache_dir: dir.path().to_path_buf(),
            port: 0,
            max_upload_bytes: 1024 * 1024,
            rust_log: "debug".to_string(),
        };
        let state = AppState {
            extractor: Arc::new(extractor),
            config,
        };
        (build_router(state), dir)
    }

    fn multipart(uri: &str, file_name: &str, content: &str) -> Request<Body> {
        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n\
             {content}\r\n\
             --{BOUNDARY}--\r\n"
        );
        Request::post(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _dir) = app(ScriptedGenerator::replying("{}"));
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["cache_entries"], 0);
    }

    #[tokio::test]
    async fn test_health_counts_cached_rule_sets() {
        let (app, _dir) = app(ScriptedGenerator::replying(r#"{"margin": {"top": 4}}"#));
        let response = app
            .clone()
            .oneshot(multipart("/api/v1/rules/extract", "panduan.txt", "Margin atas 4 cm"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(json_body(response).await["cache_entries"], 1);
    }

    #[tokio::test]
    async fn test_sample_guideline_download() {
        let (app, _dir) = app(ScriptedGenerator::replying("{}"));
        let response = app
            .oneshot(
                Request::get("/api/v1/examples/guideline")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"contoh_panduan.txt\""
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&bytes).starts_with("PANDUAN FORMAT DOKUMEN"));
    }

    #[tokio::test]
    async fn test_extract_returns_normalized_rules() {
        let (app, _dir) = app(ScriptedGenerator::replying(
            r#"Berikut hasilnya: {"margin": {"top": 4, "left": 4}, "font": {"family": "Arial"}}"#,
        ));
        let response = app
            .oneshot(multipart(
                "/api/v1/rules/extract",
                "panduan.txt",
                "Margin atas 4 cm, kiri 4 cm. Font Arial.",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["source"]["kind"], "model");
        assert_eq!(body["rules"]["margin"]["top"], 4.0);
        assert_eq!(body["rules"]["margin"]["bottom"], 3.0);
        assert_eq!(body["rules"]["font"]["family"], "Arial");
    }

    #[tokio::test]
    async fn test_extract_falls_back_when_model_output_has_no_json() {
        let (app, _dir) = app(ScriptedGenerator::replying("Maaf, saya tidak bisa."));
        let response = app
            .oneshot(multipart("/api/v1/rules/extract", "panduan.txt", "teks"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["source"]["kind"], "fallback");
        assert_eq!(body["rules"]["font"]["family"], "Times New Roman");
    }

    #[tokio::test]
    async fn test_unsupported_extension_is_rejected() {
        let (app, _dir) = app(ScriptedGenerator::replying("{}"));
        let response = app
            .oneshot(multipart("/api/v1/rules/extract", "panduan.pdf", "%PDF"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(json_body(response).await["error"]["code"], "UNSUPPORTED_FORMAT");
    }

    #[tokio::test]
    async fn test_missing_file_field_is_rejected() {
        let (app, _dir) = app(ScriptedGenerator::replying("{}"));
        let body = format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nx\r\n--{BOUNDARY}--\r\n");
        let request = Request::post("/api/v1/templates")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_template_download() {
        let (app, _dir) = app(ScriptedGenerator::replying(
            r#"{"document_structure": ["BAB I PENDAHULUAN", "Latar Belakang"]}"#,
        ));
        let response = app
            .oneshot(multipart("/api/v1/templates", "Panduan Skripsi.txt", "BAB I"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], DOCX_CONTENT_TYPE);
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"template_Panduan_Skripsi.docx\""
        );
        assert_eq!(headers["x-rule-source"], "model");

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[tokio::test]
    async fn test_render_from_raw_rules() {
        let (app, _dir) = app(ScriptedGenerator::replying("{}"));
        let request = Request::post("/api/v1/templates/render")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({"Margin": {"top": "4 cm"}, "paper": {"size": "F4"}}).to_string(),
            ))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], DOCX_CONTENT_TYPE);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}
