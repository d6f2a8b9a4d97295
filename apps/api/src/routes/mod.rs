pub mod export;
pub mod health;
pub mod preview;
pub mod resumes;
pub mod tailor;
pub mod user_details;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};

use crate::import::MAX_IMPORT_BYTES;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/onboarding", get(user_details::handle_onboarding))
        // Resumes
        .route(
            "/api/v1/resumes",
            get(resumes::handle_list).post(resumes::handle_create),
        )
        .route(
            "/api/v1/resumes/import",
            // Headroom for multipart framing around the file itself.
            post(resumes::handle_import).layer(DefaultBodyLimit::max(MAX_IMPORT_BYTES + 64 * 1024)),
        )
        .route(
            "/api/v1/resumes/:id",
            get(resumes::handle_get).delete(resumes::handle_delete),
        )
        .route("/api/v1/resumes/:id/title", patch(resumes::handle_update_title))
        .route("/api/v1/resumes/:id/pages", get(preview::handle_resume_pages))
        .route("/api/v1/resumes/:id/analysis", get(resumes::handle_analysis))
        // User details
        .route(
            "/api/v1/user-details",
            get(user_details::handle_get).put(user_details::handle_put),
        )
        // Layout
        .route("/api/v1/preview", post(preview::handle_preview))
        // Tailoring
        .route("/api/v1/tailor", post(tailor::handle_tailor))
        .route("/api/v1/tailor/models", get(tailor::handle_models))
        // Export
        .route("/api/v1/export/pdf", post(export::handle_export_pdf))
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
        Router,
    };
    use bytes::Bytes;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::export::{ExportError, PdfRenderer};
    use crate::layout::{PageSetup, TextMetricsMeasurer};
    use crate::models::tailoring::tests::sample_result;
    use crate::models::TailoringResult;
    use crate::state::AppState;
    use crate::storage::MemoryStore;
    use crate::tailor::catalog::{fallback_models, FreeModel};
    use crate::tailor::{validate, Tailor, TailorError, TailorRequest};

    /// Validates like the real service, then answers with a canned result.
    pub struct FakeTailor;

    #[async_trait]
    impl Tailor for FakeTailor {
        async fn free_models(&self) -> Vec<FreeModel> {
            fallback_models()
        }

        async fn tailor(&self, request: &TailorRequest) -> Result<TailoringResult, TailorError> {
            validate(request, &fallback_models())?;
            Ok(sample_result())
        }
    }

    /// Echoes the HTML back with a PDF magic prefix.
    pub struct EchoPdf;

    #[async_trait]
    impl PdfRenderer for EchoPdf {
        async fn render(&self, html: String) -> Result<Bytes, ExportError> {
            Ok(Bytes::from(format!("%PDF-{html}")))
        }
    }

    pub fn test_state() -> AppState {
        let page = PageSetup::default();
        AppState {
            store: Arc::new(MemoryStore::new()),
            tailor: Arc::new(FakeTailor),
            pdf: Some(Arc::new(EchoPdf)),
            measurer: Arc::new(TextMetricsMeasurer::new(&page)),
            page,
        }
    }

    pub fn app(state: &AppState) -> Router {
        super::build_router(state.clone())
    }

    pub async fn send_raw(app: Router, request: Request<Body>) -> (StatusCode, Bytes) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body)
    }

    /// Sends a JSON request and parses the JSON reply (`Null` for empty bodies).
    pub async fn send(
        app: Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let (status, bytes) = send_raw(app, request).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }
}
