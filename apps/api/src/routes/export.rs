use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::export::{print_document, ExportError, PDF_CONTENT_TYPE, PDF_DISPOSITION};
use crate::layout::ContinuationHeader;
use crate::markdown;
use crate::models::View;
use crate::routes::preview::render_document;
use crate::routes::resumes::load_resume;
use crate::state::AppState;

/// Export a saved resume by id, or ad-hoc Markdown.
#[derive(Deserialize)]
pub struct ExportRequest {
    #[serde(default)]
    pub resume_id: Option<Uuid>,
    #[serde(default)]
    pub markdown: Option<String>,
    #[serde(default)]
    pub view: View,
}

/// POST /api/v1/export/pdf
pub async fn handle_export_pdf(
    State(state): State<AppState>,
    Json(req): Json<ExportRequest>,
) -> Result<Response, AppError> {
    let renderer = state.pdf.clone().ok_or(ExportError::NotConfigured)?;

    let content = match (req.resume_id, req.markdown) {
        (Some(id), _) => load_resume(&state, id)
            .await?
            .display_content(req.view)
            .to_string(),
        (None, Some(md)) => md,
        (None, None) => {
            return Err(AppError::Validation(
                "Provide either resume_id or markdown".to_string(),
            ))
        }
    };

    let details = state.store.get_user_details().await?;
    let source = markdown::compose_document(details.as_ref(), &content);
    let rendered = render_document(&state, &source, true, ContinuationHeader::default()).await?;
    let html = print_document(&rendered.pages, &state.page);

    let pdf = renderer.render(html).await?;
    Ok((
        [
            (header::CONTENT_TYPE, PDF_CONTENT_TYPE),
            (header::CONTENT_DISPOSITION, PDF_DISPOSITION),
        ],
        pdf,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::json;

    use crate::routes::test_support::{app, send, send_raw, test_state};

    fn export_request(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/api/v1/export/pdf")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_export_markdown_returns_pdf_attachment() {
        let state = test_state();
        let response = tower::ServiceExt::oneshot(
            app(&state),
            export_request(json!({ "markdown": "## Skills\n\n- Rust" })),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=resume.pdf"
        );

        let (_, bytes) = send_raw(app(&state), export_request(json!({ "markdown": "## Skills\n\n- Rust" }))).await;
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(body.starts_with("%PDF-<!DOCTYPE html>"));
        assert!(body.contains("<li>Rust</li>"));
    }

    #[tokio::test]
    async fn test_export_requires_a_source() {
        let (status, _) = send(app(&test_state()), Method::POST, "/api/v1/export/pdf", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_export_unavailable_without_renderer() {
        let mut state = test_state();
        state.pdf = None;
        let (status, body) = send(
            app(&state),
            Method::POST,
            "/api/v1/export/pdf",
            Some(json!({ "markdown": "# A" })),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "EXPORT_UNAVAILABLE");
    }
}
