use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::layout::{
    analyze_pages, paginate_blocking, ContentRoot, ContinuationHeader, Fallback, LayoutError,
    Measurer, Page, PageFillAnalysis, PaginationOptions,
};
use crate::markdown::{self, html::page_to_html};
use crate::models::View;
use crate::routes::resumes::load_resume;
use crate::state::AppState;

/// Pages plus everything the editor needs to show them.
#[derive(Debug, Serialize)]
pub struct RenderedPages {
    pub paginated: bool,
    pub pages: Vec<Page>,
    /// One `.page` container per page, in order.
    pub html: Vec<String>,
    pub split_entries: usize,
    pub fallback: Option<Fallback>,
    /// Empty unless fitted pages were produced.
    pub fill: Vec<PageFillAnalysis>,
}

/// Renders a Markdown document and lays it out with the server's page setup.
pub(crate) async fn render_document(
    state: &AppState,
    source: &str,
    paginated: bool,
    continuation_header: ContinuationHeader,
) -> Result<RenderedPages, AppError> {
    let blocks = markdown::render(source);
    let options = PaginationOptions {
        paginated,
        page: state.page.clone(),
        continuation_header,
    };
    let available_px = options.page.usable_height_px();

    let pagination = paginate_blocking(
        ContentRoot::Flat(blocks),
        options,
        state.measurer.clone(),
    )
    .await?;

    let fill = if pagination.fallback.is_none() {
        let measurer = state.measurer.clone();
        let pages = pagination.pages.clone();
        tokio::task::spawn_blocking(move || fill_report(&pages, available_px, measurer.as_ref()))
            .await
            .map_err(|e| LayoutError::Worker(e.to_string()))?
    } else {
        Vec::new()
    };

    debug!(
        pages = pagination.pages.len(),
        split_entries = pagination.split_entries,
        fallback = ?pagination.fallback,
        "Document laid out"
    );

    let html = pagination
        .pages
        .iter()
        .map(|p| page_to_html(p, paginated))
        .collect();
    Ok(RenderedPages {
        paginated,
        pages: pagination.pages,
        html,
        split_entries: pagination.split_entries,
        fallback: pagination.fallback,
        fill,
    })
}

/// Fill report for fitted pages. A failed measurement omits the report rather
/// than failing the render.
fn fill_report(pages: &[Page], available_px: f32, measurer: &dyn Measurer) -> Vec<PageFillAnalysis> {
    match analyze_pages(pages, available_px, measurer) {
        Ok(fill) => fill,
        Err(e) => {
            warn!(error = %e, "fill analysis failed; omitting report");
            Vec::new()
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize)]
pub struct PreviewRequest {
    pub markdown: String,
    #[serde(default = "default_true")]
    pub paginated: bool,
    /// Prepend the saved contact details, as saved resumes do.
    #[serde(default = "default_true")]
    pub include_user_details: bool,
    #[serde(default)]
    pub continuation_header: ContinuationHeader,
}

/// POST /api/v1/preview
pub async fn handle_preview(
    State(state): State<AppState>,
    Json(req): Json<PreviewRequest>,
) -> Result<Json<RenderedPages>, AppError> {
    let details = if req.include_user_details {
        state.store.get_user_details().await?
    } else {
        None
    };
    let source = markdown::compose_document(details.as_ref(), &req.markdown);
    let rendered = render_document(&state, &source, req.paginated, req.continuation_header).await?;
    Ok(Json(rendered))
}

#[derive(Deserialize)]
pub struct PagesQuery {
    #[serde(default)]
    pub view: View,
    #[serde(default = "default_true")]
    pub paginated: bool,
    #[serde(default)]
    pub continuation_header: ContinuationHeader,
}

/// GET /api/v1/resumes/:id/pages?view=tailored|original&paginated=true|false
pub async fn handle_resume_pages(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<PagesQuery>,
) -> Result<Json<RenderedPages>, AppError> {
    let resume = load_resume(&state, id).await?;
    let details = state.store.get_user_details().await?;
    let source = markdown::compose_document(details.as_ref(), resume.display_content(query.view));
    let rendered =
        render_document(&state, &source, query.paginated, query.continuation_header).await?;
    Ok(Json(rendered))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use super::fill_report;
    use crate::layout::block::{Block, ListItem};
    use crate::layout::measure::{MeasureError, Measurer};
    use crate::layout::page::PageContent;
    use crate::layout::Page;
    use crate::models::tailoring::tests::sample_result;
    use crate::models::{NewResume, Resume, UserDetails};
    use crate::routes::test_support::{app, send, test_state};

    fn long_resume() -> String {
        let mut md = String::from("## Experience\n\n");
        for job in 0..12 {
            md.push_str(&format!("### Engineer {job}, Company {job}\n\n"));
            for bullet in 0..6 {
                md.push_str(&format!(
                    "- Delivered project {bullet} for team {job} with measurable impact on latency and reliability\n"
                ));
            }
            md.push('\n');
        }
        md.push_str("## Skills\n\n- Rust\n- Postgres\n");
        md
    }

    #[tokio::test]
    async fn test_preview_paginates_long_documents() {
        let (status, body) = send(
            app(&test_state()),
            Method::POST,
            "/api/v1/preview",
            Some(json!({ "markdown": long_resume() })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let pages = body["pages"].as_array().unwrap();
        assert!(pages.len() > 1);
        assert_eq!(body["html"].as_array().unwrap().len(), pages.len());
        assert_eq!(body["fill"].as_array().unwrap().len(), pages.len());
        assert!(body["fallback"].is_null());
        assert!(body["html"][0].as_str().unwrap().contains("data-page=\"1\""));
    }

    #[tokio::test]
    async fn test_preview_with_pagination_off_is_one_flow_page() {
        let (status, body) = send(
            app(&test_state()),
            Method::POST,
            "/api/v1/preview",
            Some(json!({ "markdown": long_resume(), "paginated": false })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pages"].as_array().unwrap().len(), 1);
        assert_eq!(body["pages"][0]["content"]["kind"], "flow");
        assert_eq!(body["fallback"], "disabled");
        assert!(body["fill"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_preview_prepends_contact_details() {
        let state = test_state();
        state
            .store
            .save_user_details(UserDetails {
                name: "Jane Doe".into(),
                email: "jane@example.com".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        let (_, body) = send(
            app(&state),
            Method::POST,
            "/api/v1/preview",
            Some(json!({ "markdown": "## Skills\n\n- Rust" })),
        )
        .await;
        let html = body["html"][0].as_str().unwrap();
        assert!(html.contains("<h1>Jane Doe</h1>"));
        assert!(html.contains("mailto:jane@example.com"));

        let (_, body) = send(
            app(&state),
            Method::POST,
            "/api/v1/preview",
            Some(json!({ "markdown": "## Skills\n\n- Rust", "include_user_details": false })),
        )
        .await;
        assert!(!body["html"][0].as_str().unwrap().contains("Jane Doe"));
    }

    #[tokio::test]
    async fn test_resume_pages_respect_view() {
        let state = test_state();
        let id = state
            .store
            .save(Resume::new(NewResume {
                content: "# Original".into(),
                tailored_response: Some(sample_result()),
                ..Default::default()
            }))
            .await
            .unwrap();

        let (status, body) = send(
            app(&state),
            Method::GET,
            &format!("/api/v1/resumes/{id}/pages"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["html"][0].as_str().unwrap().contains("Tailored"));

        let (_, body) = send(
            app(&state),
            Method::GET,
            &format!("/api/v1/resumes/{id}/pages?view=original&paginated=false"),
            None,
        )
        .await;
        let html = body["html"][0].as_str().unwrap();
        assert!(html.contains("Original"));
        assert!(!html.contains("paginated"));
    }

    struct FailingMeasurer;

    impl Measurer for FailingMeasurer {
        fn block_height(&self, _block: &Block) -> Result<f32, MeasureError> {
            Err(MeasureError::Surface("renderer unavailable".into()))
        }

        fn item_height(&self, _item: &ListItem) -> Result<f32, MeasureError> {
            Err(MeasureError::Surface("renderer unavailable".into()))
        }
    }

    #[test]
    fn test_fill_report_is_empty_when_measurement_fails() {
        let pages = vec![Page {
            number: 1,
            content: PageContent::Flow(vec![Block::paragraph("Rust")]),
        }];
        assert!(fill_report(&pages, 1000.0, &FailingMeasurer).is_empty());
    }

    #[tokio::test]
    async fn test_empty_resume_shows_placeholder() {
        let (_, body) = send(
            app(&test_state()),
            Method::POST,
            "/api/v1/preview",
            Some(json!({ "markdown": "" })),
        )
        .await;
        assert!(body["html"][0].as_str().unwrap().contains("No content provided"));
    }
}
