use std::sync::Arc;

use crate::export::PdfRenderer;
use crate::layout::{Measurer, PageSetup};
use crate::storage::ResumeStore;
use crate::tailor::Tailor;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Postgres when `DATABASE_URL` is set, in-memory otherwise.
    pub store: Arc<dyn ResumeStore>,
    pub tailor: Arc<dyn Tailor>,
    /// `None` when no `PDF_RENDERER_URL` is configured.
    pub pdf: Option<Arc<dyn PdfRenderer>>,
    /// Height measurement for pagination; shared with the blocking pool.
    pub measurer: Arc<dyn Measurer + Send + Sync>,
    pub page: PageSetup,
}
