//! PDF export: a standalone print document posted to an external HTML-to-PDF renderer.

use std::fmt::Write;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, info};

use crate::layout::page::{Page, PageSetup};
use crate::markdown::html::page_to_html;

const RENDER_TIMEOUT: Duration = Duration::from_secs(60);

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const PDF_DISPOSITION: &str = "attachment; filename=resume.pdf";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no PDF renderer is configured")]
    NotConfigured,

    #[error("nothing to export")]
    EmptyDocument,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("renderer returned status {status}: {message}")]
    Renderer { status: u16, message: String },
}

const PRINT_CSS: &str = r#"
@import url('https://fonts.googleapis.com/css2?family=Raleway:wght@400;700&display=swap');

:root {
    --text: #6b7280;
    --primary-dark: #81b8ff;
    --primary-light: #bfdbfe;
    --page-padding: {padding}mm;
}

@page { size: {width}mm {height}mm; margin: 0; }

body { margin: 0; font-family: 'Raleway', sans-serif; color: var(--text); }
a { text-decoration: none; color: var(--text); }

.page { box-sizing: border-box; padding: var(--page-padding); page-break-after: always; }
.page:last-child { page-break-after: auto; }

h1, h2 { color: var(--primary-dark); line-height: 1.2; }
h1 { font-size: 3rem; font-weight: 400; }
h2 { font-size: 1.5rem; font-weight: 400; margin: 2rem 0 0; }
h3 { font-size: 1.2rem; font-weight: 700; margin: 2rem 0 0; }
p { margin: 1rem 0; line-height: 1.5; }
ul, ol { padding-left: 2rem; margin: 1rem 0; }
ul { list-style-type: disc; }
ul ul { margin: 0.5rem 0; list-style-type: circle; }
li { margin: 0.5rem 0; }
strong { font-weight: bold; line-height: 2; }
"#;

fn print_css(setup: &PageSetup) -> String {
    PRINT_CSS
        .replace("{padding}", &setup.padding_mm.to_string())
        .replace("{width}", &setup.width_mm.to_string())
        .replace("{height}", &setup.height_mm.to_string())
}

/// Standalone HTML for printing `pages`, one `.page` per laid-out page.
pub fn print_document(pages: &[Page], setup: &PageSetup) -> String {
    let mut html = String::from("<!DOCTYPE html><html><head><meta charset=\"utf-8\">");
    let _ = write!(
        html,
        "<title>Resume PDF</title><style>{}</style></head><body><div id=\"resume-content\">",
        print_css(setup)
    );
    for page in pages {
        html.push_str(&page_to_html(page, true));
    }
    html.push_str("</div></body></html>");
    html
}

#[async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn render(&self, html: String) -> Result<Bytes, ExportError>;
}

/// Posts the document as `text/html` and expects PDF bytes back.
pub struct RemotePdfRenderer {
    client: Client,
    url: String,
}

impl RemotePdfRenderer {
    pub fn new(url: String) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(RENDER_TIMEOUT).build()?,
            url,
        })
    }
}

#[async_trait]
impl PdfRenderer for RemotePdfRenderer {
    async fn render(&self, html: String) -> Result<Bytes, ExportError> {
        if html.trim().is_empty() {
            return Err(ExportError::EmptyDocument);
        }
        debug!(bytes = html.len(), url = %self.url, "Sending document to PDF renderer");

        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "text/html")
            .body(html)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ExportError::Renderer {
                status: status.as_u16(),
                message,
            });
        }

        let pdf = response.bytes().await?;
        info!(bytes = pdf.len(), "PDF rendered");
        Ok(pdf)
    }
}
