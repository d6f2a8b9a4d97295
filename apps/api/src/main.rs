mod config;
mod db;
mod errors;
mod export;
mod import;
mod layout;
mod markdown;
mod models;
mod routes;
mod state;
mod storage;
mod tailor;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::export::{PdfRenderer, RemotePdfRenderer};
use crate::layout::{PageSetup, TextMetricsMeasurer};
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::{MemoryStore, PgStore, ResumeStore};
use crate::tailor::client::ChatClient;
use crate::tailor::TailorService;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ResumeFlow API v{}", env!("CARGO_PKG_VERSION"));

    let store: Arc<dyn ResumeStore> = match &config.database_url {
        Some(url) => {
            let store = PgStore::new(create_pool(url).await?);
            store.ensure_schema().await?;
            Arc::new(store)
        }
        None => {
            warn!("DATABASE_URL not set; resumes are kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    let chat = ChatClient::new(
        config.openrouter_api_key.clone(),
        config.xai_api_key.clone(),
    )?;
    if config.openrouter_api_key.is_none() && config.xai_api_key.is_none() {
        warn!("No provider API keys set; tailoring requests will fail");
    }
    let tailor = Arc::new(TailorService::new(chat));

    let pdf: Option<Arc<dyn PdfRenderer>> = match &config.pdf_renderer_url {
        Some(url) => {
            info!("PDF renderer at {url}");
            Some(Arc::new(RemotePdfRenderer::new(url.clone())?))
        }
        None => {
            warn!("PDF_RENDERER_URL not set; PDF export is disabled");
            None
        }
    };

    let page = PageSetup {
        font: config.page_font,
        ..PageSetup::a4(config.page_padding_mm)
    };
    info!(
        padding_mm = page.padding_mm,
        usable_height_px = page.usable_height_px(),
        "Page setup: A4 {:?}",
        page.font
    );

    let state = AppState {
        store,
        tailor,
        pdf,
        measurer: Arc::new(TextMetricsMeasurer::new(&page)),
        page,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
