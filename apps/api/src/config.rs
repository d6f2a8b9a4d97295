use anyhow::{Context, Result};

use crate::layout::font_metrics::FontFamily;
use crate::layout::page::DEFAULT_PADDING_MM;

/// Application configuration loaded from environment variables.
/// Every service is optional; missing ones degrade to in-memory storage or
/// a "not configured" error on the routes that need them.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub openrouter_api_key: Option<String>,
    pub xai_api_key: Option<String>,
    pub pdf_renderer_url: Option<String>,
    pub page_padding_mm: f32,
    pub page_font: FontFamily,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            openrouter_api_key: optional_env("OPENROUTER_API_KEY"),
            xai_api_key: optional_env("XAI_API_KEY"),
            pdf_renderer_url: optional_env("PDF_RENDERER_URL"),
            page_padding_mm: match optional_env("PAGE_PADDING_MM") {
                Some(v) => parse_padding(&v)?,
                None => DEFAULT_PADDING_MM,
            },
            page_font: match optional_env("PAGE_FONT") {
                Some(v) => v
                    .parse::<FontFamily>()
                    .map_err(|e| anyhow::anyhow!("PAGE_FONT: {e}"))?,
                None => FontFamily::default(),
            },
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Unset and blank variables are treated the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_padding(value: &str) -> Result<f32> {
    let padding = value
        .trim()
        .parse::<f32>()
        .context("PAGE_PADDING_MM must be a number")?;
    // Padding must leave room for content on an A4 page.
    anyhow::ensure!(
        padding.is_finite() && (0.0..100.0).contains(&padding),
        "PAGE_PADDING_MM must be between 0 and 100, got {padding}"
    );
    Ok(padding)
}
