//! Resume tailoring against a job description through a hosted chat model.

pub mod catalog;
pub mod client;
pub mod prompts;
pub mod tokens;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::models::TailoringResult;
use catalog::{FreeModel, ModelCatalog, GROK_MODEL};
use client::ChatClient;
use prompts::{build_tailor_prompt, TAILOR_SYSTEM};
use tokens::{base_prompt_tokens, TokenBudget};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenRouter,
    Grok,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Provider::OpenRouter => "openrouter",
            Provider::Grok => "grok",
        })
    }
}

impl FromStr for Provider {
    type Err = TailorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openrouter" => Ok(Provider::OpenRouter),
            "grok" => Ok(Provider::Grok),
            _ => Err(TailorError::Validation(
                "Invalid provider. Use \"openrouter\" or \"grok\".".to_string(),
            )),
        }
    }
}

#[derive(Debug, Error)]
pub enum TailorError {
    #[error("{0}")]
    Validation(String),

    #[error(
        "Estimated token count ({estimated}) exceeds 80% of model limit ({limit}). Reduce resume or job description size."
    )]
    TooManyTokens { estimated: usize, limit: u32 },

    #[error("no API key configured for provider {0}")]
    MissingApiKey(Provider),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("model returned empty content")]
    EmptyContent,

    #[error("model response is missing required fields: {}", .0.join(", "))]
    IncompleteResponse(Vec<&'static str>),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TailorRequest {
    #[serde(default)]
    pub resume: String,
    #[serde(default, alias = "jobDescription")]
    pub job_description: String,
    /// `openrouter` (default) or `grok`.
    #[serde(default)]
    pub provider: Option<String>,
    /// Defaults to the first free model for OpenRouter and `grok-beta` for Grok.
    #[serde(default)]
    pub model: Option<String>,
}

/// A request that passed validation and fits the model's context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validated {
    pub provider: Provider,
    pub model: String,
    pub budget: TokenBudget,
}

/// Checks inputs, provider, model, and token budget before any provider call.
pub fn validate(request: &TailorRequest, free_models: &[FreeModel]) -> Result<Validated, TailorError> {
    if request.resume.trim().is_empty() || request.job_description.trim().is_empty() {
        return Err(TailorError::Validation(
            "Resume content and job description are required".to_string(),
        ));
    }

    let provider = match request.provider.as_deref() {
        None | Some("") => Provider::OpenRouter,
        Some(p) => p.parse()?,
    };

    let model = match (provider, request.model.as_deref()) {
        (_, Some(m)) if !m.trim().is_empty() => m.trim().to_string(),
        (Provider::Grok, _) => GROK_MODEL.to_string(),
        (Provider::OpenRouter, _) => free_models
            .first()
            .map(|m| m.id.clone())
            .ok_or_else(|| TailorError::Validation("No free OpenRouter models available".into()))?,
    };

    if provider == Provider::OpenRouter && !free_models.iter().any(|m| m.id == model) {
        let ids: Vec<&str> = free_models.iter().map(|m| m.id.as_str()).collect();
        return Err(TailorError::Validation(format!(
            "Invalid model for OpenRouter free tier. Use one of: {}",
            ids.join(", ")
        )));
    }

    let limit = catalog::token_limit(free_models, provider, &model);
    let budget = TokenBudget::for_inputs(
        &request.resume,
        &request.job_description,
        base_prompt_tokens(),
        limit,
    );
    if budget.exceeds_limit() {
        return Err(TailorError::TooManyTokens {
            estimated: budget.estimated,
            limit: budget.limit,
        });
    }

    Ok(Validated {
        provider,
        model,
        budget,
    })
}

/// Parses a model reply, reporting which required sections are absent.
pub fn parse_tailoring(value: Value) -> Result<TailoringResult, TailorError> {
    let missing: Vec<&'static str> = ["jobDetails", "tailoredResume", "coverLetter"]
        .into_iter()
        .filter(|key| value.get(key).map_or(true, Value::is_null))
        .collect();
    if !missing.is_empty() {
        return Err(TailorError::IncompleteResponse(missing));
    }
    Ok(serde_json::from_value(value)?)
}

#[async_trait]
pub trait Tailor: Send + Sync {
    async fn free_models(&self) -> Vec<FreeModel>;

    async fn tailor(&self, request: &TailorRequest) -> Result<TailoringResult, TailorError>;
}

/// Tailoring through OpenRouter or xAI chat completions.
pub struct TailorService {
    client: ChatClient,
    catalog: ModelCatalog,
}

impl TailorService {
    pub fn new(client: ChatClient) -> Self {
        let catalog = ModelCatalog::new(client.http().clone());
        Self { client, catalog }
    }
}

#[async_trait]
impl Tailor for TailorService {
    async fn free_models(&self) -> Vec<FreeModel> {
        self.catalog.models().await
    }

    async fn tailor(&self, request: &TailorRequest) -> Result<TailoringResult, TailorError> {
        let models = self.catalog.models().await;
        let validated = validate(request, &models)?;
        info!(
            provider = %validated.provider,
            model = %validated.model,
            estimated_tokens = validated.budget.estimated,
            max_tokens = validated.budget.limit,
            "Tailoring resume"
        );

        let prompt = build_tailor_prompt(&request.resume, &request.job_description);
        let value: Value = self
            .client
            .complete_json(validated.provider, &validated.model, TAILOR_SYSTEM, &prompt)
            .await?;
        parse_tailoring(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn models() -> Vec<FreeModel> {
        catalog::fallback_models()
    }

    fn request(provider: Option<&str>, model: Option<&str>) -> TailorRequest {
        TailorRequest {
            resume: "# Jane\n\n## Experience".into(),
            job_description: "Backend engineer, Rust".into(),
            provider: provider.map(str::to_string),
            model: model.map(str::to_string),
        }
    }

    #[test]
    fn test_inputs_are_required() {
        let mut req = request(None, None);
        req.job_description = "  ".into();
        let err = validate(&req, &models()).unwrap_err();
        assert_eq!(err.to_string(), "Resume content and job description are required");
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        let err = validate(&request(Some("openai"), None), &models()).unwrap_err();
        assert!(matches!(err, TailorError::Validation(msg) if msg.contains("openrouter")));
    }

    #[test]
    fn test_openrouter_model_must_be_free() {
        let err = validate(&request(Some("openrouter"), Some("openai/gpt-4o")), &models())
            .unwrap_err();
        assert!(err.to_string().starts_with("Invalid model for OpenRouter free tier"));

        let ok = validate(
            &request(Some("openrouter"), Some("google/gemma-2-9b-it:free")),
            &models(),
        )
        .unwrap();
        assert_eq!(ok.budget.limit, 8192);
    }

    #[test]
    fn test_defaults_pick_provider_and_model() {
        let ok = validate(&request(None, None), &models()).unwrap();
        assert_eq!(ok.provider, Provider::OpenRouter);
        assert_eq!(ok.model, "meta-llama/llama-3.1-8b-instruct:free");

        let grok = validate(&request(Some("Grok"), None), &models()).unwrap();
        assert_eq!(grok.model, GROK_MODEL);
        assert_eq!(grok.budget.limit, 4000);
    }

    #[test]
    fn test_grok_accepts_any_model_name() {
        let ok = validate(&request(Some("grok"), Some("grok-2")), &[]).unwrap();
        assert_eq!(ok.model, "grok-2");
    }

    #[test]
    fn test_oversized_input_exceeds_token_budget() {
        let mut req = request(Some("grok"), None);
        // 4 chars per token; 3200 tokens is 80% of Grok's 4000.
        req.resume = "x".repeat(4 * 3200);
        let err = validate(&req, &models()).unwrap_err();
        match err {
            TailorError::TooManyTokens { estimated, limit } => {
                assert_eq!(limit, 4000);
                assert!(estimated > 3200);
            }
            other => panic!("expected TooManyTokens, got {other:?}"),
        }
    }

    #[test]
    fn test_incomplete_response_names_missing_fields() {
        let err = parse_tailoring(json!({
            "jobDetails": { "company": "Acme" },
            "coverLetter": null
        }))
        .unwrap_err();
        match err {
            TailorError::IncompleteResponse(missing) => {
                assert_eq!(missing, vec!["tailoredResume", "coverLetter"]);
            }
            other => panic!("expected IncompleteResponse, got {other:?}"),
        }
    }

    #[test]
    fn test_complete_response_parses() {
        let result = parse_tailoring(json!({
            "jobDetails": { "company": "Acme", "role": "SRE" },
            "tailoredResume": { "content": "# Jane" },
            "coverLetter": "Hello"
        }))
        .unwrap();
        assert_eq!(result.job_details.role, "SRE");
    }

    #[test]
    fn test_request_accepts_camel_case_job_description() {
        let req: TailorRequest = serde_json::from_value(json!({
            "resume": "# A",
            "jobDescription": "JD"
        }))
        .unwrap();
        assert_eq!(req.job_description, "JD");
    }
}
