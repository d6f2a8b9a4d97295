use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{NewResume, Resume, TailoringResult};
use crate::state::AppState;
use crate::tailor::catalog::{FreeModel, GROK_CONTEXT_LENGTH, GROK_MODEL};
use crate::tailor::TailorRequest;

#[derive(Deserialize)]
pub struct TailorBody {
    pub resume: String,
    #[serde(alias = "jobDescription")]
    pub job_description: String,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    /// Store the result as a new tailored resume.
    #[serde(default)]
    pub save: bool,
}

#[derive(Serialize)]
pub struct TailorResponse {
    pub result: TailoringResult,
    pub resume_id: Option<Uuid>,
}

/// POST /api/v1/tailor
pub async fn handle_tailor(
    State(state): State<AppState>,
    Json(body): Json<TailorBody>,
) -> Result<Json<TailorResponse>, AppError> {
    let request = TailorRequest {
        resume: body.resume,
        job_description: body.job_description,
        provider: body.provider,
        model: body.model,
    };
    let result = state.tailor.tailor(&request).await?;

    let resume_id = if body.save {
        let resume = Resume::new(NewResume {
            content: request.resume,
            title: Some(result.job_details.company.clone()),
            position: Some(result.job_details.role.clone()),
            job_description: Some(request.job_description),
            tailored_response: Some(result.clone()),
        });
        let id = state.store.save(resume).await?;
        info!(%id, company = %result.job_details.company, "Tailored resume saved");
        Some(id)
    } else {
        None
    };

    Ok(Json(TailorResponse { result, resume_id }))
}

#[derive(Serialize)]
pub struct ModelsResponse {
    pub openrouter: Vec<FreeModel>,
    pub grok: Vec<FreeModel>,
}

/// GET /api/v1/tailor/models
pub async fn handle_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        openrouter: state.tailor.free_models().await,
        grok: vec![FreeModel {
            id: GROK_MODEL.to_string(),
            context_length: Some(GROK_CONTEXT_LENGTH),
        }],
    })
}
