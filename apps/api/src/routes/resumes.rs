use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::import::{extract_text, MAX_IMPORT_BYTES};
use crate::models::tailoring::{
    CoverLetter, JobDetails, KeywordRow, MatchPercentage, RoleFitAssessment,
};
use crate::models::{NewResume, Resume, ResumeSummary};
use crate::state::AppState;

pub(crate) async fn load_resume(state: &AppState, id: Uuid) -> Result<Resume, AppError> {
    state
        .store
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))
}

#[derive(Serialize)]
pub struct CreatedResponse {
    pub id: Uuid,
}

/// GET /api/v1/resumes
pub async fn handle_list(State(state): State<AppState>) -> Result<Json<Vec<ResumeSummary>>, AppError> {
    let resumes = state.store.get_all().await?;
    Ok(Json(resumes.iter().map(ResumeSummary::from).collect()))
}

/// POST /api/v1/resumes
pub async fn handle_create(
    State(state): State<AppState>,
    Json(req): Json<NewResume>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    if req.content.trim().is_empty() {
        return Err(AppError::Validation("Resume content is required".to_string()));
    }
    let id = state.store.save(Resume::new(req)).await?;
    info!(%id, "Resume saved");
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Resume>, AppError> {
    Ok(Json(load_resume(&state, id).await?))
}

/// DELETE /api/v1/resumes/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.store.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct TitleUpdate {
    pub title: String,
}

/// PATCH /api/v1/resumes/:id/title
pub async fn handle_update_title(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<TitleUpdate>,
) -> Result<StatusCode, AppError> {
    state.store.update_title(id, req.title.trim()).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Serialize)]
pub struct ImportResponse {
    pub file_name: String,
    pub content: String,
}

/// POST /api/v1/resumes/import
///
/// Returns the extracted text for editing; nothing is stored.
pub async fn handle_import(mut multipart: Multipart) -> Result<Json<ImportResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
        if bytes.len() > MAX_IMPORT_BYTES {
            return Err(AppError::PayloadTooLarge(format!(
                "{file_name} is larger than {} MB",
                MAX_IMPORT_BYTES / (1024 * 1024)
            )));
        }

        let content = extract_text(&file_name, bytes.to_vec()).await?;
        info!(file_name, chars = content.len(), "Resume imported");
        return Ok(Json(ImportResponse { file_name, content }));
    }
    Err(AppError::Validation("No file was uploaded".to_string()))
}

#[derive(Serialize)]
pub struct AnalysisResponse {
    pub job_details: JobDetails,
    pub keywords: Vec<KeywordRow>,
    pub match_percentage: MatchPercentage,
    pub role_fit_assessment: RoleFitAssessment,
    pub improvement_suggestions: Vec<String>,
    pub next_steps: Vec<String>,
    pub cover_letter: CoverLetter,
}

/// GET /api/v1/resumes/:id/analysis
pub async fn handle_analysis(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let resume = load_resume(&state, id).await?;
    let result = resume
        .tailored_response
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} has no tailoring analysis")))?;

    Ok(Json(AnalysisResponse {
        keywords: result.keyword_table(),
        job_details: result.job_details,
        match_percentage: result.match_percentage,
        role_fit_assessment: result.role_fit_assessment,
        improvement_suggestions: result.tailored_resume.improvement_suggestions,
        next_steps: result.next_steps,
        cover_letter: result.cover_letter,
    }))
}
