use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::UserDetails;
use crate::state::AppState;

/// GET /api/v1/user-details
pub async fn handle_get(State(state): State<AppState>) -> Result<Json<UserDetails>, AppError> {
    state
        .store
        .get_user_details()
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No user details saved".to_string()))
}

/// PUT /api/v1/user-details
pub async fn handle_put(
    State(state): State<AppState>,
    Json(details): Json<UserDetails>,
) -> Result<StatusCode, AppError> {
    if details.name.trim().is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }
    state.store.save_user_details(details).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Serialize)]
pub struct OnboardingStatus {
    pub has_user_details: bool,
    pub has_resumes: bool,
    /// True until both contact details and a first resume exist.
    pub show_welcome: bool,
}

/// GET /api/v1/onboarding
pub async fn handle_onboarding(
    State(state): State<AppState>,
) -> Result<Json<OnboardingStatus>, AppError> {
    let has_user_details = state.store.has_user_details().await?;
    let has_resumes = !state.store.is_empty().await?;
    Ok(Json(OnboardingStatus {
        has_user_details,
        has_resumes,
        show_welcome: !(has_user_details && has_resumes),
    }))
}
