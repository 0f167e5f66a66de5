//! Axum route handlers for the Assessment API.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::assessment::assessor::AssessmentRequest;
use crate::errors::AppError;
use crate::models::assessment::AssessmentReport;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AssessmentResponse {
    pub assessment_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub backend: String,
    pub report: AssessmentReport,
}

/// POST /api/v1/assessment
///
/// Runs the applicant profile through the assessor and returns the structured report.
pub async fn handle_assess(
    State(state): State<AppState>,
    Json(request): Json<AssessmentRequest>,
) -> Result<Json<AssessmentResponse>, AppError> {
    if request.profile_text.trim().is_empty() {
        return Err(AppError::Validation(
            "profile_text cannot be empty".to_string(),
        ));
    }

    let report = state.assessor.assess(&request).await?;

    Ok(Json(AssessmentResponse {
        assessment_id: Uuid::new_v4(),
        generated_at: Utc::now(),
        backend: state.assessor.backend().to_string(),
        report,
    }))
}
