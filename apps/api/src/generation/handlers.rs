//! Axum route handlers for the Resume API.

use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::batch::{generate_batch, BatchContext, BatchReport};
use crate::generation::naming::resume_file_name_today;
use crate::models::profile::{JobPosting, Profile};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub job_title: String,
    pub job_description: String,
    #[serde(default)]
    pub company_name: String,
    pub profile: Profile,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    pub account_id: Uuid,
    pub profile: Profile,
    #[serde(default)]
    pub jobs: Vec<JobPosting>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resumes/generate
///
/// Runs the pipeline for one posting and streams the PDF back as an attachment.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Response, AppError> {
    if request.job_title.trim().is_empty() || request.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "jobTitle and jobDescription are required".to_string(),
        ));
    }

    let pdf = state
        .pipeline
        .generate_resume_document(&request.job_title, &request.job_description, &request.profile)
        .await?;

    let file_name = resume_file_name_today(
        &request.profile.full_name,
        &request.company_name,
        &request.job_title,
    );
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{file_name}\""))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid Content-Disposition: {e}")))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        pdf,
    )
        .into_response())
}

/// POST /api/v1/resumes/batch
///
/// Generates one resume and pending bid per job row. Row failures are
/// reported in the response body; the request itself only fails on bad input.
pub async fn handle_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> Result<Json<BatchReport>, AppError> {
    if request.jobs.is_empty() {
        return Err(AppError::Validation("jobs cannot be empty".to_string()));
    }
    if request.profile.full_name.trim().is_empty() {
        return Err(AppError::Validation(
            "profile fullName is required".to_string(),
        ));
    }

    let ctx = BatchContext {
        pipeline: state.pipeline.as_ref(),
        ledger: state.ledger.as_ref(),
        store: &state.store,
    };
    let report = generate_batch(ctx, request.account_id, &request.profile, &request.jobs).await;

    Ok(Json(report))
}
