//! Resume generation pipeline.
//!
//! Flow: validate input → resolve style → compose prompt → completion call →
//!       build HTML document → render PDF.
//!
//! Stages run strictly in sequence and nothing is cached; identical inputs
//! trigger a fresh completion call and a fresh browser render. Both external
//! calls share one deadline.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;
use tokio::time::{timeout_at, Instant};
use tracing::{info, instrument};

use crate::generation::composer::compose_prompt;
use crate::llm_client::{CompletionError, CompletionService};
use crate::models::profile::Profile;
use crate::render::{build_html_document, DocumentRenderer, RenderError, ResolvedStyle, StyleError};

/// Which stage of the pipeline failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Input,
    Completion,
    Render,
    Storage,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid style settings: {0}")]
    Style(#[from] StyleError),

    #[error("Completion service failed: {0}")]
    Completion(#[from] CompletionError),

    #[error("Completion service did not answer before the deadline")]
    CompletionTimedOut,

    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),
}

impl PipelineError {
    pub fn stage(&self) -> PipelineStage {
        match self {
            PipelineError::InvalidInput(_) | PipelineError::Style(_) => PipelineStage::Input,
            PipelineError::Completion(_) | PipelineError::CompletionTimedOut => {
                PipelineStage::Completion
            }
            PipelineError::Render(_) => PipelineStage::Render,
        }
    }
}

/// Composer → completion client → renderer. Clients are injected so the
/// application owns their lifecycle.
pub struct ResumePipeline {
    completion: Arc<dyn CompletionService>,
    renderer: Arc<dyn DocumentRenderer>,
    timeout: Duration,
}

impl ResumePipeline {
    pub fn new(
        completion: Arc<dyn CompletionService>,
        renderer: Arc<dyn DocumentRenderer>,
        timeout: Duration,
    ) -> Self {
        Self {
            completion,
            renderer,
            timeout,
        }
    }

    /// Generates a resume PDF using the pipeline's default deadline.
    pub async fn generate_resume_document(
        &self,
        job_title: &str,
        job_description: &str,
        profile: &Profile,
    ) -> Result<Bytes, PipelineError> {
        let deadline = Instant::now() + self.timeout;
        self.generate_resume_document_by(job_title, job_description, profile, deadline)
            .await
    }

    /// Generates a resume PDF, failing with a timeout error once `deadline`
    /// passes. The in-flight call is dropped at that point.
    #[instrument(skip_all, fields(job_title = %job_title, candidate = %profile.full_name))]
    pub async fn generate_resume_document_by(
        &self,
        job_title: &str,
        job_description: &str,
        profile: &Profile,
        deadline: Instant,
    ) -> Result<Bytes, PipelineError> {
        validate_input(job_title, job_description, profile)?;
        let style = ResolvedStyle::resolve(profile.style_settings.as_ref())?;

        let prompt = compose_prompt(job_title, job_description, profile);

        let fragment = timeout_at(deadline, self.completion.complete(&prompt))
            .await
            .map_err(|_| PipelineError::CompletionTimedOut)??;
        info!("Completion returned {} chars of HTML", fragment.len());

        let html = build_html_document(&fragment, &style);
        let pdf = self.renderer.render_pdf(&html, deadline).await?;
        info!("Resume rendered ({} bytes)", pdf.len());

        Ok(pdf)
    }
}

fn validate_input(job_title: &str, job_description: &str, profile: &Profile) -> Result<(), PipelineError> {
    if job_title.trim().is_empty() {
        return Err(PipelineError::InvalidInput("job title is required".to_string()));
    }
    if job_description.trim().is_empty() {
        return Err(PipelineError::InvalidInput(
            "job description is required".to_string(),
        ));
    }
    if profile.full_name.trim().is_empty() {
        return Err(PipelineError::InvalidInput(
            "profile full name is required".to_string(),
        ));
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Test doubles (shared with batch and handler tests)
// ────────────────────────────────────────────────────────────────────────────
