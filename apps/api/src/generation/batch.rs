//! Batch generation: one resume per job row, strictly one after another.
//!
//! For each row: validate → skip if the link is already bid on → refuse if the
//! resume file name is taken → run the pipeline → write the PDF → record a
//! pending bid. A failing row is recorded in the report and the batch moves on
//! to the next row. A PDF whose pending bid could not be recorded is deleted.

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::generation::naming::resume_file_name_today;
use crate::generation::pipeline::{PipelineStage, ResumePipeline};
use crate::models::bid::{NewPendingBid, PendingBidRow};
use crate::models::profile::{JobPosting, Profile};
use crate::storage::{BidLedger, ResumeStore};

/// Outcome of a single job row.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BatchItemOutcome {
    Generated {
        #[serde(rename = "pendingBid")]
        pending_bid: PendingBidRow,
    },
    Skipped { reason: String },
    Failed { stage: PipelineStage, message: String },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItem {
    pub index: usize,
    pub job_title: String,
    pub company_name: String,
    pub link: String,
    #[serde(flatten)]
    pub outcome: BatchItemOutcome,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub total: usize,
    pub generated: usize,
    pub skipped: usize,
    pub failed: usize,
    pub items: Vec<BatchItem>,
}

impl BatchReport {
    fn push(&mut self, item: BatchItem) {
        match item.outcome {
            BatchItemOutcome::Generated { .. } => self.generated += 1,
            BatchItemOutcome::Skipped { .. } => self.skipped += 1,
            BatchItemOutcome::Failed { .. } => self.failed += 1,
        }
        self.items.push(item);
    }
}

/// Everything a batch run needs besides its input rows.
pub struct BatchContext<'a> {
    pub pipeline: &'a ResumePipeline,
    pub ledger: &'a dyn BidLedger,
    pub store: &'a ResumeStore,
}

/// Generates a resume and a pending bid for every job row.
pub async fn generate_batch(
    ctx: BatchContext<'_>,
    account_id: Uuid,
    profile: &Profile,
    jobs: &[JobPosting],
) -> BatchReport {
    let mut report = BatchReport {
        total: jobs.len(),
        ..Default::default()
    };

    for (index, job) in jobs.iter().enumerate() {
        let outcome = process_row(&ctx, account_id, profile, job).await;
        match &outcome {
            BatchItemOutcome::Generated { pending_bid } => info!(
                "Batch row {}/{} generated {}",
                index + 1,
                jobs.len(),
                pending_bid.resume_file_name
            ),
            BatchItemOutcome::Skipped { reason } => {
                info!("Batch row {}/{} skipped: {}", index + 1, jobs.len(), reason)
            }
            BatchItemOutcome::Failed { stage, message } => warn!(
                "Batch row {}/{} failed at {:?}: {}",
                index + 1,
                jobs.len(),
                stage,
                message
            ),
        }

        report.push(BatchItem {
            index,
            job_title: job.job_title.clone(),
            company_name: job.company_name.clone(),
            link: job.link.clone(),
            outcome,
        });
    }

    info!(
        "Batch finished: {} generated, {} skipped, {} failed of {}",
        report.generated, report.skipped, report.failed, report.total
    );
    report
}

async fn process_row(
    ctx: &BatchContext<'_>,
    account_id: Uuid,
    profile: &Profile,
    job: &JobPosting,
) -> BatchItemOutcome {
    let link = job.link.trim();
    if let Err(message) = validate_row(job) {
        return failed(PipelineStage::Input, message);
    }

    match ctx.ledger.link_already_bid(account_id, link).await {
        Ok(true) => {
            return BatchItemOutcome::Skipped {
                reason: "a bid for this link already exists".to_string(),
            }
        }
        Ok(false) => {}
        Err(e) => return failed(PipelineStage::Storage, e.to_string()),
    }

    let file_name = resume_file_name_today(&profile.full_name, &job.company_name, &job.job_title);
    match ctx.store.exists(&file_name).await {
        Ok(false) => {}
        Ok(true) => {
            return failed(
                PipelineStage::Storage,
                format!("{file_name} already belongs to another bid"),
            )
        }
        Err(e) => return failed(PipelineStage::Storage, e.to_string()),
    }

    let pdf = match ctx
        .pipeline
        .generate_resume_document(&job.job_title, &job.job_description, profile)
        .await
    {
        Ok(pdf) => pdf,
        Err(e) => return failed(e.stage(), e.to_string()),
    };

    if let Err(e) = ctx.store.save(&file_name, &pdf).await {
        return failed(PipelineStage::Storage, e.to_string());
    }

    let new_bid = NewPendingBid {
        account_id,
        job_title: job.job_title.clone(),
        company_name: job.company_name.clone(),
        job_description: job.job_description.clone(),
        link: link.to_string(),
        resume_file_name: file_name.clone(),
    };
    match ctx.ledger.record_pending_bid(new_bid).await {
        Ok(pending_bid) => BatchItemOutcome::Generated { pending_bid },
        Err(e) => {
            if let Err(cleanup) = ctx.store.remove(&file_name).await {
                warn!("Could not remove orphaned resume {file_name}: {cleanup}");
            }
            failed(PipelineStage::Storage, e.to_string())
        }
    }
}

fn validate_row(job: &JobPosting) -> Result<(), String> {
    if job.job_title.trim().is_empty() {
        return Err("job title is required".to_string());
    }
    if job.company_name.trim().is_empty() {
        return Err("company name is required".to_string());
    }
    if job.job_description.trim().is_empty() {
        return Err("job description is required".to_string());
    }
    let link = job.link.trim();
    let has_scheme = ["http://", "https://"]
        .iter()
        .any(|scheme| link.len() > scheme.len() && link.starts_with(scheme));
    if !has_scheme {
        return Err(format!("link must be an http(s) URL: {link:?}"));
    }
    Ok(())
}

fn failed(stage: PipelineStage, message: String) -> BatchItemOutcome {
    BatchItemOutcome::Failed { stage, message }
}
