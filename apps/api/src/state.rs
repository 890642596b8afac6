use std::sync::Arc;

use crate::config::Config;
use crate::generation::pipeline::ResumePipeline;
use crate::storage::{BidLedger, ResumeStore};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ResumePipeline>,
    /// Pending-bid persistence. `PgBidLedger` in production.
    pub ledger: Arc<dyn BidLedger>,
    pub store: ResumeStore,
    pub config: Arc<Config>,
}
