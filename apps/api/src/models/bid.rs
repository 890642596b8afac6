use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Status a freshly generated bid starts in. The other values
/// (`in_progress`, `completed`, `cancelled`) are set by the bid list UI.
pub const STATUS_PENDING: &str = "pending";

/// A bid whose resume has been generated but not yet confirmed by the user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PendingBidRow {
    pub id: Uuid,
    pub account_id: Uuid,
    pub job_title: String,
    pub company_name: String,
    pub job_description: String,
    pub link: String,
    pub resume_file_name: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a pending bid.
#[derive(Debug, Clone)]
pub struct NewPendingBid {
    pub account_id: Uuid,
    pub job_title: String,
    pub company_name: String,
    pub job_description: String,
    pub link: String,
    pub resume_file_name: String,
}
