use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::bid::{NewPendingBid, PendingBidRow, STATUS_PENDING};
use crate::storage::StorageError;

/// Bid records the batch flow reads and writes.
#[async_trait]
pub trait BidLedger: Send + Sync {
    /// True when the account already has a bid or pending bid for `link`.
    async fn link_already_bid(&self, account_id: Uuid, link: &str) -> Result<bool, StorageError>;

    async fn record_pending_bid(&self, bid: NewPendingBid) -> Result<PendingBidRow, StorageError>;
}

pub struct PgBidLedger {
    pool: PgPool,
}

impl PgBidLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BidLedger for PgBidLedger {
    async fn link_already_bid(&self, account_id: Uuid, link: &str) -> Result<bool, StorageError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (SELECT 1 FROM pending_bids WHERE account_id = $1 AND link = $2)
                OR EXISTS (SELECT 1 FROM bids WHERE account_id = $1 AND link = $2)
            "#,
        )
        .bind(account_id)
        .bind(link)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn record_pending_bid(&self, bid: NewPendingBid) -> Result<PendingBidRow, StorageError> {
        let row = sqlx::query_as::<_, PendingBidRow>(
            r#"
            INSERT INTO pending_bids
                (id, account_id, job_title, company_name, job_description, link,
                 resume_file_name, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(bid.account_id)
        .bind(&bid.job_title)
        .bind(&bid.company_name)
        .bind(&bid.job_description)
        .bind(&bid.link)
        .bind(&bid.resume_file_name)
        .bind(STATUS_PENDING)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}

#[cfg(test)]
pub mod testing {
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;

    /// In-memory ledger. Links in `existing` count as already bid.
    #[derive(Default)]
    pub struct MemoryLedger {
        pub existing: Vec<(Uuid, String)>,
        pub recorded: Mutex<Vec<PendingBidRow>>,
        pub fail_inserts: bool,
    }

    #[async_trait]
    impl BidLedger for MemoryLedger {
        async fn link_already_bid(&self, account_id: Uuid, link: &str) -> Result<bool, StorageError> {
            let in_existing = self
                .existing
                .iter()
                .any(|(id, l)| *id == account_id && l == link);
            let in_recorded = self
                .recorded
                .lock()
                .unwrap()
                .iter()
                .any(|r| r.account_id == account_id && r.link == link);
            Ok(in_existing || in_recorded)
        }

        async fn record_pending_bid(&self, bid: NewPendingBid) -> Result<PendingBidRow, StorageError> {
            if self.fail_inserts {
                return Err(StorageError::Database(sqlx::Error::PoolTimedOut));
            }
            let now = Utc::now();
            let row = PendingBidRow {
                id: Uuid::new_v4(),
                account_id: bid.account_id,
                job_title: bid.job_title,
                company_name: bid.company_name,
                job_description: bid.job_description,
                link: bid.link,
                resume_file_name: bid.resume_file_name,
                status: STATUS_PENDING.to_string(),
                created_at: now,
                updated_at: now,
            };
            self.recorded.lock().unwrap().push(row.clone());
            Ok(row)
        }
    }
}
