// Persistence collaborators for batch generation: the bid ledger (Postgres)
// and the on-disk resume store.

pub mod files;
pub mod ledger;

use thiserror::Error;

pub use files::ResumeStore;
pub use ledger::{BidLedger, PgBidLedger};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("File I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Resume file already exists: {0}")]
    FileExists(String),

    #[error("Refusing to write outside the output directory: {0}")]
    InvalidFileName(String),
}
