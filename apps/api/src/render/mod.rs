// Document rendering: style resolution, HTML shell, and headless-browser PDF printing.
// Browser processes are bounded by `ChromeRenderer`'s slot pool; nothing else
// in the crate may launch a browser.

pub mod chrome;
pub mod style;
pub mod template;

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tokio::time::Instant;

pub use chrome::{BrowserSettings, ChromeRenderer};
pub use style::{ResolvedStyle, StyleError};
pub use template::build_html_document;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("All {capacity} render slots busy; retry after {retry_after:?}")]
    Busy {
        capacity: usize,
        retry_after: Duration,
    },

    #[error("Browser launch failed: {0}")]
    Launch(String),

    #[error("Page load failed: {0}")]
    Load(String),

    #[error("PDF printing failed: {0}")]
    Print(String),

    #[error("Rendering exceeded its deadline")]
    TimedOut,
}

/// Prints a complete HTML document to PDF bytes.
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    async fn render_pdf(&self, html: &str, deadline: Instant) -> Result<Bytes, RenderError>;
}
