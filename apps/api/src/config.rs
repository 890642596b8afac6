use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::{DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub completion_model: String,
    pub completion_timeout: Duration,
    pub pipeline_timeout: Duration,
    pub resume_output_dir: PathBuf,
    pub chrome_executable: Option<PathBuf>,
    pub browser_no_sandbox: bool,
    pub render_pool_size: usize,
    pub render_queue_timeout: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            openai_api_key: require_env("OPENAI_API_KEY")?,
            openai_base_url: env_or("OPENAI_BASE_URL", DEFAULT_BASE_URL),
            completion_model: env_or("COMPLETION_MODEL", DEFAULT_MODEL),
            completion_timeout: Duration::from_secs(parse_env("COMPLETION_TIMEOUT_SECS", 120)?),
            pipeline_timeout: Duration::from_secs(parse_env("PIPELINE_TIMEOUT_SECS", 300)?),
            resume_output_dir: PathBuf::from(env_or(
                "RESUME_OUTPUT_DIR",
                "public/auto_generated_resumes",
            )),
            chrome_executable: std::env::var("CHROME_EXECUTABLE").ok().map(PathBuf::from),
            browser_no_sandbox: parse_env("BROWSER_NO_SANDBOX", false)?,
            render_pool_size: parse_env("RENDER_POOL_SIZE", 2)?,
            render_queue_timeout: Duration::from_secs(parse_env("RENDER_QUEUE_TIMEOUT_SECS", 30)?),
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        Err(_) => Ok(default),
    }
}
