use std::path::PathBuf;

use anyhow::{Context, Result};

pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_CONCURRENCY: usize = 5;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

/// Application configuration loaded once from environment variables and handed
/// to collaborators at construction. Credentials are optional at load time:
/// each subcommand requires only the ones it actually uses.
#[derive(Debug, Clone)]
pub struct Config {
    pub groq_api_key: Option<String>,
    pub groq_model: String,
    pub data_dir: PathBuf,
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
    pub generation_concurrency: usize,
    pub poll_interval_secs: u64,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            // The frontend half of the stack exports the key under a VITE_
            // prefix; accept either spelling.
            groq_api_key: optional_env("GROQ_API_KEY").or_else(|| optional_env("VITE_GROQ_API_KEY")),
            groq_model: std::env::var("GROQ_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            data_dir: PathBuf::from(
                std::env::var("DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string()),
            ),
            supabase_url: optional_env("SUPABASE_URL"),
            supabase_key: optional_env("SUPABASE_KEY"),
            generation_concurrency: std::env::var("GENERATION_CONCURRENCY")
                .unwrap_or_else(|_| DEFAULT_CONCURRENCY.to_string())
                .parse::<usize>()
                .context("GENERATION_CONCURRENCY must be a positive integer")?,
            poll_interval_secs: std::env::var("POLL_INTERVAL_SECS")
                .unwrap_or_else(|_| DEFAULT_POLL_INTERVAL_SECS.to_string())
                .parse::<u64>()
                .context("POLL_INTERVAL_SECS must be a number of seconds")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Groq credentials, required by any subcommand that generates content.
    pub fn require_groq(&self) -> Result<&str> {
        self.groq_api_key
            .as_deref()
            .context("GROQ_API_KEY (or VITE_GROQ_API_KEY) is not set")
    }

    /// Task backend credentials, required by the worker.
    pub fn require_tasks(&self) -> Result<(&str, &str)> {
        let url = self
            .supabase_url
            .as_deref()
            .context("SUPABASE_URL is not set")?;
        let key = self
            .supabase_key
            .as_deref()
            .context("SUPABASE_KEY is not set")?;
        Ok((url, key))
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
