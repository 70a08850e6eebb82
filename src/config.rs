use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:11434/api/generate";
pub const DEFAULT_MODEL: &str = "granite3.2-vision";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;
pub const DEFAULT_MAX_SESSIONS: usize = 256;

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub model: String,
    pub request_timeout: Duration,
    pub bind_addr: String,
    pub max_upload_bytes: usize,
    pub max_sessions: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("OLLAMA_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let model = lookup("OLLAMA_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let timeout_secs = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("REQUEST_TIMEOUT_SECS must be a whole number of seconds, got '{}'", raw))?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            anyhow::bail!("REQUEST_TIMEOUT_SECS must be greater than zero");
        }

        let max_upload_bytes = match lookup("MAX_UPLOAD_BYTES") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .with_context(|| format!("MAX_UPLOAD_BYTES must be a byte count, got '{}'", raw))?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let max_sessions = match lookup("MAX_SESSIONS") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .with_context(|| format!("MAX_SESSIONS must be a whole number, got '{}'", raw))?,
            None => DEFAULT_MAX_SESSIONS,
        };
        if max_sessions == 0 {
            anyhow::bail!("MAX_SESSIONS must be greater than zero");
        }

        Ok(Self {
            api_url,
            model,
            request_timeout: Duration::from_secs(timeout_secs),
            bind_addr,
            max_upload_bytes,
            max_sessions,
        })
    }
}
