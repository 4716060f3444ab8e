use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_API_URL: &str = "http://localhost:1337/api";
pub const DEFAULT_SESSION_DATABASE_URL: &str = "sqlite://travel-session.db";
pub const DEFAULT_PAGE_SIZE: u32 = 6;

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base endpoint every request path is appended to, e.g. `https://cms.example.com/api`.
    pub api_url: String,
    pub session_database_url: String,
    pub page_size: u32,
    /// No timeout unless configured.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            session_database_url: DEFAULT_SESSION_DATABASE_URL.to_owned(),
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout: None,
        }
    }
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Default::default()
        }
    }

    /// Reads `TRAVEL_API_URL`, `SESSION_DATABASE_URL`, `TRAVEL_PAGE_SIZE` and
    /// `TRAVEL_API_TIMEOUT_SECS`. Callers load `.env` beforehand.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let page_size = match lookup("TRAVEL_PAGE_SIZE") {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|size| *size > 0)
                .context("TRAVEL_PAGE_SIZE must be a positive integer")?,
            None => defaults.page_size,
        };
        let request_timeout = match lookup("TRAVEL_API_TIMEOUT_SECS") {
            Some(raw) => Some(Duration::from_secs(
                raw.parse::<u64>()
                    .context("TRAVEL_API_TIMEOUT_SECS must be a whole number of seconds")?,
            )),
            None => None,
        };
        Ok(Self {
            api_url: lookup("TRAVEL_API_URL").unwrap_or(defaults.api_url),
            session_database_url: lookup("SESSION_DATABASE_URL")
                .unwrap_or(defaults.session_database_url),
            page_size,
            request_timeout,
        })
    }
}
