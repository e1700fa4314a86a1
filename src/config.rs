//! Runtime configuration, read from the environment (and `.env`).

use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use dotenvy::dotenv;
use tracing::{info, warn};
use url::Url;

use crate::error::{PortalError, Result};

pub const DEFAULT_ERP_URL: &str = "https://abes.platform.simplifii.com/";
pub const DEFAULT_AIMS_URL: &str = "https://aims.dev80.tech/";
pub const DEFAULT_QUIZ_URL: &str =
    "https://faas-blr1-8177d592.doserverless.co/api/v1/web/fn-1c23ee6f-939a-44b2-9c4e-d17970ddd644/abes/";

/// Seconds between question re-fetches while a quiz is active.
pub const DEFAULT_POLL_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    /// Academic ERP platform (attendance, profile, evaluated quizzes).
    pub erp_url: Url,
    /// Login and timetable service.
    pub aims_url: Url,
    /// Quiz-delivery backend.
    pub quiz_url: Url,
    pub cache_dir: PathBuf,
    pub log_dir: PathBuf,
    pub poll_interval: Duration,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let poll_secs: u64 = try_load("PORTAL_POLL_SECS", &DEFAULT_POLL_SECS.to_string())?;
        if poll_secs == 0 {
            return Err(PortalError::Config("PORTAL_POLL_SECS must be positive".to_string()));
        }

        Ok(Self {
            erp_url: base_url(&load_or("PORTAL_ERP_URL", DEFAULT_ERP_URL))?,
            aims_url: base_url(&load_or("PORTAL_AIMS_URL", DEFAULT_AIMS_URL))?,
            quiz_url: base_url(&load_or("PORTAL_QUIZ_URL", DEFAULT_QUIZ_URL))?,
            cache_dir: PathBuf::from(load_or("PORTAL_CACHE_DIR", ".portal-cache")),
            log_dir: PathBuf::from(load_or("PORTAL_LOG_DIR", "logs")),
            poll_interval: Duration::from_secs(poll_secs),
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Configuration pointing every service at one base URL. Used by tests
    /// that stand up a fake backend.
    pub fn for_base(base: &str) -> Result<Self> {
        let url = base_url(base)?;
        Ok(Self {
            erp_url: url.clone(),
            aims_url: url.clone(),
            quiz_url: url,
            cache_dir: env::temp_dir().join("student-portal-cache"),
            log_dir: env::temp_dir().join("student-portal-logs"),
            poll_interval: Duration::from_secs(DEFAULT_POLL_SECS),
            rust_log: "error".to_string(),
        })
    }
}

/// Parses a base URL, making sure it ends in `/` so that `Url::join`
/// appends endpoint names instead of replacing the last segment.
pub fn base_url(raw: &str) -> Result<Url> {
    let mut raw = raw.trim().to_string();
    if !raw.ends_with('/') {
        raw.push('/');
    }
    Ok(Url::parse(&raw)?)
}

fn load_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    load_or(key, default).parse().map_err(|e| {
        warn!("Invalid {key} value: {e}");
        PortalError::Config(format!("invalid {key}: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let url = base_url("http://127.0.0.1:9000/abes").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/abes/");
        assert_eq!(
            url.join("submitAnswer").unwrap().as_str(),
            "http://127.0.0.1:9000/abes/submitAnswer"
        );
    }

    #[test]
    fn test_base_url_rejects_garbage() {
        assert!(matches!(base_url("not a url"), Err(PortalError::Config(_))));
    }

    #[test]
    fn test_for_base_uses_one_url() {
        let config = Config::for_base("http://localhost:1234").unwrap();
        assert_eq!(config.erp_url, config.quiz_url);
        assert_eq!(config.poll_interval, Duration::from_secs(30));
    }
}
