use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub email_api_key: Option<String>,
    pub email_from: String,
    pub web_push_api_key: Option<String>,
    /// Cadence of the expiry-cleanup job (default: every 6 hours)
    pub cleanup_interval: Duration,
    /// Grace delay before the first cleanup run (default: 24 hours)
    pub cleanup_initial_delay: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let cleanup_interval_hours: u64 = env::var("CLEANUP_INTERVAL_HOURS")
            .unwrap_or_else(|_| "6".to_string())
            .parse()
            .context("CLEANUP_INTERVAL_HOURS must be a valid number")?;
        let cleanup_initial_delay_hours: u64 = env::var("CLEANUP_INITIAL_DELAY_HOURS")
            .unwrap_or_else(|_| "24".to_string())
            .parse()
            .context("CLEANUP_INITIAL_DELAY_HOURS must be a valid number")?;

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            email_api_key: env::var("EMAIL_API_KEY").ok(),
            email_from: env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "no-reply@peerprep.app".to_string()),
            web_push_api_key: env::var("WEB_PUSH_API_KEY").ok(),
            cleanup_interval: Duration::from_secs(cleanup_interval_hours * 3600),
            cleanup_initial_delay: Duration::from_secs(cleanup_initial_delay_hours * 3600),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cleanup_cadence() {
        // Defaults apply when the cleanup variables are unset
        std::env::remove_var("CLEANUP_INTERVAL_HOURS");
        std::env::remove_var("CLEANUP_INITIAL_DELAY_HOURS");
        std::env::set_var("DATABASE_URL", "postgres://localhost/peerprep_test");

        let config = Config::from_env().unwrap();
        assert_eq!(config.cleanup_interval, Duration::from_secs(6 * 3600));
        assert_eq!(config.cleanup_initial_delay, Duration::from_secs(24 * 3600));
    }
}
