use mentorbook_core::booking::DEFAULT_ENGAGEMENT_PERIOD_DAYS;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Engagement length granted on booking finalization, in days
    /// (default: `30`).
    pub engagement_period_days: i64,
    /// Base URL of the external payment gateway.
    pub payment_gateway_url: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                    |
    /// |--------------------------|----------------------------|
    /// | `HOST`                   | `0.0.0.0`                  |
    /// | `PORT`                   | `3000`                     |
    /// | `CORS_ORIGINS`           | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                       |
    /// | `ENGAGEMENT_PERIOD_DAYS` | `30`                       |
    /// | `PAYMENT_GATEWAY_URL`    | `http://localhost:9090`    |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let engagement_period_days: i64 = std::env::var("ENGAGEMENT_PERIOD_DAYS")
            .unwrap_or_else(|_| DEFAULT_ENGAGEMENT_PERIOD_DAYS.to_string())
            .parse()
            .expect("ENGAGEMENT_PERIOD_DAYS must be a valid i64");

        let payment_gateway_url = std::env::var("PAYMENT_GATEWAY_URL")
            .unwrap_or_else(|_| "http://localhost:9090".into());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            engagement_period_days,
            payment_gateway_url,
        }
    }
}
