use std::env;

/// Server configuration, read from the environment.
#[derive(Clone)]
pub struct Config {
    /// Database URL, e.g. `sqlite://opsguard.db` or `sqlite::memory:`.
    pub db_url: String,
    /// Listen address for the HTTP server.
    pub bind_addr: String,
    /// How often the worker polls the job queue for due escalations.
    pub poll_interval_secs: u64,
    /// Whether to enforce HMAC signatures on integrations that carry a
    /// signing secret.
    pub verify_signatures: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_url: env::var("OPSGUARD_DB_URL").unwrap_or_else(|_| "sqlite::memory:".to_string()),
            bind_addr: env::var("OPSGUARD_BIND_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            poll_interval_secs: env::var("OPSGUARD_POLL_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
            verify_signatures: env::var("OPSGUARD_VERIFY_SIGNATURES")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
        }
    }
}
