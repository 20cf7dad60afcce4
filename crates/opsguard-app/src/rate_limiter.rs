//! Per-integration admission control in front of ingestion. The bucket
//! math lives in the core; this service owns the read-modify-write
//! cycle against whatever [`RateLimitStore`] the runtime wires in.

use chrono::{DateTime, Utc};

use opsguard_core::ratelimit::{RateLimitConfig, RateLimitDecision, TokenBucket};
use opsguard_ports::outbound::RateLimitStore;

use crate::error::AppError;

pub struct RateLimiter<S> {
    store: S,
    config: RateLimitConfig,
}

impl<S: RateLimitStore> RateLimiter<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, RateLimitConfig::default())
    }

    pub fn with_config(store: S, config: RateLimitConfig) -> Self {
        Self { store, config }
    }

    /// Consuming check for one request against `key`.
    pub async fn check(&self, key: &str, now: DateTime<Utc>) -> Result<RateLimitDecision, AppError> {
        let mut bucket = match self.store.get(key).await? {
            Some(bucket) => bucket,
            None => TokenBucket::full(&self.config, now),
        };
        let decision = bucket.check(&self.config, now);
        self.store.put(key, bucket).await?;
        Ok(decision)
    }

    /// Read-only view of a bucket; never consumes a token.
    pub async fn status(&self, key: &str, now: DateTime<Utc>) -> Result<RateLimitDecision, AppError> {
        let bucket = match self.store.get(key).await? {
            Some(bucket) => bucket,
            None => TokenBucket::full(&self.config, now),
        };
        Ok(bucket.status(&self.config, now))
    }

    pub async fn reset(&self, key: &str) -> Result<(), AppError> {
        self.store.reset(key).await?;
        Ok(())
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }
}
