use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Token-bucket admission control, one bucket per integration identity.
/// Burst capacity is granted up front; tokens refill at the steady
/// `max_requests / window_ms` rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window_ms: u64,
    pub burst_limit: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window_ms: 60_000,
            burst_limit: 20,
        }
    }
}

impl RateLimitConfig {
    fn refill_per_ms(&self) -> f64 {
        f64::from(self.max_requests) / self.window_ms as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TokenBucket {
    tokens: f64,
    last_refill: DateTime<Utc>,
    window_start: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
    pub retry_after_secs: Option<u64>,
}

impl TokenBucket {
    /// Unknown identities start with full burst capacity.
    pub fn full(config: &RateLimitConfig, now: DateTime<Utc>) -> Self {
        Self {
            tokens: f64::from(config.burst_limit),
            last_refill: now,
            window_start: now,
        }
    }

    fn refilled_tokens(&self, config: &RateLimitConfig, now: DateTime<Utc>) -> f64 {
        let elapsed_ms = (now - self.last_refill).num_milliseconds().max(0) as f64;
        (self.tokens + elapsed_ms * config.refill_per_ms()).min(f64::from(config.burst_limit))
    }

    fn reset_at(&self, config: &RateLimitConfig) -> DateTime<Utc> {
        self.window_start + Duration::milliseconds(config.window_ms as i64)
    }

    /// Consuming check: takes a token when one is available.
    pub fn check(&mut self, config: &RateLimitConfig, now: DateTime<Utc>) -> RateLimitDecision {
        self.tokens = self.refilled_tokens(config, now);
        self.last_refill = now;
        if now - self.window_start >= Duration::milliseconds(config.window_ms as i64) {
            self.window_start = now;
        }

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            return RateLimitDecision {
                allowed: true,
                remaining: self.tokens as u32,
                reset_at: self.reset_at(config),
                retry_after_secs: None,
            };
        }

        let deficit_ms = (1.0 - self.tokens) / config.refill_per_ms();
        RateLimitDecision {
            allowed: false,
            remaining: 0,
            reset_at: self.reset_at(config),
            retry_after_secs: Some((deficit_ms / 1000.0).ceil() as u64),
        }
    }

    /// Non-consuming status query.
    pub fn status(&self, config: &RateLimitConfig, now: DateTime<Utc>) -> RateLimitDecision {
        let tokens = self.refilled_tokens(config, now);
        RateLimitDecision {
            allowed: tokens >= 1.0,
            remaining: tokens as u32,
            reset_at: self.reset_at(config),
            retry_after_secs: None,
        }
    }
}
