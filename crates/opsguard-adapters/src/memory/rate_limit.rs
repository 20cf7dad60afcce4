use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use opsguard_core::ratelimit::TokenBucket;
use opsguard_ports::error::PortError;
use opsguard_ports::outbound::RateLimitStore;

/// Process-local bucket store. Fine for a single server instance; a
/// multi-node deployment would back this port with a shared store.
#[derive(Clone, Default)]
pub struct InMemoryRateLimitStore {
    buckets: Arc<Mutex<HashMap<String, TokenBucket>>>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn get(&self, key: &str) -> Result<Option<TokenBucket>, PortError> {
        let buckets = self.buckets.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(buckets.get(key).copied())
    }

    async fn put(&self, key: &str, bucket: TokenBucket) -> Result<(), PortError> {
        let mut buckets = self.buckets.lock().unwrap_or_else(PoisonError::into_inner);
        buckets.insert(key.to_string(), bucket);
        Ok(())
    }

    async fn reset(&self, key: &str) -> Result<(), PortError> {
        let mut buckets = self.buckets.lock().unwrap_or_else(PoisonError::into_inner);
        buckets.remove(key);
        Ok(())
    }
}
