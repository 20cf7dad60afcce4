pub mod dispatch;
pub mod error;
pub mod escalation;
pub mod ingest;
pub mod normalize;
pub mod rate_limiter;

#[cfg(test)]
pub(crate) mod testsupport;
