use std::sync::Arc;

use opsguard_adapters::memory::InMemoryRateLimitStore;
use opsguard_adapters::notify::TracingSender;
use opsguard_adapters::SqliteDb;
use opsguard_app::dispatch::DispatchService;
use opsguard_app::escalation::EscalationService;
use opsguard_app::ingest::IngestService;
use opsguard_app::rate_limiter::RateLimiter;

use crate::config::Config;

pub type Escalation = EscalationService<
    SqliteDb,
    SqliteDb,
    SqliteDb,
    SqliteDb,
    SqliteDb,
    SqliteDb,
    SqliteDb,
    TracingSender,
>;
pub type Ingest = IngestService<
    SqliteDb,
    SqliteDb,
    SqliteDb,
    SqliteDb,
    SqliteDb,
    SqliteDb,
    SqliteDb,
    TracingSender,
>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: SqliteDb,
    pub config: Arc<Config>,
    pub ingest: Arc<Ingest>,
    pub escalation: Arc<Escalation>,
    pub limiter: Arc<RateLimiter<InMemoryRateLimitStore>>,
}

pub fn build_state(db: SqliteDb, config: Config) -> AppState {
    let dispatch = || {
        DispatchService::new(
            db.clone(),
            db.clone(),
            db.clone(),
            TracingSender::new(),
        )
    };
    let escalation = EscalationService::new(
        db.clone(),
        db.clone(),
        db.clone(),
        db.clone(),
        dispatch(),
    );
    let ingest_escalation = EscalationService::new(
        db.clone(),
        db.clone(),
        db.clone(),
        db.clone(),
        dispatch(),
    );
    let ingest = IngestService::new(db.clone(), db.clone(), ingest_escalation);

    AppState {
        db,
        config: Arc::new(config),
        ingest: Arc::new(ingest),
        escalation: Arc::new(escalation),
        limiter: Arc::new(RateLimiter::new(InMemoryRateLimitStore::new())),
    }
}
