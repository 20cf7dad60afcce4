//! Background escalation worker: polls the durable job queue and drives
//! the escalation service. A job is marked fired only after its handler
//! returned cleanly; a failed handler leaves the job pending for the
//! next poll, and the handler's own state checks absorb the redelivery.

use std::time::Duration;

use chrono::Utc;

use opsguard_app::error::AppError;
use opsguard_ports::outbound::EscalationJobQueue;

use crate::state::AppState;

pub async fn run(state: AppState, poll_interval: Duration) {
    let mut ticker = tokio::time::interval(poll_interval);
    loop {
        ticker.tick().await;
        if let Err(e) = run_once(&state).await {
            tracing::error!(error = %e, "escalation poll failed");
        }
    }
}

pub async fn run_once(state: &AppState) -> Result<(), AppError> {
    let now = Utc::now();
    let due = state.db.poll_due(now).await?;
    for job in due {
        match state.escalation.on_job_fired(&job, now).await {
            Ok(()) => state.db.mark_fired(&job.id).await?,
            Err(e) => {
                tracing::error!(job_id = %job.id, error = %e, "escalation job failed, leaving pending");
            }
        }
    }
    Ok(())
}
