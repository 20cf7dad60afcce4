//! Webhook ingress. Every inbound request walks the same pipeline:
//! integration lookup, enabled check, rate limit, optional signature
//! check, then normalization and ingestion. Malformed payloads degrade
//! inside the normalizer and are never answered with a 5xx.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use opsguard_core::event::{AlertEvent, SourceKind};
use opsguard_core::integration::Integration;
use opsguard_core::ratelimit::RateLimitDecision;
use opsguard_ports::outbound::IntegrationRepository;

use crate::signature;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/integrations/{kind}", post(integration_webhook))
        .route("/events", post(canonical_event))
        .route("/health", get(health))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct WebhookQuery {
    #[serde(rename = "integrationId")]
    integration_id: String,
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

async fn integration_webhook(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(query): Query<WebhookQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(kind) = SourceKind::parse(&kind) else {
        return error_response(StatusCode::NOT_FOUND, "unknown integration kind");
    };
    let (integration, decision) =
        match authorize(&state, &query.integration_id, &headers, &body).await {
            Ok(authorized) => authorized,
            Err(response) => return response,
        };

    // Unparseable bytes become a null payload; the normalizer turns that
    // into a degraded neutral event rather than an error.
    let payload: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let event = opsguard_app::normalize::normalize(kind, &payload, integration.field_map());

    accept(&state, &integration, &event, &decision).await
}

async fn canonical_event(
    State(state): State<AppState>,
    Query(query): Query<WebhookQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let (integration, decision) =
        match authorize(&state, &query.integration_id, &headers, &body).await {
            Ok(authorized) => authorized,
            Err(response) => return response,
        };

    let event: AlertEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            return error_response(StatusCode::BAD_REQUEST, &format!("invalid event: {e}"));
        }
    };

    accept(&state, &integration, &event, &decision).await
}

async fn accept(
    state: &AppState,
    integration: &Integration,
    event: &AlertEvent,
    decision: &RateLimitDecision,
) -> Response {
    match state
        .ingest
        .ingest(integration.service_id(), event, Utc::now())
        .await
    {
        Ok(outcome) => {
            let mut response = (StatusCode::ACCEPTED, Json(outcome)).into_response();
            rate_headers(&mut response, state, decision);
            response
        }
        Err(e) => {
            tracing::error!(error = %e, integration_id = %integration.id(), "ingestion failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    }
}

async fn authorize(
    state: &AppState,
    integration_id: &str,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<(Integration, RateLimitDecision), Response> {
    let integration = match IntegrationRepository::find_by_id(&state.db, integration_id).await {
        Ok(Some(integration)) => integration,
        Ok(None) => return Err(error_response(StatusCode::NOT_FOUND, "unknown integration")),
        Err(e) => {
            tracing::error!(error = %e, "integration lookup failed");
            return Err(error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal error"));
        }
    };
    if !integration.enabled() {
        return Err(error_response(StatusCode::FORBIDDEN, "integration is disabled"));
    }

    let decision = match state
        .limiter
        .check(&integration.id().to_string(), Utc::now())
        .await
    {
        Ok(decision) => decision,
        Err(e) => {
            tracing::error!(error = %e, "rate limiter failed");
            return Err(error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal error"));
        }
    };
    if !decision.allowed {
        let mut response = error_response(StatusCode::TOO_MANY_REQUESTS, "rate limit exceeded");
        if let Some(secs) = decision.retry_after_secs {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        rate_headers(&mut response, state, &decision);
        return Err(response);
    }

    if state.config.verify_signatures {
        if let Some(secret) = integration.signature_secret() {
            let presented = headers.get("x-signature").and_then(|v| v.to_str().ok());
            let valid = presented
                .map(|sig| signature::verify(body, sig, secret))
                .unwrap_or(false);
            if !valid {
                return Err(error_response(
                    StatusCode::UNAUTHORIZED,
                    "invalid or missing signature",
                ));
            }
        }
    }

    Ok((integration, decision))
}

fn rate_headers(response: &mut Response, state: &AppState, decision: &RateLimitDecision) {
    let headers = response.headers_mut();
    headers.insert(
        "X-RateLimit-Limit",
        HeaderValue::from(state.limiter.config().max_requests),
    );
    headers.insert("X-RateLimit-Remaining", HeaderValue::from(decision.remaining));
    headers.insert(
        "X-RateLimit-Reset",
        HeaderValue::from(decision.reset_at.timestamp()),
    );
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::state::build_state;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use opsguard_adapters::SqliteDb;
    use opsguard_core::event::{EventAction, EventPayload, Severity};
    use opsguard_core::ids::ServiceId;
    use opsguard_core::integration::GenericFieldMap;
    use opsguard_ports::outbound::IncidentRepository;
    use tower::ServiceExt;

    fn config(verify_signatures: bool) -> Config {
        Config {
            db_url: "sqlite::memory:".into(),
            bind_addr: "127.0.0.1:0".into(),
            poll_interval_secs: 5,
            verify_signatures,
        }
    }

    async fn setup(verify_signatures: bool, secret: Option<&str>) -> (Router, AppState, Integration) {
        let db = SqliteDb::new("sqlite::memory:").await.unwrap();
        let mut integration =
            Integration::new(SourceKind::Grafana, "intg-key".into(), ServiceId::new());
        if let Some(secret) = secret {
            integration = integration.with_signature_secret(secret.into());
        }
        IntegrationRepository::save(&db, &integration).await.unwrap();

        let state = build_state(db, config(verify_signatures));
        (build_router(state.clone()), state, integration)
    }

    fn grafana_body() -> Vec<u8> {
        serde_json::to_vec(&json!({
            "alerts": [{
                "status": "firing",
                "labels": {"alertname": "HighCPU", "severity": "critical"},
                "annotations": {"summary": "CPU above 95%"},
                "fingerprint": "abc123"
            }]
        }))
        .unwrap()
    }

    fn webhook_request(uri: &str, body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_is_open() {
        let (router, _, _) = setup(true, None).await;
        let response = router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_kind_is_404() {
        let (router, _, integration) = setup(true, None).await;
        let uri = format!("/integrations/nagios?integrationId={}", integration.id());
        let response = router.oneshot(webhook_request(&uri, grafana_body())).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_integration_is_404() {
        let (router, _, _) = setup(true, None).await;
        let uri = format!(
            "/integrations/grafana?integrationId={}",
            opsguard_core::ids::IntegrationId::new()
        );
        let response = router.oneshot(webhook_request(&uri, grafana_body())).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn disabled_integration_is_403() {
        let (router, state, mut integration) = setup(true, None).await;
        integration.disable();
        IntegrationRepository::save(&state.db, &integration).await.unwrap();

        let uri = format!("/integrations/grafana?integrationId={}", integration.id());
        let response = router.oneshot(webhook_request(&uri, grafana_body())).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn grafana_webhook_opens_an_incident() {
        let (router, state, integration) = setup(true, None).await;
        let uri = format!("/integrations/grafana?integrationId={}", integration.id());

        let response = router.oneshot(webhook_request(&uri, grafana_body())).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert!(response.headers().contains_key("X-RateLimit-Remaining"));

        let outcome = body_json(response).await;
        assert_eq!(outcome["action"], "triggered");
        assert_eq!(outcome["created"], true);

        let incident = state
            .db
            .find_open_by_dedup(&integration.service_id().to_string(), "grafana-abc123")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(incident.title(), "CPU above 95%");
    }

    #[tokio::test]
    async fn generic_webhook_honors_the_integration_field_map() {
        let db = SqliteDb::new("sqlite::memory:").await.unwrap();
        let integration =
            Integration::new(SourceKind::Webhook, "intg-key".into(), ServiceId::new())
                .with_field_map(GenericFieldMap {
                    summary: Some("alert.headline".into()),
                    dedup_key: Some("alert.key".into()),
                    ..Default::default()
                });
        IntegrationRepository::save(&db, &integration).await.unwrap();
        let state = build_state(db, config(false));
        let router = build_router(state.clone());

        let body = serde_json::to_vec(&json!({
            "alert": {"headline": "Queue backlog over 10k", "key": "q-1"}
        }))
        .unwrap();
        let uri = format!("/integrations/webhook?integrationId={}", integration.id());
        let response = router.oneshot(webhook_request(&uri, body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let incident = state
            .db
            .find_open_by_dedup(&integration.service_id().to_string(), "q-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(incident.title(), "Queue backlog over 10k");
    }

    #[tokio::test]
    async fn malformed_body_never_500s() {
        let (router, _, integration) = setup(true, None).await;
        let uri = format!("/integrations/grafana?integrationId={}", integration.id());

        let response = router
            .oneshot(webhook_request(&uri, b"this is not json".to_vec()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        // Degraded events acknowledge; with nothing to acknowledge the
        // outcome is ignored, never an error.
        let outcome = body_json(response).await;
        assert_eq!(outcome["action"], "ignored");
    }

    #[tokio::test]
    async fn missing_signature_is_401() {
        let (router, _, integration) = setup(true, Some("s3cret")).await;
        let uri = format!("/integrations/grafana?integrationId={}", integration.id());
        let response = router.oneshot(webhook_request(&uri, grafana_body())).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn valid_signature_passes() {
        let (router, _, integration) = setup(true, Some("s3cret")).await;
        let body = grafana_body();
        let sig = signature::sign(&body, "s3cret");
        let uri = format!("/integrations/grafana?integrationId={}", integration.id());

        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .header("x-signature", sig)
            .body(Body::from(body))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn signature_check_can_be_disabled() {
        let (router, _, integration) = setup(false, Some("s3cret")).await;
        let uri = format!("/integrations/grafana?integrationId={}", integration.id());
        let response = router.oneshot(webhook_request(&uri, grafana_body())).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn burst_exhaustion_is_429_with_retry_after() {
        let (router, _, integration) = setup(true, None).await;
        let uri = format!("/integrations/grafana?integrationId={}", integration.id());

        for _ in 0..20 {
            let response = router
                .clone()
                .oneshot(webhook_request(&uri, grafana_body()))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::ACCEPTED);
        }

        let response = router.oneshot(webhook_request(&uri, grafana_body())).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key(header::RETRY_AFTER));
        assert_eq!(
            response.headers().get("X-RateLimit-Remaining").unwrap(),
            "0"
        );
    }

    #[tokio::test]
    async fn canonical_event_endpoint_ingests_directly() {
        let (router, _, integration) = setup(true, None).await;
        let event = AlertEvent {
            action: EventAction::Trigger,
            dedup_key: "db-primary-down".into(),
            payload: EventPayload {
                summary: "Primary database unreachable".into(),
                source: "healthcheck".into(),
                severity: Severity::Critical,
                custom_details: Value::Null,
            },
        };
        let uri = format!("/events?integrationId={}", integration.id());
        let response = router
            .oneshot(webhook_request(&uri, serde_json::to_vec(&event).unwrap()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let outcome = body_json(response).await;
        assert_eq!(outcome["action"], "triggered");
    }

    #[tokio::test]
    async fn canonical_event_rejects_invalid_bodies() {
        let (router, _, integration) = setup(true, None).await;
        let uri = format!("/events?integrationId={}", integration.id());
        let response = router
            .oneshot(webhook_request(&uri, b"{}".to_vec()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
