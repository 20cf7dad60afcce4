//! Source adapters mapping third-party payloads to the canonical
//! [`AlertEvent`]. Each adapter is a pure function over a tagged set of
//! accepted payload shapes with an explicit detection predicate; no
//! adapter ever inspects shared state.

pub mod generic;
pub mod grafana;
pub mod pagerduty;
pub mod prometheus;
pub mod sentry;

use chrono::Utc;
use serde_json::Value;

use opsguard_core::event::{AlertEvent, EventAction, EventPayload, Severity, SourceKind};
use opsguard_ports::error::ParseError;

pub use opsguard_core::integration::GenericFieldMap;

/// Normalize a raw payload from `kind`. The field map, carried by the
/// integration, only applies to generic webhooks. An unrecognized or
/// malformed payload degrades to a neutral `acknowledge` with a
/// synthetic dedup key: it is recorded, never dropped, and never
/// mistaken for a trigger.
pub fn normalize(
    kind: SourceKind,
    payload: &Value,
    field_map: Option<&GenericFieldMap>,
) -> AlertEvent {
    let parsed = match kind {
        SourceKind::PagerDuty => pagerduty::normalize(payload),
        SourceKind::Sentry => sentry::normalize(payload),
        SourceKind::Grafana => grafana::normalize(payload),
        SourceKind::Prometheus => prometheus::normalize(payload),
        SourceKind::Webhook => {
            let default_map = GenericFieldMap::default();
            generic::normalize(payload, field_map.unwrap_or(&default_map))
        }
    };

    match parsed {
        Ok(event) => event,
        Err(err) => {
            tracing::warn!(kind = kind.as_str(), error = %err, "payload degraded to neutral event");
            degraded(kind, &err)
        }
    }
}

fn degraded(kind: SourceKind, err: &ParseError) -> AlertEvent {
    let rand = uuid::Uuid::new_v4().simple().to_string();
    AlertEvent {
        action: EventAction::Acknowledge,
        dedup_key: format!(
            "unparsed-{}-{}",
            Utc::now().timestamp_millis(),
            &rand[..8]
        ),
        payload: EventPayload {
            summary: format!("Unparseable {} payload: {err}", kind.as_str()),
            source: kind.as_str().to_string(),
            severity: Severity::Info,
            custom_details: Value::Null,
        },
    }
}

/// Dotted-path lookup into a JSON value, e.g. `"alert.labels.severity"`.
pub(crate) fn string_at<'a>(value: &'a Value, path: &str) -> Option<&'a str> {
    let mut current = value;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    current.as_str()
}

/// First present string among top-level keys.
pub(crate) fn first_string<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|k| value.get(k).and_then(Value::as_str))
}
