//! Prometheus Alertmanager webhooks. Dedup identity is the alert
//! fingerprint when Alertmanager provides one, otherwise a hash of the
//! full label set, so the same alert always lands on the same incident.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use opsguard_core::event::{AlertEvent, EventAction, EventPayload, Severity};
use opsguard_ports::error::ParseError;

#[derive(Debug, Serialize, Deserialize)]
struct AlertmanagerPayload {
    #[serde(default)]
    status: Option<String>,
    alerts: Vec<AlertmanagerAlert>,
}

#[derive(Debug, Serialize, Deserialize)]
struct AlertmanagerAlert {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    labels: BTreeMap<String, String>,
    #[serde(default)]
    annotations: BTreeMap<String, String>,
    #[serde(default)]
    fingerprint: Option<String>,
    #[serde(default, rename = "generatorURL")]
    generator_url: Option<String>,
}

pub fn normalize(value: &Value) -> Result<AlertEvent, ParseError> {
    let payload: AlertmanagerPayload = serde_json::from_value(value.clone())
        .map_err(|e| ParseError::InvalidJson(e.to_string()))?;
    let alert = payload
        .alerts
        .first()
        .ok_or_else(|| ParseError::MissingField("alerts[0]".into()))?;

    let status = alert
        .status
        .as_deref()
        .or(payload.status.as_deref())
        .unwrap_or("firing");
    let action = if status == "resolved" {
        EventAction::Resolve
    } else {
        EventAction::Trigger
    };

    let dedup_key = match &alert.fingerprint {
        Some(fp) => format!("prometheus-{fp}"),
        None if alert.labels.is_empty() => {
            // No identity at all: mint a one-off key so the delivery is
            // still recorded, without colliding with anything.
            let rand = uuid::Uuid::new_v4().simple().to_string();
            format!(
                "prometheus-{}-{}",
                chrono::Utc::now().timestamp_millis(),
                &rand[..8]
            )
        }
        None => format!("prometheus-{:016x}", label_hash(&alert.labels)),
    };
    let summary = alert
        .annotations
        .get("summary")
        .or_else(|| alert.annotations.get("description"))
        .or_else(|| alert.labels.get("alertname"))
        .cloned()
        .unwrap_or_else(|| "Prometheus alert".to_string());
    let severity = alert
        .labels
        .get("severity")
        .map(|s| Severity::parse_lenient(s))
        .unwrap_or(Severity::Error);

    Ok(AlertEvent {
        action,
        dedup_key,
        payload: EventPayload {
            summary,
            source: "Prometheus".to_string(),
            severity,
            custom_details: serde_json::to_value(alert)
                .map_err(|e| ParseError::InvalidJson(e.to_string()))?,
        },
    })
}

// BTreeMap iteration is sorted, so the digest is order-independent with
// respect to the incoming JSON.
fn label_hash(labels: &BTreeMap<String, String>) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    for (key, value) in labels {
        key.hash(&mut hasher);
        value.hash(&mut hasher);
    }
    hasher.finish()
}
