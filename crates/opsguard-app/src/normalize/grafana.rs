//! Grafana alerting webhooks: the unified `alerts[]` form and the
//! legacy dashboard-alert `state` form.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use opsguard_core::event::{AlertEvent, EventAction, EventPayload, Severity};
use opsguard_ports::error::ParseError;

#[derive(Debug, Serialize, Deserialize)]
struct UnifiedPayload {
    #[serde(default)]
    status: Option<String>,
    alerts: Vec<UnifiedAlert>,
    #[serde(default, rename = "commonLabels")]
    common_labels: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct UnifiedAlert {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    labels: BTreeMap<String, String>,
    #[serde(default)]
    annotations: BTreeMap<String, String>,
    #[serde(default)]
    fingerprint: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct LegacyPayload {
    state: String,
    #[serde(rename = "ruleId")]
    rule_id: u64,
    #[serde(default, rename = "ruleName")]
    rule_name: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

pub fn normalize(value: &Value) -> Result<AlertEvent, ParseError> {
    if value.get("alerts").is_some() {
        let payload: UnifiedPayload = serde_json::from_value(value.clone())
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
            Some(fp) => format!("grafana-{fp}"),
            None => format!(
                "grafana-{}",
                alert
                    .labels
                    .get("alertname")
                    .cloned()
                    .unwrap_or_else(|| "unnamed".to_string())
            ),
        };
        let summary = alert
            .annotations
            .get("summary")
            .or_else(|| alert.annotations.get("description"))
            .or_else(|| alert.labels.get("alertname"))
            .cloned()
            .unwrap_or_else(|| "Grafana alert".to_string());
        let severity = alert
            .labels
            .get("severity")
            .map(|s| Severity::parse_lenient(s))
            .unwrap_or(Severity::Error);

        return Ok(AlertEvent {
            action,
            dedup_key,
            payload: EventPayload {
                summary,
                source: "Grafana".to_string(),
                severity,
                custom_details: serde_json::to_value(alert)
                    .map_err(|e| ParseError::InvalidJson(e.to_string()))?,
            },
        });
    }

    if value.get("state").is_some() && value.get("ruleId").is_some() {
        let payload: LegacyPayload = serde_json::from_value(value.clone())
            .map_err(|e| ParseError::InvalidJson(e.to_string()))?;
        let action = match payload.state.as_str() {
            "ok" => EventAction::Resolve,
            _ => EventAction::Trigger, // alerting, no_data, paused
        };
        let summary = payload
            .title
            .clone()
            .or_else(|| payload.message.clone())
            .or_else(|| payload.rule_name.clone())
            .unwrap_or_else(|| format!("Grafana rule {}", payload.rule_id));
        return Ok(AlertEvent {
            action,
            dedup_key: format!("grafana-rule-{}", payload.rule_id),
            payload: EventPayload {
                summary,
                source: "Grafana".to_string(),
                severity: Severity::Error,
                custom_details: serde_json::to_value(&payload)
                    .map_err(|e| ParseError::InvalidJson(e.to_string()))?,
            },
        });
    }

    Err(ParseError::UnknownShape(
        "expected `alerts` or `state`/`ruleId`".into(),
    ))
}
