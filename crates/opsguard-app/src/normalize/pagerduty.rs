//! PagerDuty webhooks: the v3 `event` envelope and the legacy
//! `messages` batch form.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use opsguard_core::event::{AlertEvent, EventAction, EventPayload, Severity};
use opsguard_ports::error::ParseError;

#[derive(Debug)]
enum Payload {
    V3(V3Event),
    Legacy(LegacyMessage),
}

#[derive(Debug, Serialize, Deserialize)]
struct V3Event {
    event_type: String,
    incident: V3Incident,
}

#[derive(Debug, Serialize, Deserialize)]
struct V3Incident {
    id: String,
    #[serde(default)]
    incident_number: Option<u64>,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    urgency: Option<String>,
    #[serde(default)]
    service: Option<PdService>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PdService {
    #[serde(default)]
    id: Option<String>,
    name: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct LegacyMessage {
    event: String,
    incident: LegacyIncident,
}

#[derive(Debug, Serialize, Deserialize)]
struct LegacyIncident {
    #[serde(default)]
    incident_key: Option<String>,
    incident_number: u64,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    html_url: Option<String>,
    service: PdService,
    #[serde(default)]
    trigger_summary_data: Option<TriggerSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TriggerSummary {
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

fn detect(value: &Value) -> Result<Payload, ParseError> {
    if value.get("event").is_some() {
        let event: V3Event = serde_json::from_value(value["event"].clone())
            .map_err(|e| ParseError::InvalidJson(e.to_string()))?;
        return Ok(Payload::V3(event));
    }
    if let Some(messages) = value.get("messages").and_then(Value::as_array) {
        let first = messages
            .first()
            .ok_or_else(|| ParseError::MissingField("messages[0]".into()))?;
        let message: LegacyMessage = serde_json::from_value(first.clone())
            .map_err(|e| ParseError::InvalidJson(e.to_string()))?;
        return Ok(Payload::Legacy(message));
    }
    Err(ParseError::UnknownShape(
        "expected `event` or `messages`".into(),
    ))
}

pub fn normalize(value: &Value) -> Result<AlertEvent, ParseError> {
    match detect(value)? {
        Payload::V3(event) => {
            let action = if event.event_type.ends_with("resolved") {
                EventAction::Resolve
            } else if event.event_type.ends_with("acknowledged") {
                EventAction::Acknowledge
            } else {
                EventAction::Trigger
            };
            let incident = &event.incident;
            let severity = match incident.urgency.as_deref() {
                Some("high") => Severity::Critical,
                _ => Severity::Warning,
            };
            let source = match &incident.service {
                Some(svc) => format!("PagerDuty - {}", svc.name),
                None => "PagerDuty".to_string(),
            };
            Ok(AlertEvent {
                action,
                dedup_key: format!("pagerduty-{}", incident.id),
                payload: EventPayload {
                    summary: incident.title.clone(),
                    source,
                    severity,
                    custom_details: serde_json::to_value(incident)
                        .map_err(|e| ParseError::InvalidJson(e.to_string()))?,
                },
            })
        }
        Payload::Legacy(message) => {
            let incident = &message.incident;
            let status = incident.status.as_deref().unwrap_or("");
            let action = if message.event.contains("resolve") || status == "resolved" {
                EventAction::Resolve
            } else if message.event.contains("acknowledge") || status == "acknowledged" {
                EventAction::Acknowledge
            } else {
                EventAction::Trigger
            };
            let summary = incident
                .trigger_summary_data
                .as_ref()
                .and_then(|t| t.subject.clone().or_else(|| t.description.clone()))
                .unwrap_or_else(|| incident.service.name.clone());
            let key = incident
                .incident_key
                .clone()
                .unwrap_or_else(|| incident.incident_number.to_string());
            Ok(AlertEvent {
                action,
                dedup_key: format!("pagerduty-{key}"),
                payload: EventPayload {
                    summary,
                    source: format!("PagerDuty - {}", incident.service.name),
                    severity: Severity::Critical,
                    custom_details: serde_json::to_value(incident)
                        .map_err(|e| ParseError::InvalidJson(e.to_string()))?,
                },
            })
        }
    }
}
