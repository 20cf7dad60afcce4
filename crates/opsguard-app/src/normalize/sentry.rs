//! Sentry issue-alert webhooks: the `action` + `data.issue` envelope and
//! the older flat event form.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use opsguard_core::event::{AlertEvent, EventAction, EventPayload, Severity};
use opsguard_ports::error::ParseError;

#[derive(Debug, Serialize, Deserialize)]
struct IssueAlert {
    action: String,
    data: IssueData,
}

#[derive(Debug, Serialize, Deserialize)]
struct IssueData {
    issue: Issue,
}

#[derive(Debug, Serialize, Deserialize)]
struct Issue {
    id: String,
    title: String,
    #[serde(default)]
    level: Option<String>,
    #[serde(default)]
    culprit: Option<String>,
    #[serde(default)]
    project: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct FlatEvent {
    id: String,
    message: String,
    #[serde(default)]
    level: Option<String>,
    #[serde(default)]
    project: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

pub fn normalize(value: &Value) -> Result<AlertEvent, ParseError> {
    if value.get("action").is_some() && value.get("data").is_some() {
        let alert: IssueAlert = serde_json::from_value(value.clone())
            .map_err(|e| ParseError::InvalidJson(e.to_string()))?;
        let action = match alert.action.as_str() {
            "resolved" => EventAction::Resolve,
            "ignored" | "assigned" => EventAction::Acknowledge,
            _ => EventAction::Trigger, // triggered, created
        };
        let issue = &alert.data.issue;
        let severity = issue
            .level
            .as_deref()
            .map(Severity::parse_lenient)
            .unwrap_or(Severity::Error);
        return Ok(AlertEvent {
            action,
            dedup_key: format!("sentry-{}", issue.id),
            payload: EventPayload {
                summary: issue.title.clone(),
                source: "Sentry".to_string(),
                severity,
                custom_details: serde_json::to_value(issue)
                    .map_err(|e| ParseError::InvalidJson(e.to_string()))?,
            },
        });
    }

    if value.get("message").is_some() && value.get("id").is_some() {
        let event: FlatEvent = serde_json::from_value(value.clone())
            .map_err(|e| ParseError::InvalidJson(e.to_string()))?;
        let severity = event
            .level
            .as_deref()
            .map(Severity::parse_lenient)
            .unwrap_or(Severity::Error);
        let source = match &event.project {
            Some(project) => format!("Sentry - {project}"),
            None => "Sentry".to_string(),
        };
        return Ok(AlertEvent {
            action: EventAction::Trigger,
            dedup_key: format!("sentry-{}", event.id),
            payload: EventPayload {
                summary: event.message.clone(),
                source,
                severity,
                custom_details: serde_json::to_value(&event)
                    .map_err(|e| ParseError::InvalidJson(e.to_string()))?,
            },
        });
    }

    Err(ParseError::UnknownShape(
        "expected issue alert or flat event".into(),
    ))
}
