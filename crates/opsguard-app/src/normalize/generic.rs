//! Generic webhook adapter. A [`GenericFieldMap`] lets an integration
//! point each canonical field at a dotted JSON path; unmapped fields
//! fall back to a small vocabulary of conventional key names.

use serde_json::Value;
use std::hash::{Hash, Hasher};

use opsguard_core::event::{AlertEvent, EventAction, EventPayload, Severity};
use opsguard_core::integration::GenericFieldMap;
use opsguard_ports::error::ParseError;

use super::{first_string, string_at};

const SUMMARY_KEYS: &[&str] = &["summary", "title", "message", "name", "description"];
const SEVERITY_KEYS: &[&str] = &["severity", "level", "priority"];
const ACTION_KEYS: &[&str] = &["action", "event", "status", "state"];
const DEDUP_KEYS: &[&str] = &["dedup_key", "fingerprint", "alert_id", "id", "key"];
const SOURCE_KEYS: &[&str] = &["source", "origin", "host", "service"];

pub fn normalize(value: &Value, map: &GenericFieldMap) -> Result<AlertEvent, ParseError> {
    if !value.is_object() {
        return Err(ParseError::InvalidJson("payload is not an object".into()));
    }

    let summary = lookup(value, &map.summary, SUMMARY_KEYS)
        .map(str::to_string)
        .ok_or_else(|| ParseError::MissingField("summary".into()))?;

    let action = match lookup(value, &map.action, ACTION_KEYS) {
        Some(word) => parse_action(word),
        None => EventAction::Trigger,
    };

    let severity = lookup(value, &map.severity, SEVERITY_KEYS)
        .map(Severity::parse_lenient)
        .unwrap_or(Severity::Error);

    let dedup_key = match lookup(value, &map.dedup_key, DEDUP_KEYS) {
        Some(key) => key.to_string(),
        None => format!("webhook-{:016x}", summary_hash(&summary)),
    };

    let source = lookup(value, &map.source, SOURCE_KEYS)
        .map(str::to_string)
        .unwrap_or_else(|| "Webhook".to_string());

    Ok(AlertEvent {
        action,
        dedup_key,
        payload: EventPayload {
            summary,
            source,
            severity,
            custom_details: value.clone(),
        },
    })
}

fn lookup<'a>(value: &'a Value, mapped: &Option<String>, fallbacks: &[&str]) -> Option<&'a str> {
    match mapped {
        Some(path) => string_at(value, path),
        None => first_string(value, fallbacks),
    }
}

fn parse_action(word: &str) -> EventAction {
    let word = word.to_ascii_lowercase();
    if ["resolve", "resolved", "ok", "recovered", "closed"].contains(&word.as_str()) {
        EventAction::Resolve
    } else if ["acknowledge", "acknowledged", "ack"].contains(&word.as_str()) {
        EventAction::Acknowledge
    } else {
        EventAction::Trigger // trigger, firing, alerting, open...
    }
}

// Repeated deliveries of the same unkeyed alert text collapse into one
// incident instead of paging once per delivery.
fn summary_hash(summary: &str) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    summary.hash(&mut hasher);
    hasher.finish()
}
