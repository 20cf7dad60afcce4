use serde::{Deserialize, Serialize};

/// Canonical alert event every source adapter converges to.
///
/// `dedup_key` ties repeated deliveries of one real-world alert to one
/// incident; it is scoped per integration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub action: EventAction,
    pub dedup_key: String,
    pub payload: EventPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPayload {
    pub summary: String,
    pub source: String,
    pub severity: Severity,
    #[serde(default)]
    pub custom_details: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventAction {
    Trigger,
    Resolve,
    Acknowledge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn parse_lenient(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "critical" | "crit" | "fatal" | "emergency" => Self::Critical,
            "error" | "err" | "major" => Self::Error,
            "warning" | "warn" | "minor" | "moderate" => Self::Warning,
            _ => Self::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

/// Inbound source families the engine knows how to normalize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    PagerDuty,
    Sentry,
    Grafana,
    Prometheus,
    Webhook,
}

impl SourceKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pagerduty" => Some(Self::PagerDuty),
            "sentry" => Some(Self::Sentry),
            "grafana" => Some(Self::Grafana),
            "prometheus" | "alertmanager" => Some(Self::Prometheus),
            "webhook" | "generic" => Some(Self::Webhook),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PagerDuty => "pagerduty",
            Self::Sentry => "sentry",
            Self::Grafana => "grafana",
            Self::Prometheus => "prometheus",
            Self::Webhook => "webhook",
        }
    }
}
