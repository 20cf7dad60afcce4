use serde::{Deserialize, Serialize};

use crate::event::SourceKind;
use crate::ids::{IntegrationId, ServiceId};

/// Per-integration overrides for where each canonical field lives in a
/// generic webhook payload, as dotted paths.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GenericFieldMap {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub dedup_key: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

/// An inbound source identity: authenticates webhooks and partitions the
/// rate limiter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Integration {
    id: IntegrationId,
    kind: SourceKind,
    key: String,
    signature_secret: Option<String>,
    enabled: bool,
    service_id: ServiceId,
    #[serde(default)]
    field_map: Option<GenericFieldMap>,
}

impl Integration {
    pub fn new(kind: SourceKind, key: String, service_id: ServiceId) -> Self {
        Self {
            id: IntegrationId::new(),
            kind,
            key,
            signature_secret: None,
            enabled: true,
            service_id,
            field_map: None,
        }
    }

    pub fn with_signature_secret(mut self, secret: String) -> Self {
        self.signature_secret = Some(secret);
        self
    }

    pub fn with_field_map(mut self, map: GenericFieldMap) -> Self {
        self.field_map = Some(map);
        self
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn id(&self) -> &IntegrationId {
        &self.id
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn signature_secret(&self) -> Option<&str> {
        self.signature_secret.as_deref()
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn service_id(&self) -> &ServiceId {
        &self.service_id
    }

    pub fn field_map(&self) -> Option<&GenericFieldMap> {
        self.field_map.as_ref()
    }
}
