//! Export lifecycle events

use crate::ServiceId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExportEventKind {
    /// A handle was issued on a live endpoint
    Registration,
    /// A handle released its endpoint, or the endpoint was torn down
    Unregistration,
    /// An export attempt failed
    Error,
}

/// Event posted to diagnostics sinks on every export transition
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEvent {
    pub kind: ExportEventKind,
    pub service_id: ServiceId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ExportEvent {
    pub fn registration(service_id: ServiceId, endpoint_id: Uuid) -> Self {
        Self::new(ExportEventKind::Registration, service_id, Some(endpoint_id), None)
    }

    pub fn unregistration(service_id: ServiceId, endpoint_id: Uuid) -> Self {
        Self::new(ExportEventKind::Unregistration, service_id, Some(endpoint_id), None)
    }

    pub fn error(service_id: ServiceId, message: impl Into<String>) -> Self {
        Self::new(ExportEventKind::Error, service_id, None, Some(message.into()))
    }

    fn new(
        kind: ExportEventKind,
        service_id: ServiceId,
        endpoint_id: Option<Uuid>,
        message: Option<String>,
    ) -> Self {
        Self {
            kind,
            service_id,
            endpoint_id,
            message,
            timestamp: Utc::now(),
        }
    }
}
