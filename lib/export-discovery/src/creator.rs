//! Property-driven endpoint construction strategy

use export_api::properties::SERVICE_EXPORTED_CONFIGS;
use export_api::{EndpointDescription, Properties, ServiceId, ServiceReference};
use export_core::{EndpointCreator, ExportEventSink};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// LocalEndpointCreator builds endpoint descriptions from service properties.
///
/// Services that do not name any `service.exported.configs` get the creator's
/// default configuration types.
pub struct LocalEndpointCreator {
    framework_uuid: Uuid,
    default_configs: Vec<String>,
    live: Mutex<HashMap<Uuid, ServiceId>>,
    event_sink: Option<Arc<dyn ExportEventSink>>,
}

impl LocalEndpointCreator {
    pub fn new(framework_uuid: Uuid) -> Self {
        Self {
            framework_uuid,
            default_configs: Vec::new(),
            live: Mutex::new(HashMap::new()),
            event_sink: None,
        }
    }

    /// Configuration types applied when a service names none
    pub fn with_default_configs(mut self, configs: Vec<String>) -> Self {
        self.default_configs = configs;
        self
    }

    /// Route export events to `sink`
    pub fn with_event_sink(mut self, sink: Arc<dyn ExportEventSink>) -> Self {
        self.event_sink = Some(sink);
        self
    }

    pub fn framework_uuid(&self) -> Uuid {
        self.framework_uuid
    }

    /// Number of descriptions created and not yet destroyed
    pub fn live_endpoints(&self) -> usize {
        self.live.lock().len()
    }
}

impl EndpointCreator for LocalEndpointCreator {
    fn name(&self) -> &str {
        "local-endpoint-creator"
    }

    fn create_endpoint(
        &self,
        service: &ServiceReference,
        extra_properties: &Properties,
    ) -> anyhow::Result<EndpointDescription> {
        let names_configs = extra_properties.contains_key(SERVICE_EXPORTED_CONFIGS)
            || service.properties.contains_key(SERVICE_EXPORTED_CONFIGS);

        let description = if names_configs || self.default_configs.is_empty() {
            EndpointDescription::from_service(service, extra_properties, self.framework_uuid)?
        } else {
            let mut extra = extra_properties.clone();
            extra.insert(
                SERVICE_EXPORTED_CONFIGS.to_string(),
                self.default_configs.clone().into(),
            );
            EndpointDescription::from_service(service, &extra, self.framework_uuid)?
        };

        self.live.lock().insert(description.id, service.id);
        debug!(
            "Built endpoint {} for service {} with configs {:?}",
            description.id, service.id, description.configs
        );
        Ok(description)
    }

    fn destroy_endpoint(&self, description: &EndpointDescription) {
        if self.live.lock().remove(&description.id).is_none() {
            warn!("Destroying unknown endpoint {}", description.id);
        }
    }

    fn event_sink(&self) -> Option<Arc<dyn ExportEventSink>> {
        self.event_sink.clone()
    }
}
