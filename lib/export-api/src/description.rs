//! Endpoint descriptions built from exported services

use crate::properties::{self, Properties};
use crate::{ApiError, Result, ServiceId, ServiceReference};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// EndpointDescription describes a remotely reachable endpoint for a local service.
///
/// Descriptions are immutable once built; a new export of the same service after
/// its endpoint was destroyed always gets a new description with a new id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointDescription {
    /// Unique endpoint id (`endpoint.id`)
    pub id: Uuid,

    /// Id of the exported local service (`endpoint.service.id`)
    pub service_id: ServiceId,

    /// Framework the endpoint originates from (`endpoint.framework.uuid`)
    pub framework_uuid: Uuid,

    /// Interfaces reachable through this endpoint
    pub interfaces: Vec<String>,

    /// Configuration types the endpoint can be imported with
    #[serde(default)]
    pub configs: Vec<String>,

    /// Intents satisfied by the endpoint
    #[serde(default)]
    pub intents: Vec<String>,

    /// Full property map as advertised to discovery
    #[serde(default)]
    pub properties: Properties,
}

impl EndpointDescription {
    /// Build a description for `service`, merging `extra` over the service properties.
    ///
    /// Extra properties override service properties except `service.id` and
    /// `objectClass`. `service.exported.interfaces` selects which interfaces are
    /// exported; `*` or an absent value exports all of them.
    pub fn from_service(
        service: &ServiceReference,
        extra: &Properties,
        framework_uuid: Uuid,
    ) -> Result<Self> {
        if service.interfaces.is_empty() {
            return Err(ApiError::NoInterfaces(service.id.0));
        }

        let mut props = service.all_properties();
        for (key, value) in extra {
            if properties::PROTECTED.contains(&key.as_str()) {
                continue;
            }
            props.insert(key.clone(), value.clone());
        }

        let interfaces = resolve_interfaces(service, &props)?;
        let configs = list_property(&props, properties::SERVICE_EXPORTED_CONFIGS)?;
        let intents = list_property(&props, properties::SERVICE_INTENTS)?;
        let id = Uuid::new_v4();

        props.remove(properties::SERVICE_EXPORTED_INTERFACES);
        props.remove(properties::SERVICE_EXPORTED_CONFIGS);
        props.insert(properties::OBJECT_CLASS.to_string(), interfaces.clone().into());
        props.insert(properties::ENDPOINT_ID.to_string(), id.to_string().into());
        props.insert(properties::ENDPOINT_SERVICE_ID.to_string(), service.id.0.into());
        props.insert(
            properties::ENDPOINT_FRAMEWORK_UUID.to_string(),
            framework_uuid.to_string().into(),
        );
        props.insert(properties::SERVICE_IMPORTED.to_string(), Value::Bool(true));
        props.insert(
            properties::SERVICE_IMPORTED_CONFIGS.to_string(),
            configs.clone().into(),
        );

        Ok(Self {
            id,
            service_id: service.id,
            framework_uuid,
            interfaces,
            configs,
            intents,
            properties: props,
        })
    }
}

fn resolve_interfaces(service: &ServiceReference, props: &Properties) -> Result<Vec<String>> {
    let requested = list_property(props, properties::SERVICE_EXPORTED_INTERFACES)?;
    if requested.is_empty() || requested.iter().any(|i| i == properties::ALL_INTERFACES) {
        return Ok(service.interfaces.clone());
    }

    for interface in &requested {
        if !service.interfaces.contains(interface) {
            return Err(ApiError::UnknownInterface {
                service_id: service.id.0,
                interface: interface.clone(),
            });
        }
    }
    Ok(requested)
}

fn list_property(props: &Properties, key: &str) -> Result<Vec<String>> {
    if !props.contains_key(key) {
        return Ok(Vec::new());
    }
    properties::string_list(props, key).ok_or_else(|| ApiError::InvalidProperty {
        key: key.to_string(),
        reason: "expected a string or a list of strings".to_string(),
    })
}
