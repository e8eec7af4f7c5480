//! Contracts the registry consumes from its surrounding host

use export_api::{EndpointDescription, ExportEvent, Properties, ServiceReference};
use std::sync::Arc;
use uuid::Uuid;

/// Builds and destroys endpoint descriptions for exported services.
///
/// The registry calls `create_endpoint` at most once per live service identity and
/// pairs every successful call with exactly one `destroy_endpoint`. Both run with
/// the registry lock held and must not call back into the registry.
pub trait EndpointCreator: Send + Sync {
    /// Name used in log lines
    fn name(&self) -> &str {
        "endpoint-creator"
    }

    /// Build the description of a new endpoint for `service`
    fn create_endpoint(
        &self,
        service: &ServiceReference,
        extra_properties: &Properties,
    ) -> anyhow::Result<EndpointDescription>;

    /// Release whatever `create_endpoint` allocated for `description`
    fn destroy_endpoint(&self, description: &EndpointDescription);

    /// Sink receiving export lifecycle events, if any
    fn event_sink(&self) -> Option<Arc<dyn ExportEventSink>> {
        None
    }
}

/// Advertises endpoint descriptions to an external discovery mechanism.
///
/// Called with the registry lock held, like [`EndpointCreator`].
pub trait EndpointPublisher: Send + Sync {
    /// Advertise `description`; the returned handle revokes it
    fn publish(&self, description: &EndpointDescription) -> anyhow::Result<PublicationHandle>;

    /// Withdraw a publication
    fn revoke(&self, handle: PublicationHandle) -> anyhow::Result<()>;
}

/// Receives export lifecycle events. Purely observational.
///
/// Events for a live endpoint are posted with the registry lock held, so every
/// `Registration` reaches the sink before the `Unregistration` that releases it.
/// Implementations must not call back into the registry.
pub trait ExportEventSink: Send + Sync {
    fn post(&self, event: &ExportEvent);
}

/// Proof of a successful publication, consumed by `EndpointPublisher::revoke`
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct PublicationHandle {
    /// Publisher-assigned id of the publication
    pub id: Uuid,
    /// Endpoint the publication advertises
    pub endpoint_id: Uuid,
}

impl PublicationHandle {
    pub fn new(endpoint_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            endpoint_id,
        }
    }
}
