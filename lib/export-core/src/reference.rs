//! Export references handed out to callers

use export_api::{EndpointDescription, ServiceReference};
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use uuid::Uuid;

/// ExportReference is the externally visible handle to a live exported endpoint.
///
/// Cloning is cheap; every clone refers to the same endpoint. Two references are
/// equal when they describe the same endpoint id.
#[derive(Clone, Debug)]
pub struct ExportReference {
    inner: Arc<ReferenceInner>,
}

#[derive(Debug)]
struct ReferenceInner {
    service: ServiceReference,
    endpoint: EndpointDescription,
}

impl ExportReference {
    pub(crate) fn new(service: ServiceReference, endpoint: EndpointDescription) -> Self {
        Self {
            inner: Arc::new(ReferenceInner { service, endpoint }),
        }
    }

    /// The local service behind the endpoint
    pub fn exported_service(&self) -> &ServiceReference {
        &self.inner.service
    }

    /// Description of the exported endpoint
    pub fn exported_endpoint(&self) -> &EndpointDescription {
        &self.inner.endpoint
    }

    pub fn endpoint_id(&self) -> Uuid {
        self.inner.endpoint.id
    }
}

impl PartialEq for ExportReference {
    fn eq(&self, other: &Self) -> bool {
        self.endpoint_id() == other.endpoint_id()
    }
}

impl Eq for ExportReference {}

impl Hash for ExportReference {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.endpoint_id().hash(state);
    }
}
