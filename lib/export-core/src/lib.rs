//! Endpoint export registry
//!
//! This library provides:
//! - ExportRegistry: reference-counted export of local services as published endpoints
//! - ExportRegistration: per-call handle on an exported endpoint
//! - Collaborator contracts for endpoint construction, publication and eventing
//! - Prometheus metrics fed by export events

pub mod collaborators;
pub mod error;
pub mod metrics;
pub mod reference;
pub mod registration;
pub mod registry;

#[cfg(test)]
pub(crate) mod testing;

pub use collaborators::{EndpointCreator, EndpointPublisher, ExportEventSink, PublicationHandle};
pub use error::{ExportError, Result};
pub use metrics::ExportMetrics;
pub use reference::ExportReference;
pub use registration::ExportRegistration;
pub use registry::ExportRegistry;
