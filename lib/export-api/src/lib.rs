//! Export API types shared by the registry, its collaborators and hosts
//!
//! This library defines the records that cross the registry boundary:
//! - ServiceReference: the local service handed to the registry for export
//! - EndpointDescription: immutable description of an exported endpoint
//! - ExportEvent: diagnostics record posted on every export transition
//! - Well-known property keys used in service and endpoint properties

pub mod description;
pub mod error;
pub mod event;
pub mod properties;
pub mod service;

pub use description::EndpointDescription;
pub use error::{ApiError, Result};
pub use event::{ExportEvent, ExportEventKind};
pub use properties::Properties;
pub use service::{ServiceId, ServiceReference};
