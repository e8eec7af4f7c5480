//! Export registry turning local services into published endpoints

use crate::{
    EndpointCreator, EndpointPublisher, ExportError, ExportReference, ExportRegistration,
    PublicationHandle, Result,
};
use export_api::{ExportEvent, Properties, ServiceId, ServiceReference};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// ExportRegistry maps exported services to their published endpoints.
///
/// Every export of the same service shares one endpoint; the endpoint is destroyed
/// and its publication revoked when the last [`ExportRegistration`] for it is
/// closed, or when the registry is stopped. Exports fail until [`start`] is
/// called.
///
/// All mutations, including the calls into the creator, the publisher and the
/// event sink, run under a single registry-wide lock. This serializes first-time
/// construction of an endpoint, makes reference count changes exclusive with
/// teardown, and delivers the events of an endpoint in the order its
/// registrations were issued and released.
///
/// [`start`]: ExportRegistry::start
pub struct ExportRegistry {
    inner: Arc<RegistryInner>,
}

pub(crate) struct RegistryInner {
    creator: Arc<dyn EndpointCreator>,
    publisher: Arc<dyn EndpointPublisher>,
    state: Mutex<RegistryState>,
}

#[derive(Default)]
struct RegistryState {
    valid: bool,
    // Serial of the most recently created entry; never reused.
    last_serial: u64,
    entries: HashMap<ServiceId, EndpointEntry>,
}

/// Per-service record; present in the map only while `count > 0`
struct EndpointEntry {
    serial: u64,
    reference: ExportReference,
    publication: PublicationHandle,
    count: usize,
}

impl ExportRegistry {
    /// Create a stopped registry
    pub fn new(creator: Arc<dyn EndpointCreator>, publisher: Arc<dyn EndpointPublisher>) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                creator,
                publisher,
                state: Mutex::new(RegistryState::default()),
            }),
        }
    }

    /// Export `service`, reusing its endpoint if it is already exported.
    ///
    /// Never fails directly: failures are carried by the returned registration.
    /// Dropping the registration unexports again.
    pub fn export(
        &self,
        service: &ServiceReference,
        extra_properties: Option<&Properties>,
    ) -> ExportRegistration {
        let empty = Properties::new();
        let extra = extra_properties.unwrap_or(&empty);

        match self.inner.attach(service, extra) {
            Ok(serial) => {
                ExportRegistration::attached(Arc::downgrade(&self.inner), service.id, serial)
            }
            Err(e) => {
                warn!("Export of service {} failed: {}", service.id, e);
                self.inner.post(ExportEvent::error(service.id, e.to_string()));
                ExportRegistration::failed(service.id, e)
            }
        }
    }

    /// Current reference for `service`, if it is exported
    pub fn get_export_reference(&self, service: &ServiceReference) -> Option<ExportReference> {
        let state = self.inner.state.lock();
        state.entries.get(&service.id).map(|e| e.reference.clone())
    }

    /// Snapshot of all live export references
    pub fn get_all_export_references(&self) -> HashSet<ExportReference> {
        let state = self.inner.state.lock();
        state.entries.values().map(|e| e.reference.clone()).collect()
    }

    /// Number of live registrations sharing the endpoint of `service`
    pub fn registration_count(&self, service: &ServiceReference) -> usize {
        let state = self.inner.state.lock();
        state.entries.get(&service.id).map_or(0, |e| e.count)
    }

    pub fn is_valid(&self) -> bool {
        self.inner.state.lock().valid
    }

    /// Accept exports. Idempotent.
    pub fn start(&self) {
        let mut state = self.inner.state.lock();
        if !state.valid {
            state.valid = true;
            info!("Export registry started ({})", self.inner.creator.name());
        }
    }

    /// Reject further exports and tear down every exported endpoint.
    ///
    /// Registrations issued before the stop observe no reference afterwards and
    /// closing them is a no-op.
    pub fn stop(&self) {
        let mut state = self.inner.state.lock();
        let was_valid = std::mem::replace(&mut state.valid, false);
        let entries: Vec<EndpointEntry> = state.entries.drain().map(|(_, e)| e).collect();

        for entry in entries {
            let service_id = entry.reference.exported_service().id;
            let endpoint_id = entry.reference.endpoint_id();
            let count = entry.count;
            debug!(
                "Forcing {} registration(s) of service {} closed",
                count, service_id
            );
            self.inner.teardown(entry);
            for _ in 0..count {
                self.inner
                    .post(ExportEvent::unregistration(service_id, endpoint_id));
            }
        }

        if was_valid {
            info!("Export registry stopped ({})", self.inner.creator.name());
        }
    }
}

impl Drop for ExportRegistry {
    fn drop(&mut self) {
        self.stop();
    }
}

impl RegistryInner {
    /// Attach one registration to the entry of `service`, creating it if needed.
    ///
    /// Returns the serial of the entry the registration holds a share of.
    fn attach(&self, service: &ServiceReference, extra: &Properties) -> Result<u64> {
        let mut state = self.state.lock();
        if !state.valid {
            return Err(ExportError::NotStarted);
        }

        if let Some(entry) = state.entries.get_mut(&service.id) {
            entry.count += 1;
            debug!(
                "Reusing endpoint {} for service {} ({} registrations)",
                entry.reference.endpoint_id(),
                service.id,
                entry.count
            );
            let (serial, endpoint_id) = (entry.serial, entry.reference.endpoint_id());
            self.post(ExportEvent::registration(service.id, endpoint_id));
            return Ok(serial);
        }

        let description = self
            .creator
            .create_endpoint(service, extra)
            .map_err(|source| ExportError::ConstructionFailed {
                service: service.id,
                source,
            })?;

        let publication = match self.publisher.publish(&description) {
            Ok(publication) => publication,
            Err(source) => {
                let endpoint = description.id;
                self.creator.destroy_endpoint(&description);
                return Err(ExportError::PublicationFailed {
                    service: service.id,
                    endpoint,
                    source,
                });
            }
        };

        state.last_serial += 1;
        let serial = state.last_serial;
        let reference = ExportReference::new(service.clone(), description);
        debug!(
            "Created endpoint {} for service {}",
            reference.endpoint_id(),
            service.id
        );

        state.entries.insert(
            service.id,
            EndpointEntry {
                serial,
                reference: reference.clone(),
                publication,
                count: 1,
            },
        );

        self.post(ExportEvent::registration(service.id, reference.endpoint_id()));
        Ok(serial)
    }

    /// Reference of the entry created with `serial`, if it is still alive
    pub(crate) fn lookup(&self, service_id: ServiceId, serial: u64) -> Option<ExportReference> {
        let state = self.state.lock();
        state
            .entries
            .get(&service_id)
            .filter(|e| e.serial == serial)
            .map(|e| e.reference.clone())
    }

    /// Drop one registration from the entry created with `serial`.
    ///
    /// Returns false when that entry no longer exists, which happens after a stop.
    pub(crate) fn release(&self, service_id: ServiceId, serial: u64) -> bool {
        let mut state = self.state.lock();
        let (endpoint_id, remaining) = match state.entries.get_mut(&service_id) {
            Some(entry) if entry.serial == serial => {
                entry.count -= 1;
                (entry.reference.endpoint_id(), entry.count)
            }
            _ => return false,
        };

        if remaining == 0 {
            if let Some(entry) = state.entries.remove(&service_id) {
                self.teardown(entry);
            }
        } else {
            debug!(
                "Service {} still has {} registration(s)",
                service_id, remaining
            );
        }

        self.post(ExportEvent::unregistration(service_id, endpoint_id));
        true
    }

    /// Revoke the publication and destroy the description of a removed entry.
    ///
    /// Revocation errors are logged; the entry is gone either way.
    fn teardown(&self, entry: EndpointEntry) {
        let EndpointEntry {
            reference,
            publication,
            ..
        } = entry;

        if let Err(e) = self.publisher.revoke(publication) {
            warn!(
                "Failed to revoke publication of endpoint {}: {}",
                reference.endpoint_id(),
                e
            );
        }
        self.creator.destroy_endpoint(reference.exported_endpoint());
        debug!(
            "Destroyed endpoint {} of service {}",
            reference.endpoint_id(),
            reference.exported_service().id
        );
    }

    /// Deliver `event` to the creator's sink, if it has one
    fn post(&self, event: ExportEvent) {
        if let Some(sink) = self.creator.event_sink() {
            sink.post(&event);
        }
    }
}
