//! Per-call export handles

use crate::registry::RegistryInner;
use crate::{ExportError, ExportReference};
use export_api::ServiceId;
use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::debug;

/// ExportRegistration is one caller's claim on an exported endpoint.
///
/// A registration either holds a share of a live endpoint or carries the error
/// that made its export fail. Closing is idempotent: the first close releases
/// the share (destroying the endpoint if it was the last one) and clears the
/// error, later closes do nothing. Dropping a registration closes it.
#[must_use = "dropping an ExportRegistration unexports the service"]
pub struct ExportRegistration {
    registry: Weak<RegistryInner>,
    service_id: ServiceId,
    state: Mutex<RegistrationState>,
}

struct RegistrationState {
    // Serial of the entry this registration holds a share of
    serial: Option<u64>,
    error: Option<Arc<ExportError>>,
    closed: bool,
}

impl ExportRegistration {
    pub(crate) fn attached(registry: Weak<RegistryInner>, service_id: ServiceId, serial: u64) -> Self {
        Self {
            registry,
            service_id,
            state: Mutex::new(RegistrationState {
                serial: Some(serial),
                error: None,
                closed: false,
            }),
        }
    }

    pub(crate) fn failed(service_id: ServiceId, error: ExportError) -> Self {
        Self {
            registry: Weak::new(),
            service_id,
            state: Mutex::new(RegistrationState {
                serial: None,
                error: Some(Arc::new(error)),
                closed: false,
            }),
        }
    }

    /// Id of the service this registration was requested for
    pub fn service_id(&self) -> ServiceId {
        self.service_id
    }

    /// Reference to the exported endpoint.
    ///
    /// `None` if the export failed, the registration was closed, or the endpoint
    /// was torn down by a registry stop.
    pub fn get_export_reference(&self) -> Option<ExportReference> {
        let state = self.state.lock();
        if state.closed {
            return None;
        }
        let serial = state.serial?;
        let registry = self.registry.upgrade()?;
        registry.lookup(self.service_id, serial)
    }

    /// Error that made the export fail; `None` on success and after close
    pub fn get_exception(&self) -> Option<Arc<ExportError>> {
        self.state.lock().error.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Release this registration. Only the first call has an effect.
    pub fn close(&self) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        state.closed = true;
        state.error = None;

        let Some(serial) = state.serial.take() else {
            return;
        };
        let released = self
            .registry
            .upgrade()
            .is_some_and(|registry| registry.release(self.service_id, serial));
        if !released {
            debug!(
                "Endpoint of service {} was already torn down",
                self.service_id
            );
        }
    }
}

impl Drop for ExportRegistration {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for ExportRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ExportRegistration")
            .field("service_id", &self.service_id)
            .field("serial", &state.serial)
            .field("error", &state.error)
            .field("closed", &state.closed)
            .finish()
    }
}
