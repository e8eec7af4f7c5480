//! Recording collaborators for registry tests

use crate::{EndpointCreator, EndpointPublisher, ExportEventSink, PublicationHandle};
use anyhow::bail;
use export_api::{EndpointDescription, ExportEvent, ExportEventKind, Properties, ServiceReference};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;
use uuid::Uuid;

#[derive(Default)]
pub struct RecordingSink {
    pub events: Mutex<Vec<ExportEvent>>,
    hold: Mutex<Option<(Arc<Barrier>, Duration)>>,
}

impl RecordingSink {
    pub fn count(&self, kind: ExportEventKind) -> usize {
        self.events.lock().iter().filter(|e| e.kind == kind).count()
    }

    pub fn kinds(&self) -> Vec<ExportEventKind> {
        self.events.lock().iter().map(|e| e.kind).collect()
    }

    /// Park the next `Registration` post: meet `entered`, then sleep for `delay`
    pub fn hold_next_registration(&self, entered: Arc<Barrier>, delay: Duration) {
        *self.hold.lock() = Some((entered, delay));
    }

    /// Check that no endpoint ever has more unregistrations than registrations
    /// and return the number of registrations still outstanding per endpoint.
    pub fn assert_well_ordered(&self) -> HashMap<Uuid, i64> {
        let mut balance: HashMap<Uuid, i64> = HashMap::new();
        for event in self.events.lock().iter() {
            let Some(endpoint) = event.endpoint_id else {
                continue;
            };
            let live = balance.entry(endpoint).or_default();
            match event.kind {
                ExportEventKind::Registration => *live += 1,
                ExportEventKind::Unregistration => *live -= 1,
                ExportEventKind::Error => {}
            }
            assert!(*live >= 0, "endpoint {} unregistered before registration", endpoint);
        }
        balance
    }

    pub fn assert_all_released(&self) {
        let balance = self.assert_well_ordered();
        assert!(
            balance.values().all(|live| *live == 0),
            "outstanding registrations: {:?}",
            balance
        );
    }
}

impl ExportEventSink for RecordingSink {
    fn post(&self, event: &ExportEvent) {
        if event.kind == ExportEventKind::Registration {
            let hold = self.hold.lock().take();
            if let Some((entered, delay)) = hold {
                entered.wait();
                thread::sleep(delay);
            }
        }
        self.events.lock().push(event.clone());
    }
}

pub struct RecordingCreator {
    pub framework: Uuid,
    pub created: AtomicUsize,
    pub destroyed: AtomicUsize,
    pub live: Mutex<HashSet<Uuid>>,
    pub fail: AtomicBool,
    pub sink: Arc<RecordingSink>,
}

impl Default for RecordingCreator {
    fn default() -> Self {
        Self {
            framework: Uuid::new_v4(),
            created: AtomicUsize::new(0),
            destroyed: AtomicUsize::new(0),
            live: Mutex::new(HashSet::new()),
            fail: AtomicBool::new(false),
            sink: Arc::new(RecordingSink::default()),
        }
    }
}

impl RecordingCreator {
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn destroyed(&self) -> usize {
        self.destroyed.load(Ordering::SeqCst)
    }
}

impl EndpointCreator for RecordingCreator {
    fn create_endpoint(
        &self,
        service: &ServiceReference,
        extra_properties: &Properties,
    ) -> anyhow::Result<EndpointDescription> {
        if self.fail.load(Ordering::SeqCst) {
            bail!("construction refused");
        }
        let desc = EndpointDescription::from_service(service, extra_properties, self.framework)?;
        self.created.fetch_add(1, Ordering::SeqCst);
        self.live.lock().insert(desc.id);
        Ok(desc)
    }

    fn destroy_endpoint(&self, description: &EndpointDescription) {
        assert!(
            self.live.lock().remove(&description.id),
            "endpoint {} destroyed twice",
            description.id
        );
        self.destroyed.fetch_add(1, Ordering::SeqCst);
    }

    fn event_sink(&self) -> Option<Arc<dyn ExportEventSink>> {
        Some(self.sink.clone())
    }
}

#[derive(Default)]
pub struct RecordingPublisher {
    pub published: AtomicUsize,
    pub revoked: AtomicUsize,
    pub fail_publish: AtomicBool,
    pub fail_revoke: AtomicBool,
    pub live: Mutex<HashSet<Uuid>>,
}

impl RecordingPublisher {
    pub fn published(&self) -> usize {
        self.published.load(Ordering::SeqCst)
    }

    pub fn revoked(&self) -> usize {
        self.revoked.load(Ordering::SeqCst)
    }
}

impl EndpointPublisher for RecordingPublisher {
    fn publish(&self, description: &EndpointDescription) -> anyhow::Result<PublicationHandle> {
        if self.fail_publish.load(Ordering::SeqCst) {
            bail!("discovery unavailable");
        }
        let handle = PublicationHandle::new(description.id);
        self.live.lock().insert(handle.id);
        self.published.fetch_add(1, Ordering::SeqCst);
        Ok(handle)
    }

    fn revoke(&self, handle: PublicationHandle) -> anyhow::Result<()> {
        assert!(
            self.live.lock().remove(&handle.id),
            "publication {} revoked twice",
            handle.id
        );
        self.revoked.fetch_add(1, Ordering::SeqCst);
        if self.fail_revoke.load(Ordering::SeqCst) {
            bail!("discovery unavailable");
        }
        Ok(())
    }
}

pub fn service(id: u64) -> ServiceReference {
    ServiceReference::new(id, vec!["org.example.Echo".to_string()])
}
