//! In-memory endpoint directory acting as the publication mechanism

use anyhow::{anyhow, bail};
use export_api::EndpointDescription;
use export_core::{EndpointPublisher, PublicationHandle};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

/// EndpointDirectory holds every endpoint description currently advertised.
///
/// Publications are keyed by their handle id so that a description can only be
/// withdrawn through the handle returned when it was published.
#[derive(Default)]
pub struct EndpointDirectory {
    publications: RwLock<HashMap<Uuid, EndpointDescription>>,
}

impl EndpointDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// All advertised descriptions, ordered by endpoint id
    pub fn published(&self) -> Vec<EndpointDescription> {
        let publications = self.publications.read();
        let mut published: Vec<_> = publications.values().cloned().collect();
        published.sort_by_key(|d| d.id);
        published
    }

    /// Find an advertised description by endpoint id
    pub fn lookup(&self, endpoint_id: Uuid) -> Option<EndpointDescription> {
        let publications = self.publications.read();
        publications.values().find(|d| d.id == endpoint_id).cloned()
    }

    /// Advertised descriptions exposing `interface`
    pub fn providers_of(&self, interface: &str) -> Vec<EndpointDescription> {
        let publications = self.publications.read();
        publications
            .values()
            .filter(|d| d.interfaces.iter().any(|i| i == interface))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.publications.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.publications.read().is_empty()
    }
}

impl EndpointPublisher for EndpointDirectory {
    fn publish(&self, description: &EndpointDescription) -> anyhow::Result<PublicationHandle> {
        let mut publications = self.publications.write();
        if publications.values().any(|d| d.id == description.id) {
            bail!("Endpoint {} is already published", description.id);
        }

        let handle = PublicationHandle::new(description.id);
        publications.insert(handle.id, description.clone());
        debug!(
            "Published endpoint {} for service {}",
            description.id, description.service_id
        );
        Ok(handle)
    }

    fn revoke(&self, handle: PublicationHandle) -> anyhow::Result<()> {
        let mut publications = self.publications.write();
        let description = publications
            .remove(&handle.id)
            .ok_or_else(|| anyhow!("Unknown publication {}", handle.id))?;
        debug!("Revoked endpoint {}", description.id);
        Ok(())
    }
}
