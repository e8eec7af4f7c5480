//! Prometheus metrics fed by export lifecycle events

use crate::ExportEventSink;
use anyhow::Result;
use export_api::{ExportEvent, ExportEventKind};
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use std::sync::Arc;

/// Prometheus collector counting export transitions
#[derive(Clone)]
pub struct ExportMetrics {
    /// Registrations issued on live endpoints
    pub registrations_total: IntCounter,
    /// Registrations released, by close or by registry stop
    pub unregistrations_total: IntCounter,
    /// Failed export attempts
    pub export_errors_total: IntCounter,
    /// Registrations currently holding an endpoint
    pub live_registrations: IntGauge,
    /// Prometheus registry for metrics
    pub registry: Arc<Registry>,
}

impl ExportMetrics {
    /// Create a new metrics collector
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());

        let registrations_total = IntCounter::new(
            "export_registrations_total",
            "Total export registrations issued",
        )?;
        let unregistrations_total = IntCounter::new(
            "export_unregistrations_total",
            "Total export registrations released",
        )?;
        let export_errors_total =
            IntCounter::new("export_errors_total", "Total failed export attempts")?;
        let live_registrations = IntGauge::new(
            "export_live_registrations",
            "Export registrations currently holding an endpoint",
        )?;

        registry.register(Box::new(registrations_total.clone()))?;
        registry.register(Box::new(unregistrations_total.clone()))?;
        registry.register(Box::new(export_errors_total.clone()))?;
        registry.register(Box::new(live_registrations.clone()))?;

        Ok(Self {
            registrations_total,
            unregistrations_total,
            export_errors_total,
            live_registrations,
            registry,
        })
    }

    /// Gather all metrics in Prometheus text format
    pub fn gather(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = vec![];
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

impl ExportEventSink for ExportMetrics {
    fn post(&self, event: &ExportEvent) {
        match event.kind {
            ExportEventKind::Registration => {
                self.registrations_total.inc();
                self.live_registrations.inc();
            }
            ExportEventKind::Unregistration => {
                self.unregistrations_total.inc();
                self.live_registrations.dec();
            }
            ExportEventKind::Error => self.export_errors_total.inc(),
        }
    }
}
