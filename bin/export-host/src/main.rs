use anyhow::Result;
use export_core::{ExportMetrics, ExportRegistration, ExportRegistry};
use export_discovery::{EndpointDirectory, LocalEndpointCreator};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::tokio::TokioIo;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};
use tracing_subscriber::fmt::init as tracing_init;
use uuid::Uuid;

mod config;
mod status;

use config::HostConfig;
use status::StatusService;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_init();

    info!("Starting export-host...");

    let config = HostConfig::from_env()?;
    let framework_uuid = config.framework_uuid.unwrap_or_else(Uuid::new_v4);
    info!("Framework uuid: {}", framework_uuid);

    let metrics = ExportMetrics::new()?;
    let creator = LocalEndpointCreator::new(framework_uuid)
        .with_default_configs(config.exported_configs.clone())
        .with_event_sink(Arc::new(metrics.clone()));
    let directory = Arc::new(EndpointDirectory::new());
    let registry = Arc::new(ExportRegistry::new(Arc::new(creator), directory.clone()));

    registry.start();
    let registrations = export_services(&registry, &config);
    info!(
        "Exported {} service(s), {} endpoint(s) published",
        registrations.len(),
        directory.len()
    );

    let status = Arc::new(StatusService::new(registry.clone(), metrics));
    let listener = TcpListener::bind(&config.listen_addr).await?;
    info!("Status server listening on {}", config.listen_addr);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer_addr) = match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        warn!("Error accepting connection: {}", e);
                        continue;
                    }
                };
                let io = TokioIo::new(stream);
                let status = status.clone();

                tokio::task::spawn(async move {
                    let service = service_fn(move |req| status.clone().handle(req));
                    if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                        debug!("Error serving connection from {}: {}", peer_addr, e);
                    }
                });
            }
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    error!("Failed to listen for shutdown signal: {}", e);
                }
                break;
            }
        }
    }

    info!("Shutdown signal received, stopping export registry...");
    registry.stop();
    drop(registrations);
    info!("{} endpoint(s) still published", directory.len());

    Ok(())
}

/// Export every configured service, keeping the successful registrations
fn export_services(registry: &ExportRegistry, config: &HostConfig) -> Vec<ExportRegistration> {
    let mut registrations = Vec::new();

    for service in &config.services {
        let sref = service.service_reference();
        let registration = registry.export(&sref, Some(&service.extra_properties));

        match registration.get_exception() {
            Some(e) => error!("Could not export service {}: {}", sref.id, e),
            None => {
                if let Some(reference) = registration.get_export_reference() {
                    info!(
                        "Exported service {} as endpoint {}",
                        sref.id,
                        reference.endpoint_id()
                    );
                }
                registrations.push(registration);
            }
        }
    }

    registrations
}
