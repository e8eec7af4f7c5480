use export_api::ServiceId;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, ExportError>;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Export registry is not started")]
    NotStarted,

    #[error("Failed to create endpoint for service {service}: {source}")]
    ConstructionFailed {
        service: ServiceId,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to publish endpoint {endpoint} for service {service}: {source}")]
    PublicationFailed {
        service: ServiceId,
        endpoint: Uuid,
        #[source]
        source: anyhow::Error,
    },
}
