use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Service {0} exposes no interfaces")]
    NoInterfaces(u64),

    #[error("Service {service_id} does not provide exported interface {interface}")]
    UnknownInterface { service_id: u64, interface: String },

    #[error("Invalid property {key}: {reason}")]
    InvalidProperty { key: String, reason: String },
}
