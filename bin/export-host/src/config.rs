//! Host configuration loaded from YAML

use anyhow::{Context, Result};
use export_api::{Properties, ServiceReference};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use uuid::Uuid;

/// Configuration of the export host
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostConfig {
    /// Address of the status HTTP listener
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// Framework uuid stamped on every endpoint; random when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framework_uuid: Option<Uuid>,

    /// Configuration types applied to services that name none
    #[serde(default = "default_exported_configs")]
    pub exported_configs: Vec<String>,

    /// Services exported at startup
    #[serde(default)]
    pub services: Vec<ServiceConfig>,
}

/// A local service to export
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    pub id: u64,
    pub interfaces: Vec<String>,

    /// Service properties
    #[serde(default)]
    pub properties: Properties,

    /// Extra properties passed to the export call
    #[serde(default)]
    pub extra_properties: Properties,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            framework_uuid: None,
            exported_configs: default_exported_configs(),
            services: Vec::new(),
        }
    }
}

impl HostConfig {
    /// Parse a YAML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_yaml(&raw).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Load from `EXPORT_HOST_CONFIG` if set, then apply `EXPORT_HOST_ADDR`
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var("EXPORT_HOST_CONFIG") {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };

        if let Ok(addr) = std::env::var("EXPORT_HOST_ADDR") {
            config.listen_addr = addr
                .parse()
                .with_context(|| format!("Invalid EXPORT_HOST_ADDR {}", addr))?;
        }
        Ok(config)
    }
}

impl ServiceConfig {
    pub fn service_reference(&self) -> ServiceReference {
        ServiceReference {
            id: export_api::ServiceId(self.id),
            interfaces: self.interfaces.clone(),
            properties: self.properties.clone(),
        }
    }
}

// Default values
fn default_listen_addr() -> SocketAddr {
    ([0, 0, 0, 0], 9464).into()
}

fn default_exported_configs() -> Vec<String> {
    vec!["json-rpc".to_string()]
}
