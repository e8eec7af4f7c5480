//! Reference collaborators for the export registry
pub mod creator;
pub mod directory;

pub use creator::LocalEndpointCreator;
pub use directory::EndpointDirectory;
