use crate::properties::{self, Properties};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identity of a local service
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(pub u64);

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A local service handed to the export registry.
///
/// Two references are the same service when their ids are equal; interfaces
/// and properties do not take part in equality or hashing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceReference {
    /// Identity of the service
    pub id: ServiceId,

    /// Interfaces provided by the service
    pub interfaces: Vec<String>,

    /// Service properties
    #[serde(default)]
    pub properties: Properties,
}

impl ServiceReference {
    pub fn new(id: u64, interfaces: Vec<String>) -> Self {
        Self {
            id: ServiceId(id),
            interfaces,
            properties: Properties::new(),
        }
    }

    /// Set a service property
    pub fn with_property(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    /// Service properties including the framework-managed `service.id` and `objectClass`
    pub fn all_properties(&self) -> Properties {
        let mut props = self.properties.clone();
        props.insert(properties::SERVICE_ID.to_string(), self.id.0.into());
        props.insert(
            properties::OBJECT_CLASS.to_string(),
            self.interfaces.clone().into(),
        );
        props
    }
}

impl PartialEq for ServiceReference {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ServiceReference {}

impl Hash for ServiceReference {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn test_equality_uses_id_only() {
        let a = ServiceReference::new(7, vec!["a.Foo".to_string()]);
        let b = ServiceReference::new(7, vec!["a.Bar".to_string()])
            .with_property("color", json!("blue"));
        let c = ServiceReference::new(8, vec!["a.Foo".to_string()]);

        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<_> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_all_properties_include_framework_keys() {
        let sref = ServiceReference::new(3, vec!["a.Foo".to_string()])
            .with_property(properties::SERVICE_ID, json!(99));
        let props = sref.all_properties();
        assert_eq!(props[properties::SERVICE_ID], json!(3));
        assert_eq!(props[properties::OBJECT_CLASS], json!(["a.Foo"]));
    }
}
