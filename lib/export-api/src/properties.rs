//! Property maps and the well-known keys used on services and endpoints

use serde_json::Value;
use std::collections::BTreeMap;

/// Property map attached to services and endpoint descriptions
pub type Properties = BTreeMap<String, Value>;

pub const SERVICE_ID: &str = "service.id";
pub const OBJECT_CLASS: &str = "objectClass";

pub const ENDPOINT_ID: &str = "endpoint.id";
pub const ENDPOINT_SERVICE_ID: &str = "endpoint.service.id";
pub const ENDPOINT_FRAMEWORK_UUID: &str = "endpoint.framework.uuid";

pub const SERVICE_EXPORTED_INTERFACES: &str = "service.exported.interfaces";
pub const SERVICE_EXPORTED_CONFIGS: &str = "service.exported.configs";
pub const SERVICE_IMPORTED: &str = "service.imported";
pub const SERVICE_IMPORTED_CONFIGS: &str = "service.imported.configs";
pub const SERVICE_INTENTS: &str = "service.intents";

/// Wildcard value for `service.exported.interfaces`
pub const ALL_INTERFACES: &str = "*";

/// Properties that the extra properties of an export call may never override
pub const PROTECTED: [&str; 2] = [SERVICE_ID, OBJECT_CLASS];

/// Read a property as a list of strings.
///
/// A single string is treated as a one-element list. Returns `None` when the
/// property is absent or holds anything other than strings.
pub fn string_list(properties: &Properties, key: &str) -> Option<Vec<String>> {
    match properties.get(key)? {
        Value::String(s) => Some(vec![s.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => None,
    }
}
