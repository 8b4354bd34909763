//! Parser for a `VCAP_SERVICES`-style service catalog.
//!
//! The catalog is a JSON object mapping a service type to its bound
//! instances:
//!
//! ```json
//! {
//!   "hdfs": [{
//!     "name": "hdfs-instance",
//!     "label": "hdfs",
//!     "tags": ["hdfs"],
//!     "credentials": {
//!       "uri": "hdfs://nameservice1/org/brokers/userspace/1234",
//!       "HADOOP_CONFIG_KEY": { "hadoop.security.authentication": "kerberos" }
//!     }
//!   }]
//! }
//! ```

use std::collections::BTreeMap;

use hdfs_boot_types::error::{BootError, Result};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::locator::{ConfigurationLocator, PropertyLocator};

#[derive(Debug, Clone, Deserialize)]
struct ServiceInstance {
    #[serde(default)]
    name: String,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    credentials: Map<String, Value>,
}

impl ServiceInstance {
    fn matches(&self, service_type: &str, service: &str) -> bool {
        service_type.eq_ignore_ascii_case(service)
            || self
                .label
                .as_deref()
                .is_some_and(|l| l.eq_ignore_ascii_case(service))
            || self.tags.iter().any(|t| t.eq_ignore_ascii_case(service))
    }
}

/// Parsed service catalog.
#[derive(Debug, Clone, Default)]
pub struct ServiceCatalog {
    services: BTreeMap<String, Vec<ServiceInstance>>,
}

impl ServiceCatalog {
    pub fn from_json(json: &str) -> Result<Self> {
        let services: BTreeMap<String, Vec<ServiceInstance>> = serde_json::from_str(json)
            .map_err(|e| BootError::Format(format!("malformed service catalog: {}", e)))?;
        Ok(ServiceCatalog { services })
    }

    fn instances(&self) -> impl Iterator<Item = (&str, &ServiceInstance)> {
        self.services
            .iter()
            .flat_map(|(ty, list)| list.iter().map(move |inst| (ty.as_str(), inst)))
    }

    /// Look up a single property. Returns `None` when no matching service
    /// publishes a non-empty value for it.
    pub fn property(&self, locator: PropertyLocator) -> Option<String> {
        self.instances()
            .filter(|(ty, inst)| inst.matches(ty, locator.service()))
            .find_map(|(_, inst)| inst.credentials.get(locator.field()).and_then(stringify))
            .filter(|v| !v.is_empty())
    }

    /// Key/value pairs of a configuration block; empty when no bound service
    /// publishes one.
    pub fn configuration(&self, locator: ConfigurationLocator) -> BTreeMap<String, String> {
        let block = self
            .instances()
            .find_map(|(_, inst)| inst.credentials.get(locator.key()).and_then(Value::as_object));
        match block {
            Some(obj) => obj
                .iter()
                .filter_map(|(k, v)| stringify(v).map(|v| (k.clone(), v)))
                .collect(),
            None => BTreeMap::new(),
        }
    }

    /// Names of every bound instance, for diagnostics.
    pub fn instance_names(&self) -> Vec<&str> {
        self.instances().map(|(_, inst)| inst.name.as_str()).collect()
    }
}

fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
