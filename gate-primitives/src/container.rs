//! Inspect-style container metadata.
//!
//! The shape follows the output of `docker inspect`: labels, environment and
//! volumes live under `Config`, exposed ports are read from `ContainerConfig`,
//! and `Size` is reported in bytes. Every section may be missing or `null`;
//! missing sections read as empty.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// Configuration block shared by the `Config` and `ContainerConfig` sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    labels: Option<BTreeMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    env: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    volumes: Option<BTreeMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exposed_ports: Option<BTreeMap<String, Value>>,
}

impl ContainerConfig {
    fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().flat_map(|map| map.keys().map(String::as_str))
    }

    fn env(&self) -> impl Iterator<Item = &str> {
        self.env.iter().flat_map(|env| env.iter().map(String::as_str))
    }

    fn volumes(&self) -> impl Iterator<Item = &str> {
        self.volumes.iter().flat_map(|map| map.keys().map(String::as_str))
    }

    fn exposed_ports(&self) -> impl Iterator<Item = &str> {
        self.exposed_ports
            .iter()
            .flat_map(|map| map.keys().map(String::as_str))
    }
}

/// Read-only metadata record describing one container or image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    config: Option<ContainerConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    container_config: Option<ContainerConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    size: Option<u64>,
}

impl ContainerRecord {
    /// Starts building a [`ContainerRecord`].
    #[must_use]
    pub fn builder() -> ContainerRecordBuilder {
        ContainerRecordBuilder::default()
    }

    /// Returns the label keys declared under `Config.Labels`.
    pub fn label_keys(&self) -> impl Iterator<Item = &str> {
        self.config.iter().flat_map(|config| config.labels())
    }

    /// Returns `(name, value)` pairs for every `Config.Env` entry.
    ///
    /// Entries are split on the first `=`; an entry without one is treated as a
    /// name with an empty value.
    pub fn env_entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.config
            .iter()
            .flat_map(|config| config.env())
            .map(|entry| entry.split_once('=').unwrap_or((entry, "")))
    }

    /// Returns the mount paths declared under `Config.Volumes`.
    pub fn volume_paths(&self) -> impl Iterator<Item = &str> {
        self.config.iter().flat_map(|config| config.volumes())
    }

    /// Returns the `<port>/<proto>` keys declared under `ContainerConfig.ExposedPorts`.
    pub fn exposed_ports(&self) -> impl Iterator<Item = &str> {
        self.container_config
            .iter()
            .flat_map(|config| config.exposed_ports())
    }

    /// Returns the reported size in bytes, zero when absent.
    #[must_use]
    pub fn size_bytes(&self) -> u64 {
        self.size.unwrap_or_default()
    }
}

/// Extracts the numeric port from an exposed-port key such as `8080/tcp`.
///
/// # Errors
///
/// Returns [`Error::InvalidPortKey`] when the text before the protocol suffix
/// is not a decimal integer.
pub fn port_number(key: &str) -> Result<u32> {
    let prefix = key.split_once('/').map_or(key, |(port, _)| port).trim();
    prefix.parse::<u32>().map_err(|err| Error::InvalidPortKey {
        key: key.into(),
        reason: err.to_string(),
    })
}

/// Builder for [`ContainerRecord`].
#[derive(Debug, Default)]
pub struct ContainerRecordBuilder {
    config: ContainerConfig,
    container_config: ContainerConfig,
    size: Option<u64>,
}

impl ContainerRecordBuilder {
    /// Adds a label under `Config.Labels`.
    #[must_use]
    pub fn label(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.config
            .labels
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Appends a raw `KEY=VALUE` entry under `Config.Env`.
    #[must_use]
    pub fn env(mut self, entry: impl Into<String>) -> Self {
        self.config
            .env
            .get_or_insert_with(Vec::new)
            .push(entry.into());
        self
    }

    /// Declares a volume mount path under `Config.Volumes`.
    #[must_use]
    pub fn volume(mut self, path: impl Into<String>) -> Self {
        self.config
            .volumes
            .get_or_insert_with(BTreeMap::new)
            .insert(path.into(), Value::Object(serde_json::Map::new()));
        self
    }

    /// Declares an exposed port key under `ContainerConfig.ExposedPorts`.
    #[must_use]
    pub fn exposed_port(mut self, key: impl Into<String>) -> Self {
        self.container_config
            .exposed_ports
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), Value::Object(serde_json::Map::new()));
        self
    }

    /// Sets the reported size in bytes.
    #[must_use]
    pub fn size(mut self, bytes: u64) -> Self {
        self.size = Some(bytes);
        self
    }

    /// Consumes the builder and returns the record.
    #[must_use]
    pub fn build(self) -> ContainerRecord {
        let section =
            |config: ContainerConfig| (config != ContainerConfig::default()).then_some(config);
        ContainerRecord {
            config: section(self.config),
            container_config: section(self.container_config),
            size: self.size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_record_reads_as_empty() {
        let record: ContainerRecord = serde_json::from_value(json!({})).unwrap();
        assert_eq!(record.label_keys().count(), 0);
        assert_eq!(record.env_entries().count(), 0);
        assert_eq!(record.volume_paths().count(), 0);
        assert_eq!(record.exposed_ports().count(), 0);
        assert_eq!(record.size_bytes(), 0);
    }

    #[test]
    fn null_sections_read_as_empty() {
        let record: ContainerRecord = serde_json::from_value(json!({
            "Config": { "Labels": null, "Env": null, "Volumes": null },
            "ContainerConfig": null,
            "Size": null
        }))
        .unwrap();
        assert_eq!(record.label_keys().count(), 0);
        assert_eq!(record.volume_paths().count(), 0);
        assert_eq!(record.exposed_ports().count(), 0);
        assert_eq!(record.size_bytes(), 0);
    }

    #[test]
    fn decodes_inspect_shape() {
        let record: ContainerRecord = serde_json::from_value(json!({
            "Id": "sha256:abc",
            "Config": {
                "Labels": { "maintainer": "ops", "build": 12345 },
                "Env": ["PATH=/usr/bin", "TOKEN=a=b", "BARE"],
                "Volumes": { "/data": {} }
            },
            "ContainerConfig": { "ExposedPorts": { "8080/tcp": {} } },
            "Size": 42
        }))
        .unwrap();

        let labels: Vec<_> = record.label_keys().collect();
        assert_eq!(labels, ["build", "maintainer"]);

        let env: Vec<_> = record.env_entries().collect();
        assert_eq!(env, [("PATH", "/usr/bin"), ("TOKEN", "a=b"), ("BARE", "")]);

        assert_eq!(record.volume_paths().collect::<Vec<_>>(), ["/data"]);
        assert_eq!(record.exposed_ports().collect::<Vec<_>>(), ["8080/tcp"]);
        assert_eq!(record.size_bytes(), 42);
    }

    #[test]
    fn builder_matches_decoded_record() {
        let built = ContainerRecord::builder()
            .label("tier", "web")
            .env("MODE=prod")
            .volume("/cache")
            .exposed_port("443/tcp")
            .size(7)
            .build();
        let decoded: ContainerRecord = serde_json::from_value(json!({
            "Config": {
                "Labels": { "tier": "web" },
                "Env": ["MODE=prod"],
                "Volumes": { "/cache": {} }
            },
            "ContainerConfig": { "ExposedPorts": { "443/tcp": {} } },
            "Size": 7
        }))
        .unwrap();
        assert_eq!(built, decoded);
        assert_eq!(ContainerRecord::builder().build(), ContainerRecord::default());
    }

    #[test]
    fn port_numbers_ignore_protocol() {
        assert_eq!(port_number("8080/tcp").unwrap(), 8080);
        assert_eq!(port_number("53/udp").unwrap(), 53);
        assert_eq!(port_number("9000").unwrap(), 9000);
        assert!(matches!(
            port_number("http/tcp"),
            Err(Error::InvalidPortKey { .. })
        ));
    }
}
