//! Document loaders.

use std::fs;
use std::path::Path;

use gate_policy::Policy;
use gate_primitives::ContainerRecord;
use serde_json::Value;
use tracing::debug;

use crate::{ConfigError, ConfigResult};

/// Encoding of a policy document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// JSON text.
    Json,
    /// YAML text.
    Yaml,
}

impl Format {
    /// Infers the format from a file extension: `.yaml`/`.yml` are YAML,
    /// everything else is JSON.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Json,
        }
    }
}

/// Decodes a policy document.
///
/// Blank input yields the unrestricted policy.
///
/// # Errors
///
/// Returns [`ConfigError::Json`] or [`ConfigError::Yaml`] when the text is not
/// a valid policy document, including malformed port ranges and size limits.
pub fn parse_policy(text: &str, format: Format) -> ConfigResult<Policy> {
    if text.trim().is_empty() {
        return Ok(Policy::default());
    }

    let policy = match format {
        Format::Json => serde_json::from_str(text)?,
        Format::Yaml => serde_yaml::from_str(text)?,
    };
    Ok(policy)
}

/// Reads and decodes a policy document, choosing the format from the extension.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] when the file cannot be read, otherwise the
/// errors of [`parse_policy`].
pub fn load_policy(path: impl AsRef<Path>) -> ConfigResult<Policy> {
    let path = path.as_ref();
    let format = Format::from_path(path);
    debug!(path = %path.display(), ?format, "loading policy document");
    parse_policy(&read(path)?, format)
}

/// Decodes `inspect` JSON output.
///
/// Accepts a single record or an array of records, as printed by
/// `docker inspect`; for arrays the first record is used.
///
/// # Errors
///
/// Returns [`ConfigError::Json`] for invalid JSON and
/// [`ConfigError::EmptyInspect`] for an empty array.
pub fn parse_container(text: &str) -> ConfigResult<ContainerRecord> {
    let value = match serde_json::from_str::<Value>(text)? {
        Value::Array(records) => records
            .into_iter()
            .next()
            .ok_or(ConfigError::EmptyInspect)?,
        record => record,
    };
    Ok(serde_json::from_value(value)?)
}

/// Reads and decodes `inspect` JSON output from a file.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] when the file cannot be read, otherwise the
/// errors of [`parse_container`].
pub fn load_container(path: impl AsRef<Path>) -> ConfigResult<ContainerRecord> {
    let path = path.as_ref();
    debug!(path = %path.display(), "loading container record");
    parse_container(&read(path)?)
}

fn read(path: &Path) -> ConfigResult<String> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gate_policy::{Megabytes, PortRange};

    const YAML_POLICY: &str = r"
labels:
  disallow:
    - com.example.iam-profile
env_keys:
  disallow: [IAM_ROLE]
volumes:
  disallowed: true
ports:
  required: true
  range: 1024-65535
size:
  max: '500'
  warning: 250
";

    #[test]
    fn format_follows_extension() {
        assert_eq!(Format::from_path(Path::new("policy.yaml")), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("policy.YML")), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("policy.json")), Format::Json);
        assert_eq!(Format::from_path(Path::new("policy")), Format::Json);
    }

    #[test]
    fn parses_yaml_policy() {
        let policy = parse_policy(YAML_POLICY, Format::Yaml).unwrap();
        assert!(policy.labels().disallow().contains("com.example.iam-profile"));
        assert!(policy.env_keys().disallow().contains("IAM_ROLE"));
        assert!(policy.volumes().disallowed());
        assert!(policy.ports().required());
        assert_eq!(policy.ports().range(), Some(PortRange::new(1024, 65_535)));
        assert_eq!(policy.size().max(), Some(Megabytes::from(500)));
        assert_eq!(policy.size().warning(), Some(Megabytes::from(250)));
    }

    #[test]
    fn blank_policy_is_unrestricted() {
        assert_eq!(parse_policy("", Format::Yaml).unwrap(), Policy::default());
        assert_eq!(parse_policy("  \n", Format::Json).unwrap(), Policy::default());
        assert_eq!(parse_policy("{}", Format::Json).unwrap(), Policy::default());
    }

    #[test]
    fn rejects_malformed_limits() {
        let err = parse_policy(r#"{"ports":{"range":"80"}}"#, Format::Json).unwrap_err();
        assert!(matches!(err, ConfigError::Json { .. }));

        let err = parse_policy("size:\n  max: lots\n", Format::Yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn parses_inspect_array_and_object() {
        let array = r#"[{"Config":{"Labels":{"a":"1"}},"Size":5},{"Size":9}]"#;
        let record = parse_container(array).unwrap();
        assert_eq!(record.size_bytes(), 5);
        assert_eq!(record.label_keys().collect::<Vec<_>>(), ["a"]);

        let record = parse_container(r#"{"Size":9}"#).unwrap();
        assert_eq!(record.size_bytes(), 9);
    }

    #[test]
    fn empty_inspect_array_is_an_error() {
        assert!(matches!(parse_container("[]"), Err(ConfigError::EmptyInspect)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_policy("/nonexistent/policy.yaml").unwrap_err();
        match err {
            ConfigError::Io { path, .. } => assert!(path.ends_with("policy.yaml")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
