//! Typed policy documents.
//!
//! Every section is optional. A missing (or `null`) section decodes to its
//! default, and every default means "no restriction" for that dimension.

use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{PolicyError, PolicyResult};

const BYTES_PER_MEGABYTE: f64 = 1_000_000.0;

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Declarative set of constraints a container must satisfy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    #[serde(default, deserialize_with = "nullable")]
    labels: LabelRules,
    #[serde(default, deserialize_with = "nullable")]
    env_keys: EnvKeyRules,
    #[serde(default, deserialize_with = "nullable")]
    volumes: VolumeRules,
    #[serde(default, deserialize_with = "nullable")]
    ports: PortRules,
    #[serde(default, deserialize_with = "nullable")]
    size: SizeRules,
}

impl Policy {
    /// Returns a policy with no restrictions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the label section.
    #[must_use]
    pub fn labels(&self) -> &LabelRules {
        &self.labels
    }

    /// Returns the environment-key section.
    #[must_use]
    pub fn env_keys(&self) -> &EnvKeyRules {
        &self.env_keys
    }

    /// Returns the volume section.
    #[must_use]
    pub fn volumes(&self) -> &VolumeRules {
        &self.volumes
    }

    /// Returns the port section.
    #[must_use]
    pub fn ports(&self) -> &PortRules {
        &self.ports
    }

    /// Returns the size section.
    #[must_use]
    pub fn size(&self) -> &SizeRules {
        &self.size
    }

    /// Adds label keys that must not appear on the container.
    #[must_use]
    pub fn with_disallowed_labels<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels.disallow.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Adds environment-variable names that must not appear on the container.
    #[must_use]
    pub fn with_disallowed_env_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.env_keys.disallow.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Sets whether the container may declare volumes.
    #[must_use]
    pub fn with_volumes_disallowed(mut self, disallowed: bool) -> Self {
        self.volumes.disallowed = disallowed;
        self
    }

    /// Sets whether at least one exposed port is required.
    #[must_use]
    pub fn with_ports_required(mut self, required: bool) -> Self {
        self.ports.required = required;
        self
    }

    /// Restricts exposed ports to the supplied inclusive range.
    #[must_use]
    pub fn with_port_range(mut self, range: PortRange) -> Self {
        self.ports.range = Some(range);
        self
    }

    /// Sets the maximum allowed container size.
    #[must_use]
    pub fn with_size_max(mut self, max: Megabytes) -> Self {
        self.size.max = Some(max);
        self
    }

    /// Sets the size above which a warning is reported.
    #[must_use]
    pub fn with_size_warning(mut self, warning: Megabytes) -> Self {
        self.size.warning = Some(warning);
        self
    }
}

/// `labels` section. Defaults to an empty disallow set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRules {
    #[serde(default, deserialize_with = "nullable")]
    disallow: BTreeSet<String>,
}

impl LabelRules {
    /// Label keys that must not appear.
    #[must_use]
    pub fn disallow(&self) -> &BTreeSet<String> {
        &self.disallow
    }
}

/// `env_keys` section. Defaults to an empty disallow set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvKeyRules {
    #[serde(default, deserialize_with = "nullable")]
    disallow: BTreeSet<String>,
}

impl EnvKeyRules {
    /// Environment-variable names that must not appear.
    #[must_use]
    pub fn disallow(&self) -> &BTreeSet<String> {
        &self.disallow
    }
}

/// `volumes` section. Volumes are allowed by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeRules {
    #[serde(default, deserialize_with = "nullable")]
    disallowed: bool,
}

impl VolumeRules {
    /// Whether the container must declare zero volumes.
    #[must_use]
    pub fn disallowed(&self) -> bool {
        self.disallowed
    }
}

/// `ports` section. No port is required and any port number is allowed by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRules {
    #[serde(default, deserialize_with = "nullable")]
    required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    range: Option<PortRange>,
}

impl PortRules {
    /// Whether at least one exposed port is required.
    #[must_use]
    pub fn required(&self) -> bool {
        self.required
    }

    /// Inclusive range every exposed port must fall in, if any.
    #[must_use]
    pub fn range(&self) -> Option<PortRange> {
        self.range
    }
}

/// `size` section. No limits by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SizeRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max: Option<Megabytes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    warning: Option<Megabytes>,
}

impl SizeRules {
    /// Maximum allowed size.
    #[must_use]
    pub fn max(&self) -> Option<Megabytes> {
        self.max
    }

    /// Size above which a warning is reported.
    #[must_use]
    pub fn warning(&self) -> Option<Megabytes> {
        self.warning
    }
}

/// Inclusive `<low>-<high>` port range.
///
/// Bounds are kept as written: an inverted range (`low > high`) is valid and
/// simply contains no port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PortRange {
    low: u32,
    high: u32,
}

impl PortRange {
    /// Creates a range from inclusive bounds.
    #[must_use]
    pub const fn new(low: u32, high: u32) -> Self {
        Self { low, high }
    }

    /// Lower bound.
    #[must_use]
    pub const fn low(self) -> u32 {
        self.low
    }

    /// Upper bound.
    #[must_use]
    pub const fn high(self) -> u32 {
        self.high
    }

    /// Returns true when `low > high`.
    #[must_use]
    pub const fn is_inverted(self) -> bool {
        self.low > self.high
    }

    /// Returns true when `low <= port <= high`.
    #[must_use]
    pub const fn contains(self, port: u32) -> bool {
        self.low <= port && port <= self.high
    }
}

impl Display for PortRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}

impl FromStr for PortRange {
    type Err = PolicyError;

    fn from_str(s: &str) -> PolicyResult<Self> {
        let invalid = |reason: String| PolicyError::InvalidPortRange {
            range: s.into(),
            reason,
        };
        let (low, high) = s
            .split_once('-')
            .ok_or_else(|| invalid("expected `<low>-<high>`".into()))?;
        let low = low
            .trim()
            .parse::<u32>()
            .map_err(|err| invalid(format!("lower bound: {err}")))?;
        let high = high
            .trim()
            .parse::<u32>()
            .map_err(|err| invalid(format!("upper bound: {err}")))?;
        Ok(Self::new(low, high))
    }
}

impl TryFrom<String> for PortRange {
    type Error = PolicyError;

    fn try_from(value: String) -> PolicyResult<Self> {
        value.parse()
    }
}

impl From<PortRange> for String {
    fn from(value: PortRange) -> Self {
        value.to_string()
    }
}

/// Size limit in decimal megabytes (1 MB = 1,000,000 bytes).
///
/// Decodes from either a number or a numeric string, as policy documents use
/// both forms.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "RawMegabytes", into = "f64")]
pub struct Megabytes(f64);

impl Megabytes {
    /// Creates a size limit.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::InvalidSizeLimit`] for negative or non-finite values.
    pub fn new(value: f64) -> PolicyResult<Self> {
        if !value.is_finite() {
            return Err(PolicyError::InvalidSizeLimit {
                value: value.to_string(),
                reason: "limit must be a finite number",
            });
        }
        if value < 0.0 {
            return Err(PolicyError::InvalidSizeLimit {
                value: value.to_string(),
                reason: "limit cannot be negative",
            });
        }
        Ok(Self(value))
    }

    /// Returns the limit in megabytes.
    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }

    /// Returns the limit in bytes. Fractional megabytes are kept as-is.
    #[must_use]
    pub fn bytes(self) -> f64 {
        self.0 * BYTES_PER_MEGABYTE
    }

    /// Returns true when `size` bytes is strictly above the limit.
    ///
    /// A size equal to the limit does not exceed it.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn exceeded_by(self, size: u64) -> bool {
        size as f64 > self.bytes()
    }
}

impl From<u32> for Megabytes {
    fn from(value: u32) -> Self {
        Self(f64::from(value))
    }
}

impl From<Megabytes> for f64 {
    fn from(value: Megabytes) -> Self {
        value.0
    }
}

impl Display for Megabytes {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} MB", self.0)
    }
}

impl FromStr for Megabytes {
    type Err = PolicyError;

    fn from_str(s: &str) -> PolicyResult<Self> {
        let value = s
            .trim()
            .parse::<f64>()
            .map_err(|_| PolicyError::InvalidSizeLimit {
                value: s.into(),
                reason: "expected a decimal number of megabytes",
            })?;
        Self::new(value)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawMegabytes {
    Number(f64),
    Text(String),
}

impl TryFrom<RawMegabytes> for Megabytes {
    type Error = PolicyError;

    fn try_from(value: RawMegabytes) -> PolicyResult<Self> {
        match value {
            RawMegabytes::Number(value) => Self::new(value),
            RawMegabytes::Text(text) => text.parse(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_document_is_unrestricted() {
        let policy: Policy = serde_json::from_value(json!({})).unwrap();
        assert_eq!(policy, Policy::default());
        assert!(policy.labels().disallow().is_empty());
        assert!(!policy.volumes().disallowed());
        assert!(!policy.ports().required());
        assert!(policy.ports().range().is_none());
        assert!(policy.size().max().is_none());
    }

    #[test]
    fn null_sections_decode_to_defaults() {
        let policy: Policy = serde_json::from_value(json!({
            "labels": null,
            "env_keys": { "disallow": null },
            "volumes": { "disallowed": null },
            "ports": { "range": null },
            "size": null
        }))
        .unwrap();
        assert_eq!(policy, Policy::default());
    }

    #[test]
    fn decodes_full_document() {
        let policy: Policy = serde_json::from_value(json!({
            "labels": { "disallow": ["com.example.iam-profile"] },
            "env_keys": { "disallow": ["IAM_ROLE", "AWS_SECRET_ACCESS_KEY"] },
            "volumes": { "disallowed": true },
            "ports": { "required": true, "range": "1024-65535" },
            "size": { "max": "500", "warning": 250 }
        }))
        .unwrap();

        assert!(policy.labels().disallow().contains("com.example.iam-profile"));
        assert_eq!(policy.env_keys().disallow().len(), 2);
        assert!(policy.volumes().disallowed());
        assert!(policy.ports().required());
        assert_eq!(policy.ports().range(), Some(PortRange::new(1024, 65_535)));
        assert_eq!(policy.size().max().map(Megabytes::bytes), Some(500_000_000.0));
        assert_eq!(policy.size().warning().map(Megabytes::bytes), Some(250_000_000.0));
    }

    #[test]
    fn port_range_parsing() {
        assert_eq!("1-100".parse::<PortRange>().unwrap(), PortRange::new(1, 100));
        assert_eq!(" 80 - 443 ".parse::<PortRange>().unwrap(), PortRange::new(80, 443));

        let inverted = "8081-8080".parse::<PortRange>().unwrap();
        assert!(inverted.is_inverted());
        assert!(!inverted.contains(8080));
        assert!(!inverted.contains(8081));

        assert!("8080".parse::<PortRange>().is_err());
        assert!("a-b".parse::<PortRange>().is_err());
        assert!("-1-5".parse::<PortRange>().is_err());
    }

    #[test]
    fn port_range_bounds_are_inclusive() {
        let range = PortRange::new(1, 100);
        assert!(range.contains(1));
        assert!(range.contains(100));
        assert!(!range.contains(0));
        assert!(!range.contains(101));
    }

    #[test]
    fn malformed_range_fails_to_decode() {
        let result = serde_json::from_value::<Policy>(json!({ "ports": { "range": "low-high" } }));
        assert!(result.is_err());
    }

    #[test]
    fn megabytes_accept_numbers_and_strings() {
        assert_eq!("10".parse::<Megabytes>().unwrap().bytes(), 10_000_000.0);
        assert_eq!("1.5".parse::<Megabytes>().unwrap().bytes(), 1_500_000.0);
        assert_eq!(Megabytes::from(0).bytes(), 0.0);
        assert!(Megabytes::new(-1.0).is_err());
        assert!(Megabytes::new(f64::NAN).is_err());
        assert!("ten".parse::<Megabytes>().is_err());
    }

    #[test]
    fn limits_compare_without_rounding() {
        let max = Megabytes::from(10);
        assert!(!max.exceeded_by(10_000_000));
        assert!(max.exceeded_by(10_000_001));

        let fractional = "0.9999996".parse::<Megabytes>().unwrap();
        assert!(fractional.exceeded_by(1_000_000));
        assert!(!fractional.exceeded_by(999_999));
    }

    #[test]
    fn serializes_range_as_text() {
        let policy = Policy::new().with_port_range(PortRange::new(8000, 9000));
        let value = serde_json::to_value(&policy).unwrap();
        assert_eq!(value["ports"]["range"], json!("8000-9000"));
    }
}
