//! Read and write settings.
//!
//! [`ReadPolicy`] decides how a file's key set is reconciled against the
//! schema; [`IoOptions`] bundles it with the write-side switches.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How extra and missing keys are treated on read.
///
/// Optional properties may be missing under either policy. Syntax errors,
/// identity mismatches, duplicate keys, malformed values and validator
/// failures are fatal under both.
///
/// # Examples
///
/// ```
/// use typecfg::ReadPolicy;
///
/// let policy: ReadPolicy = "strict".parse().unwrap();
/// assert_eq!(policy, ReadPolicy::Strict);
/// assert_eq!(ReadPolicy::default(), ReadPolicy::Tolerant);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadPolicy {
    /// The file's keys must equal the schema's keys.
    Strict,
    /// Extra keys are ignored; missing keys keep their in-memory value.
    #[default]
    Tolerant,
}

impl fmt::Display for ReadPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Tolerant => write!(f, "tolerant"),
        }
    }
}

impl FromStr for ReadPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "tolerant" => Ok(Self::Tolerant),
            _ => Err(format!("invalid read policy: {s}")),
        }
    }
}

/// Options for file reads and writes.
///
/// # Examples
///
/// ```
/// use typecfg::{IoOptions, ReadPolicy};
///
/// let options = IoOptions::default()
///     .with_policy(ReadPolicy::Strict)
///     .with_pretty(false);
/// assert!(options.atomic_write);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoOptions {
    /// Reconciliation policy for reads.
    pub policy: ReadPolicy,
    /// Write through a temporary file renamed over the target.
    pub atomic_write: bool,
    /// Indent JSON and XML output.
    pub pretty: bool,
}

impl Default for IoOptions {
    fn default() -> Self {
        Self {
            policy: ReadPolicy::Tolerant,
            atomic_write: true,
            pretty: true,
        }
    }
}

impl IoOptions {
    /// Options using the strict policy.
    #[must_use]
    pub fn strict() -> Self {
        Self::default().with_policy(ReadPolicy::Strict)
    }

    /// Sets the read policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: ReadPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Enables or disables atomic writes.
    #[must_use]
    pub const fn with_atomic_write(mut self, atomic_write: bool) -> Self {
        self.atomic_write = atomic_write;
        self
    }

    /// Enables or disables indented output.
    #[must_use]
    pub const fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_parse() {
        assert_eq!("STRICT".parse::<ReadPolicy>().unwrap(), ReadPolicy::Strict);
        assert_eq!(
            "tolerant".parse::<ReadPolicy>().unwrap(),
            ReadPolicy::Tolerant
        );
        assert!("lenient".parse::<ReadPolicy>().is_err());
    }

    #[test]
    fn test_policy_display_round_trips() {
        for policy in [ReadPolicy::Strict, ReadPolicy::Tolerant] {
            assert_eq!(policy.to_string().parse::<ReadPolicy>().unwrap(), policy);
        }
    }

    #[test]
    fn test_policy_serde_lowercase() {
        let json = serde_json::to_string(&ReadPolicy::Strict).unwrap();
        assert_eq!(json, "\"strict\"");
        let yaml: ReadPolicy = serde_yaml::from_str("tolerant").unwrap();
        assert_eq!(yaml, ReadPolicy::Tolerant);
    }

    #[test]
    fn test_io_options_defaults() {
        let options = IoOptions::default();
        assert_eq!(options.policy, ReadPolicy::Tolerant);
        assert!(options.atomic_write);
        assert!(options.pretty);
        assert_eq!(IoOptions::strict().policy, ReadPolicy::Strict);
    }

    #[test]
    fn test_io_options_deserialize() {
        let options: IoOptions =
            serde_json::from_str(r#"{"policy":"strict","atomic_write":false,"pretty":true}"#)
                .unwrap();
        assert_eq!(options.policy, ReadPolicy::Strict);
        assert!(!options.atomic_write);
    }
}
