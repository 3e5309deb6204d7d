//! Run configuration.
//!
//! Consumed as a single options object. The core reads `labels`,
//! `excludes`, `ignore_focus` and `default_timeout`; the remaining fields
//! belong to discovery and reporting collaborators and are passed through.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{FrameworkError, Result};

/// Options for one scheduler run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Test unit identifiers to run (discovery concern).
    #[serde(default)]
    pub bundles: Vec<String>,

    /// Directory to discover units in (discovery concern).
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Reporter name (reporting concern).
    #[serde(default = "default_reporter")]
    pub reporter: String,

    /// Include labels. Empty means no include filter.
    #[serde(default)]
    pub labels: Vec<String>,

    /// Exclude labels. Wins over `labels` when both match.
    #[serde(default)]
    pub excludes: Vec<String>,

    /// Recurse into sub-directories (discovery concern).
    #[serde(default = "default_true")]
    pub recurse: bool,

    /// Run every spec as if nothing were focused.
    #[serde(default)]
    pub ignore_focus: bool,

    /// Timeout applied to specs with no own or inherited timeout.
    #[serde(default, with = "humantime_serde::option")]
    pub default_timeout: Option<Duration>,
}

fn default_reporter() -> String {
    "simple".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            bundles: Vec::new(),
            directory: None,
            reporter: default_reporter(),
            labels: Vec::new(),
            excludes: Vec::new(),
            recurse: default_true(),
            ignore_focus: false,
            default_timeout: None,
        }
    }
}

impl RunConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds include labels.
    #[must_use]
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels.extend(labels.into_iter().map(Into::into));
        self
    }

    /// Adds exclude labels.
    #[must_use]
    pub fn with_excludes<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excludes.extend(labels.into_iter().map(Into::into));
        self
    }

    /// Disables focus filtering.
    #[must_use]
    pub const fn ignoring_focus(mut self) -> Self {
        self.ignore_focus = true;
        self
    }

    /// Sets the default spec timeout.
    #[must_use]
    pub const fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }

    /// Include labels as a set.
    #[must_use]
    pub fn include_set(&self) -> BTreeSet<&str> {
        self.labels.iter().map(String::as_str).collect()
    }

    /// Exclude labels as a set.
    #[must_use]
    pub fn exclude_set(&self) -> BTreeSet<&str> {
        self.excludes.iter().map(String::as_str).collect()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns an error if a label is blank or the default timeout is zero.
    pub fn validate(&self) -> Result<()> {
        if let Some(label) = self
            .labels
            .iter()
            .chain(&self.excludes)
            .find(|l| l.trim().is_empty())
        {
            return Err(FrameworkError::config(format!(
                "labels cannot be blank (got {label:?})"
            )));
        }
        if self.default_timeout == Some(Duration::ZERO) {
            return Err(FrameworkError::config(
                "default_timeout must be greater than 0",
            ));
        }
        Ok(())
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| FrameworkError::config(format!("failed to read config: {e}")))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    /// Returns an error if the text cannot be parsed or validated.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| FrameworkError::config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}

/// Serde helpers for humantime durations.
pub(crate) mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    /// Serializes a duration as a human-readable string.
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    /// Deserializes a duration from a human-readable string.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }

    /// Optional durations.
    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};
        use std::time::Duration;

        #[allow(clippy::ref_option)]
        pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match duration {
                Some(d) => super::serialize(d, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Option::<String>::deserialize(deserializer)?
                .map(|s| humantime::parse_duration(&s).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}
