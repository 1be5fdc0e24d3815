//! Configurable properties of the library.
//!
//! A small set of named properties controls the default DDMS version and
//! the namespace prefixes used when building components. Properties can be
//! changed programmatically with [`Properties::set`] or loaded from a TOML
//! file. Unknown property names and malformed values fail fast with
//! [`Error::Config`].
//!
//! A process-wide copy backs components that are built without an explicit
//! property handle. It is shared global state: embedding applications that
//! run independent sessions (separate tests, separate requests) must call
//! [`Properties::reset_global`] between them.

use crate::error::{Error, Result};
use crate::version::{DdmsVersion, Vocabulary};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{OnceLock, RwLock};
use tracing::debug;

/// Property name for the default DDMS version.
pub const DEFAULT_VERSION_PROPERTY: &str = "ddms.defaultVersion";

/// Property names for the namespace prefixes, by vocabulary.
const PREFIX_PROPERTIES: [(&str, Vocabulary); 4] = [
    ("ddms.prefix", Vocabulary::Ddms),
    ("gml.prefix", Vocabulary::Gml),
    ("ism.prefix", Vocabulary::Ism),
    ("xlink.prefix", Vocabulary::Xlink),
];

/// Namespace prefixes used when building elements and attributes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Prefixes {
    /// Prefix for the core DDMS vocabulary
    pub ddms: String,
    /// Prefix for GML
    pub gml: String,
    /// Prefix for the security marking vocabulary
    pub ism: String,
    /// Prefix for XLink
    pub xlink: String,
}

impl Default for Prefixes {
    fn default() -> Self {
        Self {
            ddms: Vocabulary::Ddms.default_prefix().to_string(),
            gml: Vocabulary::Gml.default_prefix().to_string(),
            ism: Vocabulary::Ism.default_prefix().to_string(),
            xlink: Vocabulary::Xlink.default_prefix().to_string(),
        }
    }
}

/// The full property set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Properties {
    /// Version used when no explicit version is given
    #[serde(rename = "default-version")]
    pub default_version: String,
    /// Namespace prefixes per vocabulary
    pub prefixes: Prefixes,
}

impl Default for Properties {
    fn default() -> Self {
        Self {
            default_version: "4.0.1".to_string(),
            prefixes: Prefixes::default(),
        }
    }
}

impl Properties {
    /// Parses properties from a TOML string and validates them.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let properties: Properties =
            toml::from_str(raw).map_err(|e| Error::Config(e.to_string()))?;
        properties.validate()?;
        Ok(properties)
    }

    /// Loads properties from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let properties = Self::from_toml_str(&raw)?;
        debug!(path = %path.as_ref().display(), "loaded DDMS properties");
        Ok(properties)
    }

    /// Checks the property values for consistency.
    pub fn validate(&self) -> Result<()> {
        if DdmsVersion::get(&self.default_version).is_err() {
            return Err(Error::Config(format!(
                "default version {} is not a supported DDMS version",
                self.default_version
            )));
        }
        for (name, vocabulary) in PREFIX_PROPERTIES {
            if self.prefix(vocabulary).is_empty() {
                return Err(Error::Config(format!("property {} must not be empty", name)));
            }
        }
        Ok(())
    }

    /// Sets a property by name, failing fast on unknown names or bad values.
    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        match name {
            DEFAULT_VERSION_PROPERTY => {
                DdmsVersion::get(value)
                    .map_err(|_| Error::Config(format!("{} is not a supported DDMS version", value)))?;
                self.default_version = value.to_string();
            }
            "ddms.prefix" | "gml.prefix" | "ism.prefix" | "xlink.prefix" => {
                if value.is_empty() {
                    return Err(Error::Config(format!("property {} must not be empty", name)));
                }
                let slot = match name {
                    "ddms.prefix" => &mut self.prefixes.ddms,
                    "gml.prefix" => &mut self.prefixes.gml,
                    "ism.prefix" => &mut self.prefixes.ism,
                    _ => &mut self.prefixes.xlink,
                };
                *slot = value.to_string();
            }
            unknown => {
                return Err(Error::Config(format!("unknown property: {}", unknown)));
            }
        }
        Ok(())
    }

    /// Gets a property value by name.
    pub fn get(&self, name: &str) -> Result<String> {
        match name {
            DEFAULT_VERSION_PROPERTY => Ok(self.default_version.clone()),
            "ddms.prefix" => Ok(self.prefixes.ddms.clone()),
            "gml.prefix" => Ok(self.prefixes.gml.clone()),
            "ism.prefix" => Ok(self.prefixes.ism.clone()),
            "xlink.prefix" => Ok(self.prefixes.xlink.clone()),
            unknown => Err(Error::Config(format!("unknown property: {}", unknown))),
        }
    }

    /// Accessor for the prefix of a vocabulary.
    pub fn prefix(&self, vocabulary: Vocabulary) -> &str {
        match vocabulary {
            Vocabulary::Ddms => &self.prefixes.ddms,
            Vocabulary::Gml => &self.prefixes.gml,
            Vocabulary::Ism => &self.prefixes.ism,
            Vocabulary::Xlink => &self.prefixes.xlink,
        }
    }

    /// Accessor for the default version.
    pub fn default_version(&self) -> &'static DdmsVersion {
        // validate() guarantees the token is supported.
        DdmsVersion::get(&self.default_version)
            .unwrap_or_else(|_| &DdmsVersion::supported()[DdmsVersion::supported().len() - 1])
    }

    fn store() -> &'static RwLock<Properties> {
        static GLOBAL: OnceLock<RwLock<Properties>> = OnceLock::new();
        GLOBAL.get_or_init(|| RwLock::new(Properties::default()))
    }

    /// Returns a snapshot of the process-wide properties.
    pub fn global() -> Properties {
        Self::store().read().expect("properties lock poisoned").clone()
    }

    /// Replaces the process-wide properties after validating them.
    pub fn set_global(properties: Properties) -> Result<()> {
        properties.validate()?;
        *Self::store().write().expect("properties lock poisoned") = properties;
        Ok(())
    }

    /// Sets a single process-wide property by name.
    pub fn set_global_property(name: &str, value: &str) -> Result<()> {
        let mut guard = Self::store().write().expect("properties lock poisoned");
        guard.set(name, value)
    }

    /// Restores the process-wide properties to the shipped defaults.
    ///
    /// Call between independent sessions to avoid cross-talk.
    pub fn reset_global() {
        *Self::store().write().expect("properties lock poisoned") = Properties::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let properties = Properties::default();
        assert_eq!(properties.default_version, "4.0.1");
        assert_eq!(properties.prefix(Vocabulary::Ddms), "ddms");
        assert_eq!(properties.prefix(Vocabulary::Ism), "ism");
        properties.validate().unwrap();
    }

    #[test]
    fn test_set_known_properties() {
        let mut properties = Properties::default();
        properties.set(DEFAULT_VERSION_PROPERTY, "2.0").unwrap();
        assert_eq!(properties.default_version().version(), "2.0");
        properties.set("ism.prefix", "icism").unwrap();
        assert_eq!(properties.prefix(Vocabulary::Ism), "icism");
    }

    #[test]
    fn test_unknown_property_fails() {
        let mut properties = Properties::default();
        let err = properties.set("ddms.unknownProperty", "x").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(properties.get("ddms.unknownProperty").is_err());
    }

    #[test]
    fn test_bad_default_version_fails() {
        let mut properties = Properties::default();
        let err = properties.set(DEFAULT_VERSION_PROPERTY, "1.4.1").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_from_toml() {
        let properties = Properties::from_toml_str(
            r#"
default-version = "3.1"

[prefixes]
ism = "icism"
"#,
        )
        .unwrap();
        assert_eq!(properties.default_version, "3.1");
        assert_eq!(properties.prefix(Vocabulary::Ism), "icism");
        assert_eq!(properties.prefix(Vocabulary::Ddms), "ddms");
    }

    #[test]
    fn test_from_toml_rejects_bad_version() {
        let err = Properties::from_toml_str(r#"default-version = "9.9""#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_global_set_and_reset() {
        use crate::components::{Component, ComponentBuilder, IdentifierBuilder};

        // Only touches default-version, which no other test reads globally.
        Properties::set_global_property(DEFAULT_VERSION_PROPERTY, "3.1").unwrap();
        assert_eq!(Properties::global().default_version().version(), "3.1");

        let mut builder = IdentifierBuilder::default();
        builder.qualifier = "http://purl.org/dc/terms/URI".into();
        builder.value = "DDMS-Test".into();
        let identifier = builder.commit_default().unwrap().unwrap();
        assert_eq!(identifier.version().version(), "3.1");

        Properties::reset_global();
        assert_eq!(Properties::global().default_version().version(), "4.0.1");
        let identifier = builder.commit_default().unwrap().unwrap();
        assert_eq!(identifier.version().version(), "4.0.1");

        assert!(Properties::set_global_property("ddms.unknownProperty", "x").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "default-version = \"3.0.1\"").unwrap();
        let properties = Properties::load(file.path()).unwrap();
        assert_eq!(properties.default_version, "3.0.1");
    }
}
