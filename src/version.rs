//! Supported DDMS specification versions.
//!
//! Each supported version carries the namespace URIs and schema location
//! that components need when building or validating themselves. Raw-value
//! component constructors take an explicit `&'static DdmsVersion`; from-XML
//! constructors derive the version from the element's namespace with
//! [`DdmsVersion::for_namespace`].

use crate::error::{Error, Result};
use std::fmt;

/// The XML vocabularies that make up a DDMS document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vocabulary {
    /// The core DDMS vocabulary
    Ddms,
    /// Geography Markup Language
    Gml,
    /// Information Security Marking
    Ism,
    /// XML Linking Language
    Xlink,
}

impl Vocabulary {
    /// Returns the conventional namespace prefix for this vocabulary.
    ///
    /// The prefix can be overridden through the property layer; see
    /// [`Properties`](crate::config::Properties).
    pub fn default_prefix(&self) -> &'static str {
        match self {
            Vocabulary::Ddms => "ddms",
            Vocabulary::Gml => "gml",
            Vocabulary::Ism => "ism",
            Vocabulary::Xlink => "xlink",
        }
    }
}

/// One supported version of DDMS.
///
/// Instances are static; use [`DdmsVersion::get`] or
/// [`DdmsVersion::for_namespace`] to obtain one.
#[derive(Debug, PartialEq, Eq)]
pub struct DdmsVersion {
    version: &'static str,
    index: usize,
    ddms_namespace: &'static str,
    gml_namespace: &'static str,
    ism_namespace: &'static str,
    xlink_namespace: &'static str,
    schema: &'static str,
}

/// The supported versions, in release order.
static SUPPORTED: [DdmsVersion; 5] = [
    DdmsVersion {
        version: "2.0",
        index: 0,
        ddms_namespace: "http://metadata.dod.mil/mdr/ns/DDMS/2.0/",
        gml_namespace: "http://www.opengis.net/gml",
        ism_namespace: "urn:us:gov:ic:ism:v2",
        xlink_namespace: "http://www.w3.org/1999/xlink",
        schema: "/schemas/2.0/DDMS-v2_0.xsd",
    },
    DdmsVersion {
        version: "3.0",
        index: 1,
        ddms_namespace: "http://metadata.dod.mil/mdr/ns/DDMS/3.0/",
        gml_namespace: "http://www.opengis.net/gml/3.2",
        ism_namespace: "urn:us:gov:ic:ism",
        xlink_namespace: "http://www.w3.org/1999/xlink",
        schema: "/schemas/3.0/DDMS-v3_0.xsd",
    },
    DdmsVersion {
        version: "3.0.1",
        index: 2,
        ddms_namespace: "http://metadata.dod.mil/mdr/ns/DDMS/3.0/",
        gml_namespace: "http://www.opengis.net/gml/3.2",
        ism_namespace: "urn:us:gov:ic:ism",
        xlink_namespace: "http://www.w3.org/1999/xlink",
        schema: "/schemas/3.0.1/DDMS-v3_0_1.xsd",
    },
    DdmsVersion {
        version: "3.1",
        index: 3,
        ddms_namespace: "http://metadata.dod.mil/mdr/ns/DDMS/3.1/",
        gml_namespace: "http://www.opengis.net/gml/3.2",
        ism_namespace: "urn:us:gov:ic:ism",
        xlink_namespace: "http://www.w3.org/1999/xlink",
        schema: "/schemas/3.1/DDMS-v3_1.xsd",
    },
    DdmsVersion {
        version: "4.0.1",
        index: 4,
        ddms_namespace: "urn:us:mil:ces:metadata:ddms:4",
        gml_namespace: "http://www.opengis.net/gml/3.2",
        ism_namespace: "urn:us:gov:ic:ism",
        xlink_namespace: "http://www.w3.org/1999/xlink",
        schema: "/schemas/4.0.1/DDMS-v4_0_1.xsd",
    },
];

impl DdmsVersion {
    /// Returns the supported versions in release order.
    pub fn supported() -> &'static [DdmsVersion] {
        &SUPPORTED
    }

    /// Returns the version instance for a version token.
    ///
    /// Fails with [`Error::UnsupportedVersion`] for tokens outside the
    /// supported list.
    pub fn get(version: &str) -> Result<&'static DdmsVersion> {
        SUPPORTED
            .iter()
            .find(|v| v.version == version)
            .ok_or_else(|| Error::UnsupportedVersion(version.to_string()))
    }

    /// Returns the most recent version whose DDMS namespace matches the
    /// given URI, or `None` if the URI is not a supported DDMS namespace.
    ///
    /// DDMS 3.0 and 3.0.1 share a namespace, so the 3.0 namespace resolves
    /// to 3.0.1.
    pub fn for_namespace(namespace: &str) -> Option<&'static DdmsVersion> {
        SUPPORTED.iter().rev().find(|v| v.ddms_namespace == namespace)
    }

    /// Returns the most recent version whose ISM namespace matches the
    /// given URI.
    pub fn for_ism_namespace(namespace: &str) -> Option<&'static DdmsVersion> {
        SUPPORTED.iter().rev().find(|v| v.ism_namespace == namespace)
    }

    /// True if this version is the same as or later than the given one.
    ///
    /// Unknown threshold tokens compare as false; thresholds used inside
    /// the library are always supported tokens.
    pub fn is_at_least(&self, version: &str) -> bool {
        DdmsVersion::get(version)
            .map(|threshold| self.index >= threshold.index)
            .unwrap_or(false)
    }

    /// True if this version predates the given one.
    pub fn is_before(&self, version: &str) -> bool {
        !self.is_at_least(version)
    }

    /// Accessor for the version token.
    pub fn version(&self) -> &'static str {
        self.version
    }

    /// Accessor for the namespace URI of a vocabulary under this version.
    pub fn namespace(&self, vocabulary: Vocabulary) -> &'static str {
        match vocabulary {
            Vocabulary::Ddms => self.ddms_namespace,
            Vocabulary::Gml => self.gml_namespace,
            Vocabulary::Ism => self.ism_namespace,
            Vocabulary::Xlink => self.xlink_namespace,
        }
    }

    /// Accessor for the XSD schema location of this version.
    pub fn schema(&self) -> &'static str {
        self.schema
    }
}

impl fmt::Display for DdmsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_supported() {
        let v = DdmsVersion::get("3.1").unwrap();
        assert_eq!(v.version(), "3.1");
        assert_eq!(
            v.namespace(Vocabulary::Ddms),
            "http://metadata.dod.mil/mdr/ns/DDMS/3.1/"
        );
    }

    #[test]
    fn test_get_unsupported() {
        let err = DdmsVersion::get("1.4.1").unwrap_err();
        assert!(matches!(err, crate::error::Error::UnsupportedVersion(_)));
    }

    #[test]
    fn test_ordering() {
        let v2 = DdmsVersion::get("2.0").unwrap();
        let v401 = DdmsVersion::get("4.0.1").unwrap();
        assert!(v401.is_at_least("2.0"));
        assert!(v401.is_at_least("4.0.1"));
        assert!(v2.is_before("3.0"));
        assert!(!v2.is_at_least("3.0.1"));
    }

    #[test]
    fn test_for_namespace_prefers_most_recent() {
        // 3.0 and 3.0.1 share a namespace; the most recent wins.
        let v = DdmsVersion::for_namespace("http://metadata.dod.mil/mdr/ns/DDMS/3.0/").unwrap();
        assert_eq!(v.version(), "3.0.1");
        assert!(DdmsVersion::for_namespace("http://example.com/other").is_none());
    }

    #[test]
    fn test_supported_is_release_ordered() {
        let tokens: Vec<_> = DdmsVersion::supported().iter().map(|v| v.version()).collect();
        assert_eq!(tokens, vec!["2.0", "3.0", "3.0.1", "3.1", "4.0.1"]);
    }
}
