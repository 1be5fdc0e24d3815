//! XSD validation for DDMS documents.
//!
//! This module checks a document against the official DDMS XML Schema for
//! a given version. It complements, but never replaces, the rule-based
//! validation that runs during component construction.
//!
//! # Requirements
//!
//! This module requires the `validation` feature to be enabled and depends
//! on libxml2 being installed on the system.
//!
//! ## Installing libxml2
//!
//! **Ubuntu/Debian:**
//! ```bash
//! sudo apt-get install libxml2-dev
//! ```
//!
//! **macOS:**
//! ```bash
//! brew install libxml2
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use ddms_rs::validation::validate_str;
//! use ddms_rs::DdmsVersion;
//!
//! let version = DdmsVersion::get("4.0.1")?;
//! validate_str(&resource_xml, version, None)?;
//! ```

use std::path::{Path, PathBuf};

use libxml::parser::Parser;
use libxml::schemas::{SchemaParserContext, SchemaValidationContext};

use crate::error::{Error, Result};
use crate::version::DdmsVersion;

/// Default directory holding the DDMS schema files (relative to the crate
/// root). Version-specific locations are resolved beneath it.
pub const DEFAULT_SCHEMA_ROOT: &str = "external/ddms_schemas";

fn schema_location(version: &'static DdmsVersion, schema_root: Option<&str>) -> PathBuf {
    let root = schema_root.unwrap_or(DEFAULT_SCHEMA_ROOT);
    let relative = version.schema().trim_start_matches('/');
    Path::new(root).join(relative)
}

/// Validates a DDMS file against the XML Schema for the given version.
///
/// `schema_root` overrides the directory the version-specific schema is
/// resolved from; `None` uses [`DEFAULT_SCHEMA_ROOT`].
///
/// Returns `Ok(())` if the document is schema-valid, or an `Error`
/// describing the failure.
pub fn validate_file<P: AsRef<Path>>(
    xml_path: P,
    version: &'static DdmsVersion,
    schema_root: Option<&str>,
) -> Result<()> {
    let xml_path = xml_path.as_ref();
    if !xml_path.exists() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("XML file not found: {}", xml_path.display()),
        )));
    }

    let mut validation_context = build_context(version, schema_root)?;

    let parser = Parser::default();
    let doc = parser
        .parse_file(xml_path.to_string_lossy().as_ref())
        .map_err(|e| Error::Schema(format!("Failed to parse XML document: {:?}", e)))?;

    validation_context
        .validate_document(&doc)
        .map_err(|e| Error::Schema(format!("Validation failed: {:?}", e)))?;

    Ok(())
}

/// Validates a DDMS string against the XML Schema for the given version.
///
/// Returns `Ok(())` if the document is schema-valid, or an `Error`
/// describing the failure.
pub fn validate_str(
    xml: &str,
    version: &'static DdmsVersion,
    schema_root: Option<&str>,
) -> Result<()> {
    let mut validation_context = build_context(version, schema_root)?;

    let parser = Parser::default();
    let doc = parser
        .parse_string(xml)
        .map_err(|e| Error::Schema(format!("Failed to parse XML string: {:?}", e)))?;

    validation_context
        .validate_document(&doc)
        .map_err(|e| Error::Schema(format!("Validation failed: {:?}", e)))?;

    Ok(())
}

fn build_context(
    version: &'static DdmsVersion,
    schema_root: Option<&str>,
) -> Result<SchemaValidationContext> {
    let schema_path = schema_location(version, schema_root);
    if !schema_path.exists() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!(
                "Schema file not found: {}. Ensure the DDMS schemas are available.",
                schema_path.display()
            ),
        )));
    }

    let mut schema_parser = SchemaParserContext::from_file(&schema_path.to_string_lossy());
    SchemaValidationContext::from_parser(&mut schema_parser).map_err(|errors| {
        let msg = errors
            .iter()
            .map(|e| e.message.clone().unwrap_or_default())
            .collect::<Vec<_>>()
            .join("; ");
        Error::Schema(format!("Failed to parse schema: {}", msg))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // Note: positive-path tests require the DDMS schema files and libxml2.
    // They are ignored by default.

    #[test]
    fn test_schema_location_per_version() {
        let version = DdmsVersion::get("4.0.1").unwrap();
        let path = schema_location(version, None);
        assert_eq!(
            path,
            Path::new("external/ddms_schemas/schemas/4.0.1/DDMS-v4_0_1.xsd")
        );

        let overridden = schema_location(version, Some("/opt/ddms"));
        assert_eq!(overridden, Path::new("/opt/ddms/schemas/4.0.1/DDMS-v4_0_1.xsd"));
    }

    #[test]
    fn test_validate_missing_schema() {
        let version = DdmsVersion::get("4.0.1").unwrap();
        let result = validate_str("<ddms:title/>", version, Some("/nonexistent"));

        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Schema file not found"));
    }

    #[test]
    fn test_validate_missing_xml_file() {
        let version = DdmsVersion::get("3.1").unwrap();
        let result = validate_file("/nonexistent/file.xml", version, Some("/nonexistent"));

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("XML file not found"));
    }

    #[test]
    #[ignore = "requires DDMS schema files and libxml2"]
    fn test_validate_str_valid() {
        use crate::components::{Component, Identifier};

        let version = DdmsVersion::get("4.0.1").unwrap();
        let identifier =
            Identifier::new(version, "http://purl.org/dc/terms/URI", "DDMS-Test").unwrap();
        let result = validate_str(&identifier.to_xml(), version, None);
        assert!(result.is_ok(), "Validation failed: {:?}", result.err());
    }
}
