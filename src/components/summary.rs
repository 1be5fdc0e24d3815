//! Summary-set elements. Currently the ddms:description element.

use tracing::debug;

use crate::components::security::{SecurityAttributes, SecurityAttributesBuilder};
use crate::components::{
    combine_hash, hash_seed, is_empty, require_qname, Component, ComponentBuilder, OutputKind,
    SimpleText,
};
use crate::config;
use crate::error::{Error, Result};
use crate::message::ValidationMessage;
use crate::version::{DdmsVersion, Vocabulary};
use crate::xml::XmlElement;

/// A ddms:description element: a prose abstract of the described resource.
///
/// Security attributes joined this element in DDMS 3.0. Before that,
/// supplying any is a version-range error; from 3.0 on, classification and
/// ownerProducer are mandatory.
#[derive(Debug, Clone)]
pub struct Description {
    version: &'static DdmsVersion,
    simple: SimpleText,
    element: XmlElement,
    warnings: Vec<ValidationMessage>,
}

impl Description {
    /// Local element name.
    pub const NAME: &'static str = "description";

    /// Constructs the element from raw values.
    pub fn new(
        version: &'static DdmsVersion,
        text: &str,
        security: SecurityAttributes,
    ) -> Result<Self> {
        let simple = SimpleText::new(text, security);
        let properties = config::Properties::global();
        let mut element = XmlElement::new(
            properties.prefix(Vocabulary::Ddms),
            Self::NAME,
            version.namespace(Vocabulary::Ddms),
        );
        simple.apply_to(&mut element, version);
        Self::validated(version, simple, element)
    }

    /// Constructs the element from parsed XML.
    pub fn from_element(version: &'static DdmsVersion, element: XmlElement) -> Result<Self> {
        require_qname(&element, Self::NAME, version.namespace(Vocabulary::Ddms))
            .map_err(|e| e.at(&element.qualified_name()))?;
        let simple = SimpleText::from_element(version, &element)
            .map_err(|e| e.at(&element.qualified_name()))?;
        Self::validated(version, simple, element)
    }

    fn validated(
        version: &'static DdmsVersion,
        simple: SimpleText,
        element: XmlElement,
    ) -> Result<Self> {
        let locator = element.qualified_name();
        Self::validate(version, &simple).map_err(|e| e.at(&locator))?;

        let mut warnings = Vec::new();
        if is_empty(simple.text()) {
            warnings.push(ValidationMessage::warning(
                "A ddms:description element was found with no description value.",
                &locator,
            ));
        }
        debug!(element = %locator, warnings = warnings.len(), "validated component");
        Ok(Self {
            version,
            simple,
            element,
            warnings,
        })
    }

    fn validate(version: &'static DdmsVersion, simple: &SimpleText) -> Result<()> {
        if version.is_before("3.0") {
            if !simple.security().is_empty() {
                return Err(Error::invalid(
                    "Security attributes cannot be applied to this component until DDMS 3.0 or later.",
                ));
            }
        } else {
            simple.security().require_classification()?;
        }
        Ok(())
    }

    /// Accessor for the description text.
    pub fn text(&self) -> &str {
        self.simple.text()
    }

    /// Accessor for the security attributes.
    pub fn security_attributes(&self) -> &SecurityAttributes {
        self.simple.security()
    }
}

impl Component for Description {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn version(&self) -> &'static DdmsVersion {
        self.version
    }

    fn validation_warnings(&self) -> &[ValidationMessage] {
        &self.warnings
    }

    fn output(&self, kind: OutputKind, prefix: &str) -> String {
        self.simple.output(kind, &format!("{}description", prefix), false)
    }

    fn xml_element(&self) -> &XmlElement {
        &self.element
    }

    fn to_json(&self) -> serde_json::Value {
        self.simple.to_json()
    }
}

impl PartialEq for Description {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
            && self.namespace() == other.namespace()
            && self.simple == other.simple
    }
}

impl Eq for Description {}

impl std::hash::Hash for Description {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        let mut code = hash_seed(self.name(), self.namespace());
        code = combine_hash(code, &self.simple);
        state.write_u64(code);
    }
}

/// Mutable mirror of [`Description`].
#[derive(Debug, Clone, Default)]
pub struct DescriptionBuilder {
    /// Description text
    pub text: String,
    /// Security attributes
    pub security: SecurityAttributesBuilder,
}

impl ComponentBuilder for DescriptionBuilder {
    type Component = Description;

    fn is_empty(&self) -> bool {
        self.text.is_empty() && self.security.is_empty()
    }

    fn commit(&self, version: &'static DdmsVersion) -> Result<Option<Description>> {
        if self.is_empty() {
            return Ok(None);
        }
        let security = self.security.commit(version)?;
        Description::new(version, &self.text, security).map(Some)
    }
}

impl From<&Description> for DescriptionBuilder {
    fn from(description: &Description) -> Self {
        Self {
            text: description.text().to_string(),
            security: SecurityAttributesBuilder::from(description.security_attributes()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::DdmsVersion;

    fn v(token: &str) -> &'static DdmsVersion {
        DdmsVersion::get(token).unwrap()
    }

    fn unclassified(version: &'static DdmsVersion) -> SecurityAttributes {
        SecurityAttributes::new(version, "U", &["USA"]).unwrap()
    }

    #[test]
    fn test_security_forbidden_before_30() {
        let err = Description::new(v("2.0"), "A transformation service.", unclassified(v("2.0")))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Security attributes cannot be applied to this component until DDMS 3.0 or later."
        );
        assert_eq!(err.locator(), "/ddms:description");
    }

    #[test]
    fn test_unmarked_allowed_only_before_30() {
        assert!(
            Description::new(v("2.0"), "A transformation service.", SecurityAttributes::default())
                .is_ok()
        );
        let err =
            Description::new(v("3.0"), "A transformation service.", SecurityAttributes::default())
                .unwrap_err();
        assert_eq!(err.to_string(), "classification is required.");
    }

    #[test]
    fn test_empty_text_yields_single_warning() {
        let version = v("4.0.1");
        let description = Description::new(version, "", unclassified(version)).unwrap();
        assert_eq!(description.validation_warnings().len(), 1);
        let warning = &description.validation_warnings()[0];
        assert_eq!(
            warning.text(),
            "A ddms:description element was found with no description value."
        );
        assert_eq!(warning.locator(), "/ddms:description");
    }

    #[test]
    fn test_roundtrip_preserves_equality_and_output() {
        let version = v("4.0.1");
        let built =
            Description::new(version, "A transformation service.", unclassified(version)).unwrap();
        let reparsed =
            Description::from_element(version, XmlElement::parse(&built.to_xml()).unwrap())
                .unwrap();
        assert_eq!(built, reparsed);
        assert_eq!(built.to_html(), reparsed.to_html());
        assert_eq!(built.to_text(), reparsed.to_text());
        assert_eq!(built.to_xml(), reparsed.to_xml());
    }

    #[test]
    fn test_output_names() {
        let version = v("4.0.1");
        let description =
            Description::new(version, "A transformation service.", unclassified(version)).unwrap();
        let text = description.to_text();
        assert!(text.contains("description: A transformation service.\n"));
        assert!(text.contains("description.classification: U\n"));
        assert!(text.contains("description.ownerProducer: USA\n"));
    }

    #[test]
    fn test_builder_roundtrip_and_empty() {
        let version = v("4.0.1");
        assert!(DescriptionBuilder::default().commit(version).unwrap().is_none());

        let original =
            Description::new(version, "A transformation service.", unclassified(version)).unwrap();
        let rebuilt = DescriptionBuilder::from(&original)
            .commit(version)
            .unwrap()
            .unwrap();
        assert_eq!(original, rebuilt);
    }
}
