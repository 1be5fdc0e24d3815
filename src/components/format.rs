//! The ddms:format element and its ddms:extent child.

use tracing::debug;

use crate::components::{
    build_output, combine_hash, hash_seed, is_empty, prefix_warnings, require_bounded_child_count,
    require_qname, require_valid_uri, require_value, Component, ComponentBuilder, OutputKind,
    QualifierValue,
};
use crate::config;
use crate::error::Result;
use crate::message::ValidationMessage;
use crate::version::{DdmsVersion, Vocabulary};
use crate::xml::XmlElement;

/// A ddms:extent element: a qualifier/value pair describing the size or
/// duration of the described resource.
#[derive(Debug, Clone)]
pub struct Extent {
    version: &'static DdmsVersion,
    pair: QualifierValue,
    element: XmlElement,
    warnings: Vec<ValidationMessage>,
}

impl Extent {
    /// Local element name.
    pub const NAME: &'static str = "extent";

    /// Constructs the element from raw values.
    pub fn new(version: &'static DdmsVersion, qualifier: &str, value: &str) -> Result<Self> {
        let pair = QualifierValue::new(qualifier, value);
        let properties = config::Properties::global();
        let mut element = XmlElement::new(
            properties.prefix(Vocabulary::Ddms),
            Self::NAME,
            version.namespace(Vocabulary::Ddms),
        );
        pair.apply_to(&mut element);
        Self::validated(version, pair, element)
    }

    /// Constructs the element from parsed XML.
    pub fn from_element(version: &'static DdmsVersion, element: XmlElement) -> Result<Self> {
        require_qname(&element, Self::NAME, version.namespace(Vocabulary::Ddms))
            .map_err(|e| e.at(&element.qualified_name()))?;
        let pair = QualifierValue::from_element(&element);
        Self::validated(version, pair, element)
    }

    fn validated(
        version: &'static DdmsVersion,
        pair: QualifierValue,
        element: XmlElement,
    ) -> Result<Self> {
        let locator = element.qualified_name();
        Self::validate(&pair).map_err(|e| e.at(&locator))?;

        let mut warnings = Vec::new();
        if pair.is_empty() {
            warnings.push(ValidationMessage::warning(
                "A completely empty ddms:extent element was found.",
                &locator,
            ));
        } else if is_empty(pair.value()) {
            warnings.push(ValidationMessage::warning(
                "A qualifier has been set without an accompanying value attribute.",
                &locator,
            ));
        }
        debug!(element = %locator, warnings = warnings.len(), "validated component");
        Ok(Self {
            version,
            pair,
            element,
            warnings,
        })
    }

    fn validate(pair: &QualifierValue) -> Result<()> {
        if !is_empty(pair.value()) {
            require_value("qualifier", pair.qualifier())?;
        }
        if !is_empty(pair.qualifier()) {
            require_valid_uri(pair.qualifier())?;
        }
        Ok(())
    }

    /// Accessor for the qualifier URI.
    pub fn qualifier(&self) -> &str {
        self.pair.qualifier()
    }

    /// Accessor for the value.
    pub fn value(&self) -> &str {
        self.pair.value()
    }
}

impl Component for Extent {
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
        self.pair.output(kind, &format!("{}extent", prefix))
    }

    fn xml_element(&self) -> &XmlElement {
        &self.element
    }

    fn to_json(&self) -> serde_json::Value {
        self.pair.to_json()
    }
}

impl PartialEq for Extent {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
            && self.namespace() == other.namespace()
            && self.pair == other.pair
    }
}

impl Eq for Extent {}

impl std::hash::Hash for Extent {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        let mut code = hash_seed(self.name(), self.namespace());
        code = combine_hash(code, &self.pair);
        state.write_u64(code);
    }
}

/// Mutable mirror of [`Extent`].
#[derive(Debug, Clone, Default)]
pub struct ExtentBuilder {
    /// Qualifier URI
    pub qualifier: String,
    /// Value
    pub value: String,
}

impl ComponentBuilder for ExtentBuilder {
    type Component = Extent;

    fn is_empty(&self) -> bool {
        self.qualifier.is_empty() && self.value.is_empty()
    }

    fn commit(&self, version: &'static DdmsVersion) -> Result<Option<Extent>> {
        if self.is_empty() {
            return Ok(None);
        }
        Extent::new(version, &self.qualifier, &self.value).map(Some)
    }
}

impl From<&Extent> for ExtentBuilder {
    fn from(extent: &Extent) -> Self {
        Self {
            qualifier: extent.qualifier().to_string(),
            value: extent.value().to_string(),
        }
    }
}

/// A ddms:format element: the physical or digital manifestation of the
/// described resource.
///
/// Before DDMS 4.0.1 the children live inside a ddms:Media wrapper
/// element; from 4.0.1 on the wrapper is gone. The wrapper is structural
/// only and never a component of its own.
#[derive(Debug, Clone)]
pub struct Format {
    version: &'static DdmsVersion,
    mime_type: String,
    extent: Option<Extent>,
    medium: String,
    element: XmlElement,
    warnings: Vec<ValidationMessage>,
}

impl Format {
    /// Local element name.
    pub const NAME: &'static str = "format";

    /// Local name of the pre-4.0.1 wrapper element.
    const MEDIA_NAME: &'static str = "Media";

    /// Constructs the element from raw values.
    pub fn new(
        version: &'static DdmsVersion,
        mime_type: &str,
        extent: Option<Extent>,
        medium: &str,
    ) -> Result<Self> {
        let ddms = version.namespace(Vocabulary::Ddms);
        let properties = config::Properties::global();
        let prefix = properties.prefix(Vocabulary::Ddms);

        let mut content = XmlElement::new(prefix, Self::content_name(version), ddms);
        content.append_child(XmlElement::with_text(prefix, "mimeType", ddms, mime_type));
        if let Some(extent) = &extent {
            content.append_child(extent.xml_element().clone());
        }
        if !medium.is_empty() {
            content.append_child(XmlElement::with_text(prefix, "medium", ddms, medium));
        }

        let element = if Self::has_media_wrapper(version) {
            let mut format = XmlElement::new(prefix, Self::NAME, ddms);
            format.append_child(content);
            format
        } else {
            content
        };
        Self::validated(version, mime_type.to_string(), extent, medium.to_string(), element)
    }

    /// Constructs the element from parsed XML.
    pub fn from_element(version: &'static DdmsVersion, element: XmlElement) -> Result<Self> {
        let ddms = version.namespace(Vocabulary::Ddms);
        let bubble = |locator: String| move |e: crate::error::Error| e.at(&locator);

        require_qname(&element, Self::NAME, ddms)
            .map_err(bubble(element.qualified_name()))?;
        let content = if Self::has_media_wrapper(version) {
            require_bounded_child_count(&element, Self::MEDIA_NAME, ddms, 1, 1)
                .map_err(bubble(element.qualified_name()))?;
            element
                .first_child(Self::MEDIA_NAME, ddms)
                .ok_or_else(|| crate::error::Error::invalid("The ddms:Media element is required."))?
        } else {
            &element
        };

        let locator = Self::locator_segment(version, &element);
        require_bounded_child_count(content, "mimeType", ddms, 1, 1)
            .map_err(bubble(locator.clone()))?;
        require_bounded_child_count(content, Extent::NAME, ddms, 0, 1)
            .map_err(bubble(locator.clone()))?;
        require_bounded_child_count(content, "medium", ddms, 0, 1)
            .map_err(bubble(locator.clone()))?;

        let mime_type = content.child_text("mimeType", ddms).to_string();
        let extent = content
            .first_child(Extent::NAME, ddms)
            .map(|e| Extent::from_element(version, e.clone()))
            .transpose()
            .map_err(bubble(locator))?;
        let medium = content.child_text("medium", ddms).to_string();
        Self::validated(version, mime_type, extent, medium, element)
    }

    fn validated(
        version: &'static DdmsVersion,
        mime_type: String,
        extent: Option<Extent>,
        medium: String,
        element: XmlElement,
    ) -> Result<Self> {
        let locator = Self::locator_segment(version, &element);
        require_value("mimeType", &mime_type).map_err(|e| e.at(&locator))?;
        if let Some(extent) = &extent {
            if extent.version().version() != version.version() {
                return Err(crate::error::Error::invalid(format!(
                    "A child component, {}, is using a different version of DDMS from its parent.",
                    extent.qualified_name()
                ))
                .at(&locator));
            }
        }

        let mut warnings = Vec::new();
        let ddms = version.namespace(Vocabulary::Ddms);
        let content = Self::content_element(version, &element);
        if content.first_child("medium", ddms).is_some() && is_empty(&medium) {
            warnings.push(ValidationMessage::warning(
                "A ddms:medium element was found with no value.",
                &locator,
            ));
        }
        if let Some(extent) = &extent {
            warnings.extend(prefix_warnings(extent.validation_warnings(), &locator));
        }
        debug!(element = %locator, warnings = warnings.len(), "validated component");
        Ok(Self {
            version,
            mime_type,
            extent,
            medium,
            element,
            warnings,
        })
    }

    fn has_media_wrapper(version: &'static DdmsVersion) -> bool {
        version.is_before("4.0.1")
    }

    fn content_name(version: &'static DdmsVersion) -> &'static str {
        if Self::has_media_wrapper(version) {
            Self::MEDIA_NAME
        } else {
            Self::NAME
        }
    }

    fn content_element<'a>(version: &'static DdmsVersion, element: &'a XmlElement) -> &'a XmlElement {
        if Self::has_media_wrapper(version) {
            element
                .first_child(Self::MEDIA_NAME, version.namespace(Vocabulary::Ddms))
                .unwrap_or(element)
        } else {
            element
        }
    }

    /// Locator for messages on this element. Pre-4.0.1 the wrapper appears
    /// as a suffix so that locators match the document structure.
    fn locator_segment(version: &'static DdmsVersion, element: &XmlElement) -> String {
        if Self::has_media_wrapper(version) {
            format!(
                "{}/{}:{}",
                element.qualified_name(),
                element.prefix(),
                Self::MEDIA_NAME
            )
        } else {
            element.qualified_name()
        }
    }

    /// Accessor for the mimeType child text.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Accessor for the optional extent child.
    pub fn extent(&self) -> Option<&Extent> {
        self.extent.as_ref()
    }

    /// Accessor for the medium child text.
    pub fn medium(&self) -> &str {
        &self.medium
    }
}

impl Component for Format {
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
        let name = format!("{}format", prefix);
        let mut out = build_output(kind, &format!("{}.mimeType", name), &self.mime_type, false);
        if let Some(extent) = &self.extent {
            out.push_str(&extent.output(kind, &format!("{}.", name)));
        }
        out.push_str(&build_output(kind, &format!("{}.medium", name), &self.medium, false));
        out
    }

    fn xml_element(&self) -> &XmlElement {
        &self.element
    }

    fn to_json(&self) -> serde_json::Value {
        let mut json = serde_json::json!({ "mimeType": self.mime_type });
        if let Some(extent) = &self.extent {
            json["extent"] = extent.to_json();
        }
        if !self.medium.is_empty() {
            json["medium"] = self.medium.clone().into();
        }
        json
    }
}

impl PartialEq for Format {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
            && self.namespace() == other.namespace()
            && self.mime_type == other.mime_type
            && self.extent == other.extent
            && self.medium == other.medium
    }
}

impl Eq for Format {}

impl std::hash::Hash for Format {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        let mut code = hash_seed(self.name(), self.namespace());
        code = combine_hash(code, &self.mime_type);
        code = combine_hash(code, &self.extent);
        code = combine_hash(code, &self.medium);
        state.write_u64(code);
    }
}

/// Mutable mirror of [`Format`].
#[derive(Debug, Clone, Default)]
pub struct FormatBuilder {
    /// mimeType child text
    pub mime_type: String,
    /// Nested extent builder
    pub extent: ExtentBuilder,
    /// medium child text
    pub medium: String,
}

impl ComponentBuilder for FormatBuilder {
    type Component = Format;

    fn is_empty(&self) -> bool {
        self.mime_type.is_empty() && self.extent.is_empty() && self.medium.is_empty()
    }

    fn commit(&self, version: &'static DdmsVersion) -> Result<Option<Format>> {
        if self.is_empty() {
            return Ok(None);
        }
        let extent = self.extent.commit(version)?;
        Format::new(version, &self.mime_type, extent, &self.medium).map(Some)
    }
}

impl From<&Format> for FormatBuilder {
    fn from(format: &Format) -> Self {
        Self {
            mime_type: format.mime_type().to_string(),
            extent: format
                .extent()
                .map(ExtentBuilder::from)
                .unwrap_or_default(),
            medium: format.medium().to_string(),
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

    #[test]
    fn test_extent_requires_qualifier_with_value() {
        let err = Extent::new(v("4.0.1"), "", "123").unwrap_err();
        assert_eq!(err.to_string(), "qualifier is required.");
        assert_eq!(err.locator(), "/ddms:extent");
    }

    #[test]
    fn test_extent_qualifier_must_be_uri() {
        assert!(Extent::new(v("4.0.1"), "http://<>", "123").is_err());
        assert!(Extent::new(v("4.0.1"), "http://purl.org/dc/terms/URI", "123").is_ok());
    }

    #[test]
    fn test_extent_warnings() {
        let empty = Extent::new(v("4.0.1"), "", "").unwrap();
        assert_eq!(empty.validation_warnings().len(), 1);
        assert_eq!(
            empty.validation_warnings()[0].text(),
            "A completely empty ddms:extent element was found."
        );

        let no_value = Extent::new(v("4.0.1"), "http://purl.org/dc/terms/URI", "").unwrap();
        assert_eq!(
            no_value.validation_warnings()[0].text(),
            "A qualifier has been set without an accompanying value attribute."
        );
    }

    #[test]
    fn test_format_requires_mime_type() {
        let err = Format::new(v("4.0.1"), "", None, "digital").unwrap_err();
        assert_eq!(err.to_string(), "mimeType is required.");
        assert_eq!(err.locator(), "/ddms:format");
    }

    #[test]
    fn test_format_rejects_extent_from_other_version() {
        let extent = Extent::new(v("4.0.1"), "http://purl.org/dc/terms/URI", "123").unwrap();
        let err = Format::new(v("2.0"), "text/xml", Some(extent), "").unwrap_err();
        assert_eq!(
            err.to_string(),
            "A child component, ddms:extent, is using a different version of DDMS from its parent."
        );
        assert_eq!(err.locator(), "/ddms:format/ddms:Media");

        let extent = Extent::new(v("2.0"), "http://purl.org/dc/terms/URI", "123").unwrap();
        assert!(Format::new(v("2.0"), "text/xml", Some(extent), "").is_ok());
    }

    #[test]
    fn test_format_locator_includes_media_wrapper_before_401() {
        let err = Format::new(v("3.1"), "", None, "").unwrap_err();
        assert_eq!(err.locator(), "/ddms:format/ddms:Media");
    }

    #[test]
    fn test_format_media_wrapper_shape() {
        let modern = Format::new(v("4.0.1"), "text/xml", None, "").unwrap();
        assert!(!modern.to_xml().contains("ddms:Media"));

        let legacy = Format::new(v("3.1"), "text/xml", None, "").unwrap();
        assert!(legacy.to_xml().contains("<ddms:Media>"));
    }

    #[test]
    fn test_format_roundtrip_modern_and_legacy() {
        for token in ["2.0", "3.1", "4.0.1"] {
            let version = v(token);
            let extent = Extent::new(version, "http://purl.org/dc/terms/URI", "123").unwrap();
            let built = Format::new(version, "text/xml", Some(extent), "digital").unwrap();
            let reparsed =
                Format::from_element(version, XmlElement::parse(&built.to_xml()).unwrap()).unwrap();
            assert_eq!(built, reparsed, "round-trip failed for {}", token);
            assert_eq!(built.to_html(), reparsed.to_html());
            assert_eq!(built.to_text(), reparsed.to_text());
        }
    }

    #[test]
    fn test_format_warning_aggregation_with_wrapper_locators() {
        let version = v("3.1");
        let extent = Extent::new(version, "http://purl.org/dc/terms/URI", "").unwrap();
        let format = Format::new(version, "text/xml", Some(extent), "").unwrap();

        // No medium element was built, so only the extent warning bubbles.
        assert_eq!(format.validation_warnings().len(), 1);
        assert_eq!(
            format.validation_warnings()[0].locator(),
            "/ddms:format/ddms:Media/ddms:extent"
        );
    }

    #[test]
    fn test_format_empty_medium_element_warns() {
        let version = v("4.0.1");
        let xml = format!(
            "<ddms:format xmlns:ddms=\"{0}\"><ddms:mimeType>text/xml</ddms:mimeType><ddms:medium></ddms:medium></ddms:format>",
            version.namespace(Vocabulary::Ddms)
        );
        let format = Format::from_element(version, XmlElement::parse(&xml).unwrap()).unwrap();
        assert_eq!(format.validation_warnings().len(), 1);
        assert_eq!(
            format.validation_warnings()[0].text(),
            "A ddms:medium element was found with no value."
        );
    }

    #[test]
    fn test_format_cardinality_from_xml() {
        let version = v("4.0.1");
        let ns = version.namespace(Vocabulary::Ddms);
        let two_mime_types = format!(
            "<ddms:format xmlns:ddms=\"{0}\"><ddms:mimeType>a</ddms:mimeType><ddms:mimeType>b</ddms:mimeType></ddms:format>",
            ns
        );
        let err =
            Format::from_element(version, XmlElement::parse(&two_mime_types).unwrap()).unwrap_err();
        assert!(err.to_string().contains("must be exactly 1"));
    }

    #[test]
    fn test_format_builder_matches_direct_construction() {
        let version = v("4.0.1");
        let mut builder = FormatBuilder::default();
        builder.mime_type = "text/xml".into();
        builder.extent.qualifier = "http://purl.org/dc/terms/URI".into();
        builder.extent.value = "123".into();

        let from_builder = builder.commit(version).unwrap().unwrap();
        let extent = Extent::new(version, "http://purl.org/dc/terms/URI", "123").unwrap();
        let direct = Format::new(version, "text/xml", Some(extent), "").unwrap();
        assert_eq!(from_builder, direct);
    }

    #[test]
    fn test_format_builder_empty_commits_none() {
        assert!(FormatBuilder::default().commit(v("4.0.1")).unwrap().is_none());
    }

    #[test]
    fn test_format_equality_and_hash() {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let version = v("4.0.1");
        let a = Format::new(version, "text/xml", None, "digital").unwrap();
        let b = Format::new(version, "text/xml", None, "digital").unwrap();
        let c = Format::new(version, "text/plain", None, "digital").unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);

        let hash = |f: &Format| {
            let mut hasher = DefaultHasher::new();
            f.hash(&mut hasher);
            hasher.finish()
        };
        assert_eq!(hash(&a), hash(&b));
        assert_ne!(hash(&a), hash(&c));
    }
}
