//! ISM security attribute group and the NoticeText element.

use chrono::NaiveDate;
use tracing::debug;

use crate::components::{
    build_output, combine_hash, hash_seed, is_empty, require_qname, Component, ComponentBuilder,
    OutputKind, SimpleText,
};
use crate::config;
use crate::error::{Error, Result};
use crate::message::ValidationMessage;
use crate::version::{DdmsVersion, Vocabulary};
use crate::xml::XmlElement;

/// Controlled vocabulary for the classification attribute.
const CLASSIFICATION_TOKENS: [&str; 5] = ["U", "C", "S", "TS", "R"];

/// The ISM attribute group carried by markable DDMS elements.
///
/// The group is always present by value on its host; an entirely empty
/// group simply writes no attributes. Hosts that mandate marking call
/// [`require_classification`](SecurityAttributes::require_classification)
/// during their own validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SecurityAttributes {
    classification: String,
    owner_producers: Vec<String>,
    releasable_to: Vec<String>,
    classified_by: String,
    compilation_reason: String,
    declass_date: Option<NaiveDate>,
    declass_manual_review: Option<bool>,
}

impl SecurityAttributes {
    /// Creates the common classification/ownerProducer pair.
    pub fn new(
        version: &'static DdmsVersion,
        classification: &str,
        owner_producers: &[&str],
    ) -> Result<Self> {
        let attributes = Self {
            classification: classification.to_string(),
            owner_producers: owner_producers.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        };
        attributes.validate(version)?;
        Ok(attributes)
    }

    /// Reads the group from an element's ISM-namespace attributes.
    pub fn from_element(version: &'static DdmsVersion, element: &XmlElement) -> Result<Self> {
        let ism = version.namespace(Vocabulary::Ism);
        let declass_date = match element.attribute_value("declassDate", ism) {
            "" => None,
            raw => Some(NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                Error::invalid("The declassDate must be in the xs:date format (YYYY-MM-DD).")
            })?),
        };
        let declass_manual_review = match element.attribute_value("declassManualReview", ism) {
            "" => None,
            raw => Some(raw == "true"),
        };
        let attributes = Self {
            classification: element.attribute_value("classification", ism).to_string(),
            owner_producers: split_list(element.attribute_value("ownerProducer", ism)),
            releasable_to: split_list(element.attribute_value("releasableTo", ism)),
            classified_by: element.attribute_value("classifiedBy", ism).to_string(),
            compilation_reason: element.attribute_value("compilationReason", ism).to_string(),
            declass_date,
            declass_manual_review,
        };
        attributes.validate(version)?;
        Ok(attributes)
    }

    fn validate(&self, version: &'static DdmsVersion) -> Result<()> {
        if !self.classification.is_empty()
            && !CLASSIFICATION_TOKENS.contains(&self.classification.as_str())
        {
            return Err(Error::invalid(format!(
                "{} is not a valid enumeration token for this attribute.",
                self.classification
            )));
        }
        if !self.compilation_reason.is_empty() && version.is_before("3.0") {
            return Err(Error::invalid(
                "The compilationReason attribute cannot be used until DDMS 3.0 or later.",
            ));
        }
        if self.declass_manual_review.is_some() && version.is_at_least("3.0") {
            return Err(Error::invalid(
                "The declassManualReview attribute can only be used in DDMS 2.0.",
            ));
        }
        Ok(())
    }

    /// Fails unless a non-empty classification and at least one
    /// ownerProducer are present.
    pub fn require_classification(&self) -> Result<()> {
        if is_empty(&self.classification) {
            return Err(Error::invalid("classification is required."));
        }
        if !self.owner_producers.iter().any(|op| !is_empty(op)) {
            return Err(Error::invalid("At least 1 ownerProducer must be set."));
        }
        Ok(())
    }

    /// True when no attribute in the group carries a value.
    pub fn is_empty(&self) -> bool {
        self.classification.is_empty()
            && self.owner_producers.is_empty()
            && self.releasable_to.is_empty()
            && self.classified_by.is_empty()
            && self.compilation_reason.is_empty()
            && self.declass_date.is_none()
            && self.declass_manual_review.is_none()
    }

    /// Accessor for the classification token.
    pub fn classification(&self) -> &str {
        &self.classification
    }

    /// Accessor for the ownerProducer list.
    pub fn owner_producers(&self) -> &[String] {
        &self.owner_producers
    }

    /// Accessor for the releasableTo list.
    pub fn releasable_to(&self) -> &[String] {
        &self.releasable_to
    }

    /// Accessor for the classifiedBy value.
    pub fn classified_by(&self) -> &str {
        &self.classified_by
    }

    /// Accessor for the compilationReason value.
    pub fn compilation_reason(&self) -> &str {
        &self.compilation_reason
    }

    /// Accessor for the declassification date.
    pub fn declass_date(&self) -> Option<NaiveDate> {
        self.declass_date
    }

    /// Accessor for the manual review flag.
    pub fn declass_manual_review(&self) -> Option<bool> {
        self.declass_manual_review
    }

    /// Writes the group onto an element in canonical attribute order.
    pub(crate) fn add_to(&self, element: &mut XmlElement, version: &'static DdmsVersion) {
        let ism = version.namespace(Vocabulary::Ism);
        let properties = config::Properties::global();
        let prefix = properties.prefix(Vocabulary::Ism);
        let mut add = |name: &str, value: String| {
            if !value.is_empty() {
                element.add_attribute(prefix, name, ism, value);
            }
        };
        add("classification", self.classification.clone());
        add("ownerProducer", self.owner_producers.join(" "));
        add("releasableTo", self.releasable_to.join(" "));
        add("classifiedBy", self.classified_by.clone());
        add("compilationReason", self.compilation_reason.clone());
        add(
            "declassDate",
            self.declass_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        );
        add(
            "declassManualReview",
            self.declass_manual_review
                .map(|b| b.to_string())
                .unwrap_or_default(),
        );
    }

    /// Renders the attribute lines under the host's output prefix.
    pub(crate) fn output(&self, kind: OutputKind, prefix: &str) -> String {
        let mut out = String::new();
        out.push_str(&build_output(
            kind,
            &format!("{}classification", prefix),
            &self.classification,
            false,
        ));
        out.push_str(&build_output(
            kind,
            &format!("{}ownerProducer", prefix),
            &self.owner_producers.join(" "),
            false,
        ));
        out.push_str(&build_output(
            kind,
            &format!("{}releasableTo", prefix),
            &self.releasable_to.join(" "),
            false,
        ));
        out.push_str(&build_output(
            kind,
            &format!("{}classifiedBy", prefix),
            &self.classified_by,
            false,
        ));
        out.push_str(&build_output(
            kind,
            &format!("{}compilationReason", prefix),
            &self.compilation_reason,
            false,
        ));
        out.push_str(&build_output(
            kind,
            &format!("{}declassDate", prefix),
            &self
                .declass_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            false,
        ));
        out.push_str(&build_output(
            kind,
            &format!("{}declassManualReview", prefix),
            &self
                .declass_manual_review
                .map(|b| b.to_string())
                .unwrap_or_default(),
            false,
        ));
        out
    }

    /// Merges the non-empty attributes into a host's JSON object.
    pub(crate) fn merge_json(&self, json: &mut serde_json::Value) {
        let Some(map) = json.as_object_mut() else {
            return;
        };
        if !self.classification.is_empty() {
            map.insert("classification".into(), self.classification.clone().into());
        }
        if !self.owner_producers.is_empty() {
            map.insert("ownerProducer".into(), self.owner_producers.clone().into());
        }
        if !self.releasable_to.is_empty() {
            map.insert("releasableTo".into(), self.releasable_to.clone().into());
        }
        if !self.classified_by.is_empty() {
            map.insert("classifiedBy".into(), self.classified_by.clone().into());
        }
        if !self.compilation_reason.is_empty() {
            map.insert(
                "compilationReason".into(),
                self.compilation_reason.clone().into(),
            );
        }
        if let Some(date) = self.declass_date {
            map.insert(
                "declassDate".into(),
                date.format("%Y-%m-%d").to_string().into(),
            );
        }
        if let Some(review) = self.declass_manual_review {
            map.insert("declassManualReview".into(), review.into());
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(|s| s.to_string()).collect()
}

/// Mutable mirror of [`SecurityAttributes`].
///
/// Unlike element builders, committing always yields a group: attribute
/// groups are present-by-value on their hosts, and an empty group is the
/// legal representation of "unmarked".
#[derive(Debug, Clone, Default)]
pub struct SecurityAttributesBuilder {
    /// Classification token
    pub classification: String,
    /// ownerProducer tokens
    pub owner_producers: Vec<String>,
    /// releasableTo tokens
    pub releasable_to: Vec<String>,
    /// classifiedBy value
    pub classified_by: String,
    /// compilationReason value
    pub compilation_reason: String,
    /// Declassification date
    pub declass_date: Option<NaiveDate>,
    /// Manual review flag
    pub declass_manual_review: Option<bool>,
}

impl SecurityAttributesBuilder {
    /// True when no field has been set.
    pub fn is_empty(&self) -> bool {
        self.classification.is_empty()
            && self.owner_producers.is_empty()
            && self.releasable_to.is_empty()
            && self.classified_by.is_empty()
            && self.compilation_reason.is_empty()
            && self.declass_date.is_none()
            && self.declass_manual_review.is_none()
    }

    /// Validates and produces the attribute group.
    pub fn commit(&self, version: &'static DdmsVersion) -> Result<SecurityAttributes> {
        let attributes = SecurityAttributes {
            classification: self.classification.clone(),
            owner_producers: self.owner_producers.clone(),
            releasable_to: self.releasable_to.clone(),
            classified_by: self.classified_by.clone(),
            compilation_reason: self.compilation_reason.clone(),
            declass_date: self.declass_date,
            declass_manual_review: self.declass_manual_review,
        };
        attributes.validate(version)?;
        Ok(attributes)
    }
}

impl From<&SecurityAttributes> for SecurityAttributesBuilder {
    fn from(attributes: &SecurityAttributes) -> Self {
        Self {
            classification: attributes.classification.clone(),
            owner_producers: attributes.owner_producers.clone(),
            releasable_to: attributes.releasable_to.clone(),
            classified_by: attributes.classified_by.clone(),
            compilation_reason: attributes.compilation_reason.clone(),
            declass_date: attributes.declass_date,
            declass_manual_review: attributes.declass_manual_review,
        }
    }
}

/// An ism:NoticeText element, introduced in DDMS 4.0.1.
#[derive(Debug, Clone)]
pub struct NoticeText {
    version: &'static DdmsVersion,
    simple: SimpleText,
    element: XmlElement,
    warnings: Vec<ValidationMessage>,
}

impl NoticeText {
    /// Local element name.
    pub const NAME: &'static str = "NoticeText";

    /// Constructs the element from raw values.
    pub fn new(
        version: &'static DdmsVersion,
        text: &str,
        security: SecurityAttributes,
    ) -> Result<Self> {
        let simple = SimpleText::new(text, security);
        let properties = config::Properties::global();
        let mut element = XmlElement::new(
            properties.prefix(Vocabulary::Ism),
            Self::NAME,
            version.namespace(Vocabulary::Ism),
        );
        simple.apply_to(&mut element, version);
        Self::validated(version, simple, element)
    }

    /// Constructs the element from parsed XML.
    pub fn from_element(version: &'static DdmsVersion, element: XmlElement) -> Result<Self> {
        require_qname(&element, Self::NAME, version.namespace(Vocabulary::Ism))
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
                "An ISM:NoticeText element was found with no value.",
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
        if version.is_before("4.0.1") {
            return Err(Error::invalid(
                "The ism:NoticeText element cannot be used until DDMS 4.0.1 or later.",
            ));
        }
        simple.security().require_classification()?;
        Ok(())
    }

    /// Accessor for the notice text.
    pub fn text(&self) -> &str {
        self.simple.text()
    }

    /// Accessor for the security attributes.
    pub fn security_attributes(&self) -> &SecurityAttributes {
        self.simple.security()
    }
}

impl Component for NoticeText {
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
        self.simple.output(kind, &format!("{}noticeText", prefix), true)
    }

    fn xml_element(&self) -> &XmlElement {
        &self.element
    }

    fn to_json(&self) -> serde_json::Value {
        self.simple.to_json()
    }
}

impl PartialEq for NoticeText {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
            && self.namespace() == other.namespace()
            && self.simple == other.simple
    }
}

impl Eq for NoticeText {}

impl std::hash::Hash for NoticeText {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        let mut code = hash_seed(self.name(), self.namespace());
        code = combine_hash(code, &self.simple);
        state.write_u64(code);
    }
}

/// Mutable mirror of [`NoticeText`].
#[derive(Debug, Clone, Default)]
pub struct NoticeTextBuilder {
    /// Notice text
    pub text: String,
    /// Security attributes
    pub security: SecurityAttributesBuilder,
}

impl ComponentBuilder for NoticeTextBuilder {
    type Component = NoticeText;

    fn is_empty(&self) -> bool {
        self.text.is_empty() && self.security.is_empty()
    }

    fn commit(&self, version: &'static DdmsVersion) -> Result<Option<NoticeText>> {
        if self.is_empty() {
            return Ok(None);
        }
        let security = self.security.commit(version)?;
        NoticeText::new(version, &self.text, security).map(Some)
    }
}

impl From<&NoticeText> for NoticeTextBuilder {
    fn from(notice: &NoticeText) -> Self {
        Self {
            text: notice.text().to_string(),
            security: SecurityAttributesBuilder::from(notice.security_attributes()),
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
    fn test_classification_vocabulary() {
        for token in ["U", "C", "S", "TS", "R"] {
            assert!(SecurityAttributes::new(v("4.0.1"), token, &["USA"]).is_ok());
        }
        let err = SecurityAttributes::new(v("4.0.1"), "SuperSecret", &["USA"]).unwrap_err();
        assert!(err.to_string().contains("not a valid enumeration token"));
    }

    #[test]
    fn test_compilation_reason_version_range() {
        let mut builder = SecurityAttributesBuilder::default();
        builder.classification = "U".into();
        builder.owner_producers = vec!["USA".into()];
        builder.compilation_reason = "aggregation".into();

        assert!(builder.commit(v("2.0")).is_err());
        assert!(builder.commit(v("3.0")).is_ok());
        assert!(builder.commit(v("4.0.1")).is_ok());
    }

    #[test]
    fn test_declass_manual_review_version_range() {
        let mut builder = SecurityAttributesBuilder::default();
        builder.declass_manual_review = Some(true);

        assert!(builder.commit(v("2.0")).is_ok());
        let err = builder.commit(v("3.0")).unwrap_err();
        assert!(err.to_string().contains("only be used in DDMS 2.0"));
    }

    #[test]
    fn test_require_classification() {
        let marked = unclassified(v("4.0.1"));
        assert!(marked.require_classification().is_ok());

        let empty = SecurityAttributes::default();
        assert_eq!(
            empty.require_classification().unwrap_err().to_string(),
            "classification is required."
        );

        let no_producer = SecurityAttributes::new(v("4.0.1"), "U", &[]).unwrap();
        assert_eq!(
            no_producer.require_classification().unwrap_err().to_string(),
            "At least 1 ownerProducer must be set."
        );
    }

    #[test]
    fn test_attribute_roundtrip() {
        let version = v("4.0.1");
        let mut builder = SecurityAttributesBuilder::default();
        builder.classification = "S".into();
        builder.owner_producers = vec!["USA".into(), "AUS".into()];
        builder.releasable_to = vec!["USA".into()];
        builder.classified_by = "analyst".into();
        builder.declass_date = NaiveDate::from_ymd_opt(2030, 1, 1);
        let attributes = builder.commit(version).unwrap();

        let mut element = XmlElement::new("ddms", "title", version.namespace(Vocabulary::Ddms));
        attributes.add_to(&mut element, version);
        let reread = SecurityAttributes::from_element(version, &element).unwrap();
        assert_eq!(attributes, reread);
    }

    #[test]
    fn test_invalid_declass_date_fails() {
        let version = v("2.0");
        let mut element = XmlElement::new("ddms", "title", version.namespace(Vocabulary::Ddms));
        element.add_attribute("ism", "declassDate", version.namespace(Vocabulary::Ism), "someday");
        let err = SecurityAttributes::from_element(version, &element).unwrap_err();
        assert!(err.to_string().contains("xs:date format"));
    }

    #[test]
    fn test_notice_text_version_range() {
        let err = NoticeText::new(v("3.1"), "notice", unclassified(v("3.1"))).unwrap_err();
        assert!(err.to_string().contains("cannot be used until DDMS 4.0.1"));
        assert!(NoticeText::new(v("4.0.1"), "notice", unclassified(v("4.0.1"))).is_ok());
    }

    #[test]
    fn test_notice_text_empty_value_warning() {
        let notice = NoticeText::new(v("4.0.1"), "", unclassified(v("4.0.1"))).unwrap();
        assert_eq!(notice.validation_warnings().len(), 1);
        let warning = &notice.validation_warnings()[0];
        assert_eq!(warning.text(), "An ISM:NoticeText element was found with no value.");
        assert_eq!(warning.locator(), "/ism:NoticeText");
        assert!(notice.to_text().starts_with("noticeText: \n"));
    }

    #[test]
    fn test_notice_text_roundtrip() {
        let version = v("4.0.1");
        let built = NoticeText::new(version, "POC: John Smith", unclassified(version)).unwrap();
        let reparsed =
            NoticeText::from_element(version, XmlElement::parse(&built.to_xml()).unwrap()).unwrap();
        assert_eq!(built, reparsed);
        assert_eq!(built.to_html(), reparsed.to_html());
    }

    #[test]
    fn test_notice_text_builder_empty_commits_none() {
        let builder = NoticeTextBuilder::default();
        assert!(builder.commit(v("4.0.1")).unwrap().is_none());
    }

    #[test]
    fn test_notice_text_builder_seeds_from_component() {
        let version = v("4.0.1");
        let original = NoticeText::new(version, "notice", unclassified(version)).unwrap();
        let rebuilt = NoticeTextBuilder::from(&original)
            .commit(version)
            .unwrap()
            .unwrap();
        assert_eq!(original, rebuilt);
    }
}
