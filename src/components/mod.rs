//! Shared contract and building blocks for DDMS components.
//!
//! Every concrete element type implements [`Component`], is immutable after
//! construction, and validates fail-fast in its constructors. The capability
//! structs here ([`SimpleText`], [`QualifierValue`]) hold the behavior that
//! several element types share, embedded by value rather than inherited.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::{Error, Result};
use crate::message::ValidationMessage;
use crate::version::DdmsVersion;
use crate::xml::XmlElement;

pub mod format;
pub mod resource;
pub mod security;
pub mod summary;

pub use format::{Extent, ExtentBuilder, Format, FormatBuilder};
pub use resource::{
    Dates, DatesBuilder, Identifier, IdentifierBuilder, Language, LanguageBuilder, Source,
    SourceBuilder, Title, TitleBuilder, Type, TypeBuilder,
};
pub use security::{NoticeText, NoticeTextBuilder, SecurityAttributes, SecurityAttributesBuilder};
pub use summary::{Description, DescriptionBuilder};

/// Empty namespace URI for unqualified attributes.
pub(crate) const NO_NAMESPACE: &str = "";

/// Rendering flavor for the non-XML output forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// HTML `<meta />` tags
    Html,
    /// `name: value` lines
    Text,
}

/// The contract shared by every DDMS element type.
///
/// Components are immutable once constructed. All rendering functions are
/// pure and never fail: anything that could fail was rejected during
/// construction.
pub trait Component {
    /// Local element name.
    fn name(&self) -> &str;

    /// The DDMS version this component was constructed against.
    fn version(&self) -> &'static DdmsVersion;

    /// Warnings recorded at construction time, including re-prefixed child
    /// warnings. A component with warnings is fully usable.
    fn validation_warnings(&self) -> &[ValidationMessage];

    /// Renders this component as a sequence of HTML meta tags or text
    /// lines. `prefix` is prepended to every output name.
    fn output(&self, kind: OutputKind, prefix: &str) -> String;

    /// The underlying XML element tree.
    fn xml_element(&self) -> &XmlElement;

    /// Renders this component as a JSON value.
    fn to_json(&self) -> serde_json::Value;

    /// Namespace prefix of the element.
    fn prefix(&self) -> &str {
        self.xml_element().prefix()
    }

    /// Namespace URI of the element.
    fn namespace(&self) -> &str {
        self.xml_element().namespace()
    }

    /// Qualified element name (`prefix:name`).
    fn qualified_name(&self) -> String {
        self.xml_element().qualified_name()
    }

    /// Renders this component as HTML meta tags.
    fn to_html(&self) -> String {
        self.output(OutputKind::Html, "")
    }

    /// Renders this component as plain text lines.
    fn to_text(&self) -> String {
        self.output(OutputKind::Text, "")
    }

    /// Renders this component as XML.
    fn to_xml(&self) -> String {
        self.xml_element().to_xml()
    }
}

/// Mutable mirror of a component, for staged construction.
///
/// Builders never validate while being filled in. All validation happens in
/// [`commit`](ComponentBuilder::commit), which funnels into the same
/// raw-value constructor as direct construction and therefore produces
/// identical errors.
pub trait ComponentBuilder: Default {
    /// The component type this builder produces.
    type Component;

    /// True when no field has been set. An empty builder commits to
    /// `Ok(None)` so that optional slots in a larger document can be left
    /// blank without ceremony.
    fn is_empty(&self) -> bool;

    /// Validates and constructs the component for the given version.
    fn commit(&self, version: &'static DdmsVersion) -> Result<Option<Self::Component>>;

    /// Commits against the `ddms.defaultVersion` configuration property.
    ///
    /// Convenience for callers that work at a single, configured version
    /// rather than threading one through explicitly.
    fn commit_default(&self) -> Result<Option<Self::Component>> {
        self.commit(crate::config::Properties::global().default_version())
    }
}

/// Builds one output line in the requested flavor.
///
/// Empty content is skipped unless `always_print` is set.
pub(crate) fn build_output(kind: OutputKind, name: &str, content: &str, always_print: bool) -> String {
    if content.is_empty() && !always_print {
        return String::new();
    }
    match kind {
        OutputKind::Html => format!(
            "<meta name=\"{}\" content=\"{}\" />\n",
            escape_xml(name),
            escape_xml(content)
        ),
        OutputKind::Text => format!("{}: {}\n", name, content),
    }
}

pub(crate) fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Re-prefixes child warnings with a parent locator segment.
pub(crate) fn prefix_warnings(warnings: &[ValidationMessage], segment: &str) -> Vec<ValidationMessage> {
    warnings.iter().map(|w| w.prefixed(segment)).collect()
}

/// Order-sensitive multiplicative hash combination over semantic fields.
pub(crate) fn combine_hash<T: Hash + ?Sized>(code: u64, field: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    field.hash(&mut hasher);
    code.wrapping_mul(7).wrapping_add(hasher.finish())
}

/// Seeds a component hash from its name and namespace.
pub(crate) fn hash_seed(name: &str, namespace: &str) -> u64 {
    combine_hash(combine_hash(0, name), namespace)
}

/// True for absent or whitespace-only values.
pub(crate) fn is_empty(value: &str) -> bool {
    value.trim().is_empty()
}

/// Fails when a required value is empty.
pub(crate) fn require_value(description: &str, value: &str) -> Result<()> {
    if is_empty(value) {
        return Err(Error::invalid(format!("{} is required.", description)));
    }
    Ok(())
}

/// Fails when the element does not have the expected name and namespace.
pub(crate) fn require_qname(element: &XmlElement, name: &str, namespace: &str) -> Result<()> {
    if element.name() != name || element.namespace() != namespace {
        return Err(Error::invalid(format!(
            "Unexpected namespace URI and local name encountered: {}:{}",
            element.namespace(),
            element.name()
        )));
    }
    Ok(())
}

/// Fails when the number of matching children falls outside `low..=high`.
pub(crate) fn require_bounded_child_count(
    element: &XmlElement,
    name: &str,
    namespace: &str,
    low: usize,
    high: usize,
) -> Result<()> {
    let count = element.child_count(name, namespace);
    if count < low || count > high {
        let bound = if low == high {
            format!("exactly {}", high)
        } else {
            format!("between {} and {}", low, high)
        };
        return Err(Error::invalid(format!(
            "The number of {} elements must be {}.",
            name, bound
        )));
    }
    Ok(())
}

/// Fails when the value is not a well-formed URI.
///
/// Relative references are syntactically legal URIs and are accepted.
pub(crate) fn require_valid_uri(value: &str) -> Result<()> {
    match url::Url::parse(value) {
        Ok(_) => Ok(()),
        Err(url::ParseError::RelativeUrlWithoutBase) => Ok(()),
        Err(_) => Err(Error::invalid(format!("Invalid URI ({})", value))),
    }
}

/// Fails unless the value is one of the four DDMS date precisions
/// (xs:date, xs:dateTime, xs:gYearMonth, xs:gYear).
pub(crate) fn require_valid_date(value: &str) -> Result<()> {
    if is_valid_date(value) {
        Ok(())
    } else {
        Err(Error::invalid(
            "The date datatype must be one of xs:dateTime, xs:date, xs:gYearMonth, or xs:gYear",
        ))
    }
}

fn is_valid_date(value: &str) -> bool {
    if DateTime::parse_from_rfc3339(value).is_ok() {
        return true;
    }
    if NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").is_ok() {
        return true;
    }
    if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok() {
        return true;
    }
    // xs:gYearMonth
    if NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d").is_ok() {
        return true;
    }
    // xs:gYear
    value.len() == 4 && value.bytes().all(|b| b.is_ascii_digit())
}

/// Child text plus a security attribute group.
///
/// The common shape of marked free-text elements (title, description,
/// notice text). Embedded by value in the element types that need it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SimpleText {
    text: String,
    security: SecurityAttributes,
}

impl SimpleText {
    /// Creates the capability from raw values.
    pub fn new(text: impl Into<String>, security: SecurityAttributes) -> Self {
        Self {
            text: text.into(),
            security,
        }
    }

    /// Reads the capability from an element's child text and ISM attributes.
    pub fn from_element(version: &'static DdmsVersion, element: &XmlElement) -> Result<Self> {
        Ok(Self {
            text: element.text().to_string(),
            security: SecurityAttributes::from_element(version, element)?,
        })
    }

    /// Accessor for the child text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Accessor for the security attributes.
    pub fn security(&self) -> &SecurityAttributes {
        &self.security
    }

    /// Writes the text and security attributes onto an element.
    pub(crate) fn apply_to(&self, element: &mut XmlElement, version: &'static DdmsVersion) {
        if !self.text.is_empty() {
            element.set_text(self.text.clone());
        }
        self.security.add_to(element, version);
    }

    /// Renders the text line followed by the security attribute lines.
    pub(crate) fn output(&self, kind: OutputKind, name: &str, always_print: bool) -> String {
        let mut out = build_output(kind, name, &self.text, always_print);
        out.push_str(&self.security.output(kind, &format!("{}.", name)));
        out
    }

    pub(crate) fn to_json(&self) -> serde_json::Value {
        let mut json = serde_json::json!({ "value": self.text });
        self.security.merge_json(&mut json);
        json
    }
}

/// Qualifier/value attribute pair.
///
/// Several element types carry this shape with slightly different
/// requiredness rules, which stay with the host. The pair itself only knows
/// how to move between attributes, output lines, and JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct QualifierValue {
    qualifier: String,
    value: String,
}

impl QualifierValue {
    /// Creates the pair from raw values.
    pub fn new(qualifier: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            qualifier: qualifier.into(),
            value: value.into(),
        }
    }

    /// Reads the pair from an element's unqualified attributes.
    pub fn from_element(element: &XmlElement) -> Self {
        Self {
            qualifier: element.attribute_value("qualifier", NO_NAMESPACE).to_string(),
            value: element.attribute_value("value", NO_NAMESPACE).to_string(),
        }
    }

    /// Accessor for the qualifier.
    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    /// Accessor for the value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// True when both halves are unset.
    pub fn is_empty(&self) -> bool {
        is_empty(&self.qualifier) && is_empty(&self.value)
    }

    /// Writes the non-empty halves onto an element as attributes.
    pub(crate) fn apply_to(&self, element: &mut XmlElement) {
        if !self.qualifier.is_empty() {
            element.add_attribute("", "qualifier", NO_NAMESPACE, self.qualifier.clone());
        }
        if !self.value.is_empty() {
            element.add_attribute("", "value", NO_NAMESPACE, self.value.clone());
        }
    }

    /// Renders `name.qualifier` and `name.value` lines.
    pub(crate) fn output(&self, kind: OutputKind, name: &str) -> String {
        let mut out = build_output(kind, &format!("{}.qualifier", name), &self.qualifier, false);
        out.push_str(&build_output(kind, &format!("{}.value", name), &self.value, false));
        out
    }

    pub(crate) fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "qualifier": self.qualifier, "value": self.value })
    }
}
