//! Resource-set elements: identifier, title, language, type, source, dates.

use tracing::debug;

use crate::components::security::{SecurityAttributes, SecurityAttributesBuilder};
use crate::components::{
    build_output, combine_hash, hash_seed, is_empty, require_qname, require_valid_date,
    require_valid_uri, require_value, Component, ComponentBuilder, OutputKind, QualifierValue,
    SimpleText, NO_NAMESPACE,
};
use crate::config;
use crate::error::{Error, Result};
use crate::message::ValidationMessage;
use crate::version::{DdmsVersion, Vocabulary};
use crate::xml::XmlElement;

fn ddms_element(version: &'static DdmsVersion, name: &str) -> XmlElement {
    let properties = config::Properties::global();
    XmlElement::new(
        properties.prefix(Vocabulary::Ddms),
        name,
        version.namespace(Vocabulary::Ddms),
    )
}

/// A ddms:identifier element: a unique, resolvable identifier for the
/// described resource.
#[derive(Debug, Clone)]
pub struct Identifier {
    version: &'static DdmsVersion,
    pair: QualifierValue,
    element: XmlElement,
}

impl Identifier {
    /// Local element name.
    pub const NAME: &'static str = "identifier";

    /// Constructs the element from raw values.
    pub fn new(version: &'static DdmsVersion, qualifier: &str, value: &str) -> Result<Self> {
        let pair = QualifierValue::new(qualifier, value);
        let mut element = ddms_element(version, Self::NAME);
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
        let validate = || -> Result<()> {
            require_value("qualifier", pair.qualifier())?;
            require_valid_uri(pair.qualifier())?;
            require_value("value", pair.value())?;
            Ok(())
        };
        validate().map_err(|e| e.at(&locator))?;
        debug!(element = %locator, "validated component");
        Ok(Self {
            version,
            pair,
            element,
        })
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

impl Component for Identifier {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn version(&self) -> &'static DdmsVersion {
        self.version
    }

    fn validation_warnings(&self) -> &[ValidationMessage] {
        &[]
    }

    fn output(&self, kind: OutputKind, prefix: &str) -> String {
        self.pair.output(kind, &format!("{}identifier", prefix))
    }

    fn xml_element(&self) -> &XmlElement {
        &self.element
    }

    fn to_json(&self) -> serde_json::Value {
        self.pair.to_json()
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
            && self.namespace() == other.namespace()
            && self.pair == other.pair
    }
}

impl Eq for Identifier {}

impl std::hash::Hash for Identifier {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        let mut code = hash_seed(self.name(), self.namespace());
        code = combine_hash(code, &self.pair);
        state.write_u64(code);
    }
}

/// Mutable mirror of [`Identifier`].
#[derive(Debug, Clone, Default)]
pub struct IdentifierBuilder {
    /// Qualifier URI
    pub qualifier: String,
    /// Value
    pub value: String,
}

impl ComponentBuilder for IdentifierBuilder {
    type Component = Identifier;

    fn is_empty(&self) -> bool {
        self.qualifier.is_empty() && self.value.is_empty()
    }

    fn commit(&self, version: &'static DdmsVersion) -> Result<Option<Identifier>> {
        if self.is_empty() {
            return Ok(None);
        }
        Identifier::new(version, &self.qualifier, &self.value).map(Some)
    }
}

impl From<&Identifier> for IdentifierBuilder {
    fn from(identifier: &Identifier) -> Self {
        Self {
            qualifier: identifier.qualifier().to_string(),
            value: identifier.value().to_string(),
        }
    }
}

/// A ddms:title element: a required, securely marked name for the
/// described resource.
#[derive(Debug, Clone)]
pub struct Title {
    version: &'static DdmsVersion,
    simple: SimpleText,
    element: XmlElement,
}

impl Title {
    /// Local element name.
    pub const NAME: &'static str = "title";

    /// Constructs the element from raw values.
    pub fn new(
        version: &'static DdmsVersion,
        text: &str,
        security: SecurityAttributes,
    ) -> Result<Self> {
        let simple = SimpleText::new(text, security);
        let mut element = ddms_element(version, Self::NAME);
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
        let validate = || -> Result<()> {
            require_value("title value", simple.text())?;
            simple.security().require_classification()?;
            Ok(())
        };
        validate().map_err(|e| e.at(&locator))?;
        debug!(element = %locator, "validated component");
        Ok(Self {
            version,
            simple,
            element,
        })
    }

    /// Accessor for the title text.
    pub fn text(&self) -> &str {
        self.simple.text()
    }

    /// Accessor for the security attributes.
    pub fn security_attributes(&self) -> &SecurityAttributes {
        self.simple.security()
    }
}

impl Component for Title {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn version(&self) -> &'static DdmsVersion {
        self.version
    }

    fn validation_warnings(&self) -> &[ValidationMessage] {
        &[]
    }

    fn output(&self, kind: OutputKind, prefix: &str) -> String {
        self.simple.output(kind, &format!("{}title", prefix), false)
    }

    fn xml_element(&self) -> &XmlElement {
        &self.element
    }

    fn to_json(&self) -> serde_json::Value {
        self.simple.to_json()
    }
}

impl PartialEq for Title {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
            && self.namespace() == other.namespace()
            && self.simple == other.simple
    }
}

impl Eq for Title {}

impl std::hash::Hash for Title {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        let mut code = hash_seed(self.name(), self.namespace());
        code = combine_hash(code, &self.simple);
        state.write_u64(code);
    }
}

/// Mutable mirror of [`Title`].
#[derive(Debug, Clone, Default)]
pub struct TitleBuilder {
    /// Title text
    pub text: String,
    /// Security attributes
    pub security: SecurityAttributesBuilder,
}

impl ComponentBuilder for TitleBuilder {
    type Component = Title;

    fn is_empty(&self) -> bool {
        self.text.is_empty() && self.security.is_empty()
    }

    fn commit(&self, version: &'static DdmsVersion) -> Result<Option<Title>> {
        if self.is_empty() {
            return Ok(None);
        }
        let security = self.security.commit(version)?;
        Title::new(version, &self.text, security).map(Some)
    }
}

impl From<&Title> for TitleBuilder {
    fn from(title: &Title) -> Self {
        Self {
            text: title.text().to_string(),
            security: SecurityAttributesBuilder::from(title.security_attributes()),
        }
    }
}

/// A ddms:language element: the primary language of the described
/// resource. A value requires an accompanying qualifier.
#[derive(Debug, Clone)]
pub struct Language {
    version: &'static DdmsVersion,
    pair: QualifierValue,
    element: XmlElement,
    warnings: Vec<ValidationMessage>,
}

impl Language {
    /// Local element name.
    pub const NAME: &'static str = "language";

    /// Constructs the element from raw values.
    pub fn new(version: &'static DdmsVersion, qualifier: &str, value: &str) -> Result<Self> {
        let pair = QualifierValue::new(qualifier, value);
        let mut element = ddms_element(version, Self::NAME);
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
        if !is_empty(pair.value()) {
            require_value("qualifier", pair.qualifier()).map_err(|e| e.at(&locator))?;
        }

        let mut warnings = Vec::new();
        if pair.is_empty() {
            warnings.push(ValidationMessage::warning(
                "Neither a qualifier nor a value was set on this language.",
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

    /// Accessor for the qualifier.
    pub fn qualifier(&self) -> &str {
        self.pair.qualifier()
    }

    /// Accessor for the value.
    pub fn value(&self) -> &str {
        self.pair.value()
    }
}

impl Component for Language {
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
        self.pair.output(kind, &format!("{}language", prefix))
    }

    fn xml_element(&self) -> &XmlElement {
        &self.element
    }

    fn to_json(&self) -> serde_json::Value {
        self.pair.to_json()
    }
}

impl PartialEq for Language {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
            && self.namespace() == other.namespace()
            && self.pair == other.pair
    }
}

impl Eq for Language {}

impl std::hash::Hash for Language {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        let mut code = hash_seed(self.name(), self.namespace());
        code = combine_hash(code, &self.pair);
        state.write_u64(code);
    }
}

/// Mutable mirror of [`Language`].
#[derive(Debug, Clone, Default)]
pub struct LanguageBuilder {
    /// Qualifier
    pub qualifier: String,
    /// Value
    pub value: String,
}

impl ComponentBuilder for LanguageBuilder {
    type Component = Language;

    fn is_empty(&self) -> bool {
        self.qualifier.is_empty() && self.value.is_empty()
    }

    fn commit(&self, version: &'static DdmsVersion) -> Result<Option<Language>> {
        if self.is_empty() {
            return Ok(None);
        }
        Language::new(version, &self.qualifier, &self.value).map(Some)
    }
}

impl From<&Language> for LanguageBuilder {
    fn from(language: &Language) -> Self {
        Self {
            qualifier: language.qualifier().to_string(),
            value: language.value().to_string(),
        }
    }
}

/// A ddms:type element: the nature or genre of the described resource.
#[derive(Debug, Clone)]
pub struct Type {
    version: &'static DdmsVersion,
    pair: QualifierValue,
    element: XmlElement,
    warnings: Vec<ValidationMessage>,
}

impl Type {
    /// Local element name.
    pub const NAME: &'static str = "type";

    /// Constructs the element from raw values.
    pub fn new(version: &'static DdmsVersion, qualifier: &str, value: &str) -> Result<Self> {
        let pair = QualifierValue::new(qualifier, value);
        let mut element = ddms_element(version, Self::NAME);
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
        if !is_empty(pair.value()) {
            require_value("qualifier", pair.qualifier()).map_err(|e| e.at(&locator))?;
        }

        let mut warnings = Vec::new();
        if pair.is_empty() {
            warnings.push(ValidationMessage::warning(
                "Neither a qualifier nor a value was set on this type.",
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

    /// Accessor for the qualifier.
    pub fn qualifier(&self) -> &str {
        self.pair.qualifier()
    }

    /// Accessor for the value.
    pub fn value(&self) -> &str {
        self.pair.value()
    }
}

impl Component for Type {
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
        self.pair.output(kind, &format!("{}type", prefix))
    }

    fn xml_element(&self) -> &XmlElement {
        &self.element
    }

    fn to_json(&self) -> serde_json::Value {
        self.pair.to_json()
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
            && self.namespace() == other.namespace()
            && self.pair == other.pair
    }
}

impl Eq for Type {}

impl std::hash::Hash for Type {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        let mut code = hash_seed(self.name(), self.namespace());
        code = combine_hash(code, &self.pair);
        state.write_u64(code);
    }
}

/// Mutable mirror of [`Type`].
#[derive(Debug, Clone, Default)]
pub struct TypeBuilder {
    /// Qualifier
    pub qualifier: String,
    /// Value
    pub value: String,
}

impl ComponentBuilder for TypeBuilder {
    type Component = Type;

    fn is_empty(&self) -> bool {
        self.qualifier.is_empty() && self.value.is_empty()
    }

    fn commit(&self, version: &'static DdmsVersion) -> Result<Option<Type>> {
        if self.is_empty() {
            return Ok(None);
        }
        Type::new(version, &self.qualifier, &self.value).map(Some)
    }
}

impl From<&Type> for TypeBuilder {
    fn from(kind: &Type) -> Self {
        Self {
            qualifier: kind.qualifier().to_string(),
            value: kind.value().to_string(),
        }
    }
}

/// A ddms:source element: a reference to the resource from which the
/// described resource was derived.
#[derive(Debug, Clone)]
pub struct Source {
    version: &'static DdmsVersion,
    pair: QualifierValue,
    schema_qualifier: String,
    schema_href: String,
    security: SecurityAttributes,
    element: XmlElement,
    warnings: Vec<ValidationMessage>,
}

impl Source {
    /// Local element name.
    pub const NAME: &'static str = "source";

    /// Constructs the element from raw values.
    pub fn new(
        version: &'static DdmsVersion,
        qualifier: &str,
        value: &str,
        schema_qualifier: &str,
        schema_href: &str,
        security: SecurityAttributes,
    ) -> Result<Self> {
        let pair = QualifierValue::new(qualifier, value);
        let mut element = ddms_element(version, Self::NAME);
        pair.apply_to(&mut element);
        if !schema_qualifier.is_empty() {
            element.add_attribute("", "schemaQualifier", NO_NAMESPACE, schema_qualifier);
        }
        if !schema_href.is_empty() {
            element.add_attribute("", "schemaHref", NO_NAMESPACE, schema_href);
        }
        security.add_to(&mut element, version);
        Self::validated(
            version,
            pair,
            schema_qualifier.to_string(),
            schema_href.to_string(),
            security,
            element,
        )
    }

    /// Constructs the element from parsed XML.
    pub fn from_element(version: &'static DdmsVersion, element: XmlElement) -> Result<Self> {
        require_qname(&element, Self::NAME, version.namespace(Vocabulary::Ddms))
            .map_err(|e| e.at(&element.qualified_name()))?;
        let pair = QualifierValue::from_element(&element);
        let schema_qualifier = element
            .attribute_value("schemaQualifier", NO_NAMESPACE)
            .to_string();
        let schema_href = element.attribute_value("schemaHref", NO_NAMESPACE).to_string();
        let security = SecurityAttributes::from_element(version, &element)
            .map_err(|e| e.at(&element.qualified_name()))?;
        Self::validated(version, pair, schema_qualifier, schema_href, security, element)
    }

    fn validated(
        version: &'static DdmsVersion,
        pair: QualifierValue,
        schema_qualifier: String,
        schema_href: String,
        security: SecurityAttributes,
        element: XmlElement,
    ) -> Result<Self> {
        let locator = element.qualified_name();
        let validate = || -> Result<()> {
            if !is_empty(&schema_href) {
                require_valid_uri(&schema_href)?;
            }
            if !security.is_empty() && version.is_before("3.0") {
                return Err(Error::invalid(
                    "Security attributes cannot be applied to this component until DDMS 3.0 or later.",
                ));
            }
            Ok(())
        };
        validate().map_err(|e| e.at(&locator))?;

        let mut warnings = Vec::new();
        if pair.is_empty() && is_empty(&schema_qualifier) && is_empty(&schema_href) {
            warnings.push(ValidationMessage::warning(
                "A completely empty ddms:source element was found.",
                &locator,
            ));
        }
        debug!(element = %locator, warnings = warnings.len(), "validated component");
        Ok(Self {
            version,
            pair,
            schema_qualifier,
            schema_href,
            security,
            element,
            warnings,
        })
    }

    /// Accessor for the qualifier.
    pub fn qualifier(&self) -> &str {
        self.pair.qualifier()
    }

    /// Accessor for the value.
    pub fn value(&self) -> &str {
        self.pair.value()
    }

    /// Accessor for the schemaQualifier attribute.
    pub fn schema_qualifier(&self) -> &str {
        &self.schema_qualifier
    }

    /// Accessor for the schemaHref attribute.
    pub fn schema_href(&self) -> &str {
        &self.schema_href
    }

    /// Accessor for the security attributes.
    pub fn security_attributes(&self) -> &SecurityAttributes {
        &self.security
    }
}

impl Component for Source {
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
        let name = format!("{}source", prefix);
        let mut out = self.pair.output(kind, &name);
        out.push_str(&build_output(
            kind,
            &format!("{}.schemaQualifier", name),
            &self.schema_qualifier,
            false,
        ));
        out.push_str(&build_output(
            kind,
            &format!("{}.schemaHref", name),
            &self.schema_href,
            false,
        ));
        out.push_str(&self.security.output(kind, &format!("{}.", name)));
        out
    }

    fn xml_element(&self) -> &XmlElement {
        &self.element
    }

    fn to_json(&self) -> serde_json::Value {
        let mut json = self.pair.to_json();
        if !self.schema_qualifier.is_empty() {
            json["schemaQualifier"] = self.schema_qualifier.clone().into();
        }
        if !self.schema_href.is_empty() {
            json["schemaHref"] = self.schema_href.clone().into();
        }
        self.security.merge_json(&mut json);
        json
    }
}

impl PartialEq for Source {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
            && self.namespace() == other.namespace()
            && self.pair == other.pair
            && self.schema_qualifier == other.schema_qualifier
            && self.schema_href == other.schema_href
            && self.security == other.security
    }
}

impl Eq for Source {}

impl std::hash::Hash for Source {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        let mut code = hash_seed(self.name(), self.namespace());
        code = combine_hash(code, &self.pair);
        code = combine_hash(code, &self.schema_qualifier);
        code = combine_hash(code, &self.schema_href);
        code = combine_hash(code, &self.security);
        state.write_u64(code);
    }
}

/// Mutable mirror of [`Source`].
#[derive(Debug, Clone, Default)]
pub struct SourceBuilder {
    /// Qualifier
    pub qualifier: String,
    /// Value
    pub value: String,
    /// schemaQualifier attribute
    pub schema_qualifier: String,
    /// schemaHref attribute
    pub schema_href: String,
    /// Security attributes
    pub security: SecurityAttributesBuilder,
}

impl ComponentBuilder for SourceBuilder {
    type Component = Source;

    fn is_empty(&self) -> bool {
        self.qualifier.is_empty()
            && self.value.is_empty()
            && self.schema_qualifier.is_empty()
            && self.schema_href.is_empty()
            && self.security.is_empty()
    }

    fn commit(&self, version: &'static DdmsVersion) -> Result<Option<Source>> {
        if self.is_empty() {
            return Ok(None);
        }
        let security = self.security.commit(version)?;
        Source::new(
            version,
            &self.qualifier,
            &self.value,
            &self.schema_qualifier,
            &self.schema_href,
            security,
        )
        .map(Some)
    }
}

impl From<&Source> for SourceBuilder {
    fn from(source: &Source) -> Self {
        Self {
            qualifier: source.qualifier().to_string(),
            value: source.value().to_string(),
            schema_qualifier: source.schema_qualifier().to_string(),
            schema_href: source.schema_href().to_string(),
            security: SecurityAttributesBuilder::from(source.security_attributes()),
        }
    }
}

/// A ddms:dates element: calendar dates associated with the described
/// resource, in any of the four DDMS date precisions.
#[derive(Debug, Clone)]
pub struct Dates {
    version: &'static DdmsVersion,
    created: String,
    posted: String,
    valid_til: String,
    info_cut_off: String,
    approved_on: String,
    received_on: String,
    element: XmlElement,
    warnings: Vec<ValidationMessage>,
}

impl Dates {
    /// Local element name.
    pub const NAME: &'static str = "dates";

    /// Constructs the element from raw values.
    pub fn new(
        version: &'static DdmsVersion,
        created: &str,
        posted: &str,
        valid_til: &str,
        info_cut_off: &str,
        approved_on: &str,
        received_on: &str,
    ) -> Result<Self> {
        let mut element = ddms_element(version, Self::NAME);
        for (name, value) in [
            ("created", created),
            ("posted", posted),
            ("validTil", valid_til),
            ("infoCutOff", info_cut_off),
            ("approvedOn", approved_on),
            ("receivedOn", received_on),
        ] {
            if !value.is_empty() {
                element.add_attribute("", name, NO_NAMESPACE, value);
            }
        }
        Self::validated(
            version,
            created.to_string(),
            posted.to_string(),
            valid_til.to_string(),
            info_cut_off.to_string(),
            approved_on.to_string(),
            received_on.to_string(),
            element,
        )
    }

    /// Constructs the element from parsed XML.
    pub fn from_element(version: &'static DdmsVersion, element: XmlElement) -> Result<Self> {
        require_qname(&element, Self::NAME, version.namespace(Vocabulary::Ddms))
            .map_err(|e| e.at(&element.qualified_name()))?;
        let created = element.attribute_value("created", NO_NAMESPACE).to_string();
        let posted = element.attribute_value("posted", NO_NAMESPACE).to_string();
        let valid_til = element.attribute_value("validTil", NO_NAMESPACE).to_string();
        let info_cut_off = element.attribute_value("infoCutOff", NO_NAMESPACE).to_string();
        let approved_on = element.attribute_value("approvedOn", NO_NAMESPACE).to_string();
        let received_on = element.attribute_value("receivedOn", NO_NAMESPACE).to_string();
        Self::validated(
            version,
            created,
            posted,
            valid_til,
            info_cut_off,
            approved_on,
            received_on,
            element,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn validated(
        version: &'static DdmsVersion,
        created: String,
        posted: String,
        valid_til: String,
        info_cut_off: String,
        approved_on: String,
        received_on: String,
        element: XmlElement,
    ) -> Result<Self> {
        let locator = element.qualified_name();
        for value in [
            &created,
            &posted,
            &valid_til,
            &info_cut_off,
            &approved_on,
            &received_on,
        ] {
            if !value.is_empty() {
                require_valid_date(value).map_err(|e| e.at(&locator))?;
            }
        }
        if !approved_on.is_empty() && version.is_before("3.1") {
            return Err(Error::invalid(
                "This component cannot have an approvedOn date until DDMS 3.1 or later.",
            )
            .at(&locator));
        }
        if !received_on.is_empty() && version.is_before("4.0.1") {
            return Err(Error::invalid(
                "This component cannot have a receivedOn date until DDMS 4.0.1 or later.",
            )
            .at(&locator));
        }

        let mut warnings = Vec::new();
        if created.is_empty()
            && posted.is_empty()
            && valid_til.is_empty()
            && info_cut_off.is_empty()
            && approved_on.is_empty()
            && received_on.is_empty()
        {
            warnings.push(ValidationMessage::warning(
                "A completely empty ddms:dates element was found.",
                &locator,
            ));
        }
        debug!(element = %locator, warnings = warnings.len(), "validated component");
        Ok(Self {
            version,
            created,
            posted,
            valid_til,
            info_cut_off,
            approved_on,
            received_on,
            element,
            warnings,
        })
    }

    /// Accessor for the created date.
    pub fn created(&self) -> &str {
        &self.created
    }

    /// Accessor for the posted date.
    pub fn posted(&self) -> &str {
        &self.posted
    }

    /// Accessor for the validTil date.
    pub fn valid_til(&self) -> &str {
        &self.valid_til
    }

    /// Accessor for the infoCutOff date.
    pub fn info_cut_off(&self) -> &str {
        &self.info_cut_off
    }

    /// Accessor for the approvedOn date, available from DDMS 3.1.
    pub fn approved_on(&self) -> &str {
        &self.approved_on
    }

    /// Accessor for the receivedOn date, available from DDMS 4.0.1.
    pub fn received_on(&self) -> &str {
        &self.received_on
    }
}

impl Component for Dates {
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
        let name = format!("{}dates", prefix);
        let mut out = String::new();
        for (suffix, value) in [
            ("created", &self.created),
            ("posted", &self.posted),
            ("validTil", &self.valid_til),
            ("infoCutOff", &self.info_cut_off),
            ("approvedOn", &self.approved_on),
            ("receivedOn", &self.received_on),
        ] {
            out.push_str(&build_output(kind, &format!("{}.{}", name, suffix), value, false));
        }
        out
    }

    fn xml_element(&self) -> &XmlElement {
        &self.element
    }

    fn to_json(&self) -> serde_json::Value {
        let mut json = serde_json::json!({});
        for (name, value) in [
            ("created", &self.created),
            ("posted", &self.posted),
            ("validTil", &self.valid_til),
            ("infoCutOff", &self.info_cut_off),
            ("approvedOn", &self.approved_on),
            ("receivedOn", &self.received_on),
        ] {
            if !value.is_empty() {
                json[name] = value.clone().into();
            }
        }
        json
    }
}

impl PartialEq for Dates {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
            && self.namespace() == other.namespace()
            && self.created == other.created
            && self.posted == other.posted
            && self.valid_til == other.valid_til
            && self.info_cut_off == other.info_cut_off
            && self.approved_on == other.approved_on
            && self.received_on == other.received_on
    }
}

impl Eq for Dates {}

impl std::hash::Hash for Dates {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        let mut code = hash_seed(self.name(), self.namespace());
        code = combine_hash(code, &self.created);
        code = combine_hash(code, &self.posted);
        code = combine_hash(code, &self.valid_til);
        code = combine_hash(code, &self.info_cut_off);
        code = combine_hash(code, &self.approved_on);
        code = combine_hash(code, &self.received_on);
        state.write_u64(code);
    }
}

/// Mutable mirror of [`Dates`].
#[derive(Debug, Clone, Default)]
pub struct DatesBuilder {
    /// created date
    pub created: String,
    /// posted date
    pub posted: String,
    /// validTil date
    pub valid_til: String,
    /// infoCutOff date
    pub info_cut_off: String,
    /// approvedOn date (DDMS 3.1 and later)
    pub approved_on: String,
    /// receivedOn date (DDMS 4.0.1 and later)
    pub received_on: String,
}

impl ComponentBuilder for DatesBuilder {
    type Component = Dates;

    fn is_empty(&self) -> bool {
        self.created.is_empty()
            && self.posted.is_empty()
            && self.valid_til.is_empty()
            && self.info_cut_off.is_empty()
            && self.approved_on.is_empty()
            && self.received_on.is_empty()
    }

    fn commit(&self, version: &'static DdmsVersion) -> Result<Option<Dates>> {
        if self.is_empty() {
            return Ok(None);
        }
        Dates::new(
            version,
            &self.created,
            &self.posted,
            &self.valid_til,
            &self.info_cut_off,
            &self.approved_on,
            &self.received_on,
        )
        .map(Some)
    }
}

impl From<&Dates> for DatesBuilder {
    fn from(dates: &Dates) -> Self {
        Self {
            created: dates.created().to_string(),
            posted: dates.posted().to_string(),
            valid_til: dates.valid_til().to_string(),
            info_cut_off: dates.info_cut_off().to_string(),
            approved_on: dates.approved_on().to_string(),
            received_on: dates.received_on().to_string(),
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

    const URI: &str = "http://purl.org/dc/terms/URI";

    #[test]
    fn test_identifier_requires_both_halves() {
        let version = v("4.0.1");
        assert!(Identifier::new(version, URI, "DDMS-Test").is_ok());

        let err = Identifier::new(version, "", "DDMS-Test").unwrap_err();
        assert_eq!(err.to_string(), "qualifier is required.");
        assert_eq!(err.locator(), "/ddms:identifier");

        let err = Identifier::new(version, URI, "").unwrap_err();
        assert_eq!(err.to_string(), "value is required.");
    }

    #[test]
    fn test_identifier_qualifier_must_be_uri() {
        assert!(Identifier::new(v("4.0.1"), "http://<>", "DDMS-Test").is_err());
    }

    #[test]
    fn test_identifier_roundtrip() {
        let version = v("3.1");
        let built = Identifier::new(version, URI, "DDMS-Test").unwrap();
        let reparsed =
            Identifier::from_element(version, XmlElement::parse(&built.to_xml()).unwrap()).unwrap();
        assert_eq!(built, reparsed);
        assert_eq!(built.to_text(), "identifier.qualifier: http://purl.org/dc/terms/URI\nidentifier.value: DDMS-Test\n");
    }

    #[test]
    fn test_title_requires_value_and_marking() {
        let version = v("4.0.1");
        assert!(Title::new(version, "Sample Title", unclassified(version)).is_ok());

        let err = Title::new(version, "", unclassified(version)).unwrap_err();
        assert_eq!(err.to_string(), "title value is required.");

        let err = Title::new(version, "Sample Title", SecurityAttributes::default()).unwrap_err();
        assert_eq!(err.to_string(), "classification is required.");
        assert_eq!(err.locator(), "/ddms:title");
    }

    #[test]
    fn test_title_marking_required_in_every_version() {
        for token in ["2.0", "3.0", "3.1", "4.0.1"] {
            let version = v(token);
            assert!(
                Title::new(version, "Sample Title", SecurityAttributes::default()).is_err(),
                "unmarked title should fail under {}",
                token
            );
        }
    }

    #[test]
    fn test_title_roundtrip() {
        let version = v("4.0.1");
        let built = Title::new(version, "Sample Title", unclassified(version)).unwrap();
        let reparsed =
            Title::from_element(version, XmlElement::parse(&built.to_xml()).unwrap()).unwrap();
        assert_eq!(built, reparsed);
        assert_eq!(built.to_html(), reparsed.to_html());
    }

    #[test]
    fn test_language_warnings() {
        let empty = Language::new(v("4.0.1"), "", "").unwrap();
        assert_eq!(
            empty.validation_warnings()[0].text(),
            "Neither a qualifier nor a value was set on this language."
        );

        let no_value = Language::new(v("4.0.1"), URI, "").unwrap();
        assert_eq!(
            no_value.validation_warnings()[0].text(),
            "A qualifier has been set without an accompanying value attribute."
        );

        let full = Language::new(v("4.0.1"), URI, "en").unwrap();
        assert!(full.validation_warnings().is_empty());
    }

    #[test]
    fn test_language_value_requires_qualifier() {
        let err = Language::new(v("4.0.1"), "", "en").unwrap_err();
        assert_eq!(err.to_string(), "qualifier is required.");
        assert_eq!(err.locator(), "/ddms:language");
        assert!(Language::new(v("4.0.1"), URI, "en").is_ok());
    }

    #[test]
    fn test_type_value_requires_qualifier() {
        let err = Type::new(v("4.0.1"), "", "Imagery").unwrap_err();
        assert_eq!(err.to_string(), "qualifier is required.");
        assert_eq!(err.locator(), "/ddms:type");
        assert!(Type::new(v("4.0.1"), "DCMITYPE", "Imagery").is_ok());
    }

    #[test]
    fn test_source_schema_href_must_be_uri() {
        let version = v("4.0.1");
        let err = Source::new(version, "", "", "vocab", "http://<>", SecurityAttributes::default())
            .unwrap_err();
        assert!(err.to_string().contains("Invalid URI"));
    }

    #[test]
    fn test_source_security_version_range() {
        let attrs_20 = unclassified(v("2.0"));
        let err = Source::new(v("2.0"), URI, "value", "", "", attrs_20).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Security attributes cannot be applied to this component until DDMS 3.0 or later."
        );

        let attrs_30 = unclassified(v("3.0"));
        assert!(Source::new(v("3.0"), URI, "value", "", "", attrs_30).is_ok());
    }

    #[test]
    fn test_source_empty_warning() {
        let source =
            Source::new(v("4.0.1"), "", "", "", "", SecurityAttributes::default()).unwrap();
        assert_eq!(
            source.validation_warnings()[0].text(),
            "A completely empty ddms:source element was found."
        );
    }

    #[test]
    fn test_source_roundtrip() {
        let version = v("4.0.1");
        let built = Source::new(
            version,
            URI,
            "value",
            "vocab",
            "http://example.com/schema.xsd",
            unclassified(version),
        )
        .unwrap();
        let reparsed =
            Source::from_element(version, XmlElement::parse(&built.to_xml()).unwrap()).unwrap();
        assert_eq!(built, reparsed);
    }

    #[test]
    fn test_dates_accepts_all_precisions() {
        let dates = Dates::new(
            v("4.0.1"),
            "2011",
            "2011-08",
            "2011-08-30",
            "2011-08-30T12:00:00Z",
            "2011-08-30",
            "2011-08-30",
        )
        .unwrap();
        assert!(dates.validation_warnings().is_empty());
        assert_eq!(dates.created(), "2011");
    }

    #[test]
    fn test_dates_rejects_malformed_date() {
        let err = Dates::new(v("4.0.1"), "yesterday", "", "", "", "", "").unwrap_err();
        assert!(err.to_string().contains("date datatype"));
        assert_eq!(err.locator(), "/ddms:dates");
    }

    #[test]
    fn test_dates_approved_on_version_range() {
        let err = Dates::new(v("3.0"), "", "", "", "", "2011-08-30", "").unwrap_err();
        assert_eq!(
            err.to_string(),
            "This component cannot have an approvedOn date until DDMS 3.1 or later."
        );
        assert_eq!(err.locator(), "/ddms:dates");
        assert!(Dates::new(v("3.1"), "", "", "", "", "2011-08-30", "").is_ok());
    }

    #[test]
    fn test_dates_received_on_version_range() {
        let err = Dates::new(v("3.1"), "", "", "", "", "", "2011-08-30").unwrap_err();
        assert_eq!(
            err.to_string(),
            "This component cannot have a receivedOn date until DDMS 4.0.1 or later."
        );

        let accepted = Dates::new(v("4.0.1"), "", "", "", "", "", "2011-08-30").unwrap();
        assert_eq!(accepted.received_on(), "2011-08-30");
        assert!(accepted.validation_warnings().is_empty());
    }

    #[test]
    fn test_dates_empty_warning_and_roundtrip() {
        let version = v("3.0");
        let empty = Dates::new(version, "", "", "", "", "", "").unwrap();
        assert_eq!(
            empty.validation_warnings()[0].text(),
            "A completely empty ddms:dates element was found."
        );

        let built = Dates::new(version, "2011-08-30", "", "2012-01-01", "", "", "").unwrap();
        let reparsed =
            Dates::from_element(version, XmlElement::parse(&built.to_xml()).unwrap()).unwrap();
        assert_eq!(built, reparsed);
    }

    #[test]
    fn test_builders_empty_commit_none() {
        let version = v("4.0.1");
        assert!(IdentifierBuilder::default().commit(version).unwrap().is_none());
        assert!(TitleBuilder::default().commit(version).unwrap().is_none());
        assert!(LanguageBuilder::default().commit(version).unwrap().is_none());
        assert!(TypeBuilder::default().commit(version).unwrap().is_none());
        assert!(SourceBuilder::default().commit(version).unwrap().is_none());
        assert!(DatesBuilder::default().commit(version).unwrap().is_none());
    }

    #[test]
    fn test_builders_seed_from_components() {
        let version = v("4.0.1");
        let identifier = Identifier::new(version, URI, "DDMS-Test").unwrap();
        let rebuilt = IdentifierBuilder::from(&identifier)
            .commit(version)
            .unwrap()
            .unwrap();
        assert_eq!(identifier, rebuilt);

        let dates = Dates::new(version, "2011", "", "", "", "", "").unwrap();
        let rebuilt = DatesBuilder::from(&dates).commit(version).unwrap().unwrap();
        assert_eq!(dates, rebuilt);
    }

    #[test]
    fn test_builder_propagates_validation_failure() {
        let mut builder = IdentifierBuilder::default();
        builder.value = "DDMS-Test".into();
        let err = builder.commit(v("4.0.1")).unwrap_err();
        assert_eq!(err.to_string(), "qualifier is required.");
    }
}
