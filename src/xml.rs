//! Minimal XML element tree consumed and produced by components.
//!
//! This is the boundary with the external XML machinery: `quick-xml` does
//! the actual parsing and serialization, and the core only ever sees this
//! tree. Components read node names, namespaces, attribute values, and
//! child text from it; raw-value constructors build one and serialize it
//! through [`XmlElement::to_xml`].

use crate::error::Result;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use quick_xml::Writer;
use std::str;
use tracing::trace;

fn push_declaration(start: &mut BytesStart<'_>, prefix: &str, namespace: &str) {
    let declaration = if prefix.is_empty() {
        "xmlns".to_string()
    } else {
        format!("xmlns:{}", prefix)
    };
    start.push_attribute((declaration.as_str(), namespace));
}

fn resolved_namespace(resolve: &ResolveResult<'_>) -> Result<String> {
    match resolve {
        ResolveResult::Bound(ns) => Ok(str::from_utf8(ns.0)?.to_string()),
        _ => Ok(String::new()),
    }
}

/// A single XML attribute with namespace information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    /// Namespace prefix (may be empty)
    pub prefix: String,
    /// Local attribute name
    pub name: String,
    /// Namespace URI (empty for unqualified attributes)
    pub namespace: String,
    /// Attribute value
    pub value: String,
}

impl XmlAttribute {
    /// Returns the qualified attribute name.
    pub fn qualified_name(&self) -> String {
        if self.prefix.is_empty() {
            self.name.clone()
        } else {
            format!("{}:{}", self.prefix, self.name)
        }
    }
}

/// An XML element with namespace-aware attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    prefix: String,
    name: String,
    namespace: String,
    attributes: Vec<XmlAttribute>,
    children: Vec<XmlElement>,
    text: String,
}

impl XmlElement {
    /// Creates a new element with no attributes, children, or text.
    pub fn new(
        prefix: impl Into<String>,
        name: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            name: name.into(),
            namespace: namespace.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            text: String::new(),
        }
    }

    /// Creates a new element with child text.
    pub fn with_text(
        prefix: impl Into<String>,
        name: impl Into<String>,
        namespace: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        let mut element = Self::new(prefix, name, namespace);
        element.text = text.into();
        element
    }

    /// Accessor for the local name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Accessor for the namespace prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Accessor for the namespace URI.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the qualified element name (`prefix:name`, or just the name
    /// when there is no prefix).
    pub fn qualified_name(&self) -> String {
        if self.prefix.is_empty() {
            self.name.clone()
        } else {
            format!("{}:{}", self.prefix, self.name)
        }
    }

    /// Accessor for the concatenated child text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Sets the child text.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Appends a child element.
    pub fn append_child(&mut self, child: XmlElement) {
        self.children.push(child);
    }

    /// Adds an attribute.
    pub fn add_attribute(
        &mut self,
        prefix: impl Into<String>,
        name: impl Into<String>,
        namespace: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.attributes.push(XmlAttribute {
            prefix: prefix.into(),
            name: name.into(),
            namespace: namespace.into(),
            value: value.into(),
        });
    }

    /// Looks up an attribute value by local name and namespace. Returns an
    /// empty string if the attribute does not exist.
    pub fn attribute_value(&self, name: &str, namespace: &str) -> &str {
        self.attributes
            .iter()
            .find(|a| a.name == name && a.namespace == namespace)
            .map(|a| a.value.as_str())
            .unwrap_or("")
    }

    /// Accessor for all attributes.
    pub fn attributes(&self) -> &[XmlAttribute] {
        &self.attributes
    }

    /// Accessor for all child elements.
    pub fn children(&self) -> &[XmlElement] {
        &self.children
    }

    /// Returns the first child element with the given name and namespace.
    pub fn first_child(&self, name: &str, namespace: &str) -> Option<&XmlElement> {
        self.children
            .iter()
            .find(|c| c.name == name && c.namespace == namespace)
    }

    /// Counts child elements with the given name and namespace.
    pub fn child_count(&self, name: &str, namespace: &str) -> usize {
        self.children
            .iter()
            .filter(|c| c.name == name && c.namespace == namespace)
            .count()
    }

    /// Returns the child text of the first matching child element, or an
    /// empty string if there is no such child.
    pub fn child_text(&self, name: &str, namespace: &str) -> &str {
        self.first_child(name, namespace)
            .map(|c| c.text())
            .unwrap_or("")
    }

    /// Parses a well-formed XML string into an element tree.
    ///
    /// Namespace prefixes are resolved; `xmlns` declarations themselves are
    /// consumed and not kept as attributes. Malformed input surfaces as
    /// [`Error::XmlParse`](crate::error::Error::XmlParse).
    pub fn parse(xml: &str) -> Result<XmlElement> {
        let mut reader = NsReader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_resolved_event()? {
                (resolve, Event::Start(start)) => {
                    let namespace = resolved_namespace(&resolve)?;
                    let element = Self::element_from_start(&reader, namespace, &start)?;
                    stack.push(element);
                }
                (resolve, Event::Empty(start)) => {
                    let namespace = resolved_namespace(&resolve)?;
                    let element = Self::element_from_start(&reader, namespace, &start)?;
                    Self::attach(&mut stack, &mut root, element);
                }
                (_, Event::End(_)) => {
                    if let Some(element) = stack.pop() {
                        Self::attach(&mut stack, &mut root, element);
                    }
                }
                (_, Event::Text(text)) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&text.unescape()?);
                    }
                }
                (_, Event::CData(data)) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(str::from_utf8(&data)?);
                    }
                }
                (_, Event::Eof) => break,
                _ => {}
            }
        }

        if let Some(element) = &root {
            trace!(root = %element.qualified_name(), "parsed XML input");
        }
        root.ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "no root element").into()
        })
    }

    fn element_from_start<R>(
        reader: &NsReader<R>,
        namespace: String,
        start: &BytesStart<'_>,
    ) -> Result<XmlElement> {
        let prefix = match start.name().prefix() {
            Some(p) => str::from_utf8(p.into_inner())?.to_string(),
            None => String::new(),
        };
        let name = str::from_utf8(start.local_name().into_inner())?.to_string();

        let mut element = XmlElement::new(prefix, name, namespace);
        for attr in start.attributes() {
            let attr = attr?;
            // xmlns declarations are bookkeeping, not data.
            if attr.key.as_namespace_binding().is_some() {
                continue;
            }
            let (attr_resolve, local) = reader.resolve_attribute(attr.key);
            let attr_namespace = resolved_namespace(&attr_resolve)?;
            let attr_prefix = match attr.key.prefix() {
                Some(p) => str::from_utf8(p.into_inner())?.to_string(),
                None => String::new(),
            };
            element.attributes.push(XmlAttribute {
                prefix: attr_prefix,
                name: str::from_utf8(local.into_inner())?.to_string(),
                namespace: attr_namespace,
                value: attr.unescape_value()?.to_string(),
            });
        }
        Ok(element)
    }

    fn attach(stack: &mut Vec<XmlElement>, root: &mut Option<XmlElement>, element: XmlElement) {
        if let Some(parent) = stack.last_mut() {
            parent.children.push(element);
        } else if root.is_none() {
            *root = Some(element);
        }
    }

    /// Serializes this element (and its subtree) to an XML string.
    ///
    /// Namespace declarations for the subtree are emitted on this element's
    /// start tag, in first-use order. A descendant whose prefix is bound to
    /// a different namespace than the one in scope redeclares it locally,
    /// so the serialized bindings always match the in-memory tree.
    pub fn to_xml(&self) -> String {
        let mut buffer = Vec::new();
        let mut writer = Writer::new(&mut buffer);
        // The tree is built from valid UTF-8, so serialization cannot fail.
        self.write(&mut writer, &mut Vec::new())
            .expect("in-memory XML serialization should not fail");
        String::from_utf8(buffer).expect("generated XML should be valid UTF-8")
    }

    fn write<W: std::io::Write>(
        &self,
        writer: &mut Writer<W>,
        scope: &mut Vec<(String, String)>,
    ) -> Result<()> {
        let qualified = self.qualified_name();
        let mut start = BytesStart::new(qualified.as_str());

        let mut declared = 0;
        if scope.is_empty() {
            for (prefix, namespace) in self.namespaces_in_scope() {
                push_declaration(&mut start, &prefix, &namespace);
                scope.push((prefix, namespace));
                declared += 1;
            }
        }
        for (prefix, namespace) in self.local_bindings() {
            let bound = scope.iter().rev().find(|(p, _)| *p == prefix);
            if bound.map(|(_, n)| n.as_str()) != Some(namespace.as_str()) {
                push_declaration(&mut start, &prefix, &namespace);
                scope.push((prefix, namespace));
                declared += 1;
            }
        }

        for attribute in &self.attributes {
            start.push_attribute((
                attribute.qualified_name().as_str(),
                attribute.value.as_str(),
            ));
        }

        if self.children.is_empty() && self.text.is_empty() {
            writer.write_event(Event::Empty(start))?;
            scope.truncate(scope.len() - declared);
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        if !self.text.is_empty() {
            writer.write_event(Event::Text(BytesText::new(&self.text)))?;
        }
        for child in &self.children {
            child.write(writer, scope)?;
        }
        writer.write_event(Event::End(BytesEnd::new(qualified.as_str())))?;
        scope.truncate(scope.len() - declared);
        Ok(())
    }

    /// Collects the (prefix, namespace) pairs used anywhere in the subtree,
    /// in first-use order, keeping only the first namespace seen per prefix.
    /// A descendant bound to a later namespace redeclares during [`write`].
    fn namespaces_in_scope(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = Vec::new();
        self.collect_namespaces(&mut pairs);
        pairs
    }

    fn collect_namespaces(&self, pairs: &mut Vec<(String, String)>) {
        if !self.namespace.is_empty() && !pairs.iter().any(|(p, _)| *p == self.prefix) {
            pairs.push((self.prefix.clone(), self.namespace.clone()));
        }
        for attribute in &self.attributes {
            if !attribute.namespace.is_empty()
                && !pairs.iter().any(|(p, _)| *p == attribute.prefix)
            {
                pairs.push((attribute.prefix.clone(), attribute.namespace.clone()));
            }
        }
        for child in &self.children {
            child.collect_namespaces(pairs);
        }
    }

    /// The (prefix, namespace) pairs this single element needs in scope.
    fn local_bindings(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = Vec::new();
        if !self.namespace.is_empty() {
            pairs.push((self.prefix.clone(), self.namespace.clone()));
        }
        for attribute in &self.attributes {
            if !attribute.namespace.is_empty()
                && !pairs
                    .iter()
                    .any(|(p, n)| *p == attribute.prefix && *n == attribute.namespace)
            {
                pairs.push((attribute.prefix.clone(), attribute.namespace.clone()));
            }
        }
        pairs
    }
}
