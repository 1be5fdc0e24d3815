//! Validation messages produced while constructing DDMS components.
//!
//! Components are validated during instantiation, so a component is either
//! valid or does not exist. A fatal finding is carried inside
//! [`Error::Invalid`](crate::error::Error::Invalid); non-fatal findings are
//! stored on the component itself as warnings and can be inspected after
//! construction.

use std::fmt;

/// Prefix for each segment of a locator path.
pub const LOCATOR_PREFIX: &str = "/";

/// The severity of a validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum Severity {
    /// Fatal finding, aborts construction
    Error,
    /// Informational finding, accumulated on the component
    Warning,
}

impl Severity {
    /// Returns the display label for this severity.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "Error",
            Severity::Warning => "Warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single validation finding with a structural locator.
///
/// The locator is a slash-separated path of qualified element names rooted
/// at the element that reported the finding, e.g.
/// `/ddms:format/ddms:Media/ddms:extent`. An empty locator means the
/// finding has not yet been attributed to a position in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct ValidationMessage {
    severity: Severity,
    text: String,
    locator: String,
}

impl ValidationMessage {
    fn new(severity: Severity, text: impl Into<String>, locator: impl AsRef<str>) -> Self {
        let locator = locator.as_ref();
        let locator = if locator.is_empty() {
            String::new()
        } else if locator.starts_with(LOCATOR_PREFIX) {
            locator.to_string()
        } else {
            format!("{}{}", LOCATOR_PREFIX, locator)
        };
        Self {
            severity,
            text: text.into(),
            locator,
        }
    }

    /// Creates an error message.
    pub fn error(text: impl Into<String>, locator: impl AsRef<str>) -> Self {
        Self::new(Severity::Error, text, locator)
    }

    /// Creates a warning message.
    pub fn warning(text: impl Into<String>, locator: impl AsRef<str>) -> Self {
        Self::new(Severity::Warning, text, locator)
    }

    /// Returns a copy of this message with a parent locator segment
    /// prepended.
    ///
    /// Used when bubbling child findings up to a parent: the parent's
    /// qualified name (plus any wrapper suffix) becomes the leading segment
    /// of the child's locator.
    pub fn prefixed(&self, segment: &str) -> Self {
        Self::new(
            self.severity,
            self.text.clone(),
            format!("{}{}", segment, self.locator),
        )
    }

    /// Accessor for the severity.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Accessor for the description text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Accessor for the locator path.
    pub fn locator(&self) -> &str {
        &self.locator
    }
}

impl fmt::Display for ValidationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.text)?;
        if !self.locator.is_empty() {
            write!(f, " (at {})", self.locator)?;
        }
        Ok(())
    }
}
