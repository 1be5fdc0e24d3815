//! Error types for the DDMS library.

use crate::message::ValidationMessage;
use thiserror::Error;

/// Errors that can occur when working with DDMS components.
#[derive(Error, Debug)]
pub enum Error {
    /// XML parsing error
    #[error("XML parsing error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    /// XML attribute parsing error
    #[error("XML attribute error: {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    /// The requested DDMS version is not supported
    #[error("DDMS version is not supported: {0}")]
    UnsupportedVersion(String),

    /// A component failed validation during construction or commit
    #[error("{}", .0.text())]
    Invalid(ValidationMessage),

    /// Unknown or malformed configuration property
    #[error("configuration error: {0}")]
    Config(String),

    /// XML Schema validation failure
    #[error("schema validation error: {0}")]
    Schema(String),

    /// UTF-8 conversion error
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates a validation error with no locator. The locator is filled in
    /// by [`Error::at`] as the error bubbles up through constructors.
    pub fn invalid(text: impl Into<String>) -> Self {
        Error::Invalid(ValidationMessage::error(text, ""))
    }

    /// Prepends a locator segment to a validation error.
    ///
    /// Constructors call this when a failure escapes, so the final locator
    /// reads top-down, e.g. `/ddms:format/ddms:Media/ddms:extent`.
    pub fn at(self, segment: &str) -> Self {
        match self {
            Error::Invalid(message) => Error::Invalid(message.prefixed(segment)),
            other => other,
        }
    }

    /// Accessor for the locator of a validation error, empty otherwise.
    pub fn locator(&self) -> &str {
        match self {
            Error::Invalid(message) => message.locator(),
            _ => "",
        }
    }
}

/// Result type alias for DDMS operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_locator_prefixing() {
        let err = Error::invalid("A mimeType is required.")
            .at("ddms:Media")
            .at("ddms:format");
        assert_eq!(err.locator(), "/ddms:format/ddms:Media");
        assert!(err.to_string().contains("A mimeType is required."));
    }

    #[test]
    fn test_invalid_display_is_bare_message_text() {
        let err = Error::invalid("qualifier is required.").at("ddms:extent");
        assert_eq!(err.to_string(), "qualifier is required.");
        assert_eq!(err.locator(), "/ddms:extent");
    }

    #[test]
    fn test_at_leaves_other_errors_alone() {
        let err = Error::UnsupportedVersion("9.9".to_string()).at("ddms:title");
        assert_eq!(err.locator(), "");
        assert!(matches!(err, Error::UnsupportedVersion(_)));
    }
}
