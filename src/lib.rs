//! A Rust library for the DoD Discovery Metadata Specification (DDMS).
//!
//! This library models DDMS metadata elements as immutable, validating
//! components. A component can be built from raw values, parsed from XML,
//! or assembled through a mutable builder; all three paths run the same
//! fail-fast validation, so a component that exists is always valid against
//! the rules of its DDMS version. Conditions that are legal but suspicious
//! are reported as warnings instead, available on every component.
//!
//! Five DDMS versions are supported (2.0 through 4.0.1), each with its own
//! namespaces and rules. The version is an explicit argument to every
//! constructor rather than ambient state.
//!
//! # Example
//!
//! ```rust,ignore
//! use ddms_rs::components::{Component, Format, FormatBuilder, ComponentBuilder};
//! use ddms_rs::DdmsVersion;
//!
//! let version = DdmsVersion::get("4.0.1")?;
//!
//! let mut builder = FormatBuilder::default();
//! builder.mime_type = "text/xml".to_string();
//! let format = builder.commit(version)?.unwrap();
//!
//! println!("{}", format.to_xml());
//! for warning in format.validation_warnings() {
//!     println!("{}", warning);
//! }
//! ```
//!
//! # Features
//!
//! - `validation`: enables XSD validation against the official DDMS
//!   schemas via libxml2 (requires libxml2 to be installed).

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod components;
pub mod config;
pub mod error;
pub mod message;
pub mod version;
pub mod xml;

#[cfg(feature = "validation")]
pub mod validation;

pub use components::{Component, ComponentBuilder, OutputKind};
pub use config::Properties;
pub use error::{Error, Result};
pub use message::{Severity, ValidationMessage};
pub use version::{DdmsVersion, Vocabulary};
pub use xml::XmlElement;

/// Library version, from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
