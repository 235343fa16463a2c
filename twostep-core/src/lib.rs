//! twostep core library: view configuration, attribute holder, escaping, errors.
//!
//! Public API surface:
//! - [`config`]: [`ViewConfig`], loaded from YAML
//! - [`attributes`]: [`AttributeHolder`], [`AttributeValue`], [`SafeString`]
//! - [`escaping`]: [`EscapingMethod`] and the escaper functions
//! - [`error`]: [`ConfigError`]

pub mod attributes;
pub mod config;
pub mod error;
pub mod escaping;

pub use attributes::{AttributeHolder, AttributeValue, SafeString};
pub use config::ViewConfig;
pub use error::ConfigError;
pub use escaping::EscapingMethod;
