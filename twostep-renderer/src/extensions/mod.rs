//! Helper bundles registered into the template engine.
//!
//! A view loads the baseline helper set plus the configured standard helpers.
//! Each helper name maps to the identifier `<Name>_Tera_Extension`; names
//! with a factory in the [`ExtensionRegistry`] are instantiated and added to
//! the engine, the rest are skipped.
//!
//! | Identifier                 | Functions                                                   | Filters |
//! |----------------------------|-------------------------------------------------------------|---------|
//! | `Url_Tera_Extension`       | `url_for`, `link_to`                                        |         |
//! | `Asset_Tera_Extension`     | `stylesheet_tag`, `javascript_include_tag`, `image_tag`, `image_path` | |
//! | `Tag_Tera_Extension`       | `tag`, `content_tag`                                        | `escape_once` |
//! | `Escaping_Tera_Extension`  |                                                             | `esc_specialchars`, `esc_entities`, `esc_js`, `esc_js_no_entities`, `esc_raw` |
//! | `Date_Tera_Extension`      | `now`                                                       | `format_date` |
//! | `Text_Tera_Extension`      |                                                             | `truncate_text`, `simple_format_text` |

use std::collections::HashMap;

use tera::{Tera, Value};

use crate::engine::TemplateEngine;

pub mod asset;
pub mod date;
pub mod escaping;
pub mod tag;
pub mod text;
pub mod url;

pub use asset::AssetExtension;
pub use date::DateExtension;
pub use escaping::EscapingExtension;
pub use tag::TagExtension;
pub use text::TextExtension;
pub use url::UrlExtension;

/// Helpers every view loads, before the configured ones.
pub const BASELINE_HELPERS: [&str; 5] = ["Helper", "Url", "Asset", "Tag", "Escaping"];

/// Suffix turning a helper name into an extension identifier.
pub const EXTENSION_SUFFIX: &str = "_Tera_Extension";

/// A named, stateless bundle of template functions and filters.
pub trait Extension: Send + Sync {
    /// Identifier, e.g. `Url_Tera_Extension`. Unique per engine.
    fn name(&self) -> &'static str;

    /// Register this bundle's functions and filters.
    fn register(&self, tera: &mut Tera);

    fn functions(&self) -> &'static [&'static str] {
        &[]
    }

    fn filters(&self) -> &'static [&'static str] {
        &[]
    }
}

/// `Url` → `Url_Tera_Extension`.
pub fn extension_id(helper: &str) -> String {
    format!("{helper}{EXTENSION_SUFFIX}")
}

/// Baseline helpers followed by `configured`, duplicates removed. The first
/// occurrence of a name keeps its position.
pub fn candidate_helpers(configured: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let all = BASELINE_HELPERS
        .iter()
        .map(|s| s.to_string())
        .chain(configured.iter().cloned());
    for name in all {
        if !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

pub type ExtensionFactory = fn() -> Box<dyn Extension>;

/// Maps extension identifiers to zero-argument constructors.
#[derive(Debug, Clone, Default)]
pub struct ExtensionRegistry {
    factories: HashMap<String, ExtensionFactory>,
}

impl ExtensionRegistry {
    /// An empty registry: every candidate is skipped.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every bundle shipped with this crate.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry
            .register(extension_id("Url"), || Box::new(UrlExtension))
            .register(extension_id("Asset"), || Box::new(AssetExtension))
            .register(extension_id("Tag"), || Box::new(TagExtension))
            .register(extension_id("Escaping"), || Box::new(EscapingExtension))
            .register(extension_id("Date"), || Box::new(DateExtension))
            .register(extension_id("Text"), || Box::new(TextExtension));
        registry
    }

    /// Add or replace the factory for `id`.
    pub fn register(&mut self, id: impl Into<String>, factory: ExtensionFactory) -> &mut Self {
        self.factories.insert(id.into(), factory);
        self
    }

    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    /// A fresh instance for `id`, or `None` when no bundle exists for it.
    pub fn instantiate(&self, id: &str) -> Option<Box<dyn Extension>> {
        self.factories.get(id).map(|factory| factory())
    }

    /// Known identifiers, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

/// Add the bundle for each candidate helper to `engine`, in candidate order.
///
/// Returns the identifiers that were registered. Candidates without a bundle
/// are skipped.
pub fn load_extensions(
    engine: &mut TemplateEngine,
    registry: &ExtensionRegistry,
    configured: &[String],
) -> Vec<String> {
    let mut loaded = Vec::new();
    for helper in candidate_helpers(configured) {
        let id = extension_id(&helper);
        match registry.instantiate(&id) {
            Some(extension) => {
                tracing::debug!(extension = %id, "registering extension");
                engine.add_extension(extension);
                loaded.push(id);
            }
            None => tracing::debug!(helper = %helper, "no extension for helper, skipping"),
        }
    }
    loaded
}

// ---------------------------------------------------------------------------
// Argument helpers shared by the bundles
// ---------------------------------------------------------------------------

pub(crate) fn required_str(
    args: &HashMap<String, Value>,
    key: &str,
    helper: &str,
) -> tera::Result<String> {
    match args.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(tera::Error::msg(format!(
            "{helper}: argument `{key}` must be a string, got {other}"
        ))),
        None => Err(tera::Error::msg(format!(
            "{helper}: missing required argument `{key}`"
        ))),
    }
}

pub(crate) fn optional_str(
    args: &HashMap<String, Value>,
    key: &str,
    helper: &str,
) -> tera::Result<Option<String>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(tera::Error::msg(format!(
            "{helper}: argument `{key}` must be a string, got {other}"
        ))),
    }
}

pub(crate) fn optional_bool(
    args: &HashMap<String, Value>,
    key: &str,
    helper: &str,
) -> tera::Result<bool> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(tera::Error::msg(format!(
            "{helper}: argument `{key}` must be a boolean, got {other}"
        ))),
    }
}

pub(crate) fn optional_usize(
    args: &HashMap<String, Value>,
    key: &str,
    helper: &str,
) -> tera::Result<Option<usize>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| tera::Error::msg(format!("{helper}: `{key}` must be a positive integer"))),
        Some(other) => Err(tera::Error::msg(format!(
            "{helper}: argument `{key}` must be an integer, got {other}"
        ))),
    }
}

/// String form of a scalar value, as used in URLs and tag attributes.
pub(crate) fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_comes_first_and_duplicates_collapse() {
        let configured = vec![
            "Partial".to_string(),
            "Url".to_string(),
            "Date".to_string(),
            "Partial".to_string(),
        ];
        assert_eq!(
            candidate_helpers(&configured),
            ["Helper", "Url", "Asset", "Tag", "Escaping", "Partial", "Date"]
        );
    }

    #[test]
    fn optional_usize_accepts_only_non_negative_integers() {
        let args: HashMap<String, Value> =
            serde_json::from_value(serde_json::json!({"n": 5, "neg": -1, "s": "5"})).unwrap();
        assert_eq!(optional_usize(&args, "n", "t").unwrap(), Some(5));
        assert_eq!(optional_usize(&args, "absent", "t").unwrap(), None);
        assert!(optional_usize(&args, "neg", "t").is_err());
        assert!(optional_usize(&args, "s", "t").is_err());
    }

    #[test]
    fn extension_id_appends_suffix() {
        assert_eq!(extension_id("Url"), "Url_Tera_Extension");
    }

    #[test]
    fn standard_registry_has_no_bundle_for_core_helpers() {
        let registry = ExtensionRegistry::standard();
        assert!(registry.contains("Url_Tera_Extension"));
        assert!(registry.contains("Text_Tera_Extension"));
        assert!(!registry.contains("Helper_Tera_Extension"));
        assert!(!registry.contains("Partial_Tera_Extension"));
        assert_eq!(registry.ids().len(), 6);
    }

    #[test]
    fn instantiated_bundles_carry_their_identifier() {
        let registry = ExtensionRegistry::standard();
        for id in registry.ids() {
            let ext = registry.instantiate(id).expect("factory");
            assert_eq!(ext.name(), id);
            assert!(
                !(ext.functions().is_empty() && ext.filters().is_empty()),
                "{id} registers nothing"
            );
        }
    }
}
