//! `Tag` helpers: generic HTML tag builders.

use std::collections::HashMap;

use tera::{Tera, Value};
use twostep_core::escaping::escape_once;

use super::{optional_bool, optional_str, required_str, scalar_to_string, Extension};

pub struct TagExtension;

impl Extension for TagExtension {
    fn name(&self) -> &'static str {
        "Tag_Tera_Extension"
    }

    fn register(&self, tera: &mut Tera) {
        tera.register_function("tag", tag_fn);
        tera.register_function("content_tag", content_tag_fn);
        tera.register_filter("escape_once", escape_once_filter);
    }

    fn functions(&self) -> &'static [&'static str] {
        &["tag", "content_tag"]
    }

    fn filters(&self) -> &'static [&'static str] {
        &["escape_once"]
    }
}

/// Tag attributes from a JSON object. `true` renders as `key="key"`,
/// `false` and `null` drop the attribute. Attributes come out sorted by name.
pub(crate) fn options_from_value(value: Option<&Value>, helper: &str) -> tera::Result<Vec<(String, String)>> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Object(map)) => {
            let mut options: Vec<(String, String)> = map
                .iter()
                .filter_map(|(k, v)| match v {
                    Value::Bool(true) => Some((k.clone(), k.clone())),
                    Value::Bool(false) | Value::Null => None,
                    other => Some((k.clone(), scalar_to_string(other))),
                })
                .collect();
            options.sort();
            Ok(options)
        }
        Some(other) => Err(tera::Error::msg(format!(
            "{helper}: `options` must be an object, got {other}"
        ))),
    }
}

fn attributes(options: &[(String, String)]) -> String {
    options
        .iter()
        .map(|(k, v)| format!(" {k}=\"{}\"", escape_once(v)))
        .collect()
}

/// `<name a="b" />`, or `<name a="b">` when `open`.
pub(crate) fn render_tag(name: &str, options: &[(String, String)], open: bool) -> String {
    let close = if open { ">" } else { " />" };
    format!("<{name}{}{close}", attributes(options))
}

/// `<name a="b">content</name>`. `content` is emitted as is.
pub(crate) fn render_content_tag(name: &str, content: &str, options: &[(String, String)]) -> String {
    format!("<{name}{}>{content}</{name}>", attributes(options))
}

fn tag_fn(args: &HashMap<String, Value>) -> tera::Result<Value> {
    let name = required_str(args, "name", "tag")?;
    let options = options_from_value(args.get("options"), "tag")?;
    let open = optional_bool(args, "open", "tag")?;
    Ok(Value::String(render_tag(&name, &options, open)))
}

fn content_tag_fn(args: &HashMap<String, Value>) -> tera::Result<Value> {
    let name = required_str(args, "name", "content_tag")?;
    let content = optional_str(args, "content", "content_tag")?.unwrap_or_default();
    let options = options_from_value(args.get("options"), "content_tag")?;
    Ok(Value::String(render_content_tag(&name, &content, &options)))
}

fn escape_once_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("escape_once filter expects a string"))?;
    Ok(Value::String(escape_once(s)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> HashMap<String, Value> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn tag_renders_self_closing_with_sorted_options() {
        let out = tag_fn(&args(json!({"name": "input", "options": {"type": "text", "disabled": true, "hidden": false}})))
            .unwrap();
        assert_eq!(out, json!("<input disabled=\"disabled\" type=\"text\" />"));
    }

    #[test]
    fn open_tag_has_no_slash() {
        let out = tag_fn(&args(json!({"name": "br", "open": true}))).unwrap();
        assert_eq!(out, json!("<br>"));
    }

    #[test]
    fn content_tag_escapes_attributes_once() {
        let out = content_tag_fn(&args(json!({
            "name": "p",
            "content": "<b>hi</b>",
            "options": {"title": "a & b &amp; c"}
        })))
        .unwrap();
        assert_eq!(out, json!("<p title=\"a &amp; b &amp; c\"><b>hi</b></p>"));
    }

    #[test]
    fn missing_name_is_an_error() {
        let err = tag_fn(&args(json!({}))).unwrap_err();
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn options_must_be_an_object() {
        let err = tag_fn(&args(json!({"name": "a", "options": [1]}))).unwrap_err();
        assert!(err.to_string().contains("options"));
    }
}
