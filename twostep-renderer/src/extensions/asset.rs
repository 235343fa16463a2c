//! `Asset` helpers: stylesheet, script and image tags.

use std::collections::HashMap;

use tera::{Tera, Value};

use super::tag::{render_content_tag, render_tag};
use super::{optional_str, required_str, Extension};

pub struct AssetExtension;

impl Extension for AssetExtension {
    fn name(&self) -> &'static str {
        "Asset_Tera_Extension"
    }

    fn register(&self, tera: &mut Tera) {
        tera.register_function("stylesheet_tag", stylesheet_tag_fn);
        tera.register_function("javascript_include_tag", javascript_include_tag_fn);
        tera.register_function("image_tag", image_tag_fn);
        tera.register_function("image_path", image_path_fn);
    }

    fn functions(&self) -> &'static [&'static str] {
        &["stylesheet_tag", "javascript_include_tag", "image_tag", "image_path"]
    }
}

/// Public path of an asset: `source` under `/<dir>/`, with `.<ext>` added when
/// the file name has no extension. Absolute URLs and rooted paths are kept.
pub fn public_path(source: &str, dir: &str, ext: &str) -> String {
    if source.contains("://") || source.starts_with('/') {
        return source.to_string();
    }
    let mut path = format!("/{dir}/{source}");
    let file = source.rsplit('/').next().unwrap_or(source);
    if !file.contains('.') && !file.contains('?') {
        path.push('.');
        path.push_str(ext);
    }
    path
}

fn stylesheet_tag_fn(args: &HashMap<String, Value>) -> tera::Result<Value> {
    let source = required_str(args, "source", "stylesheet_tag")?;
    let media = optional_str(args, "media", "stylesheet_tag")?.unwrap_or_else(|| "screen".to_string());
    let options = vec![
        ("rel".to_string(), "stylesheet".to_string()),
        ("type".to_string(), "text/css".to_string()),
        ("media".to_string(), media),
        ("href".to_string(), public_path(&source, "css", "css")),
    ];
    Ok(Value::String(render_tag("link", &options, false)))
}

fn javascript_include_tag_fn(args: &HashMap<String, Value>) -> tera::Result<Value> {
    let source = required_str(args, "source", "javascript_include_tag")?;
    let options = vec![
        ("type".to_string(), "text/javascript".to_string()),
        ("src".to_string(), public_path(&source, "js", "js")),
    ];
    Ok(Value::String(render_content_tag("script", "", &options)))
}

fn image_tag_fn(args: &HashMap<String, Value>) -> tera::Result<Value> {
    let source = required_str(args, "source", "image_tag")?;
    let alt = match optional_str(args, "alt", "image_tag")? {
        Some(alt) => alt,
        None => default_alt(&source),
    };
    let mut options = vec![
        ("src".to_string(), public_path(&source, "images", "png")),
        ("alt".to_string(), alt),
    ];
    if let Some(size) = optional_str(args, "size", "image_tag")? {
        let (width, height) = size.split_once('x').ok_or_else(|| {
            tera::Error::msg(format!("image_tag: size \"{size}\" must look like WIDTHxHEIGHT"))
        })?;
        options.push(("width".to_string(), width.to_string()));
        options.push(("height".to_string(), height.to_string()));
    }
    Ok(Value::String(render_tag("img", &options, false)))
}

fn image_path_fn(args: &HashMap<String, Value>) -> tera::Result<Value> {
    let source = required_str(args, "source", "image_path")?;
    Ok(Value::String(public_path(&source, "images", "png")))
}

/// `img/site-logo.png` → `Site-logo`.
fn default_alt(source: &str) -> String {
    let file = source.rsplit('/').next().unwrap_or(source);
    let stem = file.split('.').next().unwrap_or(file);
    let mut chars = stem.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn args(value: Value) -> HashMap<String, Value> {
        serde_json::from_value(value).unwrap()
    }

    #[rstest]
    #[case("main", "css", "css", "/css/main.css")]
    #[case("print.css", "css", "css", "/css/print.css")]
    #[case("vendor/jquery", "js", "js", "/js/vendor/jquery.js")]
    #[case("/assets/app.js", "js", "js", "/assets/app.js")]
    #[case("https://cdn.example.com/x.js", "js", "js", "https://cdn.example.com/x.js")]
    fn public_paths(#[case] source: &str, #[case] dir: &str, #[case] ext: &str, #[case] expected: &str) {
        assert_eq!(public_path(source, dir, ext), expected);
    }

    #[test]
    fn stylesheet_tag_defaults_to_screen_media() {
        let out = stylesheet_tag_fn(&args(json!({"source": "main"}))).unwrap();
        assert_eq!(
            out,
            json!("<link rel=\"stylesheet\" type=\"text/css\" media=\"screen\" href=\"/css/main.css\" />")
        );
    }

    #[test]
    fn javascript_include_tag_closes_script() {
        let out = javascript_include_tag_fn(&args(json!({"source": "app"}))).unwrap();
        assert_eq!(out, json!("<script type=\"text/javascript\" src=\"/js/app.js\"></script>"));
    }

    #[test]
    fn image_tag_derives_alt_and_size() {
        let out = image_tag_fn(&args(json!({"source": "site-logo", "size": "100x20"}))).unwrap();
        assert_eq!(
            out,
            json!("<img src=\"/images/site-logo.png\" alt=\"Site-logo\" width=\"100\" height=\"20\" />")
        );
    }

    #[test]
    fn image_tag_rejects_bad_size() {
        assert!(image_tag_fn(&args(json!({"source": "a", "size": "big"}))).is_err());
    }
}
