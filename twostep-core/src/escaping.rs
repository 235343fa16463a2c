//! Output escaping applied to view attributes when they are exported.
//!
//! Escaping happens once, at export time, so the template engine itself runs
//! with autoescaping disabled. Values wrapped in [`crate::SafeString`] bypass
//! the escaper entirely.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConfigError;

/// How plain attribute values are escaped before they reach a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EscapingMethod {
    /// HTML special characters (`& < > " '`).
    #[default]
    Html,
    /// HTML special characters plus every non-ASCII character as a numeric entity.
    Entities,
    /// JavaScript string escaping followed by HTML entity escaping.
    Js,
    /// No escaping.
    Raw,
}

impl EscapingMethod {
    /// Escape a single string with this method.
    pub fn escape(&self, input: &str) -> String {
        match self {
            EscapingMethod::Html => escape_html(input),
            EscapingMethod::Entities => escape_entities(input),
            EscapingMethod::Js => escape_js(input),
            EscapingMethod::Raw => input.to_string(),
        }
    }

    /// Escape every string nested inside `value`. Object keys are left alone.
    pub fn escape_value(&self, value: &Value) -> Value {
        match value {
            Value::String(s) => Value::String(self.escape(s)),
            Value::Array(items) => {
                Value::Array(items.iter().map(|v| self.escape_value(v)).collect())
            }
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), self.escape_value(v)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}

impl fmt::Display for EscapingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EscapingMethod::Html => write!(f, "html"),
            EscapingMethod::Entities => write!(f, "entities"),
            EscapingMethod::Js => write!(f, "js"),
            EscapingMethod::Raw => write!(f, "raw"),
        }
    }
}

impl FromStr for EscapingMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "html" | "specialchars" => Ok(EscapingMethod::Html),
            "entities" => Ok(EscapingMethod::Entities),
            "js" => Ok(EscapingMethod::Js),
            "raw" => Ok(EscapingMethod::Raw),
            other => Err(ConfigError::UnknownEscapingMethod(other.to_string())),
        }
    }
}

/// Escape the five HTML special characters.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        push_special(&mut out, c);
    }
    out
}

/// Like [`escape_html`], but also encodes non-ASCII characters as `&#N;`.
pub fn escape_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if c.is_ascii() {
            push_special(&mut out, c);
        } else {
            out.push_str(&format!("&#{};", c as u32));
        }
    }
    out
}

/// Escape for embedding inside a quoted JavaScript string, then HTML-escape.
pub fn escape_js(input: &str) -> String {
    escape_entities(&escape_js_no_entities(input))
}

/// JavaScript string escaping only.
pub fn escape_js_no_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape HTML special characters without double-escaping existing entities.
pub fn escape_once(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(c) = rest.chars().next() {
        if c == '&' {
            if let Some(len) = entity_len(rest) {
                out.push_str(&rest[..len]);
                rest = &rest[len..];
                continue;
            }
        }
        push_special(&mut out, c);
        rest = &rest[c.len_utf8()..];
    }
    out
}

fn push_special(out: &mut String, c: char) {
    match c {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        '\'' => out.push_str("&#039;"),
        _ => out.push(c),
    }
}

/// Length of a well-formed entity (`&name;`, `&#123;`, `&#x1F;`) at the start of `s`.
fn entity_len(s: &str) -> Option<usize> {
    let end = s.find(';')?;
    let body = &s[1..end];
    let valid = if let Some(num) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
        !num.is_empty() && num.chars().all(|c| c.is_ascii_hexdigit())
    } else if let Some(num) = body.strip_prefix('#') {
        !num.is_empty() && num.chars().all(|c| c.is_ascii_digit())
    } else {
        !body.is_empty() && body.chars().all(|c| c.is_ascii_alphanumeric())
    };
    valid.then_some(end + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(EscapingMethod::Html, "<b>\"Tom\" & 'Jerry'</b>", "&lt;b&gt;&quot;Tom&quot; &amp; &#039;Jerry&#039;&lt;/b&gt;")]
    #[case(EscapingMethod::Entities, "café <x>", "caf&#233; &lt;x&gt;")]
    #[case(EscapingMethod::Js, "a'b\nc", "a\\&#039;b\\nc")]
    #[case(EscapingMethod::Raw, "<i>as is</i>", "<i>as is</i>")]
    fn escape_by_method(#[case] method: EscapingMethod, #[case] input: &str, #[case] expected: &str) {
        assert_eq!(method.escape(input), expected);
    }

    #[test]
    fn escape_value_walks_nested_structures() {
        let value = json!({"list": ["<a>", 1, true], "inner": {"s": "x&y"}, "n": null});
        let escaped = EscapingMethod::Html.escape_value(&value);
        assert_eq!(
            escaped,
            json!({"list": ["&lt;a&gt;", 1, true], "inner": {"s": "x&amp;y"}, "n": null})
        );
    }

    #[test]
    fn escape_once_keeps_existing_entities() {
        assert_eq!(escape_once("a &amp; b & c &#39; &nope"), "a &amp; b &amp; c &#39; &amp;nope");
        assert_eq!(escape_once("&lt;&#x3C;<"), "&lt;&#x3C;&lt;");
    }

    #[test]
    fn parse_method_names() {
        assert_eq!("HTML".parse::<EscapingMethod>().unwrap(), EscapingMethod::Html);
        assert_eq!("specialchars".parse::<EscapingMethod>().unwrap(), EscapingMethod::Html);
        assert_eq!("raw".parse::<EscapingMethod>().unwrap(), EscapingMethod::Raw);
        let err = "rot13".parse::<EscapingMethod>().unwrap_err();
        assert!(err.to_string().contains("rot13"));
    }

    #[test]
    fn display_matches_serde_name() {
        for method in [
            EscapingMethod::Html,
            EscapingMethod::Entities,
            EscapingMethod::Js,
            EscapingMethod::Raw,
        ] {
            let yaml = serde_yaml::to_string(&method).expect("serialize");
            assert_eq!(yaml.trim(), method.to_string());
        }
    }
}
