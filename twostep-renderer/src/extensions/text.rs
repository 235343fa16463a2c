//! `Text` helpers: truncation and plain-text to HTML paragraphs.

use std::collections::HashMap;

use tera::{Tera, Value};

use super::{optional_str, optional_usize, Extension};

pub struct TextExtension;

impl Extension for TextExtension {
    fn name(&self) -> &'static str {
        "Text_Tera_Extension"
    }

    fn register(&self, tera: &mut Tera) {
        tera.register_filter("truncate_text", truncate_text_filter);
        tera.register_filter("simple_format_text", simple_format_text_filter);
    }

    fn filters(&self) -> &'static [&'static str] {
        &["truncate_text", "simple_format_text"]
    }
}

/// Cut `text` to at most `length` characters, ending with `tail` when cut.
pub fn truncate_text(text: &str, length: usize, tail: &str) -> String {
    if text.chars().count() <= length {
        return text.to_string();
    }
    let keep = length.saturating_sub(tail.chars().count());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(tail);
    out
}

/// Blank-line separated blocks become `<p>` elements; single newlines get a
/// `<br />`.
pub fn simple_format_text(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let paragraphs: Vec<String> = text
        .split("\n\n")
        .map(|p| p.trim_matches('\n'))
        .filter(|p| !p.is_empty())
        .map(|p| p.replace('\n', "\n<br />"))
        .collect();
    if paragraphs.is_empty() {
        return "<p></p>".to_string();
    }
    paragraphs
        .iter()
        .map(|p| format!("<p>{p}</p>"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn truncate_text_filter(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("truncate_text filter expects a string"))?;
    let length = optional_usize(args, "length", "truncate_text")?.unwrap_or(30);
    let tail = optional_str(args, "truncate_string", "truncate_text")?;
    Ok(Value::String(truncate_text(s, length, tail.as_deref().unwrap_or("..."))))
}

fn simple_format_text_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("simple_format_text filter expects a string"))?;
    Ok(Value::String(simple_format_text(s)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_counts_characters_not_bytes() {
        assert_eq!(truncate_text("héllo wörld", 8, "..."), "héllo...");
        assert_eq!(truncate_text("short", 8, "..."), "short");
        assert_eq!(truncate_text("abcdef", 2, "..."), "...");
    }

    #[test]
    fn simple_format_splits_paragraphs_and_lines() {
        assert_eq!(
            simple_format_text("one\ntwo\r\n\r\nthree\n\n\n"),
            "<p>one\n<br />two</p>\n<p>three</p>"
        );
        assert_eq!(simple_format_text(""), "<p></p>");
    }

    #[test]
    fn filter_reads_arguments() {
        let mut args = HashMap::new();
        args.insert("length".to_string(), Value::from(4));
        args.insert("truncate_string".to_string(), Value::from("…"));
        let out = truncate_text_filter(&Value::from("abcdefgh"), &args).unwrap();
        assert_eq!(out, Value::from("abc…"));
    }
}
