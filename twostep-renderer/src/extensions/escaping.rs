//! `Escaping` helpers: explicit escaping filters for use inside templates.

use std::collections::HashMap;

use tera::{Tera, Value};
use twostep_core::escaping::{escape_entities, escape_html, escape_js, escape_js_no_entities};

use super::Extension;

pub struct EscapingExtension;

impl Extension for EscapingExtension {
    fn name(&self) -> &'static str {
        "Escaping_Tera_Extension"
    }

    fn register(&self, tera: &mut Tera) {
        tera.register_filter("esc_specialchars", esc_specialchars);
        tera.register_filter("esc_entities", esc_entities);
        tera.register_filter("esc_js", esc_js);
        tera.register_filter("esc_js_no_entities", esc_js_no_entities);
        tera.register_filter("esc_raw", esc_raw);
    }

    fn filters(&self) -> &'static [&'static str] {
        &["esc_specialchars", "esc_entities", "esc_js", "esc_js_no_entities", "esc_raw"]
    }
}

fn apply(value: &Value, filter: &str, f: fn(&str) -> String) -> tera::Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(f(s))),
        Value::Number(_) | Value::Bool(_) | Value::Null => Ok(value.clone()),
        _ => Err(tera::Error::msg(format!("{filter} filter expects a scalar value"))),
    }
}

fn esc_specialchars(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    apply(value, "esc_specialchars", escape_html)
}

fn esc_entities(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    apply(value, "esc_entities", escape_entities)
}

fn esc_js(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    apply(value, "esc_js", escape_js)
}

fn esc_js_no_entities(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    apply(value, "esc_js_no_entities", escape_js_no_entities)
}

fn esc_raw(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(value.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(filter: fn(&Value, &HashMap<String, Value>) -> tera::Result<Value>, input: Value) -> Value {
        filter(&input, &HashMap::new()).unwrap()
    }

    #[test]
    fn specialchars_and_entities() {
        assert_eq!(run(esc_specialchars, json!("<a href='x'>")), json!("&lt;a href=&#039;x&#039;&gt;"));
        assert_eq!(run(esc_entities, json!("naïve")), json!("na&#239;ve"));
    }

    #[test]
    fn js_variants() {
        assert_eq!(run(esc_js_no_entities, json!("say \"hi\"\n")), json!("say \\\"hi\\\"\\n"));
        assert_eq!(run(esc_js, json!("<\"")), json!("&lt;\\&quot;"));
    }

    #[test]
    fn scalars_pass_through_and_raw_is_identity() {
        assert_eq!(run(esc_specialchars, json!(42)), json!(42));
        assert_eq!(run(esc_raw, json!({"k": "<v>"})), json!({"k": "<v>"}));
    }

    #[test]
    fn containers_are_rejected() {
        assert!(esc_specialchars(&json!(["<"]), &HashMap::new()).is_err());
    }
}
