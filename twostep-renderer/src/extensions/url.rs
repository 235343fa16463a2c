//! `Url` helpers: internal URIs to paths using the default routes.
//!
//! Internal URIs look like `module/action?key=value`. They map onto the
//! default route set:
//!
//! | Route           | Pattern                  |
//! |-----------------|--------------------------|
//! | `homepage`      | `/` (`@homepage`)        |
//! | `default_index` | `/:module` (action `index`, no parameters) |
//! | `default`       | `/:module/:action/*`     |
//!
//! Absolute URLs, rooted paths and fragments pass through untouched.

use std::collections::HashMap;

use tera::{Tera, Value};

use super::tag::{options_from_value, render_content_tag};
use super::{optional_bool, optional_str, required_str, scalar_to_string, Extension};

pub struct UrlExtension;

impl Extension for UrlExtension {
    fn name(&self) -> &'static str {
        "Url_Tera_Extension"
    }

    fn register(&self, tera: &mut Tera) {
        tera.register_function("url_for", url_for_fn);
        tera.register_function("link_to", link_to_fn);
    }

    fn functions(&self) -> &'static [&'static str] {
        &["url_for", "link_to"]
    }
}

/// Generate a URL for an internal URI. `params` follow any query-string pairs.
pub fn url_for(
    route: &str,
    params: &[(String, String)],
    absolute: bool,
    host: &str,
) -> tera::Result<String> {
    if is_external(route) {
        return Ok(route.to_string());
    }

    let path = if let Some(name) = route.strip_prefix('@') {
        match name {
            "homepage" => "/".to_string(),
            other => return Err(tera::Error::msg(format!("url_for: unknown route \"@{other}\""))),
        }
    } else {
        let (target, query) = route.split_once('?').unwrap_or((route, ""));
        let mut segments = target.split('/').filter(|s| !s.is_empty());
        let module = segments
            .next()
            .ok_or_else(|| tera::Error::msg(format!("url_for: \"{route}\" has no module")))?;
        let action = segments.next().unwrap_or("index");

        let mut pairs: Vec<(String, String)> = query
            .split('&')
            .filter(|p| !p.is_empty())
            .map(|p| {
                let (k, v) = p.split_once('=').unwrap_or((p, ""));
                (k.to_string(), v.to_string())
            })
            .collect();
        pairs.extend(params.iter().cloned());

        if action == "index" && pairs.is_empty() {
            format!("/{}", encode_segment(module))
        } else {
            let mut path = format!("/{}/{}", encode_segment(module), encode_segment(action));
            for (k, v) in &pairs {
                path.push('/');
                path.push_str(&encode_segment(k));
                path.push('/');
                path.push_str(&encode_segment(v));
            }
            path
        }
    };

    if absolute {
        Ok(format!("http://{host}{path}"))
    } else {
        Ok(path)
    }
}

fn is_external(route: &str) -> bool {
    route.contains("://")
        || route.starts_with('/')
        || route.starts_with('#')
        || route.starts_with("mailto:")
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
pub(crate) fn encode_segment(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => out.push(b as char),
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

fn params_from_value(value: Option<&Value>) -> tera::Result<Vec<(String, String)>> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Object(map)) => {
            let mut params: Vec<(String, String)> = map
                .iter()
                .map(|(k, v)| (k.clone(), scalar_to_string(v)))
                .collect();
            params.sort();
            Ok(params)
        }
        Some(other) => Err(tera::Error::msg(format!(
            "url_for: `params` must be an object, got {other}"
        ))),
    }
}

fn url_from_args(args: &HashMap<String, Value>, helper: &str) -> tera::Result<String> {
    let route = required_str(args, "route", helper)?;
    let params = params_from_value(args.get("params"))?;
    let absolute = optional_bool(args, "absolute", helper)?;
    let host = optional_str(args, "host", helper)?.unwrap_or_else(|| "localhost".to_string());
    url_for(&route, &params, absolute, &host)
}

fn url_for_fn(args: &HashMap<String, Value>) -> tera::Result<Value> {
    url_from_args(args, "url_for").map(Value::String)
}

fn link_to_fn(args: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = required_str(args, "text", "link_to")?;
    let href = url_from_args(args, "link_to")?;
    let mut options = vec![("href".to_string(), href)];
    options.extend(options_from_value(args.get("options"), "link_to")?);
    Ok(Value::String(render_content_tag("a", &text, &options)))
}
