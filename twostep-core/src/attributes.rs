//! View attributes: the ordered name→value mapping a template renders against.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::escaping::EscapingMethod;

// ---------------------------------------------------------------------------
// SafeString
// ---------------------------------------------------------------------------

/// Trusted markup that must reach the template exactly as given.
///
/// The escaper never touches a `SafeString`, whatever the escaping method.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct SafeString(String);

impl SafeString {
    pub fn new(markup: impl Into<String>) -> Self {
        Self(markup.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SafeString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for SafeString {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SafeString {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// AttributeValue
// ---------------------------------------------------------------------------

/// A single attribute: plain data (escaped on export) or trusted markup.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Plain(Value),
    Safe(SafeString),
}

impl AttributeValue {
    /// Export this value, escaping plain data with `escaping` when set.
    pub fn export(&self, escaping: Option<EscapingMethod>) -> Value {
        match (self, escaping) {
            (AttributeValue::Safe(s), _) => Value::String(s.as_str().to_owned()),
            (AttributeValue::Plain(v), Some(method)) => method.escape_value(v),
            (AttributeValue::Plain(v), None) => v.clone(),
        }
    }

    /// The value as stored, without any escaping.
    pub fn raw(&self) -> Value {
        self.export(None)
    }

    pub fn is_safe(&self) -> bool {
        matches!(self, AttributeValue::Safe(_))
    }
}

impl From<Value> for AttributeValue {
    fn from(v: Value) -> Self {
        AttributeValue::Plain(v)
    }
}

impl From<SafeString> for AttributeValue {
    fn from(s: SafeString) -> Self {
        AttributeValue::Safe(s)
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::Plain(Value::String(s.to_owned()))
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::Plain(Value::String(s))
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        AttributeValue::Plain(Value::Bool(b))
    }
}

impl From<i64> for AttributeValue {
    fn from(n: i64) -> Self {
        AttributeValue::Plain(Value::from(n))
    }
}

// ---------------------------------------------------------------------------
// AttributeHolder
// ---------------------------------------------------------------------------

/// Ordered attribute mapping. Re-setting a name keeps its original position.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttributeHolder {
    entries: Vec<(String, AttributeValue)>,
}

impl AttributeHolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a holder from `(name, value)` pairs, in order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<AttributeValue>,
    {
        let mut holder = Self::new();
        for (name, value) in pairs {
            holder.set(name, value);
        }
        holder
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<AttributeValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Serialize `value` with serde and store it as a plain attribute.
    pub fn set_serialized<T: Serialize>(
        &mut self,
        name: impl Into<String>,
        value: &T,
    ) -> Result<(), serde_json::Error> {
        let value = serde_json::to_value(value)?;
        self.set(name, value);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<AttributeValue> {
        let idx = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Export every attribute as a JSON object, escaping plain values when
    /// `escaping` is set.
    pub fn to_map(&self, escaping: Option<EscapingMethod>) -> Map<String, Value> {
        self.entries
            .iter()
            .map(|(n, v)| (n.clone(), v.export(escaping)))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
