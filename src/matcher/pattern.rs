//! Structural patterns.
//!
//! Every pattern field is classified once, when the pattern is built:
//! a literal compared with `==`, a nested field map, a [`Type`], or a
//! predicate over the field's value.
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use super::score;
use crate::error::{Error, Result};
use crate::types::Type;
use crate::value::Value;

type PredicateFn = dyn Fn(&Value) -> bool + Send + Sync;

#[derive(Clone)]
pub struct Predicate(Arc<PredicateFn>);

impl Predicate {
    pub fn new<F>(test: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(test))
    }

    pub fn test(&self, value: &Value) -> bool { (self.0)(value) }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("Predicate") }
}

#[derive(Clone, Debug)]
pub enum Pattern {
    Fields(FieldPattern),
    /// Whole-payload test; worth one unit of specificity.
    Predicate(Predicate),
}

#[derive(Clone, Debug, Default)]
pub struct FieldPattern {
    fields: IndexMap<String, PatternValue>,
}

#[derive(Clone, Debug)]
pub enum PatternValue {
    Literal(Value),
    Nested(FieldPattern),
    Typed(Type),
    Predicate(Predicate),
}

// ------------------------------- Patterns --------------------------------- //

impl Pattern {
    pub fn predicate<F>(test: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Pattern::Predicate(Predicate::new(test))
    }

    /// Objects become field maps; nested objects become nested patterns and
    /// every other JSON value a literal. Array literals compare structurally,
    /// element by element.
    pub fn from_json(json: serde_json::Value) -> Result<Self> { Self::try_from(json) }

    /// Number of fields matched, or 0 when any field fails.
    pub fn score(&self, payload: &Value) -> usize { score::score(self, payload) }
}

impl TryFrom<serde_json::Value> for Pattern {
    type Error = Error;

    fn try_from(json: serde_json::Value) -> Result<Self> {
        match json {
            serde_json::Value::Object(map) => Ok(Pattern::Fields(FieldPattern::from(map))),
            other => Err(Error::MalformedPattern(format!("expected an object pattern, found {other}"))),
        }
    }
}

impl From<FieldPattern> for Pattern {
    fn from(fields: FieldPattern) -> Self { Pattern::Fields(fields) }
}

impl From<Predicate> for Pattern {
    fn from(p: Predicate) -> Self { Pattern::Predicate(p) }
}

impl FieldPattern {
    pub fn new() -> Self { Self::default() }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<PatternValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, PatternValue> { self.fields.iter() }

    pub fn len(&self) -> usize { self.fields.len() }

    pub fn is_empty(&self) -> bool { self.fields.is_empty() }
}

impl<K: Into<String>> FromIterator<(K, PatternValue)> for FieldPattern {
    fn from_iter<I: IntoIterator<Item = (K, PatternValue)>>(iter: I) -> Self {
        Self { fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect() }
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for FieldPattern {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        map.into_iter().map(|(k, v)| (k, PatternValue::from(v))).collect()
    }
}

// ---------------------------- Field values -------------------------------- //

impl From<serde_json::Value> for PatternValue {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Object(map) => PatternValue::Nested(FieldPattern::from(map)),
            other => PatternValue::Literal(Value::from(other)),
        }
    }
}

impl From<Type> for PatternValue {
    fn from(t: Type) -> Self { PatternValue::Typed(t) }
}

impl From<FieldPattern> for PatternValue {
    fn from(p: FieldPattern) -> Self { PatternValue::Nested(p) }
}

impl From<Predicate> for PatternValue {
    fn from(p: Predicate) -> Self { PatternValue::Predicate(p) }
}

impl From<Value> for PatternValue {
    fn from(v: Value) -> Self { PatternValue::Literal(v) }
}

impl From<&str> for PatternValue {
    fn from(s: &str) -> Self { PatternValue::Literal(Value::from(s)) }
}

impl From<String> for PatternValue {
    fn from(s: String) -> Self { PatternValue::Literal(Value::from(s)) }
}

impl From<bool> for PatternValue {
    fn from(b: bool) -> Self { PatternValue::Literal(Value::from(b)) }
}

impl From<i32> for PatternValue {
    fn from(n: i32) -> Self { PatternValue::Literal(Value::from(n)) }
}

impl From<i64> for PatternValue {
    fn from(n: i64) -> Self { PatternValue::Literal(Value::from(n)) }
}

impl From<f64> for PatternValue {
    fn from(n: f64) -> Self { PatternValue::Literal(Value::from(n)) }
}
