//! Schema validation.
//!
//! Fields are checked in schema order. Each field runs its type's chain:
//! a link whose value is missing or null is skipped unless it is a presence
//! link, and a failing link records (or overwrites) the field's message.
//! With `fail_fast`, the first recorded message ends the whole run.
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{Error, Result};
use crate::types::{Context, Type};
use crate::value::{self, Value};

// ------------------------------- Schemas ---------------------------------- //

/// Field name → type, in declaration order.
#[derive(Clone, Default)]
pub struct Schema {
    fields: IndexMap<String, Type>,
}

impl Schema {
    pub fn new() -> Self { Self::default() }

    pub fn field(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.fields.insert(name.into(), ty);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, ty: Type) -> Option<Type> {
        self.fields.insert(name.into(), ty)
    }

    pub fn get(&self, name: &str) -> Option<&Type> { self.fields.get(name) }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Type> { self.fields.iter() }

    pub fn len(&self) -> usize { self.fields.len() }

    pub fn is_empty(&self) -> bool { self.fields.is_empty() }

    pub fn describe(&self) -> String {
        let fields = self
            .fields
            .iter()
            .map(|(k, t)| format!("{k}: {}", t.describe()))
            .collect::<Vec<_>>();
        format!("{{{}}}", fields.join(", "))
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Schema{}", self.describe())
    }
}

impl<K: Into<String>> FromIterator<(K, Type)> for Schema {
    fn from_iter<I: IntoIterator<Item = (K, Type)>>(iter: I) -> Self {
        Self { fields: iter.into_iter().map(|(k, t)| (k.into(), t)).collect() }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidateOptions {
    /// Stop at the first failing link.
    pub fail_fast: bool,
}

impl ValidateOptions {
    pub fn fail_fast() -> Self { Self { fail_fast: true } }
}

// ------------------------------- Reports ---------------------------------- //

/// One field's failure: plain text, or a nested report from `types::shape`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Message {
    Text(String),
    Nested(ValidationErrors),
}

impl Message {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Message::Text(s) => Some(s),
            Message::Nested(_) => None,
        }
    }

    pub fn as_nested(&self) -> Option<&ValidationErrors> {
        match self {
            Message::Nested(e) => Some(e),
            Message::Text(_) => None,
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Text(s) => f.write_str(s),
            Message::Nested(errors) => fmt::Display::fmt(errors, f),
        }
    }
}

/// At most one message per field, in the order fields were checked.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(IndexMap<String, Message>);

impl ValidationErrors {
    pub fn get(&self, field: &str) -> Option<&Message> { self.0.get(field) }

    pub fn contains(&self, field: &str) -> bool { self.0.contains_key(field) }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Message> { self.0.iter() }

    pub fn fields(&self) -> impl Iterator<Item = &str> { self.0.keys().map(String::as_str) }

    pub(crate) fn insert(&mut self, field: String, message: Message) { self.0.insert(field, message); }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = (&'a String, &'a Message);
    type IntoIter = indexmap::map::Iter<'a, String, Message>;

    fn into_iter(self) -> Self::IntoIter { self.0.iter() }
}

/// Renders as JSON.
impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(s) => f.write_str(&s),
            Err(_) => fmt::Debug::fmt(&self.0, f),
        }
    }
}

// ------------------------------- Front API -------------------------------- //

pub fn validate(schema: &Schema, payload: &Value) -> Option<ValidationErrors> {
    validate_with(schema, payload, ValidateOptions::default())
}

/// `None` when every field passes. A non-object payload reads as having
/// every field missing.
pub fn validate_with(schema: &Schema, payload: &Value, options: ValidateOptions) -> Option<ValidationErrors> {
    let mut errors = ValidationErrors::default();
    for (prop, ty) in schema.iter() {
        if options.fail_fast && !errors.is_empty() {
            break;
        }
        if let Some(message) = check_field(prop, ty, payload.get(prop), options) {
            trace!(%prop, %message, "field failed validation");
            errors.insert(prop.clone(), message);
        }
    }
    (!errors.is_empty()).then_some(errors)
}

/// Runs one field's chain; returns the message of the last link that failed.
pub fn check_field(prop: &str, ty: &Type, value: Option<&Value>, options: ValidateOptions) -> Option<Message> {
    let ctx = Context::new(prop);
    let absent = value::is_absent(value);
    let x = value.unwrap_or(&Value::Null);

    let mut recorded = None;
    let mut link = Some(ty.clone());
    while let Some(current) = link {
        let skipped = absent && !current.is_requiring();
        if !skipped && !current.validate(x) {
            recorded = Some(current.error_message(&ctx, x));
            if options.fail_fast {
                break;
            }
        }
        link = current.next();
    }
    recorded
}

/// Hands the payload back untouched when it satisfies `schema`.
pub fn enforce<'a>(schema: &Schema, payload: &'a Value, options: ValidateOptions) -> Result<&'a Value> {
    match validate_with(schema, payload, options) {
        None => Ok(payload),
        Some(errors) => Err(Error::schema_violation(errors)),
    }
}

// ------------------------------- Tests ------------------------------------ //
