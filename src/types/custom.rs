//! User-defined types.
//!
//! [`CustomCheck`] is the typed seam. [`custom`] accepts the dynamic form, an
//! object carrying `validate` and `makeErrorMessage` callables, and rejects
//! malformed definitions when the type is built rather than when it runs.
use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::debug;

use super::{Context, Kind, Type, func};
use crate::error::{Error, Result};
use crate::validate::{Schema, ValidationErrors, validate};
use crate::value::{Func, Value};

pub trait CustomCheck: Send + Sync {
    fn validate(&self, x: &Value) -> bool;

    fn error_message(&self, ctx: &Context, x: &Value) -> String;

    fn describe(&self) -> String { "custom".to_string() }
}

pub fn custom_check<C: CustomCheck + 'static>(check: C) -> Type {
    Type::from_kind(Kind::Custom(Arc::new(check)))
}

pub fn custom_fn<V, M>(validate: V, message: M) -> Type
where
    V: Fn(&Value) -> bool + Send + Sync + 'static,
    M: Fn(&Context, &Value) -> String + Send + Sync + 'static,
{
    custom_check(FnCheck { validate, message })
}

static DEFINITION_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new()
        .field("validate", func().is_required())
        .field("makeErrorMessage", func().is_required())
});

/// Builds a type from `{validate, makeErrorMessage}`.
///
/// `validate` is called as `validate(x)` and its result read for truthiness;
/// `makeErrorMessage` as `makeErrorMessage({prop}, x)`. A non-string message
/// is rendered as JSON.
pub fn custom(definition: &Value) -> Result<Type> {
    if let Some(errors) = validate(&DEFINITION_SCHEMA, definition) {
        debug!(%errors, "rejected custom type definition");
        return Err(Error::InvalidCustomType(errors));
    }
    match (definition.get("validate"), definition.get("makeErrorMessage")) {
        (Some(Value::Func(validate)), Some(Value::Func(message))) => Ok(custom_check(FuncCheck {
            validate: validate.clone(),
            message: message.clone(),
        })),
        _ => Err(Error::InvalidCustomType(ValidationErrors::default())),
    }
}

struct FuncCheck {
    validate: Func,
    message: Func,
}

impl CustomCheck for FuncCheck {
    fn validate(&self, x: &Value) -> bool {
        self.validate.call(std::slice::from_ref(x)).is_truthy()
    }

    fn error_message(&self, ctx: &Context, x: &Value) -> String {
        let ctx = Value::object([("prop", Value::from(ctx.prop.as_str()))]);
        match self.message.call(&[ctx, x.clone()]) {
            Value::String(s) => s,
            other => other.to_string(),
        }
    }
}

struct FnCheck<V, M> {
    validate: V,
    message: M,
}

impl<V, M> CustomCheck for FnCheck<V, M>
where
    V: Fn(&Value) -> bool + Send + Sync,
    M: Fn(&Context, &Value) -> String + Send + Sync,
{
    fn validate(&self, x: &Value) -> bool { (self.validate)(x) }

    fn error_message(&self, ctx: &Context, x: &Value) -> String { (self.message)(ctx, x) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn even_definition() -> Value {
        Value::object([
            (
                "validate",
                Value::func(|args| {
                    let even = args.first().and_then(Value::as_f64).is_some_and(|n| n % 2.0 == 0.0);
                    Value::Bool(even)
                }),
            ),
            (
                "makeErrorMessage",
                Value::func(|args| {
                    let prop = args.first().and_then(|c| c.get("prop")).and_then(Value::as_str).unwrap_or("?");
                    Value::from(format!("{prop} should be even"))
                }),
            ),
        ])
    }

    #[test]
    fn dynamic_definition_drives_validation() {
        let even = custom(&even_definition()).unwrap();
        assert!(even.validate(&Value::from(4)));
        assert!(!even.validate(&Value::from(3)));
        let msg = even.error_message(&Context::new("n"), &Value::from(3));
        assert_eq!(msg.to_string(), "n should be even");
    }

    #[test]
    fn malformed_definition_fails_at_construction() {
        let missing = Value::from(json!({"validate": "not a function"}));
        match custom(&missing) {
            Err(Error::InvalidCustomType(errors)) => {
                assert_eq!(errors.get("validate").unwrap().to_string(), "validate should be of type: function");
                assert_eq!(
                    errors.get("makeErrorMessage").unwrap().to_string(),
                    "makeErrorMessage must not be null or undefined"
                );
            }
            other => panic!("expected InvalidCustomType, got {other:?}"),
        }
        assert!(custom(&Value::Null).is_err());
    }

    #[test]
    fn closures_make_custom_types() {
        let short = custom_fn(
            |x| x.as_str().is_some_and(|s| s.len() <= 3),
            |ctx, _| format!("{} is too long", ctx.prop),
        );
        assert!(short.validate(&Value::from("abc")));
        assert!(!short.validate(&Value::from("abcd")));
        assert!(short.is_required().accepts(&Value::from("ab")));
        assert_eq!(short.describe(), "custom");
    }
}
