use std::any::TypeId;
use std::sync::Arc;

use super::{Context, CustomCheck, Type};
use crate::validate::{Message, Schema, validate};
use crate::value::Value;

/// Base checks, one arm per combinator.
pub(crate) enum Kind {
    String,
    Number,
    Bool,
    Object,
    Array,
    Func,
    Any,
    OneOf(Vec<Value>),
    OneOfType(Vec<Type>),
    ArrayOf(Type),
    ObjectOf(Type),
    InstanceOf { type_id: TypeId, name: &'static str },
    Shape(Schema),
    /// A schema coerced into a type (combinator arguments).
    Conforms(Schema),
    Custom(Arc<dyn CustomCheck>),
}

impl Kind {
    pub(crate) fn check(&self, x: &Value) -> bool {
        match self {
            Kind::String => matches!(x, Value::String(_)),
            Kind::Number => matches!(x, Value::Number(_)),
            Kind::Bool => matches!(x, Value::Bool(_)),
            Kind::Object => matches!(x, Value::Object(_)),
            Kind::Array => matches!(x, Value::Array(_)),
            Kind::Func => matches!(x, Value::Func(_)),
            Kind::Any => !x.is_nullish(),
            Kind::OneOf(values) => values.contains(x),
            Kind::OneOfType(types) => types.iter().any(|t| t.accepts(x)),
            Kind::ArrayOf(item) => x
                .as_array()
                .is_some_and(|xs| xs.iter().all(|y| item.accepts(y))),
            Kind::ObjectOf(item) => x
                .as_object()
                .is_some_and(|m| m.values().all(|y| item.accepts(y))),
            Kind::InstanceOf { type_id, .. } => {
                matches!(x, Value::Instance(i) if i.holds(*type_id))
            }
            Kind::Shape(schema) | Kind::Conforms(schema) => validate(schema, x).is_none(),
            Kind::Custom(check) => check.validate(x),
        }
    }

    pub(crate) fn error_message(&self, ctx: &Context, x: &Value) -> Message {
        let prop = &ctx.prop;
        let text = match self {
            Kind::String => format!("{prop} should be of type: string"),
            Kind::Number => format!("{prop} should be of type: number"),
            Kind::Bool => format!("{prop} should be of type: boolean"),
            Kind::Object => format!("{prop} should be of type: object"),
            Kind::Array => format!("{prop} should be of type: array"),
            Kind::Func => format!("{prop} should be of type: function"),
            Kind::Any => format!(r#"{prop} should be "any"thing... just not undefined or null"#),
            Kind::OneOf(values) => format!(
                "{prop} should match one of: {}",
                serde_json::to_string(values).unwrap_or_default()
            ),
            Kind::OneOfType(types) => format!(
                "{prop} should be one of type: {}",
                types.iter().map(Type::describe).collect::<Vec<_>>().join(",")
            ),
            Kind::ArrayOf(item) => format!(
                "{prop} should be an array containing items of type: {}",
                item.describe()
            ),
            Kind::ObjectOf(item) => format!(
                "{prop} should be an object containing items of type: {}",
                item.describe()
            ),
            Kind::InstanceOf { name, .. } => format!("{prop} should be an instance of {name}"),
            Kind::Shape(schema) => match validate(schema, x) {
                Some(errors) => return Message::Nested(errors),
                None => format!("{prop} should match shape {}", schema.describe()),
            },
            Kind::Conforms(schema) => {
                format!("{prop} should match schema: {}", schema.describe())
            }
            Kind::Custom(check) => check.error_message(ctx, x),
        };
        Message::Text(text)
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            Kind::String => "string".to_string(),
            Kind::Number => "number".to_string(),
            Kind::Bool => "bool".to_string(),
            Kind::Object => "object".to_string(),
            Kind::Array => "array".to_string(),
            Kind::Func => "func".to_string(),
            Kind::Any => "any".to_string(),
            Kind::OneOf(values) => {
                format!("oneOf({})", serde_json::to_string(values).unwrap_or_default())
            }
            Kind::OneOfType(types) => format!(
                "oneOfType({})",
                types.iter().map(Type::describe).collect::<Vec<_>>().join(", ")
            ),
            Kind::ArrayOf(item) => format!("arrayOf({})", item.describe()),
            Kind::ObjectOf(item) => format!("objectOf({})", item.describe()),
            Kind::InstanceOf { name, .. } => format!("instanceOf({name})"),
            Kind::Shape(schema) => format!("shape{}", schema.describe()),
            Kind::Conforms(schema) => schema.describe(),
            Kind::Custom(check) => check.describe(),
        }
    }
}
