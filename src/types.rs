//! Composable type descriptors.
//!
//! A [`Type`] is a shared base check plus an optional presence check in front
//! of it (`is_required`). Evaluated as a chain, the presence link runs first
//! and `next()` hands over to the base link; the chain never grows past two.
//!
//! Primitive descriptors are built once and shared.
pub mod custom;
mod kind;

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::validate::{Message, Schema};
use crate::value::Value;

pub use custom::{CustomCheck, custom, custom_check, custom_fn};
pub(crate) use kind::Kind;

// ------------------------------- Handles ---------------------------------- //

#[derive(Clone)]
pub struct Type {
    kind: Arc<Kind>,
    requiring: bool,
}

/// What a failing link knows about where it failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Context {
    pub prop: String,
}

impl Context {
    pub fn new(prop: impl Into<String>) -> Self { Self { prop: prop.into() } }
}

impl Type {
    pub(crate) fn from_kind(kind: Kind) -> Self {
        Self { kind: Arc::new(kind), requiring: false }
    }

    /// Same check, preceded by a presence check.
    pub fn is_required(&self) -> Type {
        Type { kind: Arc::clone(&self.kind), requiring: true }
    }

    /// True for the presence link of a required type.
    pub fn is_requiring(&self) -> bool { self.requiring }

    /// The link evaluated after this one, if any.
    pub fn next(&self) -> Option<Type> {
        self.requiring.then(|| Type { kind: Arc::clone(&self.kind), requiring: false })
    }

    /// Evaluates this link only.
    pub fn validate(&self, x: &Value) -> bool {
        if self.requiring { !x.is_nullish() } else { self.kind.check(x) }
    }

    pub fn error_message(&self, ctx: &Context, x: &Value) -> Message {
        if self.requiring {
            Message::Text(format!("{} must not be null or undefined", ctx.prop))
        } else {
            self.kind.error_message(ctx, x)
        }
    }

    /// Evaluates the whole chain against one element of a collection.
    /// Unlike a schema field, a `null` element is not skipped: it must pass
    /// the base check itself.
    pub fn accepts(&self, x: &Value) -> bool {
        if self.requiring && x.is_nullish() {
            return false;
        }
        self.kind.check(x)
    }

    pub fn describe(&self) -> String {
        let base = self.kind.describe();
        if self.requiring { format!("{base}.isRequired") } else { base }
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type({})", self.describe())
    }
}

/// Combinator argument: a type, or a nested schema standing in for one.
#[derive(Clone, Debug)]
pub enum TypeOrSchema {
    Type(Type),
    Schema(Schema),
}

impl From<Type> for TypeOrSchema {
    fn from(t: Type) -> Self { TypeOrSchema::Type(t) }
}

impl From<Schema> for TypeOrSchema {
    fn from(s: Schema) -> Self { TypeOrSchema::Schema(s) }
}

impl TypeOrSchema {
    /// Schemas become "valid iff the schema reports no errors".
    pub fn into_type(self) -> Type {
        match self {
            TypeOrSchema::Type(t) => t,
            TypeOrSchema::Schema(s) => Type::from_kind(Kind::Conforms(s)),
        }
    }
}

// ------------------------------ Constructors ------------------------------ //

static STRING: Lazy<Type> = Lazy::new(|| Type::from_kind(Kind::String));
static NUMBER: Lazy<Type> = Lazy::new(|| Type::from_kind(Kind::Number));
static BOOL: Lazy<Type> = Lazy::new(|| Type::from_kind(Kind::Bool));
static OBJECT: Lazy<Type> = Lazy::new(|| Type::from_kind(Kind::Object));
static ARRAY: Lazy<Type> = Lazy::new(|| Type::from_kind(Kind::Array));
static FUNC: Lazy<Type> = Lazy::new(|| Type::from_kind(Kind::Func));
static ANY: Lazy<Type> = Lazy::new(|| Type::from_kind(Kind::Any));

pub fn string() -> Type { STRING.clone() }
pub fn number() -> Type { NUMBER.clone() }
pub fn bool() -> Type { BOOL.clone() }
pub fn object() -> Type { OBJECT.clone() }
pub fn array() -> Type { ARRAY.clone() }
pub fn func() -> Type { FUNC.clone() }

/// Anything except null or missing.
pub fn any() -> Type { ANY.clone() }

/// Membership in a fixed set of values.
pub fn one_of<I, V>(values: I) -> Type
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    Type::from_kind(Kind::OneOf(values.into_iter().map(Into::into).collect()))
}

/// Valid if any entry accepts the value.
pub fn one_of_type<I, E>(entries: I) -> Type
where
    I: IntoIterator<Item = E>,
    E: Into<TypeOrSchema>,
{
    Type::from_kind(Kind::OneOfType(entries.into_iter().map(|e| e.into().into_type()).collect()))
}

pub fn array_of(item: impl Into<TypeOrSchema>) -> Type {
    Type::from_kind(Kind::ArrayOf(item.into().into_type()))
}

pub fn object_of(item: impl Into<TypeOrSchema>) -> Type {
    Type::from_kind(Kind::ObjectOf(item.into().into_type()))
}

/// Matches `Value::Instance`s holding a `T`.
pub fn instance_of<T: Any>() -> Type {
    Type::from_kind(Kind::InstanceOf {
        type_id: TypeId::of::<T>(),
        name: std::any::type_name::<T>(),
    })
}

/// Valid iff `schema` reports no errors; failures carry the nested report.
pub fn shape(schema: Schema) -> Type { Type::from_kind(Kind::Shape(schema)) }

// ------------------------------- Tests ------------------------------------ //
