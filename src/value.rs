//! Runtime payload model.
//!
//! Payloads are JSON-like trees extended with the two kinds JSON cannot carry:
//! callables (`Func`) and nominal instances (`Instance`). A missing field is
//! represented by the absence of a key, never by a dedicated variant, so
//! lookups hand out `Option<&Value>`.
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

/// Field map with declaration order preserved.
pub type Map = IndexMap<String, Value>;

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(Map),
    Func(Func),
    Instance(Instance),
}

// ------------------------------- Callables -------------------------------- //

type FuncBody = dyn Fn(&[Value]) -> Value + Send + Sync;

/// Shared callable. Two `Func`s are equal only when they are the same callable.
#[derive(Clone)]
pub struct Func(Arc<FuncBody>);

impl Func {
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Self(Arc::new(body))
    }

    pub fn call(&self, args: &[Value]) -> Value { (self.0)(args) }
}

impl PartialEq for Func {
    fn eq(&self, other: &Self) -> bool { Arc::ptr_eq(&self.0, &other.0) }
}

impl fmt::Debug for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("Func") }
}

// ------------------------------- Instances -------------------------------- //

/// A value of some concrete Rust type, checked nominally by `types::instance_of`.
#[derive(Clone)]
pub struct Instance {
    type_name: &'static str,
    data: Arc<dyn Any + Send + Sync>,
}

impl Instance {
    pub fn new<T: Any + Send + Sync>(data: T) -> Self {
        Self { type_name: std::any::type_name::<T>(), data: Arc::new(data) }
    }

    pub fn is<T: Any>(&self) -> bool { (*self.data).is::<T>() }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> { (*self.data).downcast_ref::<T>() }

    pub fn type_name(&self) -> &'static str { self.type_name }

    pub(crate) fn holds(&self, id: TypeId) -> bool { (*self.data).type_id() == id }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool { Arc::ptr_eq(&self.data, &other.data) }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instance({})", self.type_name)
    }
}

// ------------------------------- Accessors -------------------------------- //

impl Value {
    pub fn object<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Object(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn func<F>(body: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Value::Func(Func::new(body))
    }

    pub fn instance<T: Any + Send + Sync>(data: T) -> Self { Value::Instance(Instance::new(data)) }

    /// Field lookup; any non-object reads as having no fields.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(key),
            _ => None,
        }
    }

    pub fn is_nullish(&self) -> bool { matches!(self, Value::Null) }

    /// `null`, `false`, `0`, `NaN` and `""` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) | Value::Func(_) | Value::Instance(_) => true,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(xs) => Some(xs),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }
}

/// Missing and `null` are both "absent" for presence checks.
pub(crate) fn is_absent(value: Option<&Value>) -> bool {
    value.is_none_or(Value::is_nullish)
}

// ------------------------------ Conversions ------------------------------- //

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(xs) => Value::Array(xs.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(m) => {
                Value::Object(m.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self { Value::Bool(b) }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self { Value::Number(n) }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self { Value::Number(n as f64) }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self { Value::Number(n as f64) }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self { Value::Number(n as f64) }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self { Value::String(s.to_string()) }
}

impl From<String> for Value {
    fn from(s: String) -> Self { Value::String(s) }
}

impl From<Vec<Value>> for Value {
    fn from(xs: Vec<Value>) -> Self { Value::Array(xs) }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self { Value::Object(map) }
}

impl From<Func> for Value {
    fn from(f: Func) -> Self { Value::Func(f) }
}

impl From<Instance> for Value {
    fn from(i: Instance) -> Self { Value::Instance(i) }
}

// ------------------------------- Emission --------------------------------- //

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => match exact_i64(*n) {
                Some(i) => serializer.serialize_i64(i),
                None => serializer.serialize_f64(*n),
            },
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(xs) => xs.serialize(serializer),
            Value::Object(map) => map.serialize(serializer),
            Value::Func(_) => serializer.serialize_str("[function]"),
            Value::Instance(i) => serializer.serialize_str(&format!("[instance {}]", i.type_name())),
        }
    }
}

// Prefer emitting integers when exact
fn exact_i64(n: f64) -> Option<i64> {
    if n.is_finite() && n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
        Some(n as i64)
    } else {
        None
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(s) => f.write_str(&s),
            Err(_) => fmt::Debug::fmt(self, f),
        }
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_objects_keep_key_order() {
        let v = Value::from(json!({"z": 1, "a": 2, "m": 3}));
        let keys: Vec<&str> = v.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn truthiness_follows_loose_rules() {
        for falsy in [Value::Null, Value::Bool(false), Value::from(0), Value::from(f64::NAN), Value::from("")] {
            assert!(!falsy.is_truthy(), "{falsy:?} should be falsy");
        }
        for truthy in [Value::from(-1), Value::from("0"), Value::from(json!([])), Value::from(json!({}))] {
            assert!(truthy.is_truthy(), "{truthy:?} should be truthy");
        }
    }

    #[test]
    fn funcs_and_instances_compare_by_identity() {
        let f = Func::new(|_| Value::Null);
        let g = Func::new(|_| Value::Null);
        assert_eq!(f, f.clone());
        assert_ne!(f, g);

        let a = Instance::new(5u8);
        assert_eq!(a, a.clone());
        assert_ne!(a, Instance::new(5u8));
        assert!(a.is::<u8>());
        assert_eq!(a.downcast_ref::<u8>(), Some(&5));
    }

    #[test]
    fn get_reads_missing_for_non_objects() {
        assert_eq!(Value::from("abc").get("len"), None);
        assert_eq!(Value::from(json!({"a": null})).get("a"), Some(&Value::Null));
        assert!(is_absent(None));
        assert!(is_absent(Some(&Value::Null)));
        assert!(!is_absent(Some(&Value::from(false))));
    }

    #[test]
    fn serializes_integers_without_fraction() {
        let v = Value::object([("n", Value::from(3)), ("x", Value::from(1.5)), ("f", Value::func(|_| Value::Null))]);
        assert_eq!(v.to_string(), r#"{"n":3,"x":1.5,"f":"[function]"}"#);
    }
}
