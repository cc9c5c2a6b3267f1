//! Value dispatch over structural patterns.
//!
//! Two layers:
//! - [`types`] + [`validate`]: composable type descriptors checked field by
//!   field against a payload, reporting one message per failing field.
//! - [`matcher`]: an ordered list of `(pattern, handler)` arms; each call
//!   scores every pattern against the payload and runs the most specific
//!   arm's handler, or the default handler when nothing scores.
//!
//! ```
//! use serde_json::json;
//! use shapematch::{FieldPattern, Matcher, Value, types};
//!
//! let greet = Matcher::builder()
//!     .arm(FieldPattern::new().field("name", types::string()), |_, _| "named")
//!     .arm(FieldPattern::new().field("name", types::string()).field("vip", true), |_, _| "vip")
//!     .otherwise(|_, _| "anonymous")
//!     .build();
//!
//! assert_eq!(greet.call(&Value::from(json!({"name": "ada", "vip": true}))), Some("vip"));
//! assert_eq!(greet.call(&Value::from(json!({"name": 7}))), Some("anonymous"));
//! ```
pub mod error;
pub mod matcher;
pub mod types;
pub mod validate;
pub mod value;

pub use error::{Error, Result};
pub use matcher::pattern::{FieldPattern, Pattern, PatternValue, Predicate};
pub use matcher::{Handler, MatchArg, Matcher, MatcherBuilder, build_matcher};
pub use types::{Context, CustomCheck, Type, TypeOrSchema};
pub use validate::{
    Message, Schema, ValidateOptions, ValidationErrors, check_field, enforce, validate, validate_with,
};
pub use value::{Func, Instance, Map, Value};
