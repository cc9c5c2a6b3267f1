use tracing::trace;

use super::pattern::{FieldPattern, Pattern, PatternValue};
use crate::validate::{ValidateOptions, check_field};
use crate::value::Value;

pub(crate) fn score(pattern: &Pattern, payload: &Value) -> usize {
    match pattern {
        Pattern::Predicate(p) => usize::from(p.test(payload)),
        Pattern::Fields(fields) => score_fields(fields, payload),
    }
}

/// One unit per matched field; a single miss voids the whole pattern.
/// A matched nested pattern counts once, whatever its own size.
fn score_fields(pattern: &FieldPattern, payload: &Value) -> usize {
    let mut count = 0;
    for (key, expected) in pattern.iter() {
        let actual = payload.get(key);
        let matched = match expected {
            PatternValue::Typed(ty) => check_field(key, ty, actual, ValidateOptions::default()).is_none(),
            PatternValue::Nested(inner) => actual
                .filter(|v| v.is_truthy())
                .is_some_and(|v| score_fields(inner, v) > 0),
            PatternValue::Literal(lit) => actual == Some(lit),
            PatternValue::Predicate(p) => p.test(actual.unwrap_or(&Value::Null)),
        };
        if !matched {
            trace!(%key, "pattern field missed");
            return 0;
        }
        count += 1;
    }
    count
}
