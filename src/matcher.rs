//! Specificity-ranked dispatch.
//!
//! Every arm's pattern is scored against the payload; the highest score wins
//! and ties go to the arm declared first. A zero top score, or a falsy
//! payload, falls through to the default handler when there is one.
pub mod pattern;
mod score;

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::value::Value;
use pattern::Pattern;

/// Called with the payload and any extra arguments given to `call_with`.
pub type Handler<R> = Arc<dyn Fn(&Value, &[Value]) -> R + Send + Sync>;

struct Arm<R> {
    pattern: Pattern,
    handler: Handler<R>,
}

impl<R> Clone for Arm<R> {
    fn clone(&self) -> Self {
        Self { pattern: self.pattern.clone(), handler: Arc::clone(&self.handler) }
    }
}

pub struct Matcher<R> {
    arms: Vec<Arm<R>>,
    fallback: Option<Handler<R>>,
}

impl<R> Clone for Matcher<R> {
    fn clone(&self) -> Self {
        Self { arms: self.arms.clone(), fallback: self.fallback.clone() }
    }
}

impl<R> fmt::Debug for Matcher<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matcher")
            .field("patterns", &self.arms.iter().map(|a| &a.pattern).collect::<Vec<_>>())
            .field("has_default", &self.fallback.is_some())
            .finish()
    }
}

// ------------------------------- Dispatch --------------------------------- //

impl<R> Matcher<R> {
    pub fn builder() -> MatcherBuilder<R> { MatcherBuilder::default() }

    pub fn len(&self) -> usize { self.arms.len() }

    pub fn is_empty(&self) -> bool { self.arms.is_empty() }

    pub fn has_default(&self) -> bool { self.fallback.is_some() }

    pub fn call(&self, payload: &Value) -> Option<R> { self.call_with(payload, &[]) }

    /// `None` means nothing matched and there is no default handler.
    pub fn call_with(&self, payload: &Value, extra: &[Value]) -> Option<R> {
        if !payload.is_truthy() {
            debug!("falsy payload, skipping pattern scoring");
            return self.fall_back(payload, extra);
        }
        match self.best_arm(payload) {
            Some((index, score)) => {
                debug!(arm = index, score, "dispatching to best arm");
                Some((self.arms[index].handler)(payload, extra))
            }
            None => self.fall_back(payload, extra),
        }
    }

    /// Index and score of the winning arm, `None` when every arm scores 0.
    pub fn best_arm(&self, payload: &Value) -> Option<(usize, usize)> {
        let scores: Vec<usize> = self.arms.iter().map(|arm| arm.pattern.score(payload)).collect();
        trace!(?scores, "scored arms");
        let max = scores.iter().copied().max().unwrap_or(0);
        if max == 0 {
            return None;
        }
        scores.iter().position(|&s| s == max).map(|index| (index, max))
    }

    fn fall_back(&self, payload: &Value, extra: &[Value]) -> Option<R> {
        match &self.fallback {
            Some(handler) => {
                debug!("no arm matched, using default handler");
                Some(handler(payload, extra))
            }
            None => {
                debug!("no arm matched and no default handler");
                None
            }
        }
    }
}

// ------------------------------- Building --------------------------------- //

pub struct MatcherBuilder<R> {
    arms: Vec<Arm<R>>,
    fallback: Option<Handler<R>>,
}

impl<R> Default for MatcherBuilder<R> {
    fn default() -> Self { Self { arms: Vec::new(), fallback: None } }
}

impl<R> MatcherBuilder<R> {
    pub fn arm<P, F>(mut self, pattern: P, handler: F) -> Self
    where
        P: Into<Pattern>,
        F: Fn(&Value, &[Value]) -> R + Send + Sync + 'static,
    {
        self.arms.push(Arm { pattern: pattern.into(), handler: Arc::new(handler) });
        self
    }

    /// Default handler; a later call replaces an earlier one.
    pub fn otherwise<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> R + Send + Sync + 'static,
    {
        self.fallback = Some(Arc::new(handler));
        self
    }

    pub fn build(self) -> Matcher<R> {
        Matcher { arms: self.arms, fallback: self.fallback }
    }
}

/// One element of the alternating `pattern, handler, …, [default]` form.
pub enum MatchArg<R> {
    Pattern(Pattern),
    Handler(Handler<R>),
}

impl<R> MatchArg<R> {
    pub fn pattern(pattern: impl Into<Pattern>) -> Self { MatchArg::Pattern(pattern.into()) }

    pub fn handler<F>(handler: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> R + Send + Sync + 'static,
    {
        MatchArg::Handler(Arc::new(handler))
    }
}

/// Pairs `(pattern, handler)` in order; a lone trailing handler becomes the
/// default. A handler in pattern position anywhere else, or a pattern
/// without a handler, is rejected.
pub fn build_matcher<R, I>(args: I) -> Result<Matcher<R>>
where
    I: IntoIterator<Item = MatchArg<R>>,
{
    let mut arms = Vec::new();
    let mut fallback = None;
    let mut args = args.into_iter().enumerate().peekable();

    while let Some((position, arg)) = args.next() {
        match arg {
            MatchArg::Pattern(pattern) => match args.next() {
                Some((_, MatchArg::Handler(handler))) => arms.push(Arm { pattern, handler }),
                Some((at, MatchArg::Pattern(_))) => {
                    return Err(Error::MalformedArgs(format!(
                        "expected a handler at position {at}, found a pattern"
                    )));
                }
                None => {
                    return Err(Error::MalformedArgs(format!(
                        "pattern at position {position} has no handler"
                    )));
                }
            },
            MatchArg::Handler(handler) => {
                if args.peek().is_some() {
                    return Err(Error::MalformedArgs(format!(
                        "expected a pattern at position {position}, found a handler"
                    )));
                }
                fallback = Some(handler);
            }
        }
    }

    Ok(Matcher { arms, fallback })
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types;
    use crate::matcher::pattern::FieldPattern;
    use serde_json::json;

    fn pat(j: serde_json::Value) -> Pattern { Pattern::from_json(j).unwrap() }
    fn v(j: serde_json::Value) -> Value { Value::from(j) }
    fn echo(p: &Value, _: &[Value]) -> Value { p.clone() }

    #[test]
    fn runs_handler_for_match() {
        let m = Matcher::builder().arm(pat(json!({"foo": "bar"})), echo).build();
        let good = v(json!({"foo": "bar"}));
        assert_eq!(m.call(&good), Some(good.clone()));
        assert_eq!(m.call(&v(json!({"foo": "baz"}))), None);
        assert_eq!(m.call(&Value::Null), None);
    }

    #[test]
    fn type_patterns_check_required_and_kind() {
        let m = Matcher::builder()
            .arm(FieldPattern::new().field("foo", types::string().is_required()), echo)
            .build();
        assert_eq!(m.call(&v(json!({"foo": 1}))), None);
        assert_eq!(m.call(&v(json!({"bar": 1}))), None);
        assert!(m.call(&v(json!({"foo": "x"}))).is_some());
    }

    #[test]
    fn one_mismatch_voids_the_arm() {
        let m = Matcher::builder()
            .arm(FieldPattern::new().field("foo", types::array()).field("bar", "baz"), echo)
            .build();
        assert_eq!(m.call(&v(json!({"foo": 1, "bar": "baz"}))), None);
    }

    #[test]
    fn strongest_match_wins() {
        let m = Matcher::builder()
            .arm(FieldPattern::new().field("foo", types::number()).field("bar", "baz"), |_, _| "two")
            .arm(
                FieldPattern::new().field("repeat", true).field("foo", types::number()).field("bar", "baz"),
                |_, _| "three",
            )
            .build();
        assert_eq!(m.call(&v(json!({"repeat": true, "foo": 1, "bar": "baz"}))), Some("three"));
        assert_eq!(m.call(&v(json!({"foo": 1, "bar": "baz"}))), Some("two"));
    }

    #[test]
    fn ties_go_to_the_first_arm() {
        let m = Matcher::builder()
            .arm(pat(json!({"a": 1})), |_, _| 0)
            .arm(pat(json!({"b": 2})), |_, _| 1)
            .build();
        assert_eq!(m.best_arm(&v(json!({"a": 1, "b": 2}))), Some((0, 1)));
        assert_eq!(m.call(&v(json!({"a": 1, "b": 2}))), Some(0));
    }

    #[test]
    fn default_catches_misses_and_falsy_payloads() {
        let m = Matcher::builder()
            .arm(FieldPattern::new().field("foo", types::number()).field("bar", "baz"), |_, _| "arm")
            .otherwise(|_, _| "some default")
            .build();
        assert_eq!(m.call(&v(json!({"foo": 1}))), Some("some default"));
        assert_eq!(m.call(&Value::Null), Some("some default"));
        assert_eq!(m.call(&Value::from(0)), Some("some default"));
        assert_eq!(m.call(&Value::from("")), Some("some default"));
    }

    #[test]
    fn handlers_receive_extra_arguments() {
        let collect = |p: &Value, extra: &[Value]| {
            let mut all = vec![p.clone()];
            all.extend_from_slice(extra);
            all
        };
        let m = Matcher::builder()
            .arm(FieldPattern::new().field("foo", types::string()).field("bar", 2), collect)
            .build();
        let good = v(json!({"foo": "hi", "bar": 2}));
        let extra: Vec<Value> = (1..=5).map(Value::from).collect();
        let mut expected = vec![good.clone()];
        expected.extend(extra.clone());
        assert_eq!(m.call_with(&good, &extra), Some(expected));

        let with_default = Matcher::builder()
            .arm(FieldPattern::new().field("foo", types::string()).field("bar", 2), |_, _| Vec::new())
            .otherwise(collect)
            .build();
        let mut expected = vec![Value::Null];
        expected.extend(extra.clone());
        assert_eq!(with_default.call_with(&Value::Null, &extra), Some(expected));
    }

    #[test]
    fn nested_patterns() {
        let m = Matcher::builder().arm(pat(json!({"foo": {"bar": "baz"}})), echo).build();
        assert!(m.call(&v(json!({"foo": {"bar": "baz"}}))).is_some());
        assert_eq!(m.call(&v(json!({"foo": {"bar": 1}}))), None);
        assert_eq!(m.call(&v(json!({"foo": null}))), None);

        let deep = Matcher::builder().arm(pat(json!({"foo": {"bar": {"zap": 1}}})), echo).build();
        assert_eq!(deep.call(&v(json!({"foo": null}))), None);

        let pair = Matcher::builder().arm(pat(json!({"foo": {"bar": "baz"}, "zap": {"pip": 1}})), echo).build();
        assert_eq!(pair.call(&v(json!({"foo": {"bar": "baz"}, "zap": {}}))), None);
        assert!(pair.call(&v(json!({"foo": {"bar": "baz"}, "zap": {"pip": 1}}))).is_some());
    }

    #[test]
    fn alternating_arguments_pair_up() {
        let m = build_matcher([
            MatchArg::pattern(pat(json!({"a": 1}))),
            MatchArg::handler(|_, _| "one"),
            MatchArg::pattern(Pattern::predicate(|x| x.get("b").is_some())),
            MatchArg::handler(|_, _| "b"),
            MatchArg::handler(|_, _| "default"),
        ])
        .unwrap();
        assert_eq!(m.len(), 2);
        assert!(m.has_default());
        assert_eq!(m.call(&v(json!({"a": 1}))), Some("one"));
        assert_eq!(m.call(&v(json!({"b": 0}))), Some("b"));
        assert_eq!(m.call(&v(json!({"c": 0}))), Some("default"));

        let without = build_matcher([MatchArg::pattern(pat(json!({"a": 1}))), MatchArg::handler(|_, _| "one")]).unwrap();
        assert!(!without.has_default());
    }

    #[test]
    fn misplaced_arguments_are_rejected() {
        let dangling = build_matcher::<(), _>([MatchArg::pattern(pat(json!({"a": 1})))]);
        assert!(matches!(dangling, Err(Error::MalformedArgs(_))));

        let two_patterns = build_matcher::<(), _>([
            MatchArg::pattern(pat(json!({"a": 1}))),
            MatchArg::pattern(pat(json!({"b": 1}))),
        ]);
        assert!(matches!(two_patterns, Err(Error::MalformedArgs(_))));

        let early_handler = build_matcher([
            MatchArg::handler(|_, _| ()),
            MatchArg::pattern(pat(json!({"a": 1}))),
            MatchArg::handler(|_, _| ()),
        ]);
        assert!(matches!(early_handler, Err(Error::MalformedArgs(_))));
    }

    #[test]
    fn empty_matcher_only_defaults() {
        let m: Matcher<u8> = build_matcher([]).unwrap();
        assert!(m.is_empty());
        assert_eq!(m.call(&v(json!({"a": 1}))), None);
    }

    #[test]
    fn matchers_are_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Matcher<Value>>();

        let m = Matcher::builder().arm(pat(json!({"a": 1})), |_, _| 1).otherwise(|_, _| 0).build();
        std::thread::scope(|s| {
            for i in 0..4 {
                let m = &m;
                s.spawn(move || assert_eq!(m.call(&v(json!({"a": i % 2}))), Some(i % 2)));
            }
        });
    }
}
