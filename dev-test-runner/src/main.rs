//! Smoke runner: dispatches a fixed set of realistic payloads through a
//! matcher and a schema and reports each expectation.
use colored::Colorize;
use serde_json::{Value as Json, json};
use shapematch::{FieldPattern, Matcher, Pattern, Schema, ValidateOptions, Value, enforce, types};

fn event_matcher() -> anyhow::Result<Matcher<&'static str>> {
    let click = Pattern::from_json(json!({"type": "click"}))?;
    let primary_click = Pattern::from_json(json!({"type": "click", "button": {"primary": true}}))?;
    let keypress = FieldPattern::new()
        .field("type", "key")
        .field("key", types::one_of(["Enter", "Escape"]).is_required());
    let coords = FieldPattern::new()
        .field("x", types::number().is_required())
        .field("y", types::number().is_required());

    Ok(Matcher::builder()
        .arm(click, |_, _| "click")
        .arm(primary_click, |_, _| "primary click")
        .arm(keypress, |_, _| "keypress")
        .arm(coords, |_, _| "pointer")
        .otherwise(|_, _| "ignored")
        .build())
}

fn samples() -> Vec<(Json, &'static str)> {
    vec![
        (json!({"type": "click", "button": {"primary": true}}), "primary click"),
        (json!({"type": "click", "button": {"primary": false}}), "click"),
        (json!({"type": "key", "key": "Enter"}), "keypress"),
        (json!({"type": "key", "key": "Tab"}), "ignored"),
        (json!({"x": 1.5, "y": -2}), "pointer"),
        (json!({"x": 1.5}), "ignored"),
        (json!(null), "ignored"),
        (json!(""), "ignored"),
    ]
}

fn main() -> anyhow::Result<()> {
    let matcher = event_matcher()?;
    let mut failures = 0;

    eprintln!("—— dispatch ——");
    for (payload, expected) in samples() {
        let got = matcher.call(&Value::from(payload.clone()));
        if got == Some(expected) {
            eprintln!("{} {payload} → {expected}", "✅".green());
        } else {
            failures += 1;
            eprintln!("{} {payload} → {got:?}, expected {expected}", "❌".red());
        }
    }

    eprintln!("—— enforce ——");
    let schema = Schema::new()
        .field("type", types::string().is_required())
        .field("button", types::shape(Schema::new().field("primary", types::bool().is_required())));
    for (payload, should_pass) in [
        (json!({"type": "click", "button": {"primary": true}}), true),
        (json!({"type": "click", "button": {}}), false),
        (json!({"button": {"primary": true}}), false),
    ] {
        let value = Value::from(payload.clone());
        match enforce(&schema, &value, ValidateOptions::default()) {
            Ok(_) if should_pass => eprintln!("{} {payload}", "✅".green()),
            Err(error) if !should_pass => eprintln!("{} {payload} rejected: {error}", "✅".green()),
            outcome => {
                failures += 1;
                eprintln!("{} {payload}: unexpected {outcome:?}", "❌".red());
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} scenario(s) failed");
    }
    Ok(())
}
