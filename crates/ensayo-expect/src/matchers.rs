//! Built-in matchers.

use std::cmp::Ordering;

use regex::Regex;
use serde_json::Value;

use crate::equality::{TYPE_NAMES, compare_numbers, deep_equals, type_name};
use crate::error::Result;
use crate::registry::{MatchContext, MatcherRegistry, Verdict};

/// Names of every built-in matcher.
pub const BUILTIN_MATCHERS: [&str; 20] = [
    "to_be",
    "to_equal",
    "to_be_true",
    "to_be_false",
    "to_be_null",
    "to_be_empty",
    "to_have_length",
    "to_contain",
    "to_have_key",
    "to_be_greater_than",
    "to_be_greater_than_or_equal",
    "to_be_less_than",
    "to_be_less_than_or_equal",
    "to_be_between",
    "to_be_close_to",
    "to_match",
    "to_start_with",
    "to_end_with",
    "to_be_type_of",
    "to_throw",
];

pub(crate) fn register_builtins(registry: &mut MatcherRegistry) {
    registry.register("to_be", to_be);
    registry.register("to_equal", to_equal);
    registry.register("to_be_true", |ctx: &MatchContext<'_>| literal(ctx, &Value::Bool(true)));
    registry.register("to_be_false", |ctx: &MatchContext<'_>| literal(ctx, &Value::Bool(false)));
    registry.register("to_be_null", |ctx: &MatchContext<'_>| literal(ctx, &Value::Null));
    registry.register("to_be_empty", to_be_empty);
    registry.register("to_have_length", to_have_length);
    registry.register("to_contain", to_contain);
    registry.register("to_have_key", to_have_key);
    registry.register("to_be_greater_than", |ctx: &MatchContext<'_>| {
        ordering(ctx, "greater than", |o| o == Ordering::Greater)
    });
    registry.register("to_be_greater_than_or_equal", |ctx: &MatchContext<'_>| {
        ordering(ctx, "greater than or equal to", |o| o != Ordering::Less)
    });
    registry.register("to_be_less_than", |ctx: &MatchContext<'_>| {
        ordering(ctx, "less than", |o| o == Ordering::Less)
    });
    registry.register("to_be_less_than_or_equal", |ctx: &MatchContext<'_>| {
        ordering(ctx, "less than or equal to", |o| o != Ordering::Greater)
    });
    registry.register("to_be_between", to_be_between);
    registry.register("to_be_close_to", to_be_close_to);
    registry.register("to_match", to_match);
    registry.register("to_start_with", |ctx: &MatchContext<'_>| {
        affix(ctx, "start with", |s, p| s.starts_with(p))
    });
    registry.register("to_end_with", |ctx: &MatchContext<'_>| {
        affix(ctx, "end with", |s, p| s.ends_with(p))
    });
    registry.register("to_be_type_of", to_be_type_of);
    registry.register("to_throw", to_throw);
}

fn to_be(ctx: &MatchContext<'_>) -> Result<Verdict> {
    ctx.arity(1, 1)?;
    let expected = ctx.arg(0)?;
    Ok(Verdict::new(
        deep_equals(ctx.actual, expected),
        format!("expected {expected} but received {}", ctx.actual),
        format!("expected {} not to be {expected}", ctx.actual),
    ))
}

fn to_equal(ctx: &MatchContext<'_>) -> Result<Verdict> {
    ctx.arity(1, 1)?;
    let expected = ctx.arg(0)?;
    Ok(Verdict::new(
        deep_equals(ctx.actual, expected),
        format!("expected {} to equal {expected}", ctx.actual),
        format!("expected {} not to equal {expected}", ctx.actual),
    ))
}

fn literal(ctx: &MatchContext<'_>, expected: &Value) -> Result<Verdict> {
    ctx.arity(0, 0)?;
    Ok(Verdict::new(
        deep_equals(ctx.actual, expected),
        format!("expected {} to be {expected}", ctx.actual),
        format!("expected {} not to be {expected}", ctx.actual),
    ))
}

fn length(ctx: &MatchContext<'_>) -> Result<usize> {
    match ctx.actual {
        Value::String(s) => Ok(s.chars().count()),
        Value::Array(a) => Ok(a.len()),
        Value::Object(o) => Ok(o.len()),
        other => Err(ctx.invalid(format!(
            "expected a string, array or object, received {}",
            type_name(other)
        ))),
    }
}

fn to_be_empty(ctx: &MatchContext<'_>) -> Result<Verdict> {
    ctx.arity(0, 0)?;
    let len = length(ctx)?;
    Ok(Verdict::new(
        len == 0,
        format!("expected {} to be empty", ctx.actual),
        format!("expected {} not to be empty", ctx.actual),
    ))
}

fn to_have_length(ctx: &MatchContext<'_>) -> Result<Verdict> {
    ctx.arity(1, 1)?;
    let want = ctx
        .arg(0)?
        .as_u64()
        .ok_or_else(|| ctx.invalid("length must be a non-negative integer"))?;
    let len = length(ctx)?;
    Ok(Verdict::new(
        len as u64 == want,
        format!("expected length {want} but received {len}"),
        format!("expected length not to be {want}"),
    ))
}

fn to_contain(ctx: &MatchContext<'_>) -> Result<Verdict> {
    ctx.arity(1, 1)?;
    let item = ctx.arg(0)?;
    let matched = match (ctx.actual, item) {
        (Value::String(s), Value::String(sub)) => s.contains(sub.as_str()),
        (Value::String(_), other) => {
            return Err(ctx.invalid(format!(
                "a string can only contain a string, received {}",
                type_name(other)
            )));
        }
        (Value::Array(items), _) => items.iter().any(|v| deep_equals(v, item)),
        (other, _) => {
            return Err(ctx.invalid(format!(
                "expected a string or array, received {}",
                type_name(other)
            )));
        }
    };
    Ok(Verdict::new(
        matched,
        format!("expected {} to contain {item}", ctx.actual),
        format!("expected {} not to contain {item}", ctx.actual),
    ))
}

fn to_have_key(ctx: &MatchContext<'_>) -> Result<Verdict> {
    ctx.arity(1, 1)?;
    let key = ctx
        .arg(0)?
        .as_str()
        .ok_or_else(|| ctx.invalid("key must be a string"))?;
    let object = ctx.actual.as_object().ok_or_else(|| {
        ctx.invalid(format!("expected an object, received {}", type_name(ctx.actual)))
    })?;
    Ok(Verdict::new(
        object.contains_key(key),
        format!("expected {} to have key \"{key}\"", ctx.actual),
        format!("expected {} not to have key \"{key}\"", ctx.actual),
    ))
}

fn compare(ctx: &MatchContext<'_>, bound: &Value) -> Result<Ordering> {
    match (ctx.actual, bound) {
        (Value::Number(a), Value::Number(b)) => compare_numbers(a, b)
            .ok_or_else(|| ctx.invalid(format!("cannot compare {a} with {b}"))),
        (a, b) => Err(ctx.invalid(format!(
            "expected numbers, received {} and {}",
            type_name(a),
            type_name(b)
        ))),
    }
}

fn ordering(
    ctx: &MatchContext<'_>,
    relation: &str,
    accept: impl Fn(Ordering) -> bool,
) -> Result<Verdict> {
    ctx.arity(1, 1)?;
    let bound = ctx.arg(0)?;
    let order = compare(ctx, bound)?;
    Ok(Verdict::new(
        accept(order),
        format!("expected {} to be {relation} {bound}", ctx.actual),
        format!("expected {} not to be {relation} {bound}", ctx.actual),
    ))
}

fn to_be_between(ctx: &MatchContext<'_>) -> Result<Verdict> {
    ctx.arity(2, 2)?;
    let (low, high) = (ctx.arg(0)?, ctx.arg(1)?);
    let matched = compare(ctx, low)? != Ordering::Less && compare(ctx, high)? != Ordering::Greater;
    Ok(Verdict::new(
        matched,
        format!("expected {} to be between {low} and {high}", ctx.actual),
        format!("expected {} not to be between {low} and {high}", ctx.actual),
    ))
}

fn to_be_close_to(ctx: &MatchContext<'_>) -> Result<Verdict> {
    ctx.arity(1, 2)?;
    let expected = ctx
        .arg(0)?
        .as_f64()
        .ok_or_else(|| ctx.invalid("expected value must be a number"))?;
    let digits = match ctx.expected.get(1) {
        Some(v) => v
            .as_u64()
            .ok_or_else(|| ctx.invalid("precision must be a non-negative integer"))?,
        None => 2,
    };
    let actual = ctx.actual.as_f64().ok_or_else(|| {
        ctx.invalid(format!("expected a number, received {}", type_name(ctx.actual)))
    })?;
    let tolerance = 10f64.powi(-i32::try_from(digits).unwrap_or(i32::MAX)) / 2.0;
    Ok(Verdict::new(
        (actual - expected).abs() < tolerance,
        format!("expected {actual} to be close to {expected} ({digits} digits)"),
        format!("expected {actual} not to be close to {expected} ({digits} digits)"),
    ))
}

fn string_actual<'a>(ctx: &MatchContext<'a>) -> Result<&'a str> {
    ctx.actual.as_str().ok_or_else(|| {
        ctx.invalid(format!("expected a string, received {}", type_name(ctx.actual)))
    })
}

fn string_arg<'a>(ctx: &MatchContext<'a>) -> Result<&'a str> {
    ctx.arg(0)?
        .as_str()
        .ok_or_else(|| ctx.invalid("argument must be a string"))
}

fn to_match(ctx: &MatchContext<'_>) -> Result<Verdict> {
    ctx.arity(1, 1)?;
    let pattern = string_arg(ctx)?;
    let actual = string_actual(ctx)?;
    let regex = Regex::new(pattern).map_err(|e| ctx.invalid(format!("invalid pattern: {e}")))?;
    Ok(Verdict::new(
        regex.is_match(actual),
        format!("expected \"{actual}\" to match /{pattern}/"),
        format!("expected \"{actual}\" not to match /{pattern}/"),
    ))
}

fn affix(ctx: &MatchContext<'_>, relation: &str, test: impl Fn(&str, &str) -> bool) -> Result<Verdict> {
    ctx.arity(1, 1)?;
    let part = string_arg(ctx)?;
    let actual = string_actual(ctx)?;
    Ok(Verdict::new(
        test(actual, part),
        format!("expected \"{actual}\" to {relation} \"{part}\""),
        format!("expected \"{actual}\" not to {relation} \"{part}\""),
    ))
}

fn to_be_type_of(ctx: &MatchContext<'_>) -> Result<Verdict> {
    ctx.arity(1, 1)?;
    let want = string_arg(ctx)?;
    if !TYPE_NAMES.contains(&want) {
        return Err(ctx.invalid(format!(
            "unknown type \"{want}\", expected one of {}",
            TYPE_NAMES.join(", ")
        )));
    }
    let got = type_name(ctx.actual);
    Ok(Verdict::new(
        got == want,
        format!("expected type {want} but received {got}"),
        format!("expected type not to be {want}"),
    ))
}

fn to_throw(ctx: &MatchContext<'_>) -> Result<Verdict> {
    ctx.arity(0, 1)?;
    let raised = ctx
        .actual
        .get("raised")
        .and_then(Value::as_bool)
        .ok_or_else(|| ctx.invalid("actual value was not captured with expect_fn"))?;
    let message = ctx.actual.get("message").and_then(Value::as_str).unwrap_or("");
    let fragment = match ctx.expected.first() {
        Some(v) => Some(
            v.as_str()
                .ok_or_else(|| ctx.invalid("message fragment must be a string"))?,
        ),
        None => None,
    };
    let (matched, positive, negative) = match fragment {
        None => (
            raised,
            "expected function to raise an error".to_string(),
            format!("expected function not to raise, but it raised \"{message}\""),
        ),
        Some(fragment) => (
            raised && message.contains(fragment),
            if raised {
                format!("expected error containing \"{fragment}\" but received \"{message}\"")
            } else {
                format!("expected error containing \"{fragment}\" but nothing was raised")
            },
            format!("expected no error containing \"{fragment}\" but received \"{message}\""),
        ),
    };
    Ok(Verdict::new(matched, positive, negative))
}
