//! Condition evaluation
//!
//! Predicates are authored as strings in a loosely typed editor, so the
//! evaluator follows loose scripting-language comparison rules rather than
//! strict typing: `"1"` equals `1`, booleans coerce to numbers, ordering
//! operators compare numerically unless both sides are strings. Authored
//! content must keep working even when the host's state has drifted, so a
//! predicate of an unknown kind logs a warning and counts as satisfied
//! instead of failing the whole evaluation.

use std::cmp::Ordering;

use serde_json::Value;

use gridloom_domain::{ComparisonOp, ConditionKind, StatePredicate};

use crate::state::GameStateView;

/// Evaluate one predicate against host state
pub fn evaluate(predicate: &StatePredicate, state: &dyn GameStateView) -> bool {
    let target = predicate.value.as_deref().map(coerce_target);
    match predicate.kind {
        ConditionKind::Variable => compare(
            predicate.operator,
            state.variable(&predicate.name).as_ref(),
            target.as_ref(),
        ),
        ConditionKind::Item => {
            let actual = match (state.item_count(&predicate.name), &target) {
                (Some(count), _) => Some(Value::from(count)),
                // a never-seen item reads as zero in numeric comparisons but
                // stays absent for presence checks
                (None, Some(_)) => Some(Value::from(0)),
                (None, None) => None,
            };
            compare(predicate.operator, actual.as_ref(), target.as_ref())
        }
        ConditionKind::Quest => compare(
            predicate.operator,
            state.quest_state(&predicate.name).as_ref(),
            target.as_ref(),
        ),
        ConditionKind::Unknown => {
            tracing::warn!(
                name = %predicate.name,
                "Unknown condition type, treating as satisfied"
            );
            true
        }
    }
}

/// Interpret an authored target string as a typed value
///
/// `"true"`/`"false"` become booleans, anything that parses as a finite
/// number becomes a number, everything else stays a string.
pub fn coerce_target(raw: &str) -> Value {
    match raw {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        if let Some(number) = trimmed
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .and_then(serde_json::Number::from_f64)
        {
            return Value::Number(number);
        }
    }
    Value::String(raw.to_string())
}

/// Loose truthiness: absent, null, false, zero, and the empty string are
/// falsy, everything else is truthy
pub fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Apply `operator` between an actual state value and an authored target.
///
/// A missing target means "presence check": the actual value's truthiness is
/// compared against `true`.
fn compare(operator: ComparisonOp, actual: Option<&Value>, target: Option<&Value>) -> bool {
    match target {
        None => {
            let as_bool = Value::Bool(truthy(actual));
            apply(operator, Some(&as_bool), &Value::Bool(true))
        }
        Some(target) => apply(operator, actual, target),
    }
}

fn apply(operator: ComparisonOp, actual: Option<&Value>, target: &Value) -> bool {
    // Undefined never equals an authored target and never orders against one
    let Some(actual) = actual else {
        return operator == ComparisonOp::Ne;
    };
    match operator {
        ComparisonOp::Eq => loose_eq(actual, target),
        ComparisonOp::Ne => !loose_eq(actual, target),
        _ => loose_cmp(actual, target)
            .is_some_and(|ordering| operator.matches_ordering(ordering)),
    }
}

/// Loose equality over JSON values
fn loose_eq(a: &Value, b: &Value) -> bool {
    use Value::{Array, Bool, Null, Object, String};
    match (a, b) {
        (Null, Null) => true,
        (Null, _) | (_, Null) => false,
        (Bool(x), Bool(y)) => x == y,
        (String(x), String(y)) => x == y,
        (Array(_) | Object(_), _) | (_, Array(_) | Object(_)) => false,
        // remaining mixes involve at least one number or bool: compare
        // numerically, unparseable strings make the comparison fail
        _ => match (as_number(a), as_number(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
    }
}

/// Loose ordering: string pairs compare lexicographically, everything else
/// numerically
fn loose_cmp(a: &Value, b: &Value) -> Option<Ordering> {
    if let (Value::String(x), Value::String(y)) = (a, b) {
        return Some(x.cmp(y));
    }
    as_number(a)?.partial_cmp(&as_number(b)?)
}

/// Numeric coercion: booleans count as 0/1, strings parse (empty means 0),
/// null means 0, containers have no numeric value
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null => Some(0.0),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
            }
        }
        Value::Array(_) | Value::Object(_) => None,
    }
}
