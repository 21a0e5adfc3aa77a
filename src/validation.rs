//! Nested-path validation and coercion of untyped request payloads.
//!
//! Rules are applied in declaration order and the first failing field is
//! returned. Coerced values replace the raw ones at the same path.

use std::collections::HashSet;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::{
    errors::{RuleError, ValidationError},
    models::rules::{FieldKind, FieldRule},
};

#[derive(Debug)]
struct CompiledRule {
    rule: FieldRule,
    pattern: Option<Regex>,
}

#[derive(Debug)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<FieldRule>) -> Result<Self, RuleError> {
        let mut seen = HashSet::with_capacity(rules.len());
        let mut compiled = Vec::with_capacity(rules.len());

        for rule in rules {
            if rule.path.is_empty() {
                return Err(RuleError::EmptyPath);
            }
            if rule.segments().any(str::is_empty) {
                return Err(RuleError::EmptySegment { path: rule.path });
            }
            if !seen.insert(rule.path.clone()) {
                return Err(RuleError::DuplicatePath { path: rule.path });
            }

            let pattern = match (rule.kind, rule.pattern.as_deref()) {
                (FieldKind::String, Some(pattern)) if !pattern.is_empty() => Some(
                    Regex::new(&format!("^(?:{pattern})$")).map_err(|source| {
                        RuleError::InvalidPattern {
                            path: rule.path.clone(),
                            source,
                        }
                    })?,
                ),
                _ => None,
            };

            compiled.push(CompiledRule { rule, pattern });
        }

        Ok(Self { rules: compiled })
    }

    /// Validates `payload` in place and hands it back with coerced values.
    pub fn validate(&self, mut payload: Value) -> Result<Value, ValidationError> {
        if !payload.is_object() {
            return Err(ValidationError::PayloadNotMapping);
        }

        for compiled in &self.rules {
            compiled.apply(&mut payload)?;
        }

        debug!(rules = self.rules.len(), "Payload validated");

        Ok(payload)
    }
}

impl CompiledRule {
    fn apply(&self, payload: &mut Value) -> Result<(), ValidationError> {
        let rule = &self.rule;
        let segments: Vec<&str> = rule.segments().collect();

        let Some(slot) = resolve_mut(payload, &segments) else {
            if rule.required {
                return Err(ValidationError::NotFound {
                    field: rule.path.clone(),
                });
            }
            return Ok(());
        };

        let coerced = coerce(rule, slot)?;

        if let (Some(pattern), Value::String(text)) = (&self.pattern, &coerced) {
            if !pattern.is_match(text) {
                return Err(ValidationError::PatternMismatch {
                    field: rule.path.clone(),
                    pattern: rule.pattern.clone().unwrap_or_default(),
                });
            }
        }

        *slot = coerced;
        Ok(())
    }
}

/// Reads the value at a dot-separated path. Null counts as absent.
pub fn lookup<'a>(payload: &'a Value, path: &str) -> Option<&'a Value> {
    let segments: Vec<&str> = path.split('.').collect();
    resolve(payload, &segments)
}

fn resolve<'a>(value: &'a Value, segments: &[&str]) -> Option<&'a Value> {
    let Some((head, rest)) = segments.split_first() else {
        return (!value.is_null()).then_some(value);
    };

    match value {
        Value::Object(map) => resolve(map.get(*head)?, rest),
        _ => None,
    }
}

fn resolve_mut<'a>(value: &'a mut Value, segments: &[&str]) -> Option<&'a mut Value> {
    let Some((head, rest)) = segments.split_first() else {
        return (!value.is_null()).then_some(value);
    };

    match value {
        Value::Object(map) => resolve_mut(map.get_mut(*head)?, rest),
        _ => None,
    }
}

fn coerce(rule: &FieldRule, raw: &Value) -> Result<Value, ValidationError> {
    match rule.kind {
        FieldKind::Int => {
            let number = as_integer(raw).ok_or_else(|| ValidationError::WrongType {
                field: rule.path.clone(),
                expected: FieldKind::Int,
            })?;

            if rule.required && number == 0 && !rule.allow_zero {
                return Err(ValidationError::Empty {
                    field: rule.path.clone(),
                    kind: FieldKind::Int,
                });
            }

            Ok(Value::from(number))
        }
        FieldKind::String => match raw {
            Value::String(text) if rule.required && text.is_empty() => {
                Err(ValidationError::Empty {
                    field: rule.path.clone(),
                    kind: FieldKind::String,
                })
            }
            Value::String(text) => Ok(Value::String(text.clone())),
            _ => Err(ValidationError::WrongType {
                field: rule.path.clone(),
                expected: FieldKind::String,
            }),
        },
    }
}

fn as_integer(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_u64().and_then(|n| i64::try_from(n).ok()))
            .or_else(|| number.as_f64().and_then(truncate)),
        Value::String(text) => parse_numeric(text),
        _ => None,
    }
}

/// Accepts decimal integers, decimals and exponent notation, surrounded by
/// optional whitespace. Fractions are truncated toward zero.
fn parse_numeric(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(number) = trimmed.parse::<i64>() {
        return Some(number);
    }

    // f64 parsing also accepts "inf" and "NaN"
    let literal = trimmed
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if !literal || !trimmed.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }

    trimmed.parse::<f64>().ok().and_then(truncate)
}

fn truncate(value: f64) -> Option<i64> {
    (value.is_finite() && value.abs() < i64::MAX as f64).then(|| value.trunc() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_numeric_forms() {
        assert_eq!(parse_numeric("42"), Some(42));
        assert_eq!(parse_numeric(" 7 "), Some(7));
        assert_eq!(parse_numeric("-3"), Some(-3));
        assert_eq!(parse_numeric("2.9"), Some(2));
        assert_eq!(parse_numeric("1e3"), Some(1000));
        assert_eq!(parse_numeric("abc"), None);
        assert_eq!(parse_numeric("inf"), None);
        assert_eq!(parse_numeric("NaN"), None);
        assert_eq!(parse_numeric(""), None);
        assert_eq!(parse_numeric("."), None);
        assert_eq!(parse_numeric("12abc"), None);
    }

    #[test]
    fn test_lookup_walks_nested_mappings() {
        let payload = json!({ "differences": { "to": 3, "from": null }, "flat": "x" });

        assert_eq!(lookup(&payload, "differences.to"), Some(&json!(3)));
        assert_eq!(lookup(&payload, "differences.from"), None);
        assert_eq!(lookup(&payload, "differences.missing"), None);
        assert_eq!(lookup(&payload, "flat.deeper"), None);
        assert_eq!(lookup(&payload, "flat"), Some(&json!("x")));
    }
}
