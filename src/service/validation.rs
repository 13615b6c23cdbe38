//! Declarative request validation: one rule set per operation over query, body and path params.

use crate::error::{AppError, Location, ValidationErrors};
use regex::Regex;
use serde_json::{Map, Number, Value};
use std::collections::HashMap;
use std::sync::LazyLock;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Number,
    String,
}

/// Constraints on a single named parameter.
#[derive(Clone, Copy, Debug)]
pub struct FieldRule {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub integer: bool,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub max_length: Option<usize>,
    pub pattern: Option<PatternFn>,
}

/// Accessor for a compiled pattern, so rules stay `const`.
pub type PatternFn = fn() -> &'static Regex;

impl FieldRule {
    pub const fn number(name: &'static str) -> Self {
        FieldRule {
            name,
            kind: FieldKind::Number,
            required: false,
            integer: false,
            minimum: None,
            maximum: None,
            max_length: None,
            pattern: None,
        }
    }

    pub const fn string(name: &'static str) -> Self {
        FieldRule {
            kind: FieldKind::String,
            ..FieldRule::number(name)
        }
    }

    pub const fn required(self) -> Self {
        FieldRule { required: true, ..self }
    }

    pub const fn integer(self) -> Self {
        FieldRule { integer: true, ..self }
    }

    pub const fn min(self, minimum: f64) -> Self {
        FieldRule {
            minimum: Some(minimum),
            ..self
        }
    }

    pub const fn max(self, maximum: f64) -> Self {
        FieldRule {
            maximum: Some(maximum),
            ..self
        }
    }

    pub const fn max_length(self, max_length: usize) -> Self {
        FieldRule {
            max_length: Some(max_length),
            ..self
        }
    }

    pub const fn pattern(self, pattern: PatternFn) -> Self {
        FieldRule {
            pattern: Some(pattern),
            ..self
        }
    }
}

/// Rules for one operation. A group that is `None` is not checked.
#[derive(Clone, Copy, Debug)]
pub struct ValidationSchema {
    pub query: Option<&'static [FieldRule]>,
    pub body: Option<&'static [FieldRule]>,
    pub params: Option<&'static [FieldRule]>,
}

pub const PRODUCT_ID_PATTERN: &str = "^[a-fA-F0-9]{24}$";
pub const NAME_MAX_LENGTH: usize = 128;

/// Largest integer a JSON number holds exactly (2^53 - 1).
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

static PRODUCT_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PRODUCT_ID_PATTERN).expect("product id pattern compiles"));

fn product_id_re() -> &'static Regex {
    &PRODUCT_ID_RE
}

const PRODUCT_ID_PARAMS: &[FieldRule] = &[FieldRule::string("productId").pattern(product_id_re).required()];

const LIST_QUERY: &[FieldRule] = &[
    FieldRule::number("page").integer().min(1.0).max(MAX_SAFE_INTEGER),
    FieldRule::number("perPage").integer().min(1.0).max(100.0),
    FieldRule::string("name"),
    FieldRule::number("price"),
];

const FULL_BODY: &[FieldRule] = &[
    FieldRule::number("price"),
    FieldRule::string("name").max_length(NAME_MAX_LENGTH).required(),
];

const PARTIAL_BODY: &[FieldRule] = &[
    FieldRule::number("price"),
    FieldRule::string("name").max_length(NAME_MAX_LENGTH),
];

/// GET /v1/products
pub const LIST_PRODUCTS: ValidationSchema = ValidationSchema {
    query: Some(LIST_QUERY),
    body: None,
    params: None,
};

/// POST /v1/products
pub const CREATE_PRODUCT: ValidationSchema = ValidationSchema {
    query: None,
    body: Some(FULL_BODY),
    params: None,
};

/// PUT /v1/products/:productId
pub const REPLACE_PRODUCT: ValidationSchema = ValidationSchema {
    query: None,
    body: Some(FULL_BODY),
    params: Some(PRODUCT_ID_PARAMS),
};

/// PATCH /v1/products/:productId
pub const UPDATE_PRODUCT: ValidationSchema = ValidationSchema {
    query: None,
    body: Some(PARTIAL_BODY),
    params: Some(PRODUCT_ID_PARAMS),
};

impl ValidationSchema {
    /// Check path params. Always succeeds when the schema has no params group.
    pub fn validate_params(&self, params: &[(&str, &str)]) -> Result<(), AppError> {
        let Some(rules) = self.params else {
            return Ok(());
        };
        let map: Map<String, Value> = params
            .iter()
            .map(|(k, v)| ((*k).to_string(), Value::String((*v).to_string())))
            .collect();
        check_group(Location::Params, map, rules).map(|_| ())
    }

    /// Check query string params, converting numeric ones. Returns the normalized values.
    pub fn validate_query(&self, query: &HashMap<String, String>) -> Result<Map<String, Value>, AppError> {
        let map: Map<String, Value> = query
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        match self.query {
            Some(rules) => check_group(Location::Query, map, rules),
            None => Ok(map),
        }
    }

    /// Check a JSON body. It must be an object. Returns the normalized values.
    pub fn validate_body(&self, body: Value) -> Result<Map<String, Value>, AppError> {
        let Some(rules) = self.body else {
            return Ok(Map::new());
        };
        let map = match body {
            Value::Object(m) => m,
            _ => {
                let mut errors = ValidationErrors::default();
                errors.push(Location::Body, "body", "must be an object");
                return Err(AppError::Validation(errors));
            }
        };
        check_group(Location::Body, map, rules)
    }
}

fn check_group(
    location: Location,
    input: Map<String, Value>,
    rules: &[FieldRule],
) -> Result<Map<String, Value>, AppError> {
    let mut errors = ValidationErrors::default();
    let mut out = Map::new();

    let mut keys: Vec<&String> = input.keys().collect();
    keys.sort();
    for key in keys {
        if !rules.iter().any(|r| r.name == key.as_str()) {
            errors.push(location, key, "is not allowed");
        }
    }

    for rule in rules {
        match input.get(rule.name) {
            None => {
                if rule.required {
                    errors.push(location, rule.name, "is required");
                }
            }
            Some(v) => match check_field(rule, v) {
                Ok(normalized) => {
                    out.insert(rule.name.to_string(), normalized);
                }
                Err(messages) => {
                    for m in messages {
                        errors.push(location, rule.name, m);
                    }
                }
            },
        }
    }

    errors.into_result()?;
    Ok(out)
}

fn check_field(rule: &FieldRule, v: &Value) -> Result<Value, Vec<String>> {
    match rule.kind {
        FieldKind::Number => check_number(rule, v).map(number_value).map_err(|m| vec![m]),
        FieldKind::String => check_string(rule, v),
    }
}

fn check_number(rule: &FieldRule, v: &Value) -> Result<f64, String> {
    let n = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|_| !s.trim().is_empty()),
        _ => None,
    };
    let n = match n {
        Some(n) if n.is_finite() => n,
        _ => return Err("must be a number".into()),
    };
    if rule.integer && n.fract() != 0.0 {
        return Err("must be an integer".into());
    }
    if let Some(min) = rule.minimum {
        if n < min {
            return Err(format!("must be greater than or equal to {}", min));
        }
    }
    if let Some(max) = rule.maximum {
        if n > max {
            return Err(format!("must be less than or equal to {}", max));
        }
    }
    Ok(n)
}

/// Whole numbers stay integers so they deserialize into integer fields.
fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

fn check_string(rule: &FieldRule, v: &Value) -> Result<Value, Vec<String>> {
    let Some(s) = v.as_str() else {
        return Err(vec!["must be a string".into()]);
    };
    if s.is_empty() {
        return Err(vec!["is not allowed to be empty".into()]);
    }
    let mut messages = Vec::new();
    if let Some(max) = rule.max_length {
        if s.chars().count() > max {
            messages.push(format!("length must be less than or equal to {} characters long", max));
        }
    }
    if let Some(pattern) = rule.pattern {
        let re = pattern();
        if !re.is_match(s) {
            messages.push(format!("does not match the required pattern {}", re.as_str()));
        }
    }
    if messages.is_empty() {
        Ok(Value::String(s.to_string()))
    } else {
        Err(messages)
    }
}
