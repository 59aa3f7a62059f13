// schema.rs
//! Turns untrusted request bodies into typed category requests.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::{CategoryCreate, CategoryUpdate};

pub const NAME_MIN_LEN: usize = 1;
pub const NAME_MAX_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub reason: String,
}

impl FieldError {
    fn new(field: &str, reason: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    #[error("No raw data found")]
    Empty,
    #[error("Failed to read request body: {0}")]
    Unreadable(String),
    #[error("Malformed JSON body: {0}")]
    Malformed(String),
    #[error("{} invalid field(s)", .0.len())]
    Fields(Vec<FieldError>),
}

/// Parses a raw body. Empty bodies, `null` and `{}` count as no data.
pub fn parse_body(body: &[u8]) -> Result<Value, ValidationFailure> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ValidationFailure::Empty);
    }

    let raw: Value =
        serde_json::from_slice(body).map_err(|e| ValidationFailure::Malformed(e.to_string()))?;

    match &raw {
        Value::Null => Err(ValidationFailure::Empty),
        Value::Object(map) if map.is_empty() => Err(ValidationFailure::Empty),
        _ => Ok(raw),
    }
}

pub fn validate_create(raw: &Value) -> Result<CategoryCreate, ValidationFailure> {
    let fields = as_object(raw)?;
    let name = check_name(fields).map_err(|e| ValidationFailure::Fields(vec![e]))?;
    Ok(CategoryCreate { name })
}

pub fn validate_update(raw: &Value) -> Result<CategoryUpdate, ValidationFailure> {
    let fields = as_object(raw)?;
    let name = check_name(fields).map_err(|e| ValidationFailure::Fields(vec![e]))?;
    Ok(CategoryUpdate { name })
}

fn as_object(raw: &Value) -> Result<&Map<String, Value>, ValidationFailure> {
    raw.as_object().ok_or_else(|| {
        ValidationFailure::Fields(vec![FieldError::new("body", "expected a JSON object")])
    })
}

fn check_name(fields: &Map<String, Value>) -> Result<String, FieldError> {
    let name = match fields.get("name") {
        None => return Err(FieldError::new("name", "field required")),
        Some(Value::String(name)) => name,
        Some(_) => return Err(FieldError::new("name", "must be a string")),
    };

    // Length is counted in characters, not bytes.
    let len = name.chars().count();
    if len < NAME_MIN_LEN {
        return Err(FieldError::new(
            "name",
            format!("must be at least {NAME_MIN_LEN} character long"),
        ));
    }
    if len > NAME_MAX_LEN {
        return Err(FieldError::new(
            "name",
            format!("must be at most {NAME_MAX_LEN} characters long"),
        ));
    }

    Ok(name.clone())
}
