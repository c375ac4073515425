//! Shape checks for incoming catalog payloads.
//!
//! Every offending field is reported, not just the first one, so a caller
//! can fix a payload in one round trip.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use super::models::{Author, Book};

pub const REQUIRED: &str = "required";
pub const NOT_A_STRING: &str = "must be a string";
pub const NOT_A_COUNT: &str = "must be a non-negative integer";
pub const EMPTY: &str = "must not be empty";
pub const NOT_AN_OBJECT: &str = "must be a JSON object";

/// One rejected field, rendered as `{"field": ..., "error": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub error: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {entity}: {}", describe(.violations))]
pub struct ValidationError {
    pub entity: &'static str,
    pub violations: Vec<FieldViolation>,
}

fn describe(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|violation| format!("{} {}", violation.field, violation.error))
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationError {
    pub fn details(&self) -> Vec<Value> {
        self.violations
            .iter()
            .map(|violation| serde_json::json!(violation))
            .collect()
    }

    pub fn has_violation(&self, field: &str, error: &str) -> bool {
        self.violations
            .iter()
            .any(|violation| violation.field == field && violation.error == error)
    }
}

/// Field reader that accumulates violations instead of stopping early.
struct Fields<'a> {
    object: &'a Map<String, Value>,
    violations: Vec<FieldViolation>,
}

impl<'a> Fields<'a> {
    fn of(entity: &'static str, payload: &'a Value) -> Result<Self, ValidationError> {
        match payload.as_object() {
            Some(object) => Ok(Self {
                object,
                violations: Vec::new(),
            }),
            None => Err(ValidationError {
                entity,
                violations: vec![FieldViolation {
                    field: "body",
                    error: NOT_AN_OBJECT,
                }],
            }),
        }
    }

    /// Look up `field`, falling back to its legacy wire name.
    fn lookup(&self, field: &str, legacy: Option<&str>) -> Option<&'a Value> {
        let object: &'a Map<String, Value> = self.object;
        object
            .get(field)
            .or_else(|| legacy.and_then(|name| object.get(name)))
            .filter(|value| !value.is_null())
    }

    fn reject(&mut self, field: &'static str, error: &'static str) {
        self.violations.push(FieldViolation { field, error });
    }

    fn string(&mut self, field: &'static str, legacy: Option<&str>) -> String {
        match self.lookup(field, legacy) {
            None => {
                self.reject(field, REQUIRED);
                String::new()
            }
            Some(Value::String(text)) => text.clone(),
            Some(_) => {
                self.reject(field, NOT_A_STRING);
                String::new()
            }
        }
    }

    fn identifier(&mut self, field: &'static str, legacy: Option<&str>) -> String {
        let before = self.violations.len();
        let id = self.string(field, legacy);
        if self.violations.len() == before && id.trim().is_empty() {
            self.reject(field, EMPTY);
        }
        id
    }

    fn count(&mut self, field: &'static str) -> u32 {
        match self.lookup(field, None) {
            None => {
                self.reject(field, REQUIRED);
                0
            }
            Some(value) => match value.as_u64().and_then(|n| u32::try_from(n).ok()) {
                Some(n) => n,
                None => {
                    self.reject(field, NOT_A_COUNT);
                    0
                }
            },
        }
    }

    fn finish<T>(self, entity: &'static str, record: T) -> Result<T, ValidationError> {
        if self.violations.is_empty() {
            Ok(record)
        } else {
            Err(ValidationError {
                entity,
                violations: self.violations,
            })
        }
    }
}

/// Validate a book payload. All seven fields are required; `pages` must be
/// a non-negative integer and the rest strings.
pub fn book_from_json(payload: &Value) -> Result<Book, ValidationError> {
    let mut fields = Fields::of("book", payload)?;

    let book = Book {
        id: fields.identifier("id", Some("uuid")),
        title: fields.string("title", None),
        author_id: fields.string("author_id", Some("author_uuid")),
        description: fields.string("description", None),
        pages: fields.count("pages"),
        language: fields.string("language", None),
        genre: fields.string("genre", None),
    };

    fields.finish("book", book)
}

pub fn author_from_json(payload: &Value) -> Result<Author, ValidationError> {
    let mut fields = Fields::of("author", payload)?;

    let author = Author {
        id: fields.identifier("id", Some("uuid")),
        name: fields.string("name", None),
    };

    fields.finish("author", author)
}
