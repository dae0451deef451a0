//! Visit validation rules.
//!
//! A single rule-set shared by the JSON API, every spreadsheet import row
//! and the interactive CLI. Evaluation is pure: no store access, no logging.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationErrors};

use crate::models::visit::{NewVisit, VisitPayload};

/// Visit fields in the order errors are reported.
pub const VISIT_FIELDS: [&str; 4] = ["name", "email", "latitude", "longitude"];

/// Field name to list of human-readable reasons.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(IndexMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Error map holding one reason for one field
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Copy `validator` errors for `fields`, in that order, skipping any
    /// field that already carries an error.
    pub fn merge_validator(&mut self, errors: &ValidationErrors, fields: &[&str]) {
        let field_errors = errors.field_errors();
        for field in fields {
            if self.contains(field) {
                continue;
            }
            let Some(list) = field_errors.get(*field) else {
                continue;
            };
            for error in list.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("The {} field is invalid.", field));
                self.add(field, message);
            }
        }
    }

    /// Reorder entries to follow `fields`; unknown fields go last.
    fn sort_by_fields(&mut self, fields: &[&str]) {
        let rank = |name: &str| fields.iter().position(|f| *f == name).unwrap_or(fields.len());
        self.0.sort_by(|a, _, b, _| rank(a.as_str()).cmp(&rank(b.as_str())));
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, reasons) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            first = false;
            write!(f, "{}: {}", field, reasons.join(", "))?;
        }
        Ok(())
    }
}

/// Check a candidate visit against every rule.
///
/// All failing fields are reported together. On success the trimmed,
/// typed values are returned, ready to be stored.
pub fn validate_visit(payload: &VisitPayload) -> Result<NewVisit, FieldErrors> {
    let mut errors = FieldErrors::new();

    let name = required_string(&mut errors, "name", payload.name.as_ref());
    let email = required_string(&mut errors, "email", payload.email.as_ref());
    let latitude = required_number(&mut errors, "latitude", payload.latitude.as_ref());
    let longitude = required_number(&mut errors, "longitude", payload.longitude.as_ref());

    // Fields that failed coercion get placeholders; their constraint errors are dropped.
    let candidate = NewVisit {
        name: name.unwrap_or_default(),
        email: email.unwrap_or_default(),
        latitude: latitude.unwrap_or_default(),
        longitude: longitude.unwrap_or_default(),
    };

    if let Err(e) = candidate.validate() {
        errors.merge_validator(&e, &VISIT_FIELDS);
    }

    if errors.is_empty() {
        Ok(candidate)
    } else {
        errors.sort_by_fields(&VISIT_FIELDS);
        Err(errors)
    }
}

/// Check one field in isolation, with the same rules as [`validate_visit`].
///
/// Used by interactive input, where fields arrive one at a time.
pub fn validate_field(field: &str, value: Value) -> Result<(), Vec<String>> {
    let mut payload = VisitPayload::default();
    match field {
        "name" => payload.name = Some(value),
        "email" => payload.email = Some(value),
        "latitude" => payload.latitude = Some(value),
        "longitude" => payload.longitude = Some(value),
        other => return Err(vec![format!("Unknown field {}.", other)]),
    }

    match validate_visit(&payload) {
        Ok(_) => Ok(()),
        Err(errors) => match errors.get(field) {
            Some(reasons) => Err(reasons.to_vec()),
            None => Ok(()),
        },
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        _ => false,
    }
}

fn required_string(errors: &mut FieldErrors, field: &str, value: Option<&Value>) -> Option<String> {
    if is_blank(value) {
        errors.add(field, format!("The {} field is required.", field));
        return None;
    }
    match value {
        Some(Value::String(s)) => Some(s.trim().to_string()),
        _ => {
            errors.add(field, format!("The {} field must be a string.", field));
            None
        }
    }
}

fn required_number(errors: &mut FieldErrors, field: &str, value: Option<&Value>) -> Option<f64> {
    if is_blank(value) {
        errors.add(field, format!("The {} field is required.", field));
        return None;
    }
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed.filter(|n| n.is_finite()) {
        Some(n) => Some(n),
        None => {
            errors.add(field, format!("The {} field must be a number.", field));
            None
        }
    }
}
