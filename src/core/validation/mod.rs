//! Validation of submitted forms
//!
//! Raw form structs ([`InvoiceForm`], [`CredentialsForm`]) are the only place
//! untyped input lives. Schemas turn them into typed values or into
//! [`FieldErrors`], a field-keyed map of messages the UI renders inline.

pub mod credentials;
pub mod schema;
pub mod validators;

pub use credentials::CredentialsForm;
pub use schema::{InvoiceForm, InvoiceInput, InvoiceSchema};

use serde::Serialize;
use std::collections::BTreeMap;

/// Field-keyed validation messages
///
/// Keys use the form's field names (`customerId`, `amount`, `status`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Record a message for a field
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Messages recorded for a field
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fields that failed, in name order
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// One-line rendering, `field: message; field: message`
    pub fn summary(&self) -> String {
        self.0
            .iter()
            .flat_map(|(field, messages)| messages.iter().map(move |m| format!("{}: {}", field, m)))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut out = FieldErrors::default();
        for (field, field_errors) in errors.field_errors() {
            let name = camel_case(field.as_ref());
            for error in field_errors.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                out.push(name.clone(), message);
            }
        }
        out
    }
}

/// `customer_id` -> `customerId`
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
