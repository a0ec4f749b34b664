//! Invoice form schema
//!
//! An invoice submission carries three fields. The schema coerces them from
//! strings and checks them:
//!
//! | field        | rule                                  | message                           |
//! |--------------|---------------------------------------|-----------------------------------|
//! | `customerId` | present, not blank                    | `select a creator`                |
//! | `amount`     | numeric, at least one cent, in range  | `amount must be greater than 0`   |
//! | `status`     | exactly `pending` or `paid`           | `select a status`                 |
//!
//! The amount is checked after rounding to minor units, so `0.004` fails and
//! anything beyond [`MAX_AMOUNT_MINOR_UNITS`](crate::core::invoice::MAX_AMOUNT_MINOR_UNITS) is refused before it can reach
//! storage.
//!
//! The invoice id comes from the request path and the issue date from the
//! server clock, so neither is part of the form.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{FieldErrors, validators};
use crate::core::error::AppResult;
use crate::core::invoice::{InvoiceStatus, to_minor_units};

/// Raw invoice submission, exactly as the form posts it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceForm {
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl InvoiceForm {
    pub fn new(customer_id: &str, amount: &str, status: &str) -> Self {
        Self {
            customer_id: Some(customer_id.to_string()),
            amount: Some(amount.to_string()),
            status: Some(status.to_string()),
        }
    }
}

/// A validated invoice submission; `amount` is in minor units
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceInput {
    pub customer_id: String,
    pub amount: i64,
    pub status: InvoiceStatus,
}

#[derive(Debug, Validate)]
struct CoercedInvoice {
    #[validate(required(message = "select a creator"))]
    customer_id: Option<String>,

    #[validate(
        required(message = "amount must be greater than 0"),
        range(min = 1, message = "amount must be greater than 0")
    )]
    amount: Option<i64>,

    #[validate(required(message = "select a status"))]
    status: Option<InvoiceStatus>,
}

impl CoercedInvoice {
    fn from_form(form: &InvoiceForm) -> Self {
        Self {
            customer_id: validators::non_blank(form.customer_id.as_deref()),
            amount: validators::number(form.amount.as_deref()).and_then(to_minor_units),
            status: validators::one_of(form.status.as_deref()),
        }
    }
}

/// Schema for invoice create/update submissions
pub struct InvoiceSchema;

impl InvoiceSchema {
    /// Validate without failing: typed input or the field-keyed messages
    pub fn safe_parse(form: &InvoiceForm) -> Result<InvoiceInput, FieldErrors> {
        let coerced = CoercedInvoice::from_form(form);
        coerced.validate().map_err(FieldErrors::from)?;

        match coerced {
            CoercedInvoice {
                customer_id: Some(customer_id),
                amount: Some(amount),
                status: Some(status),
            } => Ok(InvoiceInput {
                customer_id,
                amount,
                status,
            }),
            // validate() passing guarantees every field is present
            _ => unreachable!("validated invoice has missing fields"),
        }
    }

    /// Validate, turning failures into the crate error for `?` propagation
    pub fn parse(form: &InvoiceForm) -> AppResult<InvoiceInput> {
        Ok(Self::safe_parse(form)?)
    }
}
