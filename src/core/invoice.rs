//! Invoice and customer records

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Payment state of an invoice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Pending,
    Paid,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Paid => "paid",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = String;

    /// Accepts exactly `pending` or `paid`; no case folding.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(InvoiceStatus::Pending),
            "paid" => Ok(InvoiceStatus::Paid),
            other => Err(format!("unknown invoice status '{}'", other)),
        }
    }
}

/// A stored invoice
///
/// `amount` is in minor units (cents).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub customer_id: String,
    pub amount: i64,
    pub status: InvoiceStatus,
    pub date: NaiveDate,
}

impl Invoice {
    /// Build the form-facing view of this invoice (amount back in major units)
    pub fn to_form(&self) -> InvoiceFormView {
        InvoiceFormView {
            id: self.id.clone(),
            customer_id: self.customer_id.clone(),
            amount: from_minor_units(self.amount),
            status: self.status,
        }
    }
}

/// An invoice as an edit form shows it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceFormView {
    pub id: String,
    pub customer_id: String,
    pub amount: f64,
    pub status: InvoiceStatus,
}

/// Row to insert; the store assigns the id
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvoice {
    pub customer_id: String,
    pub amount: i64,
    pub status: InvoiceStatus,
    pub date: NaiveDate,
}

/// Fields an update may change (the issue date is fixed at creation)
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceChanges {
    pub customer_id: String,
    pub amount: i64,
    pub status: InvoiceStatus,
}

/// A customer an invoice can be billed to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: String,
    pub image_url: String,
}

/// Largest amount a single invoice may carry, in minor units
///
/// Every cent up to this bound is exactly representable as an `f64`, and the
/// sum of a million such invoices still fits an `i64`.
pub const MAX_AMOUNT_MINOR_UNITS: i64 = 1_000_000_000_000;

/// Convert a major-unit amount to integer minor units
///
/// Rounds to the nearest cent so that amounts like `19.99` (which are not
/// exactly representable) land on `1999` rather than `1998`. Returns `None`
/// when the rounded value is not finite or lies beyond
/// [`MAX_AMOUNT_MINOR_UNITS`] in either direction.
pub fn to_minor_units(amount: f64) -> Option<i64> {
    let cents = (amount * 100.0).round();
    let bound = MAX_AMOUNT_MINOR_UNITS as f64;
    (cents.is_finite() && (-bound..=bound).contains(&cents)).then_some(cents as i64)
}

/// Convert integer minor units back to a major-unit amount
pub fn from_minor_units(amount: i64) -> f64 {
    amount as f64 / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minor_units_exact() {
        assert_eq!(to_minor_units(12.50), Some(1250));
        assert_eq!(to_minor_units(1.0), Some(100));
        assert_eq!(to_minor_units(0.01), Some(1));
    }

    #[test]
    fn test_minor_units_rounds_representation_error() {
        assert_eq!(to_minor_units(19.99), Some(1999));
        assert_eq!(to_minor_units(0.29), Some(29));
        assert_eq!(to_minor_units(1.15), Some(115));
    }

    #[test]
    fn test_minor_units_sub_cent_rounds_to_zero() {
        assert_eq!(to_minor_units(0.004), Some(0));
        assert_eq!(to_minor_units(0.005), Some(1));
    }

    #[test]
    fn test_minor_units_out_of_range() {
        assert_eq!(to_minor_units(1e300), None);
        assert_eq!(to_minor_units(-1e300), None);
        assert_eq!(to_minor_units(f64::INFINITY), None);
        assert_eq!(to_minor_units(f64::NAN), None);
        assert_eq!(to_minor_units(10_000_000_000.0), Some(MAX_AMOUNT_MINOR_UNITS));
        assert_eq!(to_minor_units(10_000_000_000.01), None);
    }

    #[test]
    fn test_from_minor_units() {
        assert_eq!(from_minor_units(1250), 12.5);
        assert_eq!(from_minor_units(1), 0.01);
    }

    #[test]
    fn test_status_parse_is_exact() {
        assert_eq!("pending".parse(), Ok(InvoiceStatus::Pending));
        assert_eq!("paid".parse(), Ok(InvoiceStatus::Paid));
        assert!("Paid".parse::<InvoiceStatus>().is_err());
        assert!("overdue".parse::<InvoiceStatus>().is_err());
        assert!("".parse::<InvoiceStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_value(InvoiceStatus::Paid).unwrap();
        assert_eq!(json, "paid");
    }

    #[test]
    fn test_to_form_converts_amount() {
        let invoice = Invoice {
            id: "inv1".to_string(),
            customer_id: "c1".to_string(),
            amount: 1250,
            status: InvoiceStatus::Pending,
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        };
        let view = invoice.to_form();
        assert_eq!(view.amount, 12.5);
        assert_eq!(view.customer_id, "c1");

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["customerId"], "c1");
        assert_eq!(json["status"], "pending");
    }
}
