//! Request validation for transaction bodies.
//!
//! Structural checks (JSON syntax, object shape) happen while the body is
//! parsed; this module checks the fields a transaction must carry and
//! coerces the amount into a float.

use crate::error::ValidationError;
use crate::model::{Item, Value};

/// Fields every new transaction must carry, in the order they are checked.
pub const REQUIRED_TRANSACTION_FIELDS: [&str; 5] =
    ["amount", "description", "date", "type", "category"];

/// Checks that every required transaction field is present.
///
/// Reports the first missing field in [`REQUIRED_TRANSACTION_FIELDS`] order.
/// Only absent keys count as missing; their values are checked later.
pub fn validate_transaction_request(body: &Item) -> Result<(), ValidationError> {
    match REQUIRED_TRANSACTION_FIELDS
        .into_iter()
        .find(|field| !body.contains_key(*field))
    {
        Some(field) => Err(ValidationError::MissingField { field }),
        None => Ok(()),
    }
}

/// Coerces a transaction amount into a float.
///
/// Numbers convert directly and strings are parsed after trimming. Booleans,
/// containers, and non-finite results are rejected.
pub fn coerce_amount(value: &Value) -> Result<f64, ValidationError> {
    let invalid = ValidationError::InvalidField {
        field: "amount",
        reason: "must be a number",
    };
    let amount = match value {
        Value::Int(i) => *i as f64,
        Value::Float(f) => *f,
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| invalid.clone())?,
        _ => return Err(invalid),
    };
    if amount.is_finite() {
        Ok(amount)
    } else {
        Err(invalid)
    }
}
