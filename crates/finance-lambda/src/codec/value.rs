//! Conversion between request values and storage values.
//!
//! Encoding replaces every float with an exact decimal built from the
//! float's text; decoding turns decimals back into floats. Everything else
//! passes through with its structure intact.

use crate::error::EncodeError;
use crate::limits::MAX_NESTING_DEPTH;
use crate::model::{Decimal, Item, StorageItem, StorageValue, Value};

// =============================================================================
// ENCODING
// =============================================================================

/// Encodes a value tree into its storage form.
///
/// Trees nested deeper than [`MAX_NESTING_DEPTH`] are rejected, matching the
/// limit applied when stored attributes are read back.
pub fn encode_value(value: &Value) -> Result<StorageValue, EncodeError> {
    encode_at(value, 0)
}

/// Encodes every field of a record.
pub fn encode_item(item: &Item) -> Result<StorageItem, EncodeError> {
    encode_fields(item, 0)
}

fn encode_fields(item: &Item, depth: usize) -> Result<StorageItem, EncodeError> {
    item.iter()
        .map(|(k, v)| Ok((k.clone(), encode_at(v, depth + 1)?)))
        .collect()
}

fn encode_at(value: &Value, depth: usize) -> Result<StorageValue, EncodeError> {
    if depth > MAX_NESTING_DEPTH {
        return Err(EncodeError::NestingTooDeep {
            max: MAX_NESTING_DEPTH,
        });
    }
    Ok(match value {
        Value::Null => StorageValue::Null,
        Value::Bool(b) => StorageValue::Bool(*b),
        Value::Int(i) => StorageValue::Int(*i),
        Value::Float(f) => StorageValue::Decimal(Decimal::from_f64(*f)?),
        Value::String(s) => StorageValue::String(s.clone()),
        Value::List(items) => StorageValue::List(
            items
                .iter()
                .map(|v| encode_at(v, depth + 1))
                .collect::<Result<_, _>>()?,
        ),
        Value::Map(map) => StorageValue::Map(encode_fields(map, depth)?),
    })
}

// =============================================================================
// DECODING
// =============================================================================

/// Decodes a storage value tree.
///
/// Decimals become the nearest binary float.
pub fn decode_value(value: &StorageValue) -> Value {
    match value {
        StorageValue::Null => Value::Null,
        StorageValue::Bool(b) => Value::Bool(*b),
        StorageValue::Int(i) => Value::Int(*i),
        StorageValue::Decimal(d) => Value::Float(d.to_f64()),
        StorageValue::String(s) => Value::String(s.clone()),
        StorageValue::List(items) => Value::List(items.iter().map(decode_value).collect()),
        StorageValue::Map(map) => Value::Map(decode_item(map)),
    }
}

/// Decodes every field of a stored record.
pub fn decode_item(item: &StorageItem) -> Item {
    item.iter()
        .map(|(k, v)| (k.clone(), decode_value(v)))
        .collect()
}
