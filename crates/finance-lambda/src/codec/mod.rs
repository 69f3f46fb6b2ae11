//! Encoding/decoding at the persistence boundary.
//!
//! Two layers: [`value`] converts between request values and storage values
//! (float to exact decimal and back), and [`attribute`] adds and removes the
//! storage engine's type tags.

pub mod attribute;
pub mod value;

pub use attribute::{
    decode_attribute_item, encode_attribute_item, from_attribute, from_attribute_item,
    to_attribute, to_attribute_item, AttributeMap,
};
pub use value::{decode_item, decode_value, encode_item, encode_value};
