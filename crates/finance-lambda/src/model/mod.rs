//! Data model types.
//!
//! This module contains the two value trees and the number type that
//! connects them:
//! - Values (request/response side)
//! - Storage values (persistence side)
//! - Exact decimals

pub mod decimal;
pub mod storage;
pub mod value;

pub use decimal::Decimal;
pub use storage::{AttributeTag, StorageItem, StorageValue};
pub use value::{item_from_json, item_to_json, Item, Value, ValueKind};
