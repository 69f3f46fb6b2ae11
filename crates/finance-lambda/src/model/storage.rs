//! Value tree at the persistence boundary.
//!
//! Mirrors [`Value`](crate::model::Value) with floats replaced by exact
//! decimals, and defines the storage engine's attribute tag vocabulary.

use std::collections::BTreeMap;
use std::fmt;

use crate::limits::MAX_PLAIN_EXPONENT;
use crate::model::Decimal;

/// A top-level stored record: attribute name to value.
pub type StorageItem = BTreeMap<String, StorageValue>;

/// Attribute type tags understood by the storage engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeTag {
    /// `S`: UTF-8 string
    String,
    /// `N`: number carried as exact decimal text
    Number,
    /// `BOOL`: boolean
    Bool,
    /// `NULL`: null marker, payload is always `true`
    Null,
    /// `L`: ordered list of tagged values
    List,
    /// `M`: map of name to tagged value
    Map,
}

impl AttributeTag {
    /// Every tag in the vocabulary.
    pub const ALL: [AttributeTag; 6] = [
        AttributeTag::String,
        AttributeTag::Number,
        AttributeTag::Bool,
        AttributeTag::Null,
        AttributeTag::List,
        AttributeTag::Map,
    ];

    /// Returns the wire name of this tag.
    pub fn as_str(self) -> &'static str {
        match self {
            AttributeTag::String => "S",
            AttributeTag::Number => "N",
            AttributeTag::Bool => "BOOL",
            AttributeTag::Null => "NULL",
            AttributeTag::List => "L",
            AttributeTag::Map => "M",
        }
    }

    /// Looks up a tag by wire name.
    pub fn from_name(name: &str) -> Option<AttributeTag> {
        Self::ALL.into_iter().find(|tag| tag.as_str() == name)
    }
}

impl fmt::Display for AttributeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value ready for storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageValue {
    Null,
    Bool(bool),
    Int(i64),
    Decimal(Decimal),
    String(String),
    List(Vec<StorageValue>),
    Map(StorageItem),
}

impl StorageValue {
    /// Returns the attribute tag this value is written with.
    pub fn tag(&self) -> AttributeTag {
        match self {
            StorageValue::Null => AttributeTag::Null,
            StorageValue::Bool(_) => AttributeTag::Bool,
            StorageValue::Int(_) | StorageValue::Decimal(_) => AttributeTag::Number,
            StorageValue::String(_) => AttributeTag::String,
            StorageValue::List(_) => AttributeTag::List,
            StorageValue::Map(_) => AttributeTag::Map,
        }
    }

    /// Returns the `N` payload text for `Int` and `Decimal` values.
    ///
    /// Integral decimals in plain notation get a `.0` suffix so they never
    /// read back as integers.
    pub fn number_text(&self) -> Option<String> {
        match self {
            StorageValue::Int(i) => Some(i.to_string()),
            StorageValue::Decimal(d) if d.is_integer() && d.exponent() <= MAX_PLAIN_EXPONENT => {
                Some(format!("{d}.0"))
            }
            StorageValue::Decimal(d) => Some(d.to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_names_roundtrip() {
        for tag in AttributeTag::ALL {
            assert_eq!(AttributeTag::from_name(tag.as_str()), Some(tag));
        }
        assert_eq!(AttributeTag::from_name("SS"), None);
        assert_eq!(AttributeTag::from_name("B"), None);
        assert_eq!(AttributeTag::from_name("s"), None);
    }

    #[test]
    fn test_value_tags() {
        assert_eq!(StorageValue::Int(1).tag(), AttributeTag::Number);
        assert_eq!(StorageValue::Decimal(Decimal::ZERO).tag(), AttributeTag::Number);
        assert_eq!(StorageValue::Map(StorageItem::new()).tag().to_string(), "M");
        assert_eq!(StorageValue::Null.tag().as_str(), "NULL");
    }

    #[test]
    fn test_number_text() {
        let d: Decimal = "0.1".parse().unwrap();
        assert_eq!(StorageValue::Decimal(d).number_text().as_deref(), Some("0.1"));
        assert_eq!(StorageValue::Int(-3).number_text().as_deref(), Some("-3"));
        assert_eq!(StorageValue::Bool(true).number_text(), None);
    }

    #[test]
    fn test_integral_decimal_text_is_not_integer_text() {
        let text = |s: &str| StorageValue::Decimal(s.parse().unwrap()).number_text().unwrap();
        assert_eq!(text("12"), "12.0");
        assert_eq!(text("-1500"), "-1500.0");
        assert_eq!(text("0"), "0.0");
        assert_eq!(text("1E20"), "100000000000000000000.0");
        assert_eq!(text("1E25"), "1E25");
    }
}
