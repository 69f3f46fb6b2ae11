//! Tagged attribute wire form used by the storage engine.
//!
//! Every stored value is a single-key JSON object whose key names the type:
//!
//! ```text
//! {"S": "coffee"}            string
//! {"N": "12.5"}              number (exact decimal text)
//! {"BOOL": true}             boolean
//! {"NULL": true}             null
//! {"L": [{"N": "1"}, ...]}   list
//! {"M": {"k": {"S": "v"}}}   map
//! ```
//!
//! Untagging is strict: unknown tags, payloads that disagree with their tag,
//! and malformed numbers are errors rather than pass-through values.

use serde_json::Value as Json;

use crate::codec::value::{decode_item, encode_item};
use crate::error::{DecodeError, EncodeError};
use crate::limits::MAX_NESTING_DEPTH;
use crate::model::{AttributeTag, Decimal, Item, StorageItem, StorageValue};

/// A record in tagged wire form: attribute name to tagged value.
pub type AttributeMap = serde_json::Map<String, Json>;

// =============================================================================
// TAGGING
// =============================================================================

/// Renders a storage value as a tagged attribute.
pub fn to_attribute(value: &StorageValue) -> Json {
    let payload = match value {
        StorageValue::Null => Json::Bool(true),
        StorageValue::Bool(b) => Json::Bool(*b),
        StorageValue::Int(_) | StorageValue::Decimal(_) => {
            Json::String(value.number_text().unwrap_or_default())
        }
        StorageValue::String(s) => Json::String(s.clone()),
        StorageValue::List(items) => Json::Array(items.iter().map(to_attribute).collect()),
        StorageValue::Map(map) => Json::Object(to_attribute_item(map)),
    };
    let mut tagged = AttributeMap::new();
    tagged.insert(value.tag().as_str().to_string(), payload);
    Json::Object(tagged)
}

/// Renders every field of a stored record as a tagged attribute.
pub fn to_attribute_item(item: &StorageItem) -> AttributeMap {
    item.iter()
        .map(|(k, v)| (k.clone(), to_attribute(v)))
        .collect()
}

/// Encodes a record and tags it for the storage engine.
pub fn encode_attribute_item(item: &Item) -> Result<AttributeMap, EncodeError> {
    Ok(to_attribute_item(&encode_item(item)?))
}

// =============================================================================
// UNTAGGING
// =============================================================================

/// Location of an attribute inside a record, rendered only for errors.
#[derive(Clone, Copy)]
enum Segment<'a> {
    Root,
    Key(&'a str),
    Index(usize),
}

#[derive(Clone, Copy)]
struct Path<'a> {
    parent: Option<&'a Path<'a>>,
    segment: Segment<'a>,
    depth: usize,
}

impl<'a> Path<'a> {
    const ROOT: Path<'static> = Path {
        parent: None,
        segment: Segment::Root,
        depth: 0,
    };

    fn child(&'a self, segment: Segment<'a>) -> Path<'a> {
        Path {
            parent: Some(self),
            segment,
            depth: self.depth + 1,
        }
    }

    fn render(&self) -> String {
        let mut segments = Vec::new();
        let mut current = Some(self);
        while let Some(path) = current {
            segments.push(path.segment);
            current = path.parent;
        }
        let mut out = String::new();
        for segment in segments.iter().rev() {
            match segment {
                Segment::Root => out.push('$'),
                Segment::Key(k) => {
                    out.push('.');
                    out.push_str(k);
                }
                Segment::Index(i) => {
                    out.push('[');
                    out.push_str(&i.to_string());
                    out.push(']');
                }
            }
        }
        out
    }
}

/// Removes storage tags from a single attribute.
pub fn from_attribute(json: &Json) -> Result<StorageValue, DecodeError> {
    untag(json, &Path::ROOT)
}

/// Removes storage tags from every field of a stored record.
pub fn from_attribute_item(map: &AttributeMap) -> Result<StorageItem, DecodeError> {
    untag_map(map, &Path::ROOT)
}

/// Untags a stored record and decodes it into request values.
pub fn decode_attribute_item(map: &AttributeMap) -> Result<Item, DecodeError> {
    Ok(decode_item(&from_attribute_item(map)?))
}

fn untag_map(map: &AttributeMap, path: &Path<'_>) -> Result<StorageItem, DecodeError> {
    map.iter()
        .map(|(k, v)| Ok((k.clone(), untag(v, &path.child(Segment::Key(k)))?)))
        .collect()
}

fn untag(json: &Json, path: &Path<'_>) -> Result<StorageValue, DecodeError> {
    if path.depth > MAX_NESTING_DEPTH {
        return Err(DecodeError::NestingTooDeep {
            max: MAX_NESTING_DEPTH,
            path: path.render(),
        });
    }

    let object = match json {
        Json::Object(object) if object.len() == 1 => object,
        _ => return Err(DecodeError::MalformedAttribute { path: path.render() }),
    };
    let Some((name, payload)) = object.iter().next() else {
        return Err(DecodeError::MalformedAttribute { path: path.render() });
    };
    let tag = AttributeTag::from_name(name).ok_or_else(|| DecodeError::UnknownTag {
        tag: name.clone(),
        path: path.render(),
    })?;

    let mismatch = |expected: &'static str| DecodeError::PayloadMismatch {
        tag: tag.as_str(),
        expected,
        path: path.render(),
    };

    match (tag, payload) {
        (AttributeTag::String, Json::String(s)) => Ok(StorageValue::String(s.clone())),
        (AttributeTag::String, _) => Err(mismatch("a string")),

        (AttributeTag::Number, Json::String(text)) => parse_number(text, path),
        (AttributeTag::Number, _) => Err(mismatch("a number string")),

        (AttributeTag::Bool, Json::Bool(b)) => Ok(StorageValue::Bool(*b)),
        (AttributeTag::Bool, _) => Err(mismatch("a boolean")),

        (AttributeTag::Null, Json::Bool(true)) => Ok(StorageValue::Null),
        (AttributeTag::Null, _) => Err(mismatch("true")),

        (AttributeTag::List, Json::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| untag(item, &path.child(Segment::Index(i))))
            .collect::<Result<_, _>>()
            .map(StorageValue::List),
        (AttributeTag::List, _) => Err(mismatch("an array")),

        (AttributeTag::Map, Json::Object(map)) => untag_map(map, path).map(StorageValue::Map),
        (AttributeTag::Map, _) => Err(mismatch("an object")),
    }
}

/// Plain integer text that fits `i64` stays an integer; anything else is a
/// decimal.
fn parse_number(text: &str, path: &Path<'_>) -> Result<StorageValue, DecodeError> {
    let digits = text.strip_prefix('-').unwrap_or(text);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(i) = text.parse::<i64>() {
            return Ok(StorageValue::Int(i));
        }
    }
    text.parse::<Decimal>()
        .map(StorageValue::Decimal)
        .map_err(|source| DecodeError::InvalidNumber {
            path: path.render(),
            source,
        })
}
