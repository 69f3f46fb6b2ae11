//! Error types for value encoding/decoding, validation, storage and handlers.

use thiserror::Error;

/// Error codes for attribute decoding failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// E001: Tag outside the storage vocabulary
    UnknownTag,
    /// E002: Attribute shape or payload does not match its tag
    MalformedAttribute,
    /// E003: Number text is not a valid decimal
    InvalidNumber,
    /// E004: A decoding limit was exceeded
    LimitExceeded,
}

impl ErrorCode {
    /// Returns the error code string (e.g., "E001").
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::UnknownTag => "E001",
            ErrorCode::MalformedAttribute => "E002",
            ErrorCode::InvalidNumber => "E003",
            ErrorCode::LimitExceeded => "E004",
        }
    }
}

/// Error while parsing or building an exact decimal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumberError {
    #[error("number text is empty")]
    Empty,

    #[error("invalid number syntax: {text:?}")]
    InvalidSyntax { text: String },

    #[error("number has {digits} significant digits (maximum {max})")]
    TooManyDigits { digits: usize, max: usize },

    #[error("number magnitude outside storage range: {text}")]
    OutOfRange { text: String },
}

/// Error while converting a value into its storage form.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    #[error("value kind has no storage representation: {kind}")]
    InvalidValueKind { kind: &'static str },

    #[error("float value is not finite: {value}")]
    FloatNotFinite { value: f64 },

    #[error(transparent)]
    Number(#[from] NumberError),

    #[error("value nesting exceeds maximum depth {max}")]
    NestingTooDeep { max: usize },
}

/// Error while removing storage tags from an attribute value.
///
/// Every variant belongs to the malformed-storage-tag family: the input did
/// not follow the tagged attribute convention.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    // === E001: Unknown tag ===
    #[error("[E001] unknown storage tag {tag:?} at {path}")]
    UnknownTag { tag: String, path: String },

    // === E002: Malformed attribute ===
    #[error("[E002] expected a single-key tagged object at {path}")]
    MalformedAttribute { path: String },

    #[error("[E002] {tag} payload at {path} must be {expected}")]
    PayloadMismatch {
        tag: &'static str,
        expected: &'static str,
        path: String,
    },

    // === E003: Invalid number ===
    #[error("[E003] invalid number at {path}: {source}")]
    InvalidNumber {
        path: String,
        #[source]
        source: NumberError,
    },

    // === E004: Limits ===
    #[error("[E004] attribute nesting exceeds maximum depth {max} at {path}")]
    NestingTooDeep { max: usize, path: String },
}

impl DecodeError {
    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            DecodeError::UnknownTag { .. } => ErrorCode::UnknownTag,
            DecodeError::MalformedAttribute { .. } | DecodeError::PayloadMismatch { .. } => {
                ErrorCode::MalformedAttribute
            }
            DecodeError::InvalidNumber { .. } => ErrorCode::InvalidNumber,
            DecodeError::NestingTooDeep { .. } => ErrorCode::LimitExceeded,
        }
    }
}

/// Error during request validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("Invalid field {field}: {reason}")]
    InvalidField {
        field: &'static str,
        reason: &'static str,
    },
}

/// Error reported by an item store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("table not found: {table}")]
    TableNotFound { table: String },

    #[error("item is missing key attribute {attribute} for table {table}")]
    MissingKey { table: String, attribute: String },

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Error raised while serving a request.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Database error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl HandlerError {
    /// Returns the HTTP status code this error maps to.
    pub fn status_code(&self) -> u16 {
        match self {
            HandlerError::Unauthorized => 401,
            HandlerError::InvalidBody(_) | HandlerError::Validation(_) => 400,
            HandlerError::Store(_) | HandlerError::Encode(_) | HandlerError::Decode(_) => 500,
        }
    }
}
