//! finance-lambda: serverless personal-finance API handlers.
//!
//! This crate provides the request handlers for a personal-finance backend
//! (transactions and user profiles) together with the value codec that sits
//! between JSON request values and a tagged key-value storage engine.
//!
//! # Overview
//!
//! The storage engine cannot hold binary floats, so every float crossing the
//! persistence boundary is converted:
//! - **Encoding**: a float becomes an exact decimal built from its shortest
//!   text form (`0.1` is stored as `0.1`, not `0.1000000000000000055...`)
//! - **Decoding**: a decimal becomes the nearest float again
//! - **Structure**: maps, lists and scalars keep their shape and order
//!
//! # Quick Start
//!
//! ```rust
//! use finance_lambda::{decode_attribute_item, encode_attribute_item, Item, Value};
//!
//! let mut item = Item::new();
//! item.insert("amount".to_string(), Value::Float(19.99));
//! item.insert("tags".to_string(), Value::List(vec![Value::from("food")]));
//!
//! // Encode to the tagged wire form
//! let wire = encode_attribute_item(&item).unwrap();
//! assert_eq!(wire["amount"], serde_json::json!({ "N": "19.99" }));
//!
//! // Decode back
//! let decoded = decode_attribute_item(&wire).unwrap();
//! assert_eq!(decoded, item);
//! ```
//!
//! Handlers take an API Gateway event, a store and the configuration:
//!
//! ```rust
//! use finance_lambda::handler::{create_transaction, ApiGatewayEvent, MemoryStore};
//! use finance_lambda::Config;
//! use serde_json::json;
//!
//! let config = Config::default();
//! let store = MemoryStore::for_config(&config);
//! let event = ApiGatewayEvent::from_json(json!({
//!     "httpMethod": "POST",
//!     "requestContext": { "authorizer": { "claims": { "sub": "user-1" } } },
//!     "body": r#"{"amount": 4.5, "description": "Coffee", "date": "2024-03-15",
//!                 "type": "expense", "category": "food"}"#
//! }))
//! .unwrap();
//!
//! let response = create_transaction(&event, &store, &config);
//! assert_eq!(response.status_code, 201);
//! ```
//!
//! # Modules
//!
//! - [`model`]: Value trees (request and storage side) and exact decimals
//! - [`codec`]: Value/storage conversion and the tagged attribute wire form
//! - [`handler`]: Transaction and profile endpoints, identity, storage seam
//! - [`validate`]: Transaction request validation
//! - [`config`]: Table names and identity fallback
//! - [`error`]: Error types
//! - [`limits`]: Storage engine number and nesting limits
//! - [`util`]: Date and timestamp helpers
//!
//! # Logging
//!
//! Handlers emit `tracing` events; the hosting runtime installs the
//! subscriber.

pub mod codec;
pub mod config;
pub mod error;
pub mod handler;
pub mod limits;
pub mod model;
pub mod util;
pub mod validate;

// Re-export commonly used types at crate root
pub use codec::{
    decode_attribute_item, decode_item, decode_value, encode_attribute_item, encode_item,
    encode_value, from_attribute, to_attribute, AttributeMap,
};
pub use config::Config;
pub use error::{DecodeError, EncodeError, HandlerError, NumberError, StoreError, ValidationError};
pub use model::{Decimal, Item, StorageItem, StorageValue, Value};
pub use validate::{coerce_amount, validate_transaction_request};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
