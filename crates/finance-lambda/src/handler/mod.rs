//! Request handlers.
//!
//! Each handler takes an API Gateway event, an [`ItemStore`] and the
//! [`Config`](crate::config::Config), and always produces an [`ApiResponse`];
//! failures become JSON error messages with the matching status code.

pub mod event;
pub mod identity;
pub mod profile;
pub mod store;
pub mod transactions;

pub use event::{ApiGatewayEvent, ApiResponse, Claims};
pub use identity::{resolve_identity, Identity};
pub use profile::{get_profile, handle_profile, update_profile};
pub use store::{ItemStore, KeySchema, MemoryStore};
pub use transactions::{create_transaction, get_transactions};

use tracing::{error, warn};

use crate::error::HandlerError;

/// Renders a handler failure.
///
/// Client errors and storage errors carry their own message; anything else
/// is prefixed with `context`.
pub(crate) fn error_response(err: &HandlerError, context: &str) -> ApiResponse {
    let status = err.status_code();
    let message = match err {
        HandlerError::Unauthorized
        | HandlerError::InvalidBody(_)
        | HandlerError::Validation(_)
        | HandlerError::Store(_) => err.to_string(),
        HandlerError::Encode(_) | HandlerError::Decode(_) => format!("{context}: {err}"),
    };
    if status >= 500 {
        error!(status, error = %err, "{}", context);
    } else {
        warn!(status, error = %err, "Request rejected");
    }
    ApiResponse::message(status, message)
}
