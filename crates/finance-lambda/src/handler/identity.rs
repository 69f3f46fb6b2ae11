//! Caller identity resolution.

use tracing::{info, warn};

use crate::config::Config;
use crate::error::HandlerError;
use crate::handler::event::{ApiGatewayEvent, Claims};

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub email: Option<String>,
    pub username: Option<String>,
    pub name: Option<String>,
}

impl Identity {
    /// Builds an identity from claims carrying a non-empty `sub`.
    pub fn from_claims(claims: &Claims) -> Option<Self> {
        let user_id = claims.sub.as_deref().filter(|sub| !sub.is_empty())?;
        Some(Self {
            user_id: user_id.to_string(),
            email: claims.email.clone(),
            username: claims.username.clone(),
            name: claims.name.clone(),
        })
    }

    /// Reads the identity from the authorizer claims, preferring
    /// `authorizer.claims` over `authorizer.jwt.claims`.
    pub fn from_event(event: &ApiGatewayEvent) -> Option<Self> {
        let authorizer = event.authorizer()?;
        authorizer
            .claims
            .as_ref()
            .and_then(Self::from_claims)
            .or_else(|| {
                authorizer
                    .jwt
                    .as_ref()?
                    .claims
                    .as_ref()
                    .and_then(Self::from_claims)
            })
    }

    /// The local development user.
    pub fn test_user() -> Self {
        Self {
            user_id: "test-user-id".to_string(),
            email: Some("test@example.com".to_string()),
            username: Some("testuser".to_string()),
            name: Some("Test User".to_string()),
        }
    }
}

/// Resolves the caller, falling back to the configured identity when the
/// event carries no claims.
pub fn resolve_identity(event: &ApiGatewayEvent, config: &Config) -> Result<Identity, HandlerError> {
    let identity = match Identity::from_event(event) {
        Some(identity) => identity,
        None => match &config.fallback_identity {
            Some(fallback) => {
                warn!(
                    user_id = %fallback.user_id,
                    "No user ID found in authorizer, using fallback identity"
                );
                fallback.clone()
            }
            None => {
                warn!("No user ID found in authorizer, rejecting request");
                return Err(HandlerError::Unauthorized);
            }
        },
    };
    info!(user_id = %identity.user_id, "Resolved caller identity");
    Ok(identity)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn event(json: serde_json::Value) -> ApiGatewayEvent {
        ApiGatewayEvent::from_json(json).unwrap()
    }

    #[test]
    fn test_claims_take_precedence_over_jwt() {
        let e = event(json!({
            "requestContext": { "authorizer": {
                "claims": { "sub": "from-claims", "name": "Ann" },
                "jwt": { "claims": { "sub": "from-jwt" } }
            }}
        }));
        let identity = Identity::from_event(&e).unwrap();
        assert_eq!(identity.user_id, "from-claims");
        assert_eq!(identity.name.as_deref(), Some("Ann"));
    }

    #[test]
    fn test_jwt_claims_used_when_claims_lack_sub() {
        let e = event(json!({
            "requestContext": { "authorizer": {
                "claims": { "email": "x@example.com" },
                "jwt": { "claims": { "sub": "from-jwt", "cognito:username": "jay" } }
            }}
        }));
        let identity = Identity::from_event(&e).unwrap();
        assert_eq!(identity.user_id, "from-jwt");
        assert_eq!(identity.username.as_deref(), Some("jay"));
        assert_eq!(identity.email, None);
    }

    #[test]
    fn test_empty_sub_is_absent() {
        let e = event(json!({ "requestContext": { "authorizer": { "claims": { "sub": "" } } } }));
        assert_eq!(Identity::from_event(&e), None);
    }

    #[test]
    fn test_resolve_without_claims() {
        let e = event(json!({ "httpMethod": "GET" }));

        let err = resolve_identity(&e, &Config::default()).unwrap_err();
        assert!(matches!(err, HandlerError::Unauthorized));
        assert_eq!(err.status_code(), 401);

        let config = Config::default().with_test_user();
        assert_eq!(resolve_identity(&e, &config).unwrap(), Identity::test_user());
    }

    #[test]
    fn test_resolve_prefers_claims_over_fallback() {
        let e = event(json!({ "requestContext": { "authorizer": { "claims": { "sub": "real" } } } }));
        let config = Config::default().with_test_user();
        assert_eq!(resolve_identity(&e, &config).unwrap().user_id, "real");
    }
}
