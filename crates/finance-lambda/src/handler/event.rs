//! API Gateway event and response shapes.
//!
//! Both REST (v1) and HTTP (v2) payload formats are accepted: the method comes
//! from `requestContext.http.method` or `httpMethod`, and claims from either
//! `requestContext.authorizer.claims` or `requestContext.authorizer.jwt.claims`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as Json};

use crate::error::HandlerError;
use crate::model::{item_from_json, Item};

/// Inbound API Gateway proxy event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiGatewayEvent {
    /// REST API (v1) method.
    pub http_method: Option<String>,
    /// Raw JSON request body.
    pub body: Option<String>,
    pub request_context: Option<RequestContext>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestContext {
    /// HTTP API (v2) request description.
    pub http: Option<HttpContext>,
    pub authorizer: Option<Authorizer>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpContext {
    pub method: Option<String>,
}

/// Authorizer output. Cognito user pool authorizers fill `claims`; JWT
/// authorizers nest them under `jwt`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Authorizer {
    pub claims: Option<Claims>,
    pub jwt: Option<JwtAuthorizer>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtAuthorizer {
    pub claims: Option<Claims>,
}

/// Identity claims issued by the user pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Claims {
    pub sub: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "cognito:username")]
    pub username: Option<String>,
    pub name: Option<String>,
}

impl ApiGatewayEvent {
    /// Parses an event from its JSON form.
    pub fn from_json(json: Json) -> Result<Self, serde_json::Error> {
        serde_json::from_value(json)
    }

    /// The request method: HTTP API form first, then REST form, then `GET`.
    pub fn method(&self) -> &str {
        self.request_context
            .as_ref()
            .and_then(|ctx| ctx.http.as_ref())
            .and_then(|http| http.method.as_deref())
            .or(self.http_method.as_deref())
            .unwrap_or("GET")
    }

    pub fn authorizer(&self) -> Option<&Authorizer> {
        self.request_context.as_ref()?.authorizer.as_ref()
    }

    /// Parses the body as a JSON object. A missing body is an empty object.
    ///
    /// Malformed or non-object bodies are `InvalidBody`; values with no
    /// [`Value`](crate::model::Value) variant surface as encode errors.
    pub fn json_body(&self) -> Result<Item, HandlerError> {
        let Some(text) = self.body.as_deref() else {
            return Ok(Item::new());
        };
        let json: Json = serde_json::from_str(text)
            .map_err(|e| HandlerError::InvalidBody(e.to_string()))?;
        match json {
            Json::Object(map) => Ok(item_from_json(map)?),
            other => Err(HandlerError::InvalidBody(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "a boolean",
        Json::Number(_) => "a number",
        Json::String(_) => "a string",
        Json::Array(_) => "an array",
        Json::Object(_) => "an object",
    }
}

/// Outbound API Gateway proxy response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl ApiResponse {
    /// A response with a JSON body and the CORS headers every endpoint sends.
    pub fn json(status_code: u16, body: &Json) -> Self {
        let headers = [
            ("Content-Type", "application/json"),
            ("Access-Control-Allow-Origin", "*"),
            ("Access-Control-Allow-Credentials", "true"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Self {
            status_code,
            headers,
            body: body.to_string(),
        }
    }

    /// A response whose body is `{"message": <message>}`.
    pub fn message(status_code: u16, message: impl fmt::Display) -> Self {
        Self::json(status_code, &json!({ "message": message.to_string() }))
    }

    /// Parses the body back into JSON.
    pub fn body_json(&self) -> Result<Json, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EncodeError;
    use crate::model::Value;

    #[test]
    fn test_method_resolution() {
        let v2 = ApiGatewayEvent::from_json(json!({
            "httpMethod": "POST",
            "requestContext": { "http": { "method": "PUT" } }
        }))
        .unwrap();
        assert_eq!(v2.method(), "PUT");

        let v1 = ApiGatewayEvent::from_json(json!({ "httpMethod": "POST" })).unwrap();
        assert_eq!(v1.method(), "POST");

        let bare = ApiGatewayEvent::from_json(json!({})).unwrap();
        assert_eq!(bare.method(), "GET");
    }

    #[test]
    fn test_claims_deserialize() {
        let event = ApiGatewayEvent::from_json(json!({
            "requestContext": {
                "authorizer": {
                    "claims": {
                        "sub": "abc-123",
                        "email": "a@example.com",
                        "cognito:username": "alice",
                        "email_verified": "true"
                    }
                }
            }
        }))
        .unwrap();
        let claims = event.authorizer().unwrap().claims.as_ref().unwrap();
        assert_eq!(claims.sub.as_deref(), Some("abc-123"));
        assert_eq!(claims.username.as_deref(), Some("alice"));
        assert_eq!(claims.name, None);
    }

    #[test]
    fn test_json_body() {
        let mut event = ApiGatewayEvent::default();
        assert_eq!(event.json_body().unwrap(), Item::new());

        event.body = Some(r#"{"amount": 12.5, "tags": ["a"]}"#.into());
        let body = event.json_body().unwrap();
        assert_eq!(body["amount"], Value::Float(12.5));
        assert_eq!(body["tags"], Value::List(vec![Value::from("a")]));
    }

    #[test]
    fn test_json_body_rejects() {
        let mut event = ApiGatewayEvent::default();
        for text in ["{not json", "[1, 2]", "42"] {
            event.body = Some(text.into());
            let err = event.json_body().unwrap_err();
            assert!(matches!(err, HandlerError::InvalidBody(_)), "{text}");
            assert_eq!(err.status_code(), 400);
        }
    }

    #[test]
    fn test_json_body_unrepresentable_value() {
        let event = ApiGatewayEvent {
            body: Some(r#"{"n": 18446744073709551615}"#.into()),
            ..Default::default()
        };
        let err = event.json_body().unwrap_err();
        assert!(matches!(
            err,
            HandlerError::Encode(EncodeError::InvalidValueKind { .. })
        ));
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_response_shape() {
        let response = ApiResponse::message(405, "Method DELETE not allowed");
        assert_eq!(response.status_code, 405);
        assert_eq!(response.headers["Content-Type"], "application/json");
        assert_eq!(response.headers["Access-Control-Allow-Origin"], "*");
        assert_eq!(response.headers["Access-Control-Allow-Credentials"], "true");
        assert_eq!(
            response.body_json().unwrap(),
            json!({ "message": "Method DELETE not allowed" })
        );

        let wire = serde_json::to_value(&response).unwrap();
        assert_eq!(wire["statusCode"], 405);
        assert!(wire["body"].is_string());
    }
}
