//! User profile endpoints.
//!
//! Profiles live in the user settings table keyed by `userId`. Reading a
//! profile that does not exist yet creates a default one from the caller's
//! claims.

use tracing::{info, warn};

use crate::codec::{decode_attribute_item, encode_attribute_item, to_attribute, AttributeMap};
use crate::config::Config;
use crate::error::HandlerError;
use crate::handler::event::{ApiGatewayEvent, ApiResponse};
use crate::handler::identity::{resolve_identity, Identity};
use crate::handler::store::ItemStore;
use crate::handler::error_response;
use crate::model::{item_from_json, item_to_json, Item, StorageValue, Value};

/// Dispatches on the request method: `GET` reads, `PUT` and `POST` update.
pub fn handle_profile(event: &ApiGatewayEvent, store: &dyn ItemStore, config: &Config) -> ApiResponse {
    let method = event.method();
    info!(method, "User profile request received");
    match method {
        "GET" => get_profile(event, store, config),
        "PUT" | "POST" => update_profile(event, store, config),
        other => ApiResponse::message(405, format!("Method {other} not allowed")),
    }
}

/// Returns the caller's profile, creating the default one on first access.
pub fn get_profile(event: &ApiGatewayEvent, store: &dyn ItemStore, config: &Config) -> ApiResponse {
    match try_get_profile(event, store, config) {
        Ok(profile) => ApiResponse::json(200, &item_to_json(&profile)),
        Err(err) => error_response(&err, "Error retrieving user profile"),
    }
}

/// Applies the request body to the caller's profile.
pub fn update_profile(event: &ApiGatewayEvent, store: &dyn ItemStore, config: &Config) -> ApiResponse {
    match try_update_profile(event, store, config) {
        Ok(profile) => ApiResponse::json(200, &item_to_json(&profile)),
        Err(err) => error_response(&err, "Error updating user profile"),
    }
}

fn default_preferences() -> Value {
    Value::Map(Item::from([
        ("theme".to_string(), Value::from("light")),
        ("currency".to_string(), Value::from("USD")),
        ("notifications".to_string(), Value::Bool(true)),
    ]))
}

fn profile_key(user_id: &str) -> AttributeMap {
    let mut key = AttributeMap::new();
    key.insert(
        "userId".to_string(),
        to_attribute(&StorageValue::String(user_id.to_string())),
    );
    key
}

fn load_profile(store: &dyn ItemStore, config: &Config, user_id: &str) -> Result<Option<Item>, HandlerError> {
    let stored = store.get_item(&config.user_settings_table, &profile_key(user_id))?;
    Ok(stored.as_ref().map(decode_attribute_item).transpose()?)
}

fn save_profile(store: &dyn ItemStore, config: &Config, profile: &Item) -> Result<(), HandlerError> {
    store.put_item(&config.user_settings_table, encode_attribute_item(profile)?)?;
    Ok(())
}

fn default_profile(identity: &Identity) -> Item {
    let email = identity
        .email
        .clone()
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| format!("{}@example.com", identity.user_id));
    Item::from([
        ("userId".to_string(), Value::from(identity.user_id.as_str())),
        ("email".to_string(), Value::String(email)),
        ("username".to_string(), Value::from(identity.username.clone())),
        ("name".to_string(), Value::from(identity.name.clone().unwrap_or_default())),
        ("bio".to_string(), Value::from("")),
        ("preferences".to_string(), default_preferences()),
    ])
}

fn try_get_profile(event: &ApiGatewayEvent, store: &dyn ItemStore, config: &Config) -> Result<Item, HandlerError> {
    let identity = resolve_identity(event, config)?;
    let Some(mut profile) = load_profile(store, config, &identity.user_id)? else {
        info!(user_id = %identity.user_id, "Creating default profile");
        let profile = default_profile(&identity);
        save_profile(store, config, &profile)?;
        return Ok(profile);
    };

    let claims = [
        ("email", &identity.email),
        ("username", &identity.username),
        ("name", &identity.name),
    ];
    let mut changed = false;
    for (field, claim) in claims {
        let Some(claim) = claim.as_deref().filter(|c| !c.is_empty()) else {
            continue;
        };
        if profile.get(field).is_none_or(Value::is_blank) {
            profile.insert(field.to_string(), Value::from(claim));
            changed = true;
        }
    }
    if changed {
        info!(user_id = %identity.user_id, "Filling profile from identity claims");
        save_profile(store, config, &profile)?;
    }
    Ok(profile)
}

fn try_update_profile(event: &ApiGatewayEvent, store: &dyn ItemStore, config: &Config) -> Result<Item, HandlerError> {
    let identity = resolve_identity(event, config)?;
    let body = event.json_body()?;

    let profile = match load_profile(store, config, &identity.user_id)? {
        None => {
            info!(user_id = %identity.user_id, "No existing profile, creating one");
            let field = |name: &str| body.get(name).cloned().unwrap_or_else(|| Value::from(""));
            Item::from([
                ("userId".to_string(), Value::from(identity.user_id.as_str())),
                ("email".to_string(), field("email")),
                ("username".to_string(), Value::from(identity.user_id.as_str())),
                ("name".to_string(), field("name")),
                ("bio".to_string(), field("bio")),
                (
                    "preferences".to_string(),
                    body.get("preferences").cloned().unwrap_or_else(default_preferences),
                ),
            ])
        }
        Some(mut profile) => {
            for field in ["email", "name", "bio"] {
                if let Some(value) = body.get(field) {
                    profile.insert(field.to_string(), value.clone());
                }
            }
            if let Some(preferences) = body.get("preferences") {
                merge_preferences(&mut profile, preferences);
            }
            profile
        }
    };

    save_profile(store, config, &profile)?;
    info!(user_id = %identity.user_id, "Profile saved");
    Ok(profile)
}

/// Merges `update` into the profile's preferences key by key.
///
/// `update` may be a map or a string holding a JSON object; anything else
/// leaves the preferences as they are.
fn merge_preferences(profile: &mut Item, update: &Value) {
    let parsed;
    let entries = match update {
        Value::Map(map) => map,
        Value::String(text) => match parse_json_object(text) {
            Some(map) => {
                parsed = map;
                &parsed
            }
            None => {
                warn!(preferences = %text, "Preferences string is not a JSON object, ignoring");
                return;
            }
        },
        other => {
            warn!(kind = other.kind().name(), "Preferences is not a map, ignoring");
            return;
        }
    };

    let preferences = profile
        .entry("preferences".to_string())
        .or_insert_with(|| Value::Map(Item::new()));
    if preferences.as_map().is_none() {
        *preferences = Value::Map(Item::new());
    }
    if let Some(current) = preferences.as_map_mut() {
        for (key, value) in entries {
            current.insert(key.clone(), value.clone());
        }
    }
}

fn parse_json_object(text: &str) -> Option<Item> {
    match serde_json::from_str::<serde_json::Value>(text).ok()? {
        serde_json::Value::Object(map) => item_from_json(map).ok(),
        _ => None,
    }
}
