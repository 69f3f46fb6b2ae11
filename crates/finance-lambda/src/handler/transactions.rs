//! Transaction endpoints.

use serde_json::{json, Value as Json};
use tracing::{info, warn};
use uuid::Uuid;

use crate::codec::{decode_attribute_item, encode_attribute_item, to_attribute};
use crate::config::Config;
use crate::error::HandlerError;
use crate::handler::event::{ApiGatewayEvent, ApiResponse};
use crate::handler::identity::resolve_identity;
use crate::handler::store::ItemStore;
use crate::handler::error_response;
use crate::model::{item_to_json, Item, StorageValue, Value};
use crate::util::datetime::{format_timestamp, now_epoch_micros, utc_date};
use crate::validate::{coerce_amount, validate_transaction_request, REQUIRED_TRANSACTION_FIELDS};

/// Creates a transaction for the caller.
///
/// Responds 201 with the stored record.
pub fn create_transaction(event: &ApiGatewayEvent, store: &dyn ItemStore, config: &Config) -> ApiResponse {
    info!(method = event.method(), "Create transaction request received");
    match try_create_transaction(event, store, config) {
        Ok(transaction) => ApiResponse::json(
            201,
            &json!({
                "message": "Transaction created successfully",
                "transaction": item_to_json(&transaction),
            }),
        ),
        Err(err) => error_response(&err, "Error creating transaction"),
    }
}

fn try_create_transaction(
    event: &ApiGatewayEvent,
    store: &dyn ItemStore,
    config: &Config,
) -> Result<Item, HandlerError> {
    let identity = resolve_identity(event, config)?;
    let body = event.json_body()?;
    validate_transaction_request(&body)?;
    let transaction = build_transaction(&identity.user_id, &body, now_epoch_micros())?;

    let attributes = encode_attribute_item(&transaction)?;
    store.put_item(&config.transactions_table, attributes)?;
    info!(
        user_id = %identity.user_id,
        table = %config.transactions_table,
        "Transaction stored"
    );
    Ok(transaction)
}

/// Assembles the stored record from a validated body.
///
/// Required fields and `notes` are copied; other body fields are kept only
/// when they hold a map or a list.
fn build_transaction(user_id: &str, body: &Item, now_micros: i64) -> Result<Item, HandlerError> {
    let timestamp = format_timestamp(now_micros);
    let mut transaction = Item::new();
    transaction.insert("userId".into(), Value::from(user_id));
    transaction.insert("id".into(), Value::String(Uuid::new_v4().to_string()));
    for field in REQUIRED_TRANSACTION_FIELDS {
        if let Some(value) = body.get(field) {
            transaction.insert(field.into(), value.clone());
        }
    }
    if let Some(amount) = body.get("amount") {
        transaction.insert("amount".into(), Value::Float(coerce_amount(amount)?));
    }
    transaction.insert("createdAt".into(), Value::String(timestamp.clone()));
    transaction.insert("updatedAt".into(), Value::String(timestamp));
    if let Some(notes) = body.get("notes") {
        transaction.insert("notes".into(), notes.clone());
    }

    for (key, value) in body {
        if value.is_container() && !transaction.contains_key(key) {
            transaction.insert(key.clone(), value.clone());
        }
    }
    Ok(transaction)
}

/// Lists the caller's transactions with normalized `date` and `amount`.
pub fn get_transactions(event: &ApiGatewayEvent, store: &dyn ItemStore, config: &Config) -> ApiResponse {
    info!(method = event.method(), "Get transactions request received");
    match try_get_transactions(event, store, config) {
        Ok(transactions) => ApiResponse::json(
            200,
            &Json::Array(transactions.iter().map(item_to_json).collect()),
        ),
        Err(err) => error_response(&err, "Error retrieving transactions"),
    }
}

fn try_get_transactions(
    event: &ApiGatewayEvent,
    store: &dyn ItemStore,
    config: &Config,
) -> Result<Vec<Item>, HandlerError> {
    let identity = resolve_identity(event, config)?;
    let partition = to_attribute(&StorageValue::String(identity.user_id.clone()));
    let raw = store.query(&config.transactions_table, "userId", &partition)?;

    let today = utc_date(now_epoch_micros());
    let mut transactions = raw
        .iter()
        .map(decode_attribute_item)
        .collect::<Result<Vec<_>, _>>()?;
    for transaction in &mut transactions {
        normalize_transaction(transaction, &today);
    }
    info!(
        user_id = %identity.user_id,
        count = transactions.len(),
        "Transactions retrieved"
    );
    Ok(transactions)
}

/// Falsy dates are left alone; a date that is not a string is replaced by
/// `today`. Booleans count as 1 or 0; other amounts that do not coerce to a
/// finite number become `Int(0)`.
fn normalize_transaction(transaction: &mut Item, today: &str) {
    if let Some(date) = transaction.get_mut("date") {
        if !date.is_falsy() {
            *date = match &*date {
                Value::String(text) => Value::String(normalize_date(text, today)),
                other => {
                    warn!(kind = other.kind().name(), today, "Transaction date is not a string, using today");
                    Value::from(today)
                }
            };
        }
    }
    if let Some(amount) = transaction.get_mut("amount") {
        *amount = match &*amount {
            Value::Bool(b) => Value::Float(if *b { 1.0 } else { 0.0 }),
            other => coerce_amount(other).map_or(Value::Int(0), Value::Float),
        };
    }
}

/// Reduces a stored date to `YYYY-MM-DD`.
///
/// Datetimes keep the part before `T`, three-part dashed dates are kept
/// unchanged, and anything else is replaced by `today`.
fn normalize_date(date: &str, today: &str) -> String {
    if let Some((day, _)) = date.split_once('T') {
        return day.to_string();
    }
    if date.split('-').count() == 3 {
        return date.to_string();
    }
    warn!(date, today, "Unrecognized transaction date, using today");
    today.to_string()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::codec::AttributeMap;
    use crate::handler::store::MemoryStore;

    fn event_for(user: &str, body: Option<Json>) -> ApiGatewayEvent {
        let mut event = ApiGatewayEvent::from_json(json!({
            "httpMethod": "POST",
            "requestContext": { "authorizer": { "claims": { "sub": user } } }
        }))
        .unwrap();
        event.body = body.map(|b| b.to_string());
        event
    }

    fn setup() -> (MemoryStore, Config) {
        let config = Config::default();
        (MemoryStore::for_config(&config), config)
    }

    fn lunch() -> Json {
        json!({
            "amount": "12.50",
            "description": "Lunch",
            "date": "2024-03-15",
            "type": "expense",
            "category": "food"
        })
    }

    fn stored(store: &MemoryStore, user: &str) -> Vec<AttributeMap> {
        store.query("Transactions", "userId", &json!({ "S": user })).unwrap()
    }

    #[test]
    fn test_create_transaction() {
        let (store, config) = setup();
        let response = create_transaction(&event_for("u1", Some(lunch())), &store, &config);
        assert_eq!(response.status_code, 201);

        let body = response.body_json().unwrap();
        assert_eq!(body["message"], "Transaction created successfully");
        let tx = &body["transaction"];
        assert_eq!(tx["userId"], "u1");
        assert_eq!(tx["amount"], 12.5);
        assert_eq!(tx["category"], "food");
        assert_eq!(tx["createdAt"], tx["updatedAt"]);
        let created = tx["createdAt"].as_str().unwrap();
        assert_eq!(created.len(), 27, "{created}");
        assert_eq!(&created[10..11], "T");
        assert!(created.ends_with('Z'));
        assert_eq!(created[..10].split('-').count(), 3);
        let id = tx["id"].as_str().unwrap();
        assert!(Uuid::parse_str(id).is_ok());

        let items = stored(&store, "u1");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["amount"], json!({ "N": "12.5" }));
        assert_eq!(items[0]["id"], json!({ "S": id }));
    }

    #[test]
    fn test_create_keeps_notes_and_containers_only() {
        let (store, config) = setup();
        let mut body = lunch();
        body["notes"] = json!("team lunch");
        body["split"] = json!({ "with": ["ann", "bo"], "ratio": 0.5 });
        body["tags"] = json!(["work"]);
        body["merchant"] = json!("Cafe");
        let response = create_transaction(&event_for("u1", Some(body)), &store, &config);
        assert_eq!(response.status_code, 201);

        let tx = &response.body_json().unwrap()["transaction"];
        assert_eq!(tx["notes"], "team lunch");
        assert_eq!(tx["split"]["ratio"], 0.5);
        assert_eq!(tx["tags"], json!(["work"]));
        assert!(tx.get("merchant").is_none());

        let items = stored(&store, "u1");
        assert_eq!(
            items[0]["split"],
            json!({ "M": {
                "ratio": { "N": "0.5" },
                "with": { "L": [{ "S": "ann" }, { "S": "bo" }] }
            }})
        );
    }

    #[test]
    fn test_container_cannot_override_record_fields() {
        let (store, config) = setup();
        let mut body = lunch();
        body["userId"] = json!(["someone-else"]);
        let response = create_transaction(&event_for("u1", Some(body)), &store, &config);
        assert_eq!(response.body_json().unwrap()["transaction"]["userId"], "u1");
    }

    #[test]
    fn test_create_missing_field() {
        let (store, config) = setup();
        let mut body = lunch();
        body.as_object_mut().unwrap().remove("date");
        body.as_object_mut().unwrap().remove("category");
        let response = create_transaction(&event_for("u1", Some(body)), &store, &config);
        assert_eq!(response.status_code, 400);
        assert_eq!(
            response.body_json().unwrap(),
            json!({ "message": "Missing required field: date" })
        );
        assert!(stored(&store, "u1").is_empty());

        let response = create_transaction(&event_for("u1", None), &store, &config);
        assert_eq!(response.status_code, 400);
        assert_eq!(
            response.body_json().unwrap()["message"],
            "Missing required field: amount"
        );
    }

    #[test]
    fn test_create_bad_input() {
        let (store, config) = setup();
        let mut body = lunch();
        body["amount"] = json!("lots");
        let response = create_transaction(&event_for("u1", Some(body)), &store, &config);
        assert_eq!(response.status_code, 400);

        let mut event = event_for("u1", None);
        event.body = Some("{oops".into());
        assert_eq!(create_transaction(&event, &store, &config).status_code, 400);
    }

    #[test]
    fn test_create_unauthorized_and_fallback() {
        let (store, config) = setup();
        let mut event = event_for("ignored", Some(lunch()));
        event.request_context = None;
        let response = create_transaction(&event, &store, &config);
        assert_eq!(response.status_code, 401);
        assert_eq!(response.body_json().unwrap(), json!({ "message": "Unauthorized" }));

        let config = config.with_test_user();
        assert_eq!(create_transaction(&event, &store, &config).status_code, 201);
        assert_eq!(stored(&store, "test-user-id").len(), 1);
    }

    #[test]
    fn test_create_database_error() {
        let store = MemoryStore::new();
        let response = create_transaction(&event_for("u1", Some(lunch())), &store, &Config::default());
        assert_eq!(response.status_code, 500);
        let message = response.body_json().unwrap()["message"].as_str().unwrap().to_string();
        assert!(message.starts_with("Database error: "), "{message}");
    }

    #[test]
    fn test_get_transactions_normalizes() {
        let (store, config) = setup();
        let rows = [
            json!({ "id": {"S": "1"}, "date": {"S": "2024-03-15T10:00:00Z"}, "amount": {"N": "12.5"} }),
            json!({ "id": {"S": "2"}, "date": {"S": "2024-03-16"}, "amount": {"S": "7.25"} }),
            json!({ "id": {"S": "3"}, "date": {"S": "yesterday"}, "amount": {"S": "n/a"} }),
            json!({ "id": {"S": "4"}, "date": {"S": ""}, "amount": {"N": "3"} }),
            json!({ "id": {"S": "5"}, "date": {"N": "20240315"}, "amount": {"BOOL": true} }),
            json!({ "id": {"S": "6"}, "date": {"NULL": true}, "amount": {"L": []} }),
        ];
        for row in rows {
            let mut item = row.as_object().unwrap().clone();
            item.insert("userId".into(), json!({ "S": "u1" }));
            store.put_item("Transactions", item).unwrap();
        }
        store
            .put_item("Transactions", json!({ "userId": {"S": "u2"}, "id": {"S": "9"} }).as_object().unwrap().clone())
            .unwrap();

        let response = get_transactions(&event_for("u1", None), &store, &config);
        assert_eq!(response.status_code, 200);
        let body = response.body_json().unwrap();
        let list = body.as_array().unwrap();
        assert_eq!(list.len(), 6);

        assert_eq!(list[0]["date"], "2024-03-15");
        assert_eq!(list[0]["amount"], 12.5);
        assert_eq!(list[1]["date"], "2024-03-16");
        assert_eq!(list[1]["amount"], 7.25);
        assert_eq!(list[2]["date"].as_str().unwrap().len(), 10);
        assert_ne!(list[2]["date"], "yesterday");
        assert_eq!(list[2]["amount"], 0);
        assert_eq!(list[3]["date"], "");
        assert_eq!(list[3]["amount"], 3.0);
        assert!(list[3]["amount"].is_f64());
        assert_eq!(list[4]["date"], list[2]["date"]);
        assert_eq!(list[4]["amount"], 1.0);
        assert_eq!(list[5]["date"], Json::Null);
        assert_eq!(list[5]["amount"], 0);
    }

    #[test]
    fn test_normalize_falsy_and_boolean_values() {
        let mut tx = Item::new();
        tx.insert("date".into(), Value::Int(0));
        tx.insert("amount".into(), Value::Bool(false));
        normalize_transaction(&mut tx, "2000-01-01");
        assert_eq!(tx["date"], Value::Int(0));
        assert_eq!(tx["amount"], Value::Float(0.0));

        tx.insert("date".into(), Value::List(vec![Value::from("2024-03-15")]));
        tx.insert("amount".into(), Value::from("inf"));
        normalize_transaction(&mut tx, "2000-01-01");
        assert_eq!(tx["date"], Value::from("2000-01-01"));
        assert_eq!(tx["amount"], Value::Int(0));
    }

    #[test]
    fn test_create_rejects_overly_nested_body() {
        let (store, config) = setup();
        let mut meta = json!("leaf");
        for _ in 0..40 {
            meta = json!([meta]);
        }
        let mut body = lunch();
        body["meta"] = meta;
        let response = create_transaction(&event_for("u1", Some(body)), &store, &config);
        assert_eq!(response.status_code, 500);
        assert_eq!(
            response.body_json().unwrap()["message"],
            "Error creating transaction: value nesting exceeds maximum depth 32"
        );
        assert!(stored(&store, "u1").is_empty());

        assert_eq!(create_transaction(&event_for("u1", Some(lunch())), &store, &config).status_code, 201);
        let response = get_transactions(&event_for("u1", None), &store, &config);
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body_json().unwrap().as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_create_unrepresentable_number() {
        let (store, config) = setup();
        let mut event = event_for("u1", None);
        event.body = Some(
            r#"{"amount": 5, "description": "x", "date": "2024-03-15", "type": "expense", "category": "misc", "n": 18446744073709551615}"#.into(),
        );
        let response = create_transaction(&event, &store, &config);
        assert_eq!(response.status_code, 500);
        let message = response.body_json().unwrap()["message"].as_str().unwrap().to_string();
        assert!(message.starts_with("Error creating transaction: "), "{message}");
        assert!(stored(&store, "u1").is_empty());
    }

    #[test]
    fn test_get_transactions_empty_and_errors() {
        let (store, config) = setup();
        let response = get_transactions(&event_for("u1", None), &store, &config);
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body_json().unwrap(), json!([]));

        store
            .put_item(
                "Transactions",
                json!({ "userId": {"S": "u1"}, "id": {"S": "x"}, "bad": {"SS": ["a"]} })
                    .as_object()
                    .unwrap()
                    .clone(),
            )
            .unwrap();
        let response = get_transactions(&event_for("u1", None), &store, &config);
        assert_eq!(response.status_code, 500);
        let message = response.body_json().unwrap()["message"].as_str().unwrap().to_string();
        assert!(message.starts_with("Error retrieving transactions: [E001]"), "{message}");

        let response = get_transactions(&event_for("u1", None), &MemoryStore::new(), &config);
        assert_eq!(response.status_code, 500);
    }

    #[test]
    fn test_normalize_date() {
        assert_eq!(normalize_date("2024-03-15T23:59:59+02:00", "2000-01-01"), "2024-03-15");
        assert_eq!(normalize_date("15-03-2024", "2000-01-01"), "15-03-2024");
        assert_eq!(normalize_date("March 15", "2000-01-01"), "2000-01-01");
        assert_eq!(normalize_date("2024/03/15", "2000-01-01"), "2000-01-01");
    }
}
