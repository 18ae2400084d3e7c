//! Response envelope normalization.
//!
//! Endpoints answer with a bare payload, `{ "data": payload }` or
//! `{ "status": .., "data": payload }`. Everything above the gateway only
//! sees the payload.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::GatewayError;

/// Paginated wrappers nest one more `data`; deeper nesting is not expected.
const MAX_DEPTH: usize = 2;

pub fn normalize<T: DeserializeOwned>(body: Value) -> Result<T, GatewayError> {
    let payload = unwrap(body, 0)?;
    serde_json::from_value(payload)
        .map_err(|err| GatewayError::Server(format!("unexpected response shape: {err}")))
}

fn unwrap(body: Value, depth: usize) -> Result<Value, GatewayError> {
    let Value::Object(mut map) = body else {
        return Ok(body);
    };

    // A bare record may carry its own `status` column; only an object that
    // also has `data` or `message` is an envelope.
    let is_envelope = map.contains_key("data") || map.contains_key("message");
    if let Some(status) = map.get("status").filter(|_| is_envelope) {
        if is_failure(status) {
            let message = map
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("request failed")
                .to_string();
            return Err(GatewayError::Server(message));
        }
    }

    if depth < MAX_DEPTH {
        if let Some(data) = map.remove("data") {
            return unwrap(data, depth + 1);
        }
    }

    Ok(Value::Object(map))
}

fn is_failure(status: &Value) -> bool {
    match status {
        Value::Bool(ok) => !ok,
        Value::String(s) => matches!(
            s.to_ascii_lowercase().as_str(),
            "error" | "fail" | "failed" | "false"
        ),
        Value::Number(code) => code.as_u64().is_some_and(|code| code >= 400),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[derive(Debug, PartialEq, serde::Deserialize)]
    struct Item {
        id: i64,
    }

    #[test]
    fn bare_array() {
        let items: Vec<Item> = normalize(json!([{"id": 1}, {"id": 2}])).unwrap();
        assert_eq!(items, vec![Item { id: 1 }, Item { id: 2 }]);
    }

    #[test]
    fn data_wrapper() {
        let items: Vec<Item> = normalize(json!({"data": [{"id": 1}]})).unwrap();
        assert_eq!(items, vec![Item { id: 1 }]);
    }

    #[test]
    fn status_and_data_wrapper() {
        let items: Vec<Item> =
            normalize(json!({"status": true, "message": "ok", "data": [{"id": 4}]})).unwrap();
        assert_eq!(items, vec![Item { id: 4 }]);
    }

    #[test]
    fn paginated_wrapper() {
        let items: Vec<Item> =
            normalize(json!({"status": "success", "data": {"current_page": 1, "data": [{"id": 7}]}}))
                .unwrap();
        assert_eq!(items, vec![Item { id: 7 }]);
    }

    #[test]
    fn bare_record() {
        let item: Item = normalize(json!({"id": 3})).unwrap();
        assert_eq!(item, Item { id: 3 });
    }

    #[test]
    fn failed_status_surfaces_message() {
        let err = normalize::<Vec<Item>>(json!({"status": false, "message": "Branch closed"}))
            .unwrap_err();
        assert_eq!(err, GatewayError::Server("Branch closed".to_string()));
    }

    #[test]
    fn record_status_column_is_not_an_envelope() {
        #[derive(Debug, serde::Deserialize)]
        struct Flagged {
            id: i64,
            status: bool,
        }
        let item: Flagged = normalize(json!({"id": 2, "status": false})).unwrap();
        assert_eq!(item.id, 2);
        assert!(!item.status);
    }

    #[test]
    fn wrong_shape_is_a_server_error() {
        let err = normalize::<Vec<Item>>(json!({"status": true, "data": {"id": 1}})).unwrap_err();
        assert!(matches!(err, GatewayError::Server(_)));
    }
}
