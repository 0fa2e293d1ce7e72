//! Payment gateway event fixtures.

use serde_json::{Value, json};

/// A minimal `payment_intent.*` event body as the gateway posts it.
pub fn payment_intent_event(event_type: &str, intent_id: &str) -> Value {
    json!({
        "id": format!("evt_{intent_id}"),
        "object": "event",
        "type": event_type,
        "data": {
            "object": {
                "id": intent_id,
                "object": "payment_intent",
            }
        }
    })
}

/// Serialized event body, ready to be signed with
/// [`crate::webhook::sign_webhook`].
pub fn payment_intent_body(event_type: &str, intent_id: &str) -> Vec<u8> {
    payment_intent_event(event_type, intent_id)
        .to_string()
        .into_bytes()
}
