//! Overlay record types and error definitions

use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::{Map, Value, json};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur when working with overlays
#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("Invalid overlay identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Storage error: {0}")]
    Storage(#[from] sled::Error),

    #[error("Failed to encode overlay document: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Store-assigned overlay identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverlayId(Uuid);

impl OverlayId {
    /// Generate a fresh identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Raw key bytes used in the document store
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl Default for OverlayId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl FromStr for OverlayId {
    type Err = OverlayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| OverlayError::InvalidIdentifier(s.to_string()))
    }
}

/// A positioned text or image annotation
///
/// Field values are kept as raw JSON so that whatever the client sent is
/// stored as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    #[serde(rename = "_id")]
    pub id: OverlayId,
    #[serde(rename = "type")]
    pub kind: Value,
    pub content: Value,
    pub x: Value,
    pub y: Value,
    pub width: Value,
    pub height: Value,
    /// Seconds since the Unix epoch
    #[serde(rename = "createdAt")]
    pub created_at: f64,
}

/// The client-writable overlay fields.
///
/// Used both as the create payload (absent fields take defaults) and as the
/// update patch (absent fields are left untouched). Only a JSON object is
/// accepted; keys outside this set are dropped. An explicit `null` counts as
/// present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayFields {
    pub kind: Option<Value>,
    pub content: Option<Value>,
    pub x: Option<Value>,
    pub y: Option<Value>,
    pub width: Option<Value>,
    pub height: Option<Value>,
}

impl<'de> Deserialize<'de> for OverlayFields {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Object(map) => Ok(Self::from_object(map)),
            other => Err(de::Error::custom(format!(
                "expected a JSON object, found {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl OverlayFields {
    /// Pick the allow-listed keys out of a JSON object
    pub fn from_object(mut map: Map<String, Value>) -> Self {
        Self {
            kind: map.remove("type"),
            content: map.remove("content"),
            x: map.remove("x"),
            y: map.remove("y"),
            width: map.remove("width"),
            height: map.remove("height"),
        }
    }

    /// True if the patch would not change anything
    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.content.is_none()
            && self.x.is_none()
            && self.y.is_none()
            && self.width.is_none()
            && self.height.is_none()
    }
}

impl Overlay {
    /// Build a new record from client fields, filling in defaults
    pub fn new(id: OverlayId, fields: OverlayFields, created_at: f64) -> Self {
        Self {
            id,
            kind: fields.kind.unwrap_or_else(|| json!("text")),
            content: fields.content.unwrap_or_else(|| json!("")),
            x: fields.x.unwrap_or_else(|| json!(50)),
            y: fields.y.unwrap_or_else(|| json!(50)),
            width: fields.width.unwrap_or_else(|| json!(100)),
            height: fields.height.unwrap_or_else(|| json!(50)),
            created_at,
        }
    }

    /// Overwrite the fields present in `patch`. `id` and `created_at` are
    /// never touched.
    pub fn apply(&mut self, patch: &OverlayFields) {
        let targets = [
            (&mut self.kind, &patch.kind),
            (&mut self.content, &patch.content),
            (&mut self.x, &patch.x),
            (&mut self.y, &patch.y),
            (&mut self.width, &patch.width),
            (&mut self.height, &patch.height),
        ];
        for (field, value) in targets {
            if let Some(value) = value {
                *field = value.clone();
            }
        }
    }
}

/// Current server time in seconds since the Unix epoch
pub fn now_timestamp() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

/// Acknowledgement body for update and delete
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn updated() -> Self {
        Self {
            status: "updated".to_string(),
        }
    }

    pub fn deleted() -> Self {
        Self {
            status: "deleted".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied_for_empty_payload() {
        let overlay = Overlay::new(OverlayId::new(), OverlayFields::default(), 1.5);
        assert_eq!(overlay.kind, json!("text"));
        assert_eq!(overlay.content, json!(""));
        assert_eq!(overlay.x, json!(50));
        assert_eq!(overlay.y, json!(50));
        assert_eq!(overlay.width, json!(100));
        assert_eq!(overlay.height, json!(50));
        assert_eq!(overlay.created_at, 1.5);
    }

    #[test]
    fn test_fields_drop_unknown_keys_and_keep_null() {
        let fields: OverlayFields =
            serde_json::from_value(json!({"x": 200, "content": null, "bogus": "ignored"}))
                .unwrap();
        assert_eq!(fields.x, Some(json!(200)));
        assert_eq!(fields.content, Some(Value::Null));
        assert_eq!(fields.kind, None);
        assert!(!fields.is_empty());
    }

    #[test]
    fn test_fields_reject_non_object_payloads() {
        for payload in [json!([1, 2]), json!("text"), json!(null), json!(5)] {
            let result = serde_json::from_value::<OverlayFields>(payload.clone());
            assert!(result.is_err(), "accepted {}", payload);
        }
    }

    #[test]
    fn test_wrong_typed_values_stored_as_given() {
        let fields: OverlayFields =
            serde_json::from_value(json!({"x": "left", "width": [1, 2]})).unwrap();
        let overlay = Overlay::new(OverlayId::new(), fields, 0.0);
        assert_eq!(overlay.x, json!("left"));
        assert_eq!(overlay.width, json!([1, 2]));
    }

    #[test]
    fn test_apply_only_touches_present_fields() {
        let id = OverlayId::new();
        let mut overlay = Overlay::new(id, OverlayFields::default(), 42.0);
        let patch: OverlayFields = serde_json::from_value(
            json!({"x": 200, "_id": "other", "createdAt": 0, "bogus": true}),
        )
        .unwrap();

        overlay.apply(&patch);

        assert_eq!(overlay.x, json!(200));
        assert_eq!(overlay.y, json!(50));
        assert_eq!(overlay.id, id);
        assert_eq!(overlay.created_at, 42.0);
    }

    #[test]
    fn test_record_serializes_with_client_field_names() {
        let overlay = Overlay::new(OverlayId::new(), OverlayFields::default(), 10.0);
        let json = serde_json::to_value(&overlay).unwrap();
        assert_eq!(json["_id"], json!(overlay.id.to_string()));
        assert_eq!(json["type"], json!("text"));
        assert_eq!(json["createdAt"], json!(10.0));
    }

    #[test]
    fn test_identifier_parsing() {
        let id = OverlayId::new();
        assert_eq!(id.to_string().parse::<OverlayId>().unwrap(), id);
        assert!(matches!(
            "not-an-id".parse::<OverlayId>(),
            Err(OverlayError::InvalidIdentifier(_))
        ));
        assert!(matches!(
            "507f1f77bcf86cd799439011".parse::<OverlayId>(),
            Err(OverlayError::InvalidIdentifier(_))
        ));
    }
}
