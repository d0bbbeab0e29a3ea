//! Error payload emitted by the crawl service.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Service-defined error body.
///
/// The service usually sends `{"code": 404, "message": "..."}`, but the shape
/// is not guaranteed, so every field is optional and unknown fields are kept.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ErrorPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ErrorPayload {
    /// Interpret a raw error body.
    ///
    /// JSON objects are decoded field by field; anything else (HTML from a
    /// proxy, plain text, an empty body) becomes the message verbatim.
    pub fn from_body(body: &[u8]) -> Self {
        if let Ok(payload) = serde_json::from_slice::<ErrorPayload>(body) {
            return payload;
        }

        let text = String::from_utf8_lossy(body).trim().to_string();
        ErrorPayload {
            code: None,
            message: (!text.is_empty()).then_some(text),
            extra: Map::new(),
        }
    }
}
