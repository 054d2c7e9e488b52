//! Proxy-integration response normalization.
//!
//! # Rules (applied in order)
//! 1. `statusCode` defaults to 502
//! 2. `headers` defaults to `Access-Control-Allow-Origin: *`
//! 3. a body flagged `isBase64Encoded` is decoded; failure is an error
//! 4. an empty body falls back to `errorMessage`

use axum::body::Bytes;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::http::cors::ALLOW_ORIGIN_HEADER;

pub const DEFAULT_STATUS: u16 = 502;

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("body is flagged base64 but does not decode: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Reply body as sent by the backend function.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawInvocationResponse {
    pub status_code: Option<Value>,
    pub headers: Option<IndexMap<String, Value>>,
    pub multi_value_headers: Option<IndexMap<String, Vec<Value>>>,
    pub body: Option<Value>,
    pub is_base64_encoded: Option<bool>,
    pub error_message: Option<String>,
}

/// A backend reply ready to be sent to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResponse {
    pub status_code: u16,
    pub headers: IndexMap<String, String>,
    pub multi_value_headers: Option<IndexMap<String, Vec<String>>>,
    pub body: Bytes,
}

fn default_headers() -> IndexMap<String, String> {
    IndexMap::from([(ALLOW_ORIGIN_HEADER.to_string(), "*".to_string())])
}

/// Header values may arrive as numbers or booleans; `null` drops the header.
fn header_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn body_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn decode_base64(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let encoded = encoded.trim();
    STANDARD.decode(encoded).or_else(|e| URL_SAFE.decode(encoded).map_err(|_| e))
}

impl RawInvocationResponse {
    fn status(&self) -> Option<u16> {
        match self.status_code.as_ref()? {
            Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl InvocationResponse {
    /// Normalize a reply. `None` stands for a JSON `null` reply.
    pub fn normalize(raw: Option<RawInvocationResponse>) -> Result<Self, NormalizeError> {
        let raw = raw.unwrap_or_default();

        let status_code = raw.status().unwrap_or(DEFAULT_STATUS);

        let headers = match raw.headers {
            Some(headers) => headers
                .into_iter()
                .filter_map(|(name, value)| header_text(value).map(|v| (name, v)))
                .collect(),
            None => default_headers(),
        };

        let multi_value_headers: Option<IndexMap<String, Vec<String>>> =
            raw.multi_value_headers.map(|headers| {
                headers
                    .into_iter()
                    .map(|(name, values)| {
                        (name, values.into_iter().filter_map(header_text).collect())
                    })
                    .collect()
            });

        let text = raw.body.map(body_text).unwrap_or_default();
        let mut body = if raw.is_base64_encoded.unwrap_or(false) {
            Bytes::from(decode_base64(&text)?)
        } else {
            Bytes::from(text)
        };

        if body.is_empty() {
            if let Some(message) = raw.error_message {
                body = Bytes::from(message);
            }
        }

        Ok(Self {
            status_code,
            headers,
            multi_value_headers,
            body,
        })
    }

    /// Parse and normalize a reply body.
    pub fn from_json(bytes: &[u8]) -> Result<Result<Self, NormalizeError>, serde_json::Error> {
        let value: Value = serde_json::from_slice(bytes)?;
        if !(value.is_object() || value.is_null()) {
            return Err(serde::de::Error::custom("reply is not a JSON object"));
        }
        let raw: Option<RawInvocationResponse> = serde_json::from_value(value)?;
        Ok(Self::normalize(raw))
    }

    /// Fixed reply used when no usable response came back.
    pub fn bad_gateway() -> Self {
        Self {
            status_code: DEFAULT_STATUS,
            headers: default_headers(),
            multi_value_headers: None,
            body: Bytes::new(),
        }
    }

    pub fn body_text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}
