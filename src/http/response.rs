//! Response handling and transformation.
//!
//! # Responsibilities
//! - Turn a normalized backend reply into the client response
//! - Merge single- and multi-value headers
//! - Map unusable status codes and header entries safely
//!
//! # Design Decisions
//! - Framing headers (`Content-Length`, `Transfer-Encoding`) from the
//!   function are dropped; the server frames the body itself
//! - Invalid header names or values are skipped and logged, never fatal
//! - A status code outside 100..=999 becomes 502

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::integration::InvocationResponse;

fn is_framing_header(name: &HeaderName) -> bool {
    name == header::CONTENT_LENGTH || name == header::TRANSFER_ENCODING
}

fn parse_header(name: &str, value: &str) -> Option<(HeaderName, HeaderValue)> {
    let parsed = HeaderName::from_bytes(name.as_bytes())
        .ok()
        .zip(HeaderValue::from_str(value).ok());
    if parsed.is_none() {
        tracing::warn!(header = name, "Dropping invalid header from backend response");
    }
    parsed.filter(|(name, _)| !is_framing_header(name))
}

/// Single-value headers first, then any multi-value entry not already present.
pub fn merge_headers(response: &InvocationResponse) -> HeaderMap {
    let mut headers = HeaderMap::new();

    for (name, value) in &response.headers {
        if let Some((name, value)) = parse_header(name, value) {
            headers.insert(name, value);
        }
    }

    for (name, values) in response.multi_value_headers.iter().flatten() {
        for value in values {
            if let Some((name, value)) = parse_header(name, value) {
                if !headers.get_all(&name).iter().any(|existing| *existing == value) {
                    headers.append(name, value);
                }
            }
        }
    }

    headers
}

impl IntoResponse for InvocationResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or_else(|_| {
            tracing::warn!(status_code = self.status_code, "Backend returned an invalid status code");
            StatusCode::BAD_GATEWAY
        });
        let headers = merge_headers(&self);

        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }
}
