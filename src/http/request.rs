//! Inbound request helpers.
//!
//! # Responsibilities
//! - Read the request ID assigned by the request-id layer, and tell a
//!   generated one apart from a client-supplied one
//! - Canonicalise header names for the invocation envelope
//! - Reconstruct the absolute request URL for contract server checks
//!
//! # Design Decisions
//! - Header names are Title-Cased per dash segment (`x-api-key` → `X-Api-Key`);
//!   the wire casing is not preserved by the HTTP stack
//! - Non-UTF-8 header values are carried lossily rather than dropped

use axum::{
    body::Body,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::Response,
};

use crate::contract::params::ParameterMap;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Marks a request whose `x-request-id` was assigned by the gateway rather
/// than sent by the client. Such an id is logged and echoed back but never
/// forwarded to the backend function.
#[derive(Debug, Clone, Copy)]
pub struct GeneratedRequestId;

/// Runs ahead of `SetRequestIdLayer` and records whether it will have to
/// generate an id.
pub async fn mark_generated_request_id(mut request: Request<Body>, next: Next) -> Response {
    if !request.headers().contains_key(X_REQUEST_ID) {
        request.extensions_mut().insert(GeneratedRequestId);
    }
    next.run(request).await
}

/// Request ID set by `SetRequestIdLayer`, or "unknown".
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// `content-type` → `Content-Type`.
pub fn canonical_header_name(name: &str) -> String {
    name.split('-')
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join("-")
}

/// All headers with canonical names, in single- and multi-value form.
pub fn header_parameters(headers: &HeaderMap) -> ParameterMap {
    ParameterMap::from_pairs(headers.iter().map(|(name, value)| {
        (
            canonical_header_name(name.as_str()),
            String::from_utf8_lossy(value.as_bytes()).into_owned(),
        )
    }))
}

/// `http://{host}{path}` when the request carries a Host header.
pub fn request_url(headers: &HeaderMap, path: &str) -> Option<String> {
    headers
        .get(header::HOST)
        .and_then(|host| host.to_str().ok())
        .map(|host| format!("http://{host}{path}"))
}
