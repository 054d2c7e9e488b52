//! Mock identity resolution.
//!
//! # Responsibilities
//! - Map a bearer token to a fixed claim from the configured token table
//! - Without an `Authorization` header, pass through identity supplied in
//!   `X-Cognito-*` headers
//!
//! # Design Decisions
//! - No signature checking; this stands in for a managed user pool
//! - The token table is loaded once and never mutated
//! - An unknown token yields no claim rather than falling back to headers

use axum::http::header::{HeaderMap, AUTHORIZATION};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::{IdentityConfig, TokenClaims};

pub const X_COGNITO_SUBJECT: &str = "x-cognito-subject";
pub const X_COGNITO_EMAIL: &str = "x-cognito-email";
pub const X_COGNITO_GROUPS: &str = "x-cognito-groups";

/// Identity assertion handed to the backend function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub sub: String,
    pub email: String,
    #[serde(rename = "cognito:groups", default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<String>,
}

impl From<&TokenClaims> for Claim {
    fn from(claims: &TokenClaims) -> Self {
        Self {
            sub: claims.sub.clone(),
            email: claims.email.clone(),
            groups: None,
        }
    }
}

/// Resolves request headers to an optional identity claim.
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, headers: &HeaderMap) -> Option<Claim>;
}

/// Static bearer-token table with header pass-through.
#[derive(Debug, Clone, Default)]
pub struct MockIdentity {
    tokens: IndexMap<String, Claim>,
}

impl MockIdentity {
    pub fn new(config: &IdentityConfig) -> Self {
        let tokens = config
            .tokens
            .iter()
            .map(|(token, claims)| (token.clone(), Claim::from(claims)))
            .collect();
        Self { tokens }
    }

    fn lookup_token(&self, authorization: &str) -> Option<Claim> {
        let token = authorization.strip_prefix("Bearer ").unwrap_or(authorization);
        match self.tokens.get(token) {
            Some(claim) => {
                tracing::debug!(sub = %claim.sub, "Matched claim token to subject");
                Some(claim.clone())
            }
            None => {
                tracing::debug!("No matching claim for token");
                None
            }
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

impl IdentityResolver for MockIdentity {
    fn resolve(&self, headers: &HeaderMap) -> Option<Claim> {
        if let Some(authorization) = headers.get(AUTHORIZATION) {
            return authorization
                .to_str()
                .ok()
                .and_then(|value| self.lookup_token(value));
        }

        let subject = header_str(headers, X_COGNITO_SUBJECT).filter(|s| !s.is_empty())?;
        let email = header_str(headers, X_COGNITO_EMAIL).filter(|e| !e.is_empty())?;
        Some(Claim {
            sub: subject.to_string(),
            email: email.to_string(),
            groups: header_str(headers, X_COGNITO_GROUPS).map(str::to_string),
        })
    }
}
