//! Proxy-integration request envelope.
//!
//! The backend function expects the full REST API proxy event shape. Only
//! the resource, path, method, headers, query, path parameters, body and
//! authorizer claims carry information; every other request-context field is
//! a fixed placeholder kept for structural compatibility.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::contract::params::ParameterMap;
use crate::identity::Claim;
use crate::routing::ResolvedRoute;

// Fixed request-context values. httpMethod, path and resourcePath are the
// exceptions: they mirror the real request rather than a constant.
const ACCOUNT_ID: &str = "123456789012";
const API_ID: &str = "id";
const DOMAIN_NAME: &str = "id.execute-api.us-east-1.amazonaws.com";
const DOMAIN_PREFIX: &str = "id";
const EXTENDED_REQUEST_ID: &str = "request-id";
const PROTOCOL: &str = "HTTP/1.1";
const REQUEST_ID: &str = "id=";
const REQUEST_TIME: &str = "04/Mar/2020:19:15:17 +0000";
const REQUEST_TIME_EPOCH: u64 = 1_583_349_317_135;
const STAGE: &str = "$default";
const SOURCE_IP: &str = "IP";
const USER_AGENT: &str = "user-agent";

/// Everything about the inbound request the envelope is built from.
#[derive(Debug, Clone, Default)]
pub struct InboundRequest {
    pub path: String,
    pub method: String,
    pub headers: ParameterMap,
    pub body: String,
}

/// The payload POSTed to the backend function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationEnvelope {
    pub resource: String,
    pub path: String,
    pub http_method: String,
    pub headers: IndexMap<String, String>,
    pub multi_value_headers: IndexMap<String, Vec<String>>,
    pub query_string_parameters: Option<IndexMap<String, String>>,
    pub multi_value_query_string_parameters: Option<IndexMap<String, Vec<String>>>,
    pub request_context: RequestContext,
    pub path_parameters: Option<IndexMap<String, String>>,
    pub stage_variables: Option<IndexMap<String, String>>,
    pub body: Option<String>,
    pub is_base64_encoded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    pub account_id: String,
    pub api_id: String,
    pub authorizer: Authorizer,
    pub domain_name: String,
    pub domain_prefix: String,
    pub extended_request_id: String,
    pub http_method: String,
    pub identity: RequestIdentity,
    pub path: String,
    pub protocol: String,
    pub request_id: String,
    pub request_time: String,
    pub request_time_epoch: u64,
    pub resource_id: Option<String>,
    pub resource_path: String,
    pub stage: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Authorizer {
    pub claims: Option<Claim>,
    pub scopes: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestIdentity {
    pub access_key: Option<String>,
    pub account_id: Option<String>,
    pub caller: Option<String>,
    pub cognito_authentication_provider: Option<String>,
    pub cognito_authentication_type: Option<String>,
    pub cognito_identity_id: Option<String>,
    pub cognito_identity_pool_id: Option<String>,
    pub principal_org_id: Option<String>,
    pub source_ip: String,
    pub user: Option<String>,
    pub user_agent: String,
    pub user_arn: Option<String>,
    pub client_cert: ClientCert,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientCert {
    pub client_cert_pem: String,
    #[serde(rename = "subjectDN")]
    pub subject_dn: String,
    #[serde(rename = "issuerDN")]
    pub issuer_dn: String,
    pub serial_number: String,
    pub validity: CertValidity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertValidity {
    pub not_before: String,
    pub not_after: String,
}

impl RequestIdentity {
    fn placeholder() -> Self {
        Self {
            access_key: None,
            account_id: None,
            caller: None,
            cognito_authentication_provider: None,
            cognito_authentication_type: None,
            cognito_identity_id: None,
            cognito_identity_pool_id: None,
            principal_org_id: None,
            source_ip: SOURCE_IP.to_string(),
            user: None,
            user_agent: USER_AGENT.to_string(),
            user_arn: None,
            client_cert: ClientCert {
                client_cert_pem: "CERT_CONTENT".to_string(),
                subject_dn: "www.example.com".to_string(),
                issuer_dn: "Example issuer".to_string(),
                serial_number: "a1:a1:a1:a1:a1:a1:a1:a1:a1:a1:a1:a1:a1:a1:a1:a1".to_string(),
                validity: CertValidity {
                    not_before: "May 28 12:30:02 2019 GMT".to_string(),
                    not_after: "Aug  5 09:36:04 2021 GMT".to_string(),
                },
            },
        }
    }
}

fn non_empty<K, V>(map: &IndexMap<K, V>) -> Option<IndexMap<K, V>>
where
    K: Clone + std::hash::Hash + Eq,
    V: Clone,
{
    (!map.is_empty()).then(|| map.clone())
}

impl InvocationEnvelope {
    /// Build the envelope for one request. Never fails; absent parts become
    /// `null`.
    pub fn build(route: &ResolvedRoute, request: &InboundRequest, claim: Option<Claim>) -> Self {
        let query = &route.query_parameters;

        Self {
            resource: route.resource.clone(),
            path: request.path.clone(),
            http_method: request.method.clone(),
            headers: request.headers.single().clone(),
            multi_value_headers: request.headers.multi().clone(),
            query_string_parameters: non_empty(query.single()),
            multi_value_query_string_parameters: non_empty(query.multi()),
            request_context: RequestContext {
                account_id: ACCOUNT_ID.to_string(),
                api_id: API_ID.to_string(),
                authorizer: Authorizer {
                    claims: claim,
                    scopes: None,
                },
                domain_name: DOMAIN_NAME.to_string(),
                domain_prefix: DOMAIN_PREFIX.to_string(),
                extended_request_id: EXTENDED_REQUEST_ID.to_string(),
                // Real method, not a fixed "GET".
                http_method: request.method.clone(),
                identity: RequestIdentity::placeholder(),
                path: request.path.clone(),
                protocol: PROTOCOL.to_string(),
                request_id: REQUEST_ID.to_string(),
                request_time: REQUEST_TIME.to_string(),
                request_time_epoch: REQUEST_TIME_EPOCH,
                resource_id: None,
                resource_path: route.resource.clone(),
                stage: STAGE.to_string(),
            },
            path_parameters: non_empty(&route.path_parameters),
            stage_variables: None,
            body: (!request.body.is_empty()).then(|| request.body.clone()),
            is_base64_encoded: false,
        }
    }
}
