//! Soft request validation against the contract.
//!
//! Violations are reported for logging only; the gateway forwards the
//! request regardless.

use thiserror::Error;

use crate::contract::document::{ContractDocument, Parameter, ParameterLocation};
use crate::contract::params::ParameterMap;
use crate::routing::ResolvedRoute;

/// A way in which a request does not conform to the contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractViolation {
    #[error("no path template matches {path}")]
    UnknownRoute { path: String },

    #[error("{method} is not declared for {resource}")]
    UndeclaredMethod { method: String, resource: String },

    #[error("required {location:?} parameter '{name}' is missing")]
    MissingParameter {
        name: String,
        location: ParameterLocation,
    },

    #[error("parameter reference {reference} cannot be resolved")]
    DanglingReference { reference: String },

    #[error("request url {url} is not served by any declared server")]
    UnknownServer { url: String },
}

/// The parts of an inbound request the validator looks at.
#[derive(Debug, Clone, Copy)]
pub struct RequestView<'a> {
    pub method: &'a str,
    /// Absolute request URL without the query, when the host is known.
    pub url: Option<&'a str>,
    pub headers: &'a ParameterMap,
}

/// Check a resolved request against the contract, collecting every violation.
pub fn validate_request(
    contract: &ContractDocument,
    route: &ResolvedRoute,
    request: RequestView<'_>,
) -> Vec<ContractViolation> {
    let mut violations = Vec::new();

    if let Some(url) = request.url {
        if !server_accepts(contract, url) {
            violations.push(ContractViolation::UnknownServer {
                url: url.to_string(),
            });
        }
    }

    let item = match contract.paths.get(&route.resource).filter(|_| route.matched) {
        Some(item) => item,
        None => {
            violations.push(ContractViolation::UnknownRoute {
                path: route.resource.clone(),
            });
            return violations;
        }
    };

    let Some(operation) = item.operation(request.method) else {
        violations.push(ContractViolation::UndeclaredMethod {
            method: request.method.to_string(),
            resource: route.resource.clone(),
        });
        return violations;
    };

    // Operation-level declarations override path-level ones with the same name and location.
    let mut declared: Vec<&Parameter> = Vec::new();
    for parameter in item.parameters.iter().chain(operation.parameters.iter()) {
        let Some(resolved) = contract.resolve_parameter(parameter) else {
            violations.push(ContractViolation::DanglingReference {
                reference: parameter.reference.clone().unwrap_or_default(),
            });
            continue;
        };
        declared.retain(|existing| {
            existing.name != resolved.name || existing.location != resolved.location
        });
        declared.push(resolved);
    }

    for parameter in declared.into_iter().filter(|p| p.required) {
        let (Some(name), Some(location)) = (parameter.name.as_deref(), parameter.location) else {
            continue;
        };
        let present = match location {
            ParameterLocation::Path => route
                .path_parameters
                .get(name)
                .is_some_and(|value| !value.is_empty()),
            ParameterLocation::Query => route.query_parameters.contains_key(name),
            ParameterLocation::Header => request
                .headers
                .single()
                .keys()
                .any(|key| key.eq_ignore_ascii_case(name)),
            ParameterLocation::Cookie => true,
        };
        if !present {
            violations.push(ContractViolation::MissingParameter {
                name: name.to_string(),
                location,
            });
        }
    }

    violations
}

/// Whether any absolute, variable-free server URL is a prefix of `url`.
///
/// Relative or templated server entries cannot be checked and make the
/// contract accept every host.
fn server_accepts(contract: &ContractDocument, url: &str) -> bool {
    let servers: Vec<&str> = contract
        .servers
        .iter()
        .map(|server| server.url.as_str())
        .collect();

    let checkable = |server: &&str| {
        (server.starts_with("http://") || server.starts_with("https://")) && !server.contains('{')
    };
    if servers.is_empty() || !servers.iter().all(checkable) {
        return true;
    }

    servers.iter().any(|server| {
        let base = server.trim_end_matches('/');
        url == base
            || url
                .strip_prefix(base)
                .is_some_and(|rest| rest.starts_with('/'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::RouteResolver;

    const CONTRACT: &str = r#"
openapi: 3.0.3
servers:
  - url: http://localhost:8080
paths:
  /items/{itemId}:
    parameters:
      - name: itemId
        in: path
        required: true
    get:
      parameters:
        - name: X-Tenant
          in: header
          required: true
        - $ref: '#/components/parameters/Fields'
    delete:
      parameters:
        - $ref: '#/components/parameters/Gone'
  /items:
    get:
      parameters:
        - name: page
          in: query
          required: false
components:
  parameters:
    Fields:
      name: fields
      in: query
      required: true
"#;

    fn check(
        method: &str,
        path: &str,
        query: &str,
        headers: &[(&str, &str)],
        url: Option<&str>,
    ) -> Vec<ContractViolation> {
        let contract = ContractDocument::from_yaml(CONTRACT).unwrap();
        let resolver = RouteResolver::new(contract.path_templates()).unwrap();
        let route = resolver.route(path, Some(query));
        let headers = ParameterMap::from_pairs(headers.iter().copied());
        validate_request(
            &contract,
            &route,
            RequestView {
                method,
                url,
                headers: &headers,
            },
        )
    }

    #[test]
    fn test_conforming_request() {
        let violations = check(
            "GET",
            "/items/1",
            "fields=name",
            &[("X-Tenant", "acme")],
            Some("http://localhost:8080/items/1"),
        );
        assert!(violations.is_empty(), "{violations:?}");
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let violations = check("GET", "/items/1", "fields=name", &[("x-tenant", "acme")], None);
        assert!(violations.is_empty(), "{violations:?}");
    }

    #[test]
    fn test_missing_required_parameters() {
        let violations = check("GET", "/items/1", "", &[], None);
        assert_eq!(
            violations,
            vec![
                ContractViolation::MissingParameter {
                    name: "X-Tenant".into(),
                    location: ParameterLocation::Header,
                },
                ContractViolation::MissingParameter {
                    name: "fields".into(),
                    location: ParameterLocation::Query,
                },
            ]
        );
    }

    #[test]
    fn test_unknown_route_and_method() {
        assert_eq!(
            check("GET", "/orders", "", &[], None),
            vec![ContractViolation::UnknownRoute { path: "/orders".into() }]
        );
        assert_eq!(
            check("POST", "/items", "", &[], None),
            vec![ContractViolation::UndeclaredMethod {
                method: "POST".into(),
                resource: "/items".into(),
            }]
        );
    }

    #[test]
    fn test_dangling_reference() {
        let violations = check("DELETE", "/items/1", "", &[], None);
        assert_eq!(
            violations,
            vec![ContractViolation::DanglingReference {
                reference: "#/components/parameters/Gone".into(),
            }]
        );
    }

    #[test]
    fn test_unknown_server() {
        let violations = check("GET", "/items", "", &[], Some("http://otherhost:9000/items"));
        assert_eq!(
            violations,
            vec![ContractViolation::UnknownServer {
                url: "http://otherhost:9000/items".into(),
            }]
        );
    }

    #[test]
    fn test_relative_server_accepts_any_host() {
        let mut contract = ContractDocument::from_yaml(CONTRACT).unwrap();
        contract.servers.push(crate::contract::document::Server {
            url: "/".into(),
            description: None,
        });
        assert!(server_accepts(&contract, "http://anything/items"));
    }
}
