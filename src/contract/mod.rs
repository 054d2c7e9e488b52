//! Contract store subsystem.
//!
//! # Data Flow
//! ```text
//! contract file (YAML/JSON)
//!     → document.rs (parse, keep path declaration order)
//!     → optional base URL injected into servers
//!     → path templates compiled into a RouteResolver
//!     → ContractStore (immutable, shared via Arc)
//!
//! Per request:
//!     → route() (template + path/query parameters, via params.rs)
//!     → validate() (soft checks, violations are only logged)
//! ```

pub mod document;
pub mod params;
pub mod validation;

use std::path::Path;

use crate::config::ContractConfig;
use crate::routing::{ResolvedRoute, RouteResolver};

pub use document::{ContractDocument, ContractError};
pub use params::ParameterMap;
pub use validation::{ContractViolation, RequestView};

/// A loaded contract together with its compiled routes.
#[derive(Debug, Clone)]
pub struct ContractStore {
    document: ContractDocument,
    resolver: RouteResolver,
}

impl ContractStore {
    pub fn new(document: ContractDocument) -> Result<Self, ContractError> {
        let resolver = RouteResolver::new(document.path_templates())?;
        Ok(Self { document, resolver })
    }

    /// Load the configured document, injecting the base URL if one is set.
    pub fn load(config: &ContractConfig) -> Result<Self, ContractError> {
        let mut document = ContractDocument::load(Path::new(&config.path))?;
        if let Some(base_url) = &config.base_url {
            document.inject_base_url(base_url);
        }

        let store = Self::new(document)?;
        tracing::info!(
            path = %config.path,
            templates = store.document.paths.len(),
            servers = store.document.servers.len(),
            "Contract loaded"
        );
        Ok(store)
    }

    pub fn document(&self) -> &ContractDocument {
        &self.document
    }

    pub fn resolver(&self) -> &RouteResolver {
        &self.resolver
    }

    /// Declared path templates, in declaration order.
    pub fn path_templates(&self) -> impl Iterator<Item = &str> {
        self.document.path_templates()
    }

    pub fn route(&self, path: &str, raw_query: Option<&str>) -> ResolvedRoute {
        self.resolver.route(path, raw_query)
    }

    pub fn validate(&self, route: &ResolvedRoute, request: RequestView<'_>) -> Vec<ContractViolation> {
        validation::validate_request(&self.document, route, request)
    }
}
