//! Contract document model and loading.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Description given to a server entry injected from configuration.
pub const INJECTED_SERVER_DESCRIPTION: &str = "Local REST API Gateway Base URL";

/// Errors raised while loading a contract document.
#[derive(Debug, Error)]
pub enum ContractError {
    #[error("failed to read contract {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse contract {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid path template: {0}")]
    Template(#[from] regex::Error),
}

/// The subset of an OpenAPI 3 document the gateway consumes.
///
/// `paths` keeps declaration order, which breaks ties during route
/// resolution.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ContractDocument {
    pub openapi: Option<serde_yaml::Value>,
    pub info: Option<serde_yaml::Value>,
    pub servers: Vec<Server>,
    pub paths: IndexMap<String, PathItem>,
    pub components: Components,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Server {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Components {
    pub parameters: IndexMap<String, Parameter>,
}

/// Operations declared for one path template.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PathItem {
    pub parameters: Vec<Parameter>,
    pub get: Option<Operation>,
    pub put: Option<Operation>,
    pub post: Option<Operation>,
    pub delete: Option<Operation>,
    pub options: Option<Operation>,
    pub head: Option<Operation>,
    pub patch: Option<Operation>,
    pub trace: Option<Operation>,
}

impl PathItem {
    /// Operation declared for an HTTP method, matched case-insensitively.
    pub fn operation(&self, method: &str) -> Option<&Operation> {
        match method.to_ascii_lowercase().as_str() {
            "get" => self.get.as_ref(),
            "put" => self.put.as_ref(),
            "post" => self.post.as_ref(),
            "delete" => self.delete.as_ref(),
            "options" => self.options.as_ref(),
            "head" => self.head.as_ref(),
            "patch" => self.patch.as_ref(),
            "trace" => self.trace.as_ref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Operation {
    pub operation_id: Option<String>,
    pub parameters: Vec<Parameter>,
}

/// Where a parameter is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

/// A parameter declaration, or a `$ref` to one under `components`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Parameter {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "in")]
    pub location: Option<ParameterLocation>,
    pub required: bool,
}

impl ContractDocument {
    /// Load a document from YAML or JSON on disk.
    pub fn load(path: &Path) -> Result<Self, ContractError> {
        tracing::debug!(path = %path.display(), "Loading contract document");
        let content = fs::read_to_string(path).map_err(|source| ContractError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content).map_err(|source| ContractError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Declared path templates, in declaration order.
    pub fn path_templates(&self) -> impl Iterator<Item = &str> {
        self.paths.keys().map(String::as_str)
    }

    /// Append `base_url` to the servers list unless it is already declared.
    ///
    /// Returns true if a server was added.
    pub fn inject_base_url(&mut self, base_url: &str) -> bool {
        if self.servers.iter().any(|server| server.url == base_url) {
            return false;
        }
        tracing::debug!(base_url, "Injecting base url into contract servers");
        self.servers.push(Server {
            url: base_url.to_string(),
            description: Some(INJECTED_SERVER_DESCRIPTION.to_string()),
        });
        true
    }

    /// Resolve a `$ref` parameter against `components.parameters`.
    ///
    /// Non-reference parameters are returned as-is; dangling references
    /// resolve to `None`.
    pub fn resolve_parameter<'a>(&'a self, parameter: &'a Parameter) -> Option<&'a Parameter> {
        match &parameter.reference {
            None => Some(parameter),
            Some(reference) => reference
                .strip_prefix("#/components/parameters/")
                .and_then(|name| self.components.parameters.get(name)),
        }
    }
}
