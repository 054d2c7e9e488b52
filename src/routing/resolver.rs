//! Route resolution against declared path templates.
//!
//! # Responsibilities
//! - Hold every template compiled once at startup
//! - Map a concrete request path to the template it matches
//! - Extract path and query parameters for the matched route
//!
//! # Design Decisions
//! - Candidates are ordered by descending template length; the sort is
//!   stable so equal lengths keep contract declaration order
//! - An exact literal match anywhere beats every wildcard match
//! - No match is not an error: the requested path itself becomes the
//!   resource identifier

use std::cmp::Reverse;

use indexmap::IndexMap;

use crate::contract::params::{parse_query, ParameterMap};
use crate::routing::matcher::TemplatePattern;

/// Outcome of resolving one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    /// Matched template, or the requested path verbatim on a miss.
    pub resource: String,

    /// Whether `resource` is a declared template.
    pub matched: bool,

    /// Placeholder name to decoded value.
    pub path_parameters: IndexMap<String, String>,

    /// Query parameters in single- and multi-value form.
    pub query_parameters: ParameterMap,
}

/// Immutable, precompiled set of path templates.
#[derive(Debug, Clone, Default)]
pub struct RouteResolver {
    candidates: Vec<TemplatePattern>,
}

impl RouteResolver {
    /// Compile templates given in declaration order.
    pub fn new<I, S>(templates: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut candidates = templates
            .into_iter()
            .map(|template| TemplatePattern::compile(template.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        candidates.sort_by_key(|pattern| Reverse(pattern.specificity()));

        tracing::debug!(templates = candidates.len(), "Route resolver compiled");
        Ok(Self { candidates })
    }

    /// Templates in the order they are tried.
    pub fn templates(&self) -> impl Iterator<Item = &str> {
        self.candidates.iter().map(TemplatePattern::template)
    }

    fn find(&self, path: &str) -> Option<&TemplatePattern> {
        tracing::debug!(path, "Searching for path in contract");

        if let Some(exact) = self.candidates.iter().find(|c| c.template() == path) {
            tracing::debug!(template = exact.template(), "Exact match found");
            return Some(exact);
        }

        let matched = self.candidates.iter().find(|candidate| {
            tracing::trace!(template = candidate.template(), "Checking wildcard match");
            candidate.matches(path)
        });

        match matched {
            Some(candidate) => {
                tracing::debug!(template = candidate.template(), path, "Wildcard match found");
            }
            None => tracing::debug!(path, "No matches found in contract, using path"),
        }
        matched
    }

    /// Template matching `path`, or `path` itself when nothing matches.
    pub fn resolve<'a>(&'a self, path: &'a str) -> &'a str {
        self.find(path).map(TemplatePattern::template).unwrap_or(path)
    }

    /// Resolve a request and extract its parameters.
    pub fn route(&self, path: &str, raw_query: Option<&str>) -> ResolvedRoute {
        let query_parameters = raw_query.map(parse_query).unwrap_or_default();

        match self.find(path) {
            Some(candidate) => ResolvedRoute {
                resource: candidate.template().to_string(),
                matched: true,
                path_parameters: candidate.captures(path).unwrap_or_default(),
                query_parameters,
            },
            None => ResolvedRoute {
                resource: path.to_string(),
                matched: false,
                path_parameters: IndexMap::new(),
                query_parameters,
            },
        }
    }
}

/// One-shot resolution without keeping compiled patterns around.
pub fn resolve<S: AsRef<str>>(requested_path: &str, templates: &[S]) -> String {
    match RouteResolver::new(templates) {
        Ok(resolver) => resolver.resolve(requested_path).to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to compile path templates");
            requested_path.to_string()
        }
    }
}
