//! Path template compilation.
//!
//! # Responsibilities
//! - Split a template such as `/users/{id}/orders` into literal and
//!   placeholder parts
//! - Compile it once into an anchored regex
//! - Capture placeholder values from a concrete path
//!
//! # Design Decisions
//! - Literal parts are escaped; only the request path is ever matched
//!   against a pattern, never compiled into one
//! - A placeholder matches any character sequence (lazy), including `/`

use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{([^}]*)\}").expect("static regex"))
}

/// A path template compiled for matching.
#[derive(Debug, Clone)]
pub struct TemplatePattern {
    template: String,
    names: Vec<String>,
    regex: Regex,
}

impl TemplatePattern {
    pub fn compile(template: &str) -> Result<Self, regex::Error> {
        let mut pattern = String::with_capacity(template.len() + 8);
        let mut names = Vec::new();
        let mut last = 0;

        pattern.push('^');
        for captures in placeholder_regex().captures_iter(template) {
            let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            pattern.push_str(&regex::escape(&template[last..whole.start()]));
            pattern.push_str("(.*?)");
            names.push(name.as_str().to_string());
            last = whole.end();
        }
        pattern.push_str(&regex::escape(&template[last..]));
        pattern.push('$');

        Ok(Self {
            template: template.to_string(),
            names,
            regex: Regex::new(&pattern)?,
        })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Placeholder names in template order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_literal(&self) -> bool {
        self.names.is_empty()
    }

    /// Length used to order candidates; longer templates are tried first.
    pub fn specificity(&self) -> usize {
        self.template.chars().count()
    }

    /// Full-string wildcard match.
    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Placeholder values captured from `path`, as they appear in it.
    ///
    /// Returns `None` if the path does not match. A name repeated in the
    /// template keeps its last value. The dispatcher decodes the request
    /// path once before matching, so no decoding happens here.
    pub fn captures(&self, path: &str) -> Option<IndexMap<String, String>> {
        let captures = self.regex.captures(path)?;
        let values = self
            .names
            .iter()
            .zip(captures.iter().skip(1))
            .map(|(name, value)| {
                let value = value.map(|m| m.as_str()).unwrap_or_default();
                (name.clone(), value.to_string())
            })
            .collect();
        Some(values)
    }
}
