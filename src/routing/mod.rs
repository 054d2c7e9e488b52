//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path + raw query
//!     → resolver.rs (exact match, then wildcard match)
//!     → matcher.rs (compiled template patterns)
//!     → Return: ResolvedRoute (template or literal path fallback)
//!
//! Route Compilation (at startup):
//!     contract path templates (declaration order)
//!     → compile each template to an anchored regex
//!     → stable sort by descending template length
//!     → freeze as immutable RouteResolver
//! ```
//!
//! # Design Decisions
//! - Templates compiled at startup, immutable at runtime
//! - Deterministic: same input always resolves to the same template
//! - Unknown routes fall through with the literal path

pub mod matcher;
pub mod resolver;

pub use matcher::TemplatePattern;
pub use resolver::{resolve, ResolvedRoute, RouteResolver};
