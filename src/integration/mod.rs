//! Proxy-integration subsystem.
//!
//! # Data Flow
//! ```text
//! ResolvedRoute + InboundRequest + Option<Claim>
//!     → envelope.rs (build the fixed-shape invocation envelope)
//!     → invoker.rs (single POST to the backend function, bounded by timeout)
//!     → response.rs (parse reply, apply defaults, base64, errorMessage fallback)
//!     → InvocationResponse, or InvokeError for the dispatcher to turn into 502
//! ```

pub mod envelope;
pub mod invoker;
pub mod response;

pub use envelope::{InboundRequest, InvocationEnvelope};
pub use invoker::{BackendInvoker, InvokeError};
pub use response::{InvocationResponse, NormalizeError, RawInvocationResponse};
